// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use rand::{seq::SliceRandom, Rng};
use secrecy::SecretString;

use crate::{error, rng};

const LOWER_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"~!@#$%^&*()_+`-={}|[]\\:\"<>?,./";

/// Describes the shape of a generated password: how long it is, how many of
/// its characters come from each class, and whether characters may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Policy {
    pub(crate) length: usize,
    pub(crate) digits: usize,
    pub(crate) symbols: usize,
    pub(crate) no_upper: bool,
    pub(crate) allow_repeat: bool,
}

impl Default for Policy {
    /// 64 characters with 10 digits, 10 symbols and no repeats. Letters and
    /// digits alone offer only 62 unique characters, so a 64-character
    /// password without repeats needs the symbols.
    fn default() -> Self {
        Self {
            length: 64,
            digits: 10,
            symbols: 10,
            no_upper: false,
            allow_repeat: false,
        }
    }
}

impl Policy {
    fn letters(&self) -> &'static [u8] {
        if self.no_upper {
            LOWER_LETTERS
        } else {
            LETTERS
        }
    }

    /// Checks that the policy can be satisfied at all. Without this, picking
    /// unique characters from an alphabet that is too small would never
    /// finish.
    pub(crate) fn validate(&self) -> Result<(), error::Password> {
        let classes = self.digits.saturating_add(self.symbols);
        if classes > self.length {
            return Err(error::Password::ClassesExceedLength {
                length: self.length,
                digits: self.digits,
                symbols: self.symbols,
            });
        }

        if !self.allow_repeat {
            for (class, wanted, alphabet) in [
                ("digits", self.digits, DIGITS),
                ("symbols", self.symbols, SYMBOLS),
                ("letters", self.length - classes, self.letters()),
            ] {
                if wanted > alphabet.len() {
                    return Err(error::Password::NotEnoughUnique {
                        class,
                        wanted,
                        available: alphabet.len(),
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn generate(&self) -> Result<SecretString, error::Password> {
        rng::map(|rng| self.generate_with(rng))
    }

    pub(crate) fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<SecretString, error::Password> {
        self.validate()?;

        let mut chars: Vec<u8> = Vec::with_capacity(self.length);
        let letters = self.length - self.digits - self.symbols;
        for (count, alphabet) in [
            (letters, self.letters()),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ] {
            let mut placed = 0;
            while placed < count {
                let Some(&ch) = alphabet.choose(rng) else {
                    break;
                };
                if !self.allow_repeat && chars.contains(&ch) {
                    continue;
                }

                let at = rng.gen_range(0..=chars.len());
                chars.insert(at, ch);
                placed += 1;
            }
        }

        // Every alphabet above is ASCII.
        Ok(SecretString::new(chars.into_iter().map(char::from).collect()))
    }
}
