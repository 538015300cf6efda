// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt,
    fs::{self, OpenOptions},
    io::Write,
    os::unix::fs::OpenOptionsExt,
    path::{Path, PathBuf},
};

use log::info;
use serde::{de::Error as _, Deserialize};
use serde_json::{Map, Value};

use crate::error::{self, Result};

/// The account address recorded in a keystore file, exactly as the wallet
/// wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub(crate) struct AccountAddress(String);

impl AccountAddress {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Writes the address, byte for byte, to `path`.
    pub(crate) fn write_to(&self, path: &Path) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o644)
                .open(path)?;
            file.write_all(self.as_str().as_bytes())?;
            file.sync_all()
        };

        write().map_err(|source| error::Keystore::Write {
            path: path.to_owned(),
            source,
        })?;
        info!("Wrote account address to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the one file the wallet created in `dir`. Entries are named like
/// `UTC--2021-03-01T05-17-12.173336000Z--2754599e48ca29f1998c31e7c668c33bff5e5bf2`,
/// but the name is not relied on.
pub(crate) fn find_key_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;

    match <[PathBuf; 1]>::try_from(entries) {
        Ok([path]) => Ok(path),
        Err(entries) => Err(error::Keystore::EntryCount {
            dir: dir.to_owned(),
            count: entries.len(),
        }
        .into()),
    }
}

pub(crate) fn read_account_address(path: &Path) -> Result<AccountAddress> {
    let content = fs::read(path).map_err(|source| error::Keystore::Read {
        path: path.to_owned(),
        source,
    })?;
    let malformed = |source| error::Keystore::Malformed {
        path: path.to_owned(),
        source,
    };

    // The file must be a JSON object; only its `address` member is used.
    let mut object: Map<String, Value> = serde_json::from_slice(&content).map_err(&malformed)?;
    let address = match object.remove("address") {
        Some(value) => AccountAddress::deserialize(value),
        None => Err(serde_json::Error::missing_field("address")),
    }
    .map_err(&malformed)?;

    info!("Extracted account address from keystore: {}", address);
    Ok(address)
}

/// Extracts the account address from the single file in a keystore
/// directory.
pub(crate) fn account_address(dir: &Path) -> Result<AccountAddress> {
    read_account_address(&find_key_file(dir)?)
}
