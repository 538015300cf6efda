// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs::Permissions, io::Write, os::unix::fs::PermissionsExt, path::Path};

use log::debug;
use secrecy::{ExposeSecret, SecretString};
use tempfile::{NamedTempFile, TempDir};

use crate::error::Result;

/// A password written to an owner-only file. The file is deleted when this
/// value is dropped.
pub(crate) struct PasswordFile {
    file: NamedTempFile,
}

impl PasswordFile {
    pub(crate) fn create_in(dir: &Path, password: &SecretString) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("password")
            .permissions(Permissions::from_mode(0o600))
            .tempfile_in(dir)?;
        file.write_all(password.expose_secret().as_bytes())?;
        file.as_file().sync_all()?;
        debug!("Wrote password file {}", file.path().display());

        Ok(Self { file })
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for PasswordFile {
    fn drop(&mut self) {
        debug!("Removing password file {}", self.file.path().display());
    }
}

/// A scratch keystore directory, removed with everything in it when dropped.
pub(crate) struct KeystoreDir {
    dir: TempDir,
}

impl KeystoreDir {
    pub(crate) fn create_in(dir: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("keystore").tempdir_in(dir)?;
        debug!("Created keystore directory {}", dir.path().display());

        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for KeystoreDir {
    fn drop(&mut self) {
        debug!("Removing keystore directory {}", self.dir.path().display());
    }
}
