// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsStr, path::Path};

use log::info;

use crate::error::Result;

use super::Tool;

pub(crate) struct Geth {
    tool: Tool,
}

impl Geth {
    pub(crate) fn new(program: &Path) -> Result<Self> {
        Ok(Self {
            tool: Tool::resolve("geth", program)?,
        })
    }

    /// Imports the private key in `key` into `keystore`, encrypted with the
    /// password stored in `password`.
    pub(crate) async fn import_account(
        &self,
        keystore: &Path,
        password: &Path,
        key: &Path,
    ) -> Result<()> {
        self.tool
            .run(
                "geth account import",
                [
                    OsStr::new("account"),
                    OsStr::new("import"),
                    OsStr::new("--keystore"),
                    keystore.as_os_str(),
                    OsStr::new("--password"),
                    password.as_os_str(),
                    key.as_os_str(),
                ],
            )
            .await?;
        info!("Imported private key {}", key.display());
        Ok(())
    }
}
