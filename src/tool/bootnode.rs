// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsStr, fmt, path::Path};

use log::info;

use crate::error::Result;

use super::Tool;

/// A node's hex-encoded public key as printed by `bootnode -writeaddress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublicKey(String);

#[cfg(test)]
impl From<&str> for PublicKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) struct Bootnode {
    tool: Tool,
}

impl Bootnode {
    pub(crate) fn new(program: &Path) -> Result<Self> {
        Ok(Self {
            tool: Tool::resolve("bootnode", program)?,
        })
    }

    /// Writes a freshly generated node key to `path`.
    pub(crate) async fn generate_key(&self, path: &Path) -> Result<()> {
        self.tool
            .run("bootnode -genkey", [OsStr::new("-genkey"), path.as_os_str()])
            .await?;
        info!("Generated private key at: {}", path.display());
        Ok(())
    }

    pub(crate) async fn public_key(&self, path: &Path) -> Result<PublicKey> {
        let public_key = self
            .tool
            .capture(
                "bootnode -writeaddress -nodekey",
                [
                    OsStr::new("-writeaddress"),
                    OsStr::new("-nodekey"),
                    path.as_os_str(),
                ],
            )
            .await?;
        info!("Generated public key: {}", public_key);
        Ok(PublicKey(public_key))
    }
}
