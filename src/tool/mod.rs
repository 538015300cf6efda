// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod bootnode;
mod geth;

use std::{
    env,
    ffi::{OsStr, OsString},
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Output, Stdio},
};

use log::debug;
use tokio::process::Command;

use crate::error::{self, Result};

pub(crate) use bootnode::{Bootnode, PublicKey};
pub(crate) use geth::Geth;

/// An external program located once up front and then invoked any number of
/// times.
#[derive(Debug, Clone)]
pub(crate) struct Tool {
    name: &'static str,
    path: PathBuf,
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// The absolute directories in a `PATH`-style list. Empty and relative
/// entries would resolve against the working directory, so they are skipped.
fn search_dirs(search: &OsStr) -> impl Iterator<Item = PathBuf> + '_ {
    env::split_paths(search).filter(|dir| dir.is_absolute())
}

impl Tool {
    /// Finds `program` the way a shell would: a name with a path separator is
    /// used as given, anything else is looked up on `PATH`.
    pub(crate) fn resolve(name: &'static str, program: &Path) -> Result<Self> {
        Self::resolve_in(name, program, env::var_os("PATH"))
    }

    fn resolve_in(name: &'static str, program: &Path, search: Option<OsString>) -> Result<Self> {
        let found = if program.components().count() > 1 {
            Some(program.to_owned()).filter(|path| is_executable(path))
        } else {
            search.and_then(|search| {
                search_dirs(&search)
                    .map(|dir| dir.join(program))
                    .find(|candidate| is_executable(candidate))
            })
        };

        let path = found.ok_or_else(|| error::Tool::NotFound {
            name,
            program: program.to_owned(),
        })?;
        debug!("Using {} at {}", name, path.display());
        Ok(Self { name, path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.path);
        _ = cmd.args(args).stdin(Stdio::null()).stderr(Stdio::inherit());
        cmd
    }

    /// Runs the program to completion with its output passed through to ours.
    async fn run<I, S>(&self, description: &'static str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!("Running {} ({} at {})", description, self.name, self.path().display());
        let status = self
            .command(args)
            .stdout(Stdio::inherit())
            .status()
            .await?;
        if !status.success() {
            return Err(error::Tool::Failed {
                command: description,
                status,
            }
            .into());
        }
        Ok(())
    }

    /// Runs the program to completion and returns what it wrote to standard
    /// output, trimmed.
    async fn capture<I, S>(&self, description: &'static str, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!("Running {} ({} at {})", description, self.name, self.path().display());
        let Output { status, stdout, .. } = self
            .command(args)
            .stdout(Stdio::piped())
            .output()
            .await?;
        if !status.success() {
            return Err(error::Tool::Failed {
                command: description,
                status,
            }
            .into());
        }

        let stdout = String::from_utf8(stdout).map_err(|source| error::Tool::Encoding {
            command: description,
            source,
        })?;
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Err(error::Tool::EmptyOutput(description).into());
        }
        Ok(trimmed.to_owned())
    }
}
