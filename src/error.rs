// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, path::PathBuf, process::ExitStatus, result, string::FromUtf8Error};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] Config),
    #[error("password generation error: {0}")]
    Password(#[from] Password),
    #[error("external tool error: {0}")]
    Tool(#[from] Tool),
    #[error("keystore error: {0}")]
    Keystore(#[from] Keystore),
    #[error("cluster error: {0}")]
    Cluster(#[from] Cluster),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<kube::Error> for Error {
    fn from(value: kube::Error) -> Self {
        Self::Cluster(Cluster::Api(value))
    }
}

#[derive(Error, Debug)]
pub(crate) enum Config {
    #[error("--{0} is required")]
    MissingArgument(&'static str),
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("{digits} digits and {symbols} symbols do not fit in a password of length {length}")]
    ClassesExceedLength {
        length: usize,
        digits: usize,
        symbols: usize,
    },
    #[error("cannot pick {wanted} unique {class} from an alphabet of {available} characters")]
    NotEnoughUnique {
        class: &'static str,
        wanted: usize,
        available: usize,
    },
}

#[derive(Error, Debug)]
pub(crate) enum Tool {
    #[error("could not find {name} executable {program:?}")]
    NotFound { name: &'static str, program: PathBuf },
    #[error("'{command}' failed: {status}")]
    Failed {
        command: &'static str,
        status: ExitStatus,
    },
    #[error("'{command}' wrote non-UTF-8 output: {source}")]
    Encoding {
        command: &'static str,
        source: FromUtf8Error,
    },
    #[error("'{0}' wrote no output")]
    EmptyOutput(&'static str),
}

#[derive(Error, Debug)]
pub(crate) enum Keystore {
    #[error("expected exactly 1 file in keystore {}; got: {count}", .dir.display())]
    EntryCount { dir: PathBuf, count: usize },
    #[error("couldn't read keystore file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("couldn't parse keystore file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("couldn't write account address to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Error, Debug)]
pub(crate) enum Cluster {
    #[error("could not load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
    #[error("could not load in-cluster configuration: {0}")]
    InCluster(#[from] kube::config::InClusterError),
    #[error("API request failed: {0}")]
    Api(kube::Error),
}
