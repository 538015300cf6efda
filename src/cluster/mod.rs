// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod kubernetes;

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use serde_json::json;

use crate::{error::Result, metadata, tool::PublicKey};

pub(crate) use self::kubernetes::Kube;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PodRef {
    pub(crate) namespace: String,
    pub(crate) name: String,
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A node URL of the form `enode://<public key>@<host:port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Enode {
    public_key: PublicKey,
    address: String,
}

impl Enode {
    pub(crate) fn new(public_key: PublicKey, address: &str) -> Self {
        Self {
            public_key,
            address: address.to_owned(),
        }
    }
}

impl fmt::Display for Enode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enode://{}@{}", self.public_key, self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnodeAnnotations {
    pub(crate) internal: Enode,
    pub(crate) external: Enode,
}

impl EnodeAnnotations {
    pub(crate) fn new(public_key: &PublicKey, internal: &str, external: &str) -> Self {
        Self {
            internal: Enode::new(public_key.clone(), internal),
            external: Enode::new(public_key.clone(), external),
        }
    }

    pub(crate) fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                metadata::INTERNAL_ENODE_KEY.to_owned(),
                self.internal.to_string(),
            ),
            (
                metadata::EXTERNAL_ENODE_KEY.to_owned(),
                self.external.to_string(),
            ),
        ])
    }

    /// The strategic merge patch body that sets both annotations on a Pod.
    pub(crate) fn to_patch(&self) -> serde_json::Value {
        json!({
            "metadata": {
                "annotations": self.annotations(),
            },
        })
    }
}

/// Publishes enode URLs somewhere the proxy informer can discover them.
#[async_trait]
pub(crate) trait Annotator: Send + Sync {
    async fn annotate(&self, pod: &PodRef, enodes: &EnodeAnnotations) -> Result<()>;
}
