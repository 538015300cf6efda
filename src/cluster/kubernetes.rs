// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Patch, PatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config,
};
use log::{debug, info};

use crate::{
    error::{self, Result},
    metadata,
};

use super::{Annotator, EnodeAnnotations, PodRef};

/// Annotates Pods through the Kubernetes API server.
pub(crate) struct Kube {
    client: Client,
}

impl Kube {
    /// Builds a client from the given kubeconfig file, or from the Pod's
    /// service account when no file is given. No request is made until the
    /// first annotation.
    pub(crate) async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                debug!("Loading cluster configuration from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(error::Cluster::from)?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(error::Cluster::from)?
            }
            None => {
                debug!("Loading in-cluster configuration");
                Config::incluster().map_err(error::Cluster::from)?
            }
        };

        Ok(Self {
            client: Client::try_from(config)?,
        })
    }
}

#[async_trait]
impl Annotator for Kube {
    async fn annotate(&self, pod: &PodRef, enodes: &EnodeAnnotations) -> Result<()> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &pod.namespace);
        let params = PatchParams {
            field_manager: Some(metadata::FIELD_MANAGER.clone()),
            ..PatchParams::default()
        };

        _ = pods
            .patch(&pod.name, &params, &Patch::Strategic(enodes.to_patch()))
            .await?;
        info!("Published enodes to Pod {}", pod);
        Ok(())
    }
}
