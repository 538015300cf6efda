// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;

// These must match the keys the proxy informer watches.
pub(crate) const INTERNAL_ENODE_KEY: &str = "proxy.mantalabs.com/internal-enode-url";
pub(crate) const EXTERNAL_ENODE_KEY: &str = "proxy.mantalabs.com/external-enode-url";

pub(crate) const DEFAULT_BOOTNODE: &str = "bootnode";
pub(crate) const DEFAULT_GETH: &str = "geth";
pub(crate) const DEFAULT_SECRET_DIR: &str = "/dev/shm";

pub(crate) static FIELD_MANAGER: Lazy<String> =
    Lazy::new(|| option_env!("CARGO_PKG_NAME").unwrap_or("proxy-init").to_owned());
