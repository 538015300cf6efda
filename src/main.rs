// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod cluster;
mod config;
mod error;
mod keystore;
mod metadata;
mod password;
mod provision;
mod rng;
mod secret;
mod tool;

use std::process;

use config::Args;
use error::Result;
use log::{error, info};
use provision::Provisioner;

async fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;
    let provisioner = Provisioner::new(config)?;
    let annotator = cluster::Kube::connect(provisioner.config().kubeconfig.as_deref()).await?;

    let identity = provisioner.run(&annotator).await?;
    info!(
        "Provisioned Pod {} with public key {} and account {}; published {} and {}",
        provisioner.config().pod,
        identity.public_key,
        identity.account_address,
        identity.enodes.internal,
        identity.enodes.external,
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("PROXY_INIT_LOG", "info")
        .write_style("PROXY_INIT_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse_any_dash()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
