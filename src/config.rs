// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    env,
    ffi::{OsStr, OsString},
    path::PathBuf,
};

use clap::{CommandFactory, Parser};

use crate::{
    cluster::PodRef,
    error::{self, Result},
    metadata, password,
};

/// Generate a throw-away node key for a proxy, import it into a keystore,
/// and publish the proxy's enode URLs as annotations on its Pod.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub(crate) struct Args {
    /// Path to a kubeconfig file. Leave empty to use the in-cluster service
    /// account.
    #[arg(long, env = "PROXY_INIT_KUBECONFIG", value_hint = clap::ValueHint::FilePath)]
    kubeconfig: Option<OsString>,

    /// Path to write the generated private key to.
    #[arg(long, env = "PROXY_INIT_PRIVATE_KEY", value_hint = clap::ValueHint::FilePath)]
    private_key: Option<PathBuf>,

    /// Path to write the account address to.
    #[arg(long, env = "PROXY_INIT_ACCOUNT_ADDRESS", value_hint = clap::ValueHint::FilePath)]
    account_address: Option<PathBuf>,

    /// Namespace of the Pod to annotate.
    #[arg(long, env = "PROXY_INIT_POD_NAMESPACE", default_value = "default")]
    pod_namespace: String,

    /// Name of the Pod to annotate.
    #[arg(long, env = "PROXY_INIT_POD_NAME")]
    pod_name: Option<String>,

    /// Internal proxy address (host:port).
    #[arg(long, env = "PROXY_INIT_INTERNAL_ADDRESS")]
    internal_address: Option<String>,

    /// External proxy address (host:port).
    #[arg(long, env = "PROXY_INIT_EXTERNAL_ADDRESS")]
    external_address: Option<String>,

    /// The bootnode program used to generate the node key.
    #[arg(long, env = "PROXY_INIT_BOOTNODE", default_value = metadata::DEFAULT_BOOTNODE, value_hint = clap::ValueHint::ExecutablePath)]
    bootnode: PathBuf,

    /// The geth program used to import the node key into a keystore.
    #[arg(long, env = "PROXY_INIT_GETH", default_value = metadata::DEFAULT_GETH, value_hint = clap::ValueHint::ExecutablePath)]
    geth: PathBuf,

    /// Directory for the transient password file and keystore. This should
    /// be memory-backed.
    #[arg(long, env = "PROXY_INIT_SECRET_DIR", default_value = metadata::DEFAULT_SECRET_DIR, value_hint = clap::ValueHint::DirPath)]
    secret_dir: PathBuf,

    /// Length of the generated keystore password.
    #[arg(long, default_value_t = password::Policy::default().length)]
    password_length: usize,

    /// Number of digits in the generated keystore password.
    #[arg(long, default_value_t = password::Policy::default().digits)]
    password_digits: usize,

    /// Number of symbols in the generated keystore password.
    #[arg(long, default_value_t = password::Policy::default().symbols)]
    password_symbols: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) kubeconfig: Option<PathBuf>,
    pub(crate) private_key: PathBuf,
    pub(crate) account_address: PathBuf,
    pub(crate) pod: PodRef,
    pub(crate) internal_address: String,
    pub(crate) external_address: String,
    pub(crate) bootnode: PathBuf,
    pub(crate) geth: PathBuf,
    pub(crate) secret_dir: PathBuf,
    pub(crate) password_policy: password::Policy,
}

fn required<T: AsRef<OsStr>>(value: Option<T>, flag: &'static str) -> Result<T> {
    value
        .filter(|v| !v.as_ref().is_empty())
        .ok_or_else(|| error::Config::MissingArgument(flag).into())
}

/// Rewrites `-name` and `-name=value` to `--name` and `--name=value` for
/// every long flag we define, so invocations written for Go-style flag
/// parsing keep working. Anything after `--` is left alone.
pub(crate) fn widen_single_dash<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let longs: Vec<String> = Args::command()
        .get_arguments()
        .filter_map(clap::Arg::get_long)
        .map(str::to_owned)
        .collect();

    let mut positional = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || positional {
                return arg;
            }

            let widened = arg.to_str().and_then(|s| {
                if s == "--" {
                    positional = true;
                    return None;
                }
                let flag = s.strip_prefix('-').filter(|f| !f.starts_with('-'))?;
                let name = flag.split_once('=').map_or(flag, |(name, _)| name);
                longs
                    .iter()
                    .any(|long| long == name)
                    .then(|| format!("-{s}"))
            });
            widened.map_or(arg, OsString::from)
        })
        .collect()
}

impl Args {
    /// Parses the process arguments, accepting long flags with either one or
    /// two leading dashes.
    pub(crate) fn parse_any_dash() -> Self {
        Self::parse_from(widen_single_dash(env::args_os()))
    }

    /// Checks that every required flag is present and non-empty. Nothing on
    /// disk or in the cluster is touched before this succeeds.
    pub(crate) fn into_config(self) -> Result<Config> {
        let private_key = required(self.private_key, "private-key")?;
        let account_address = required(self.account_address, "account-address")?;
        let internal_address = required(self.internal_address, "internal-address")?;
        let external_address = required(self.external_address, "external-address")?;
        let pod_name = required(self.pod_name, "pod-name")?;
        let pod_namespace = required(Some(self.pod_namespace), "pod-namespace")?;

        let password_policy = password::Policy {
            length: self.password_length,
            digits: self.password_digits,
            symbols: self.password_symbols,
            ..password::Policy::default()
        };
        password_policy.validate()?;

        Ok(Config {
            kubeconfig: self
                .kubeconfig
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            private_key,
            account_address,
            pod: PodRef {
                namespace: pod_namespace,
                name: pod_name,
            },
            internal_address,
            external_address,
            bootnode: self.bootnode,
            geth: self.geth,
            secret_dir: self.secret_dir,
            password_policy,
        })
    }
}
