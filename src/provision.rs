// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use log::info;

use crate::{
    cluster::{Annotator, EnodeAnnotations},
    config::Config,
    error::Result,
    keystore::{self, AccountAddress},
    secret::{KeystoreDir, PasswordFile},
    tool::{Bootnode, Geth, PublicKey},
};

/// What a successful run produced.
#[derive(Debug)]
pub(crate) struct Identity {
    pub(crate) public_key: PublicKey,
    pub(crate) account_address: AccountAddress,
    pub(crate) enodes: EnodeAnnotations,
}

pub(crate) struct Provisioner {
    config: Config,
    bootnode: Bootnode,
    geth: Geth,
}

impl Provisioner {
    /// Locates the external tools. This happens before anything is written so
    /// a missing tool leaves no trace.
    pub(crate) fn new(config: Config) -> Result<Self> {
        let bootnode = Bootnode::new(&config.bootnode)?;
        let geth = Geth::new(&config.geth)?;
        Ok(Self {
            config,
            bootnode,
            geth,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every step in order and stops at the first failure. The password
    /// file and keystore directory are gone by the time this returns, whether
    /// or not it succeeded.
    pub(crate) async fn run<A: Annotator + ?Sized>(&self, annotator: &A) -> Result<Identity> {
        let config = &self.config;

        self.bootnode.generate_key(&config.private_key).await?;
        let public_key = self.bootnode.public_key(&config.private_key).await?;

        let account_address = {
            let password = config.password_policy.generate()?;
            let password_file = PasswordFile::create_in(&config.secret_dir, &password)?;
            let keystore_dir = KeystoreDir::create_in(&config.secret_dir)?;

            self.geth
                .import_account(
                    keystore_dir.path(),
                    password_file.path(),
                    &config.private_key,
                )
                .await?;
            keystore::account_address(keystore_dir.path())?
        };
        account_address.write_to(&config.account_address)?;

        let enodes = EnodeAnnotations::new(
            &public_key,
            &config.internal_address,
            &config.external_address,
        );
        info!("Internal enode: {}", enodes.internal);
        info!("External enode: {}", enodes.external);
        annotator.annotate(&config.pod, &enodes).await?;

        Ok(Identity {
            public_key,
            account_address,
            enodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io, path::Path, sync::Mutex};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        cluster::PodRef,
        error::{self, Error},
        password, tool::testing,
    };

    const ADDRESS: &str = "2754599e48ca29f1998c31e7c668c33bff5e5bf2";

    const BOOTNODE: &str = r#"
case "$1" in
  -genkey) printf 'deadbeef' > "$2" ;;
  -writeaddress) [ -f "$3" ] && echo abc123 ;;
  *) exit 2 ;;
esac
"#;

    // Imports by writing one keystore entry, after checking that the
    // password file is present and private. A copy of the password is kept
    // so tests can compare runs.
    const GETH: &str = r#"
keystore="$4"; password="$6"; key="$7"
[ -f "$key" ] || exit 4
[ "$(stat -c %a "$password")" = 600 ] || exit 5
cp "$password" "$keystore/../../seen-password-$$"
printf '{"address":"2754599e48ca29f1998c31e7c668c33bff5e5bf2","version":3}' \
  > "$keystore/UTC--2021-03-01T05-17-12.173336000Z--2754599e48ca29f1998c31e7c668c33bff5e5bf2"
"#;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(PodRef, EnodeAnnotations)>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<(PodRef, EnodeAnnotations)> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Annotator for Recorder {
        async fn annotate(&self, pod: &PodRef, enodes: &EnodeAnnotations) -> Result<()> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((pod.clone(), enodes.clone()));
            }
            Ok(())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Annotator for Unreachable {
        async fn annotate(&self, _: &PodRef, _: &EnodeAnnotations) -> Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "API server unreachable").into())
        }
    }

    struct Fixture {
        root: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new(geth: &str) -> Result<Self> {
            let root = TempDir::new()?;
            let bin = root.path().join("bin");
            let secrets = root.path().join("shm").join("secrets");
            let data = root.path().join("data");
            for dir in [&bin, &secrets, &data] {
                fs::create_dir_all(dir)?;
            }

            let config = Config {
                kubeconfig: None,
                private_key: data.join("nodekey"),
                account_address: data.join("address"),
                pod: PodRef {
                    namespace: "default".to_owned(),
                    name: "proxy-0".to_owned(),
                },
                internal_address: "10.0.0.1:30303".to_owned(),
                external_address: "1.2.3.4:30303".to_owned(),
                bootnode: testing::script(&bin, "bootnode", BOOTNODE)?,
                geth: testing::script(&bin, "geth", geth)?,
                secret_dir: secrets,
                password_policy: password::Policy::default(),
            };
            Ok(Self { root, config })
        }

        fn provisioner(&self) -> Result<Provisioner> {
            Provisioner::new(self.config.clone())
        }

        fn secrets_left(&self) -> Result<usize> {
            Ok(fs::read_dir(&self.config.secret_dir)?.count())
        }

        fn seen_passwords(&self) -> Result<Vec<String>> {
            let mut passwords = Vec::new();
            for entry in fs::read_dir(self.root.path().join("shm"))? {
                let path = entry?.path();
                if path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("seen-password-"))
                {
                    passwords.push(fs::read_to_string(path)?);
                }
            }
            Ok(passwords)
        }
    }

    #[tokio::test]
    async fn provisions_identity() -> Result<()> {
        let fixture = Fixture::new(GETH)?;
        let recorder = Recorder::default();

        let identity = fixture.provisioner()?.run(&recorder).await?;

        assert_eq!(identity.public_key, PublicKey::from("abc123"));
        assert_eq!(identity.account_address.as_str(), ADDRESS);
        assert_eq!(fs::read_to_string(&fixture.config.private_key)?, "deadbeef");
        assert_eq!(fs::read(&fixture.config.account_address)?, ADDRESS.as_bytes());
        assert_eq!(fixture.secrets_left()?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn publishes_both_enodes_in_one_call() -> Result<()> {
        let fixture = Fixture::new(GETH)?;
        let recorder = Recorder::default();

        _ = fixture.provisioner()?.run(&recorder).await?;

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        let (pod, enodes) = &calls[0];
        assert_eq!(pod, &fixture.config.pod);
        assert_eq!(enodes.internal.to_string(), "enode://abc123@10.0.0.1:30303");
        assert_eq!(enodes.external.to_string(), "enode://abc123@1.2.3.4:30303");
        Ok(())
    }

    #[tokio::test]
    async fn password_differs_between_runs() -> Result<()> {
        let fixture = Fixture::new(GETH)?;
        let provisioner = fixture.provisioner()?;

        _ = provisioner.run(&Recorder::default()).await?;
        _ = provisioner.run(&Recorder::default()).await?;

        let passwords = fixture.seen_passwords()?;
        assert_eq!(passwords.len(), 2);
        assert_eq!(passwords[0].len(), 64);
        assert_ne!(passwords[0], passwords[1]);
        Ok(())
    }

    #[tokio::test]
    async fn import_failure_cleans_up_secrets() -> Result<()> {
        let fixture = Fixture::new("exit 1\n")?;
        let recorder = Recorder::default();

        let result = fixture.provisioner()?.run(&recorder).await;

        assert!(matches!(
            result,
            Err(Error::Tool(error::Tool::Failed {
                command: "geth account import",
                ..
            }))
        ));
        assert_eq!(fixture.secrets_left()?, 0);
        assert!(fixture.config.private_key.exists());
        assert!(!fixture.config.account_address.exists());
        assert!(recorder.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn extra_keystore_entry_stops_before_extraction() -> Result<()> {
        let fixture = Fixture::new(&format!("{GETH}touch \"$keystore/UTC--stray\"\n"))?;
        let recorder = Recorder::default();

        let result = fixture.provisioner()?.run(&recorder).await;

        assert!(matches!(
            result,
            Err(Error::Keystore(error::Keystore::EntryCount { count: 2, .. }))
        ));
        assert_eq!(fixture.secrets_left()?, 0);
        assert!(!fixture.config.account_address.exists());
        assert!(recorder.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_keystore_stops_before_extraction() -> Result<()> {
        let fixture = Fixture::new("exit 0\n")?;
        let recorder = Recorder::default();

        let result = fixture.provisioner()?.run(&recorder).await;

        assert!(matches!(
            result,
            Err(Error::Keystore(error::Keystore::EntryCount { count: 0, .. }))
        ));
        assert_eq!(fixture.secrets_left()?, 0);
        assert!(!fixture.config.account_address.exists());
        Ok(())
    }

    #[tokio::test]
    async fn annotation_failure_is_fatal() -> Result<()> {
        let fixture = Fixture::new(GETH)?;

        let result = fixture.provisioner()?.run(&Unreachable).await;

        assert!(matches!(result, Err(Error::Io(_))));
        // Files written before the failing step stay where they are.
        assert_eq!(fs::read(&fixture.config.account_address)?, ADDRESS.as_bytes());
        assert_eq!(fixture.secrets_left()?, 0);
        Ok(())
    }

    #[test]
    fn missing_tool_has_no_side_effects() -> Result<()> {
        let mut fixture = Fixture::new(GETH)?;
        fixture.config.geth = Path::new("/nonexistent/geth").to_owned();

        assert!(matches!(
            fixture.provisioner(),
            Err(Error::Tool(error::Tool::NotFound { name: "geth", .. }))
        ));
        assert!(!fixture.config.private_key.exists());
        assert_eq!(fixture.secrets_left()?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn key_generation_failure_stops_pipeline() -> Result<()> {
        let mut fixture = Fixture::new(GETH)?;
        fixture.config.bootnode =
            testing::script(fixture.root.path(), "broken-bootnode", "exit 1\n")?;
        let recorder = Recorder::default();

        let result = fixture.provisioner()?.run(&recorder).await;

        assert!(matches!(
            result,
            Err(Error::Tool(error::Tool::Failed {
                command: "bootnode -genkey",
                ..
            }))
        ));
        assert!(fixture.seen_passwords()?.is_empty());
        assert!(!fixture.config.account_address.exists());
        assert!(recorder.calls().is_empty());
        Ok(())
    }
}
