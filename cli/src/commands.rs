use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use cqlschema_kernel::config::resolver::resolve;
use cqlschema_kernel::keyspace::{create_keyspace, replication_for};
use cqlschema_kernel::persistence::Persistence;
use cqlschema_kernel::version::{SCHEMA_VERSION, VISIBILITY_SCHEMA_VERSION};
use cqlschema_kernel::{
    check_compatible_version, verify_compatible_version, ClientFactory, ExpectedVersions,
};

use crate::args::ConnectionArgs;

/// Create a keyspace.
#[derive(Args, Debug)]
pub struct CreateKeyspaceArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Datacenter for network-topology replication
    #[arg(short = 'd', long, env = "CASSANDRA_DATACENTER")]
    pub datacenter: Option<String>,
}

/// Check the schema version of a single keyspace.
#[derive(Args, Debug)]
pub struct CheckVersionArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Minimum schema version the keyspace must carry
    #[arg(long, default_value = SCHEMA_VERSION)]
    pub expected_version: String,
}

/// Verify all stores of a persistence config.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to persistence config JSON
    #[arg(long)]
    pub persistence: PathBuf,

    #[arg(long, default_value = SCHEMA_VERSION)]
    pub expected_version: String,

    #[arg(long, default_value = VISIBILITY_SCHEMA_VERSION)]
    pub expected_visibility_version: String,
}

/// JSON summary printed on success.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum CliOutput {
    CreateKeyspace {
        keyspace: String,
        replication: String,
    },
    CheckVersion {
        keyspace: String,
        expected_version: String,
    },
    Verify {
        persistence: String,
        expected: ExpectedOutput,
    },
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExpectedOutput {
    pub default: String,
    pub visibility: String,
}

pub fn run_create_keyspace<F: ClientFactory>(
    args: &CreateKeyspaceArgs,
    factory: &F,
) -> Result<CliOutput> {
    let config = resolve(&args.connection)?;
    let datacenter = args.datacenter.as_deref();

    create_keyspace(&config, config.keyspace(), datacenter, factory)?;

    Ok(CliOutput::CreateKeyspace {
        keyspace: config.keyspace().into(),
        replication: replication_for(&config, datacenter).to_string(),
    })
}

pub fn run_check_version<F: ClientFactory>(
    args: &CheckVersionArgs,
    factory: &F,
) -> Result<CliOutput> {
    let config = resolve(&args.connection)?;

    check_compatible_version(&config.to_params(), &args.expected_version, factory)?;

    Ok(CliOutput::CheckVersion {
        keyspace: config.keyspace().into(),
        expected_version: args.expected_version.clone(),
    })
}

pub fn run_verify<F: ClientFactory>(args: &VerifyArgs, factory: &F) -> Result<CliOutput> {
    let persistence = Persistence::from_file(&args.persistence)?;
    let expected = ExpectedVersions {
        default: args.expected_version.clone(),
        visibility: args.expected_visibility_version.clone(),
    };

    verify_compatible_version(&persistence, &expected, factory).with_context(|| {
        format!(
            "schema verification failed for {}",
            args.persistence.display()
        )
    })?;

    Ok(CliOutput::Verify {
        persistence: args.persistence.display().to_string(),
        expected: ExpectedOutput {
            default: expected.default,
            visibility: expected.visibility,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    use cqlschema_kernel::{ConnectionConfig, CqlClient, Replication, SchemaError};

    type Created = Rc<RefCell<Vec<(String, Replication)>>>;

    /// Reports one installed version and records DDL.
    struct StubFactory {
        installed: &'static str,
        created: Created,
    }

    struct StubClient {
        installed: &'static str,
        created: Created,
    }

    impl ClientFactory for StubFactory {
        type Client = StubClient;

        fn create(&self, _config: &ConnectionConfig) -> Result<StubClient, SchemaError> {
            Ok(StubClient {
                installed: self.installed,
                created: Rc::clone(&self.created),
            })
        }
    }

    impl CqlClient for StubClient {
        fn read_schema_version(&mut self, _keyspace: &str) -> Result<String, SchemaError> {
            Ok(self.installed.into())
        }

        fn create_keyspace(
            &mut self,
            name: &str,
            replication: &Replication,
        ) -> Result<(), SchemaError> {
            self.created
                .borrow_mut()
                .push((name.into(), replication.clone()));
            Ok(())
        }

        fn close(&mut self) {}
    }

    fn stub(installed: &'static str) -> StubFactory {
        StubFactory {
            installed,
            created: Rc::default(),
        }
    }

    fn connection(keyspace: &str) -> ConnectionArgs {
        ConnectionArgs {
            endpoint: "127.0.0.1".into(),
            port: 9042,
            user: None,
            password: None,
            allowed_authenticators: vec![],
            timeout: 30,
            connect_timeout: 2,
            keyspace: keyspace.into(),
            replication_factor: 1,
            protocol_version: 0,
            tls: false,
            tls_cert_file: None,
            tls_key_file: None,
            tls_ca_file: None,
            tls_enable_host_verification: false,
            tls_server_name: None,
        }
    }

    #[test]
    fn create_keyspace_without_datacenter() {
        let factory = stub("0.30");
        let args = CreateKeyspaceArgs {
            connection: connection("mykeyspace"),
            datacenter: None,
        };

        let output = run_create_keyspace(&args, &factory).unwrap();

        assert_eq!(
            output,
            CliOutput::CreateKeyspace {
                keyspace: "mykeyspace".into(),
                replication: "simple(rf=1)".into(),
            }
        );
        assert_eq!(
            factory.created.borrow().as_slice(),
            [("mykeyspace".to_string(), Replication::Simple { replicas: 1 })]
        );
    }

    #[test]
    fn check_version_reports_mismatch() {
        let factory = stub("0.29");
        let args = CheckVersionArgs {
            connection: connection("cadence"),
            expected_version: "0.30".into(),
        };

        let err = run_check_version(&args, &factory).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn verify_reads_persistence_file() {
        let path = std::env::temp_dir().join(format!(
            "cqlschema-persistence-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{
              "defaultStore": "cass",
              "datastores": {
                "cass": { "nosql": { "pluginName": "cassandra", "hosts": "127.0.0.1", "keyspace": "cadence" } }
              }
            }"#,
        )
        .unwrap();

        let args = VerifyArgs {
            persistence: path.clone(),
            expected_version: "0.30".into(),
            expected_visibility_version: "0.6".into(),
        };

        let ok = run_verify(&args, &stub("0.31"));
        let behind = run_verify(&args, &stub("0.29"));
        fs::remove_file(&path).unwrap();

        ok.unwrap();
        let err = behind.unwrap_err();
        assert!(format!("{err:#}").contains("store `default`"));
    }

    #[test]
    fn output_is_tagged_json() {
        let output = CliOutput::CheckVersion {
            keyspace: "cadence".into(),
            expected_version: "0.30".into(),
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["command"], "check-version");
        assert_eq!(json["keyspace"], "cadence");
    }
}
