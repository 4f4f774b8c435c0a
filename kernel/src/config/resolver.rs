// Option Resolution
//
// Gathers named options from an argument source into a validated
// connection config. The source is read through `OptionSource` only;
// argv parsing belongs to the caller.

use crate::config::{ConnectionConfig, ConnectionParams, TlsConfig};
use crate::error::SchemaError;

pub const OPT_ENDPOINT: &str = "endpoint";
pub const OPT_PORT: &str = "port";
pub const OPT_USER: &str = "user";
pub const OPT_PASSWORD: &str = "password";
pub const OPT_ALLOWED_AUTHENTICATORS: &str = "allowed-authenticators";
pub const OPT_TIMEOUT: &str = "timeout";
pub const OPT_CONNECT_TIMEOUT: &str = "connect-timeout";
pub const OPT_KEYSPACE: &str = "keyspace";
pub const OPT_REPLICATION_FACTOR: &str = "replication-factor";
pub const OPT_PROTOCOL_VERSION: &str = "protocol-version";
pub const OPT_DATACENTER: &str = "datacenter";

pub const FLAG_ENABLE_TLS: &str = "tls";
pub const FLAG_TLS_CERT_FILE: &str = "tls-cert-file";
pub const FLAG_TLS_KEY_FILE: &str = "tls-key-file";
pub const FLAG_TLS_CA_FILE: &str = "tls-ca-file";
pub const FLAG_TLS_ENABLE_HOST_VERIFICATION: &str = "tls-enable-host-verification";
pub const FLAG_TLS_SERVER_NAME: &str = "tls-server-name";

/// Named lookups over already-parsed command line options.
///
/// Absent options return `None` (or `false` / empty for flags and lists).
pub trait OptionSource {
    fn string(&self, key: &str) -> Option<String>;

    fn int(&self, key: &str) -> Option<i64>;

    fn bool(&self, key: &str) -> bool;

    fn string_list(&self, key: &str) -> Vec<String>;
}

/// Render an option key the way it appears in error messages.
pub fn flag(opt: &str) -> String {
    format!("(-{opt})")
}

/// Resolve a connection config from the given options.
pub fn resolve(source: &dyn OptionSource) -> Result<ConnectionConfig, SchemaError> {
    let tls = if source.bool(FLAG_ENABLE_TLS) {
        Some(TlsConfig {
            enabled: true,
            cert_file: non_empty(source.string(FLAG_TLS_CERT_FILE)),
            key_file: non_empty(source.string(FLAG_TLS_KEY_FILE)),
            ca_file: non_empty(source.string(FLAG_TLS_CA_FILE)),
            enable_host_verification: source.bool(FLAG_TLS_ENABLE_HOST_VERIFICATION),
            server_name: non_empty(source.string(FLAG_TLS_SERVER_NAME)),
        })
    } else {
        None
    };

    let params = ConnectionParams {
        hosts: source.string(OPT_ENDPOINT).into_iter().collect(),
        port: int_option(source, OPT_PORT)?,
        user: non_empty(source.string(OPT_USER)),
        password: non_empty(source.string(OPT_PASSWORD)),
        allowed_authenticators: source.string_list(OPT_ALLOWED_AUTHENTICATORS),
        keyspace: source.string(OPT_KEYSPACE).unwrap_or_default(),
        num_replicas: int_option(source, OPT_REPLICATION_FACTOR)?,
        protocol_version: int_option(source, OPT_PROTOCOL_VERSION)?,
        timeout_secs: int_option(source, OPT_TIMEOUT)?,
        connect_timeout_secs: int_option(source, OPT_CONNECT_TIMEOUT)?,
        tls,
    };

    params.validate()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read an integer option into the target width; absent means zero.
fn int_option<T>(source: &dyn OptionSource, key: &str) -> Result<T, SchemaError>
where
    T: TryFrom<i64> + Default,
{
    match source.int(key) {
        None => Ok(T::default()),
        Some(value) => T::try_from(value).map_err(|_| {
            SchemaError::config(format!("value {value} out of range for {}", flag(key)))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PORT;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Options {
        strings: HashMap<&'static str, String>,
        ints: HashMap<&'static str, i64>,
        flags: Vec<&'static str>,
    }

    impl Options {
        fn with(mut self, key: &'static str, value: &str) -> Self {
            self.strings.insert(key, value.into());
            self
        }

        fn with_int(mut self, key: &'static str, value: i64) -> Self {
            self.ints.insert(key, value);
            self
        }

        fn with_flag(mut self, key: &'static str) -> Self {
            self.flags.push(key);
            self
        }
    }

    impl OptionSource for Options {
        fn string(&self, key: &str) -> Option<String> {
            self.strings.get(key).cloned()
        }

        fn int(&self, key: &str) -> Option<i64> {
            self.ints.get(key).copied()
        }

        fn bool(&self, key: &str) -> bool {
            self.flags.contains(&key)
        }

        fn string_list(&self, key: &str) -> Vec<String> {
            self.strings
                .get(key)
                .map(|v| v.split(',').map(String::from).collect())
                .unwrap_or_default()
        }
    }

    fn base() -> Options {
        Options::default()
            .with(OPT_ENDPOINT, "127.0.0.1")
            .with(OPT_KEYSPACE, "cadence")
    }

    #[test]
    fn resolves_with_defaults() {
        let config = resolve(&base()).unwrap();

        assert_eq!(config.hosts(), ["127.0.0.1"]);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.num_replicas(), 1);
        assert!(config.tls().is_none());
    }

    #[test]
    fn missing_endpoint_is_config_error() {
        let options = Options::default().with(OPT_KEYSPACE, "cadence");
        let err = resolve(&options).unwrap_err();

        assert_eq!(
            err,
            SchemaError::config("missing cassandra endpoint argument (-endpoint)")
        );
    }

    #[test]
    fn missing_keyspace_is_config_error() {
        let options = Options::default().with(OPT_ENDPOINT, "127.0.0.1");
        let err = resolve(&options).unwrap_err();

        assert_eq!(err, SchemaError::config("missing (-keyspace) argument"));
    }

    #[test]
    fn reads_all_connection_options() {
        let options = base()
            .with(OPT_USER, "admin")
            .with(OPT_PASSWORD, "secret")
            .with(
                OPT_ALLOWED_AUTHENTICATORS,
                "org.apache.cassandra.auth.PasswordAuthenticator",
            )
            .with_int(OPT_PORT, 9043)
            .with_int(OPT_REPLICATION_FACTOR, 3)
            .with_int(OPT_PROTOCOL_VERSION, 4)
            .with_int(OPT_TIMEOUT, 10)
            .with_int(OPT_CONNECT_TIMEOUT, 1);

        let config = resolve(&options).unwrap();

        assert_eq!(config.user(), Some("admin"));
        assert_eq!(config.password(), Some("secret"));
        assert_eq!(config.allowed_authenticators().len(), 1);
        assert_eq!(config.port(), 9043);
        assert_eq!(config.num_replicas(), 3);
        assert_eq!(config.protocol_version(), 4);
        assert_eq!(config.timeout().as_secs(), 10);
        assert_eq!(config.connect_timeout().as_secs(), 1);
    }

    #[test]
    fn tls_only_when_enabled() {
        let without = resolve(&base().with(FLAG_TLS_CA_FILE, "ca.pem")).unwrap();
        assert!(without.tls().is_none());

        let with = resolve(
            &base()
                .with_flag(FLAG_ENABLE_TLS)
                .with_flag(FLAG_TLS_ENABLE_HOST_VERIFICATION)
                .with(FLAG_TLS_CA_FILE, "ca.pem")
                .with(FLAG_TLS_SERVER_NAME, "cassandra.internal"),
        )
        .unwrap();

        let tls = with.tls().unwrap();
        assert!(tls.enabled);
        assert!(tls.enable_host_verification);
        assert_eq!(tls.ca_file.as_deref(), Some("ca.pem"));
        assert_eq!(tls.server_name.as_deref(), Some("cassandra.internal"));
        assert!(tls.cert_file.is_none());
    }

    #[test]
    fn out_of_range_port_rejected() {
        let err = resolve(&base().with_int(OPT_PORT, 70_000)).unwrap_err();
        assert!(err.to_string().contains("(-port)"));

        let err = resolve(&base().with_int(OPT_REPLICATION_FACTOR, -1)).unwrap_err();
        assert!(err.is_config());
    }
}
