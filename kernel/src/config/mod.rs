// Connection Configuration
//
// Raw connection parameters as they arrive from flags or config files,
// and the validated, read-only configuration derived from them.
// Validation is pure: it consumes the raw value and returns a new one.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SchemaError;

pub mod resolver;

use resolver::{flag, OPT_ENDPOINT, OPT_KEYSPACE};

/// Native protocol port used when none is configured.
pub const DEFAULT_PORT: u16 = 9042;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_NUM_REPLICAS: u32 = 1;

/// Longest keyspace name the backend accepts.
const MAX_KEYSPACE_NAME_LEN: usize = 48;

/// TLS material for the client connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub ca_file: Option<String>,
    pub enable_host_verification: bool,
    pub server_name: Option<String>,
}

/// Unvalidated connection parameters.
///
/// Zero values mean "use the default". Hosts may be given as a list or
/// as a single comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionParams {
    #[serde(deserialize_with = "hosts_from_str_or_seq")]
    pub hosts: Vec<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub allowed_authenticators: Vec<String>,
    pub keyspace: String,
    pub num_replicas: u32,
    #[serde(rename = "protoVersion")]
    pub protocol_version: u8,
    /// Request timeout in seconds.
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(rename = "connectTimeout")]
    pub connect_timeout_secs: u64,
    pub tls: Option<TlsConfig>,
}

/// Validated description of how to reach the backend.
///
/// Only obtainable through [`ConnectionParams::validate`]. Derivations
/// such as [`ConnectionConfig::with_keyspace`] return new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    hosts: Vec<String>,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    allowed_authenticators: Vec<String>,
    keyspace: String,
    num_replicas: u32,
    protocol_version: u8,
    timeout: Duration,
    connect_timeout: Duration,
    tls: Option<TlsConfig>,
}

impl ConnectionParams {
    /// Validate and normalize into a [`ConnectionConfig`].
    ///
    /// Fails if no host is given or the keyspace is missing or not a
    /// valid identifier. Applies port, replica and timeout defaults.
    pub fn validate(self) -> Result<ConnectionConfig, SchemaError> {
        let hosts: Vec<String> = self
            .hosts
            .iter()
            .flat_map(|h| h.split(','))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();

        if hosts.is_empty() {
            return Err(SchemaError::config(format!(
                "missing cassandra endpoint argument {}",
                flag(OPT_ENDPOINT)
            )));
        }
        if self.keyspace.is_empty() {
            return Err(SchemaError::config(format!(
                "missing {} argument",
                flag(OPT_KEYSPACE)
            )));
        }
        validate_keyspace_name(&self.keyspace)?;

        Ok(ConnectionConfig {
            hosts,
            port: if self.port == 0 { DEFAULT_PORT } else { self.port },
            user: self.user.filter(|u| !u.is_empty()),
            password: self.password.filter(|p| !p.is_empty()),
            allowed_authenticators: self.allowed_authenticators,
            keyspace: self.keyspace,
            num_replicas: if self.num_replicas == 0 {
                DEFAULT_NUM_REPLICAS
            } else {
                self.num_replicas
            },
            protocol_version: self.protocol_version,
            timeout: secs_or(self.timeout_secs, DEFAULT_TIMEOUT),
            connect_timeout: secs_or(self.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT),
            tls: self.tls.filter(|tls| tls.enabled),
        })
    }
}

impl ConnectionConfig {
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn allowed_authenticators(&self) -> &[String] {
        &self.allowed_authenticators
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn num_replicas(&self) -> u32 {
        self.num_replicas
    }

    /// Wire protocol version, `0` for the driver default.
    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_ref()
    }

    /// Contact points as `host:port`.
    pub fn contact_points(&self) -> Vec<String> {
        self.hosts
            .iter()
            .map(|host| format!("{}:{}", host, self.port))
            .collect()
    }

    /// Same connection, different target keyspace.
    pub fn with_keyspace(&self, keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            ..self.clone()
        }
    }

    /// Same connection, different timeouts.
    pub fn with_timeouts(&self, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout,
            ..self.clone()
        }
    }

    /// Raw parameters that validate back into this config.
    pub fn to_params(&self) -> ConnectionParams {
        ConnectionParams {
            hosts: self.hosts.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            allowed_authenticators: self.allowed_authenticators.clone(),
            keyspace: self.keyspace.clone(),
            num_replicas: self.num_replicas,
            protocol_version: self.protocol_version,
            timeout_secs: self.timeout.as_secs(),
            connect_timeout_secs: self.connect_timeout.as_secs(),
            tls: self.tls.clone(),
        }
    }
}

/// Reject names that cannot be used unquoted in keyspace DDL.
pub fn validate_keyspace_name(name: &str) -> Result<(), SchemaError> {
    let well_formed = name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.len() <= MAX_KEYSPACE_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(SchemaError::config(format!(
            "invalid keyspace name `{name}`: expected a letter followed by up to \
             {} alphanumeric or underscore characters",
            MAX_KEYSPACE_NAME_LEN - 1
        )))
    }
}

fn secs_or(secs: u64, default: Duration) -> Duration {
    if secs == 0 {
        default
    } else {
        Duration::from_secs(secs)
    }
}

fn hosts_from_str_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hosts {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Hosts::deserialize(deserializer)? {
        Hosts::One(joined) => vec![joined],
        Hosts::Many(hosts) => hosts,
    })
}
