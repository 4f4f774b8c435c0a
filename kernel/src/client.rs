// Control-Plane Client Abstraction
//
// Defines the capability surface the schema tooling needs from a
// backend client, and the scoped ownership that guarantees every
// client is closed exactly once.
//
// This module defines *interfaces only*; the driver-backed
// implementation lives in `driver`.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::config::ConnectionConfig;
use crate::error::SchemaError;

/// Keyspace DDL must run against this keyspace, which always exists.
pub const SYSTEM_KEYSPACE: &str = "system";

/// Replication strategy for a new keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replication {
    /// Uniform replica count across the cluster.
    Simple { replicas: u32 },

    /// Replica count scoped to a single datacenter.
    NetworkTopology { datacenter: String, replicas: u32 },
}

impl Replication {
    /// Strategy map as used in `CREATE KEYSPACE ... WITH replication = ...`.
    pub fn to_cql(&self) -> String {
        match self {
            Replication::Simple { replicas } => format!(
                "{{ 'class' : 'SimpleStrategy', 'replication_factor' : {replicas} }}"
            ),
            Replication::NetworkTopology {
                datacenter,
                replicas,
            } => format!(
                "{{ 'class' : 'NetworkTopologyStrategy', '{}' : {replicas} }}",
                datacenter.replace('\'', "''")
            ),
        }
    }
}

impl fmt::Display for Replication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replication::Simple { replicas } => write!(f, "simple(rf={replicas})"),
            Replication::NetworkTopology {
                datacenter,
                replicas,
            } => write!(f, "network-topology({datacenter}={replicas})"),
        }
    }
}

/// Render the keyspace creation statement.
pub fn create_keyspace_cql(name: &str, replication: &Replication) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {name} WITH replication = {}",
        replication.to_cql()
    )
}

/// Live client for schema control-plane operations.
///
/// Properties required from implementations:
/// - `close` is idempotent
/// - operations after `close` fail rather than panic
pub trait CqlClient {
    /// Read the schema version recorded for `keyspace`.
    fn read_schema_version(&mut self, keyspace: &str) -> Result<String, SchemaError>;

    /// Create `name` with the given replication unless it exists.
    fn create_keyspace(&mut self, name: &str, replication: &Replication)
        -> Result<(), SchemaError>;

    /// Release connection resources.
    fn close(&mut self);
}

/// Builds clients from validated configuration.
pub trait ClientFactory {
    type Client: CqlClient;

    /// Establish a client. Failures are `SchemaError::Connection`.
    fn create(&self, config: &ConnectionConfig) -> Result<Self::Client, SchemaError>;
}

/// Owns a client and closes it when dropped.
///
/// Every operation acquires its client through this guard so the
/// close happens on all exit paths, including early error returns.
pub struct ScopedClient<C: CqlClient> {
    client: C,
}

impl<C: CqlClient> ScopedClient<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: CqlClient> Deref for ScopedClient<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C: CqlClient> DerefMut for ScopedClient<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C: CqlClient> Drop for ScopedClient<C> {
    fn drop(&mut self) {
        self.client.close();
    }
}

/// Create a client for `config` wrapped in a [`ScopedClient`].
pub fn open_scoped<F: ClientFactory>(
    factory: &F,
    config: &ConnectionConfig,
) -> Result<ScopedClient<F::Client>, SchemaError> {
    factory.create(config).map(ScopedClient::new)
}
