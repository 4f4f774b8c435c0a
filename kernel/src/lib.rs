// cqlschema Kernel
//
// Schema-version safety and keyspace provisioning for the
// Cassandra persistence backend of the workflow engine.

pub mod client;
pub mod config;
pub mod error;
pub mod keyspace;
pub mod persistence;
pub mod verify;
pub mod version;

#[cfg(feature = "scylla")]
pub mod driver;

#[cfg(test)]
mod testing;

pub use client::{ClientFactory, CqlClient, Replication, ScopedClient};
pub use config::{ConnectionConfig, ConnectionParams, TlsConfig};
pub use error::SchemaError;
pub use keyspace::create_keyspace;
pub use persistence::Persistence;
pub use verify::{check_compatible_version, verify_compatible_version, ExpectedVersions};
