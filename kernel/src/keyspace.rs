// Keyspace Provisioning
//
// Creates the target keyspace before any schema is applied. The DDL
// runs through a client bound to the system keyspace, since the target
// does not exist yet.

use tracing::info;

use crate::client::{open_scoped, ClientFactory, CqlClient, Replication, SYSTEM_KEYSPACE};
use crate::config::{validate_keyspace_name, ConnectionConfig};
use crate::error::SchemaError;

/// Replication for a new keyspace: network-topology scoped to
/// `datacenter` when one is given, simple otherwise.
pub fn replication_for(config: &ConnectionConfig, datacenter: Option<&str>) -> Replication {
    match datacenter.filter(|dc| !dc.is_empty()) {
        Some(dc) => Replication::NetworkTopology {
            datacenter: dc.into(),
            replicas: config.num_replicas(),
        },
        None => Replication::Simple {
            replicas: config.num_replicas(),
        },
    }
}

/// Create keyspace `name` using the connection described by `config`.
pub fn create_keyspace<F: ClientFactory>(
    config: &ConnectionConfig,
    name: &str,
    datacenter: Option<&str>,
    factory: &F,
) -> Result<(), SchemaError> {
    validate_keyspace_name(name)?;

    let bootstrap = config.with_keyspace(SYSTEM_KEYSPACE);
    let replication = replication_for(config, datacenter);

    let mut client = open_scoped(factory, &bootstrap)?;
    client
        .create_keyspace(name, &replication)
        .map_err(|err| match err {
            SchemaError::Provisioning { .. } => err,
            other => SchemaError::Provisioning {
                keyspace: name.into(),
                reason: other.to_string(),
            },
        })?;

    info!(keyspace = name, %replication, "keyspace created");
    Ok(())
}
