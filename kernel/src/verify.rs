// Schema Version Verification
//
// Confirms, before the engine starts serving, that every store on
// this backend carries a schema at least as new as the binary expects.
// A newer installed schema passes: after an upgrade followed by a code
// rollback, the schema is a superset of what the older code needs.

use tracing::{debug, info};

use crate::client::{open_scoped, ClientFactory, CqlClient};
use crate::config::{ConnectionParams, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use crate::error::SchemaError;
use crate::persistence::{
    NoSqlConfig, Persistence, CASSANDRA_PLUGIN, DEFAULT_STORE, VISIBILITY_STORE,
};
use crate::version::{SchemaVersion, SCHEMA_VERSION, VISIBILITY_SCHEMA_VERSION};

/// Expected schema version per logical store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedVersions {
    pub default: String,
    pub visibility: String,
}

impl Default for ExpectedVersions {
    fn default() -> Self {
        Self {
            default: SCHEMA_VERSION.into(),
            visibility: VISIBILITY_SCHEMA_VERSION.into(),
        }
    }
}

/// Verify the default and visibility stores, in that order.
///
/// Stores that are not configured or do not use this backend are
/// skipped. Stops at the first failing store.
pub fn verify_compatible_version<F: ClientFactory>(
    persistence: &Persistence,
    expected: &ExpectedVersions,
    factory: &F,
) -> Result<(), SchemaError> {
    let requirements = [
        (DEFAULT_STORE, expected.default.as_str()),
        (VISIBILITY_STORE, expected.visibility.as_str()),
    ];

    for (store, expected_version) in requirements {
        let nosql = persistence
            .datastore_for(store)
            .and_then(|ds| ds.nosql.as_ref());
        verify_store(store, nosql, expected_version, factory)?;
    }

    Ok(())
}

/// Verify one store; `None` means the store is on another backend.
pub fn verify_store<F: ClientFactory>(
    store: &str,
    nosql: Option<&NoSqlConfig>,
    expected_version: &str,
    factory: &F,
) -> Result<(), SchemaError> {
    let Some(nosql) = nosql else {
        debug!(store, "store does not use nosql, skipping version check");
        return Ok(());
    };

    if nosql.plugin_name != CASSANDRA_PLUGIN {
        return Err(SchemaError::UnsupportedBackend {
            store: store.into(),
            plugin: nosql.plugin_name.clone(),
        });
    }

    check_store_version(store, &nosql.connection, expected_version, factory)
}

/// Check a single keyspace against `expected_version`.
///
/// Reported store name is the keyspace itself.
pub fn check_compatible_version<F: ClientFactory>(
    params: &ConnectionParams,
    expected_version: &str,
    factory: &F,
) -> Result<(), SchemaError> {
    check_store_version(&params.keyspace, params, expected_version, factory)
}

fn check_store_version<F: ClientFactory>(
    store: &str,
    params: &ConnectionParams,
    expected_version: &str,
    factory: &F,
) -> Result<(), SchemaError> {
    let expected = SchemaVersion::parse(expected_version)?;

    // Version checks always use the default timeouts, whatever the
    // store config says, to keep startup bounded.
    let config = params
        .clone()
        .validate()?
        .with_timeouts(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT);

    let mut client = open_scoped(factory, &config)?;
    let installed_raw = client.read_schema_version(config.keyspace())?;
    let installed = SchemaVersion::parse(&installed_raw)?;

    if installed < expected {
        return Err(SchemaError::VersionMismatch {
            store: store.into(),
            keyspace: config.keyspace().into(),
            installed: installed.to_string(),
            expected: expected.to_string(),
        });
    }

    info!(
        store,
        keyspace = config.keyspace(),
        %installed,
        %expected,
        "schema version compatible"
    );
    Ok(())
}
