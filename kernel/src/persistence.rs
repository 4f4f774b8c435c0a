// Persistence Configuration
//
// The orchestration engine's view of its stores: which logical store
// maps to which datastore, and whether that datastore uses this
// backend. Only the parts version verification reads are modelled.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConnectionParams;
use crate::error::SchemaError;

/// Plugin identifier of this backend.
pub const CASSANDRA_PLUGIN: &str = "cassandra";

/// Logical store roles.
pub const DEFAULT_STORE: &str = "default";
pub const VISIBILITY_STORE: &str = "visibility";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persistence {
    /// Datastore name backing the default store.
    pub default_store: String,

    /// Datastore name backing the visibility store.
    #[serde(default)]
    pub visibility_store: String,

    #[serde(default)]
    pub datastores: BTreeMap<String, DataStore>,
}

/// A single datastore. Exactly one backend section is expected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataStore {
    #[serde(default)]
    pub nosql: Option<NoSqlConfig>,

    /// SQL backends are opaque here.
    #[serde(default)]
    pub sql: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoSqlConfig {
    pub plugin_name: String,

    #[serde(flatten)]
    pub connection: ConnectionParams,
}

impl Persistence {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            SchemaError::config(format!(
                "unable to read persistence config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(data)
            .map_err(|e| SchemaError::config(format!("invalid persistence config: {e}")))
    }

    /// Datastore backing a logical store role, if configured.
    pub fn datastore_for(&self, store: &str) -> Option<&DataStore> {
        let name = match store {
            DEFAULT_STORE => &self.default_store,
            VISIBILITY_STORE => &self.visibility_store,
            _ => return None,
        };
        self.datastores.get(name)
    }
}
