// In-memory client doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::client::{ClientFactory, CqlClient, Replication};
use crate::config::{ConnectionConfig, ConnectionParams};
use crate::error::SchemaError;

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub created: usize,
    pub closed: usize,
    pub configs: Vec<ConnectionConfig>,
    pub keyspaces: Vec<(String, Replication)>,
}

#[derive(Default)]
pub struct FakeFactory {
    versions: HashMap<String, String>,
    default_version: Option<String>,
    unreachable: bool,
    fail_ddl: bool,
    stats: Rc<RefCell<Stats>>,
}

impl FakeFactory {
    /// Every keyspace reports `version`.
    pub fn with_version(version: &str) -> Self {
        Self {
            default_version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Per-keyspace versions; unknown keyspaces fail to read.
    pub fn with_versions(versions: &[(&str, &str)]) -> Self {
        Self {
            versions: versions
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn failing_ddl() -> Self {
        Self {
            fail_ddl: true,
            ..Default::default()
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats.borrow().clone()
    }
}

pub struct FakeClient {
    version: Option<String>,
    fail_ddl: bool,
    stats: Rc<RefCell<Stats>>,
}

impl ClientFactory for FakeFactory {
    type Client = FakeClient;

    fn create(&self, config: &ConnectionConfig) -> Result<FakeClient, SchemaError> {
        if self.unreachable {
            return Err(SchemaError::Connection("connection refused".into()));
        }

        let mut stats = self.stats.borrow_mut();
        stats.created += 1;
        stats.configs.push(config.clone());

        Ok(FakeClient {
            version: self
                .versions
                .get(config.keyspace())
                .or(self.default_version.as_ref())
                .cloned(),
            fail_ddl: self.fail_ddl,
            stats: Rc::clone(&self.stats),
        })
    }
}

impl CqlClient for FakeClient {
    fn read_schema_version(&mut self, keyspace: &str) -> Result<String, SchemaError> {
        self.version.clone().ok_or_else(|| SchemaError::ReadVersion {
            keyspace: keyspace.into(),
            reason: "schema_version table not found".into(),
        })
    }

    fn create_keyspace(
        &mut self,
        name: &str,
        replication: &Replication,
    ) -> Result<(), SchemaError> {
        if self.fail_ddl {
            return Err(SchemaError::Provisioning {
                keyspace: name.into(),
                reason: "unauthorized".into(),
            });
        }
        self.stats
            .borrow_mut()
            .keyspaces
            .push((name.into(), replication.clone()));
        Ok(())
    }

    fn close(&mut self) {
        self.stats.borrow_mut().closed += 1;
    }
}

pub fn params(keyspace: &str) -> ConnectionParams {
    ConnectionParams {
        hosts: vec!["127.0.0.1".into()],
        keyspace: keyspace.into(),
        ..Default::default()
    }
}

pub fn config(keyspace: &str) -> ConnectionConfig {
    params(keyspace)
        .validate()
        .expect("test config must validate")
}
