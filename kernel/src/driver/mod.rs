// Scylla Driver Adapter
//
// Implements the client traits over the `scylla` driver, which speaks
// the native protocol to both Cassandra and ScyllaDB. The driver is
// async; each client owns a current-thread runtime and blocks on it,
// keeping the tooling surface synchronous.

mod auth;
mod tls;

use std::sync::Arc;

use scylla::execution_profile::ExecutionProfile;
use scylla::{Session, SessionBuilder};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::client::{create_keyspace_cql, ClientFactory, CqlClient, Replication};
use crate::config::ConnectionConfig;
use crate::error::SchemaError;

pub use auth::AllowListAuthenticator;

const READ_SCHEMA_VERSION_CQL: &str =
    "SELECT curr_version FROM schema_version WHERE keyspace_name = ?";

/// Native protocol version the driver speaks.
const DRIVER_PROTOCOL_VERSION: u8 = 4;

/// Builds [`ScyllaClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScyllaClientFactory;

impl ScyllaClientFactory {
    pub fn new() -> Self {
        Self
    }
}

/// Client bound to one keyspace. Field order matters: the session is
/// dropped before the runtime it was built on.
pub struct ScyllaClient {
    session: Option<Session>,
    keyspace: String,
    runtime: Runtime,
}

impl ClientFactory for ScyllaClientFactory {
    type Client = ScyllaClient;

    fn create(&self, config: &ConnectionConfig) -> Result<ScyllaClient, SchemaError> {
        let protocol = check_protocol_version(config.protocol_version())?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SchemaError::Connection(format!("unable to start runtime: {e}")))?;

        let profile = ExecutionProfile::builder()
            .request_timeout(Some(config.timeout()))
            .build();

        let mut builder = SessionBuilder::new()
            .known_nodes(config.contact_points())
            .connection_timeout(config.connect_timeout())
            .use_keyspace(config.keyspace(), false)
            .default_execution_profile_handle(profile.into_handle());

        if let Some(user) = config.user() {
            builder = builder.authenticator_provider(Arc::new(AllowListAuthenticator::new(
                user,
                config.password().unwrap_or_default(),
                config.allowed_authenticators().to_vec(),
            )));
        }

        if let Some(tls) = config.tls() {
            builder = builder.ssl_context(Some(tls::ssl_context(tls, config.hosts())?));
        }

        debug!(
            hosts = ?config.contact_points(),
            keyspace = config.keyspace(),
            protocol,
            tls = config.tls().is_some(),
            "connecting"
        );

        let session = runtime
            .block_on(builder.build())
            .map_err(|e| SchemaError::Connection(e.to_string()))?;

        Ok(ScyllaClient {
            session: Some(session),
            keyspace: config.keyspace().into(),
            runtime,
        })
    }
}

/// Older protocol versions are still named in existing configs. The driver
/// negotiates v4 with every supported server, so those are accepted with a
/// warning; anything newer cannot be spoken at all.
fn check_protocol_version(requested: u8) -> Result<u8, SchemaError> {
    match requested {
        0 | DRIVER_PROTOCOL_VERSION => Ok(DRIVER_PROTOCOL_VERSION),
        v if v < DRIVER_PROTOCOL_VERSION => {
            warn!(
                requested = v,
                using = DRIVER_PROTOCOL_VERSION,
                "protocol version not spoken by driver, using v4"
            );
            Ok(DRIVER_PROTOCOL_VERSION)
        }
        v => Err(SchemaError::Connection(format!(
            "unsupported protocol version {v}"
        ))),
    }
}

impl ScyllaClient {
    fn session(&self) -> Result<&Session, String> {
        self.session
            .as_ref()
            .ok_or_else(|| "client is closed".to_string())
    }
}

impl CqlClient for ScyllaClient {
    fn read_schema_version(&mut self, keyspace: &str) -> Result<String, SchemaError> {
        let read_err = |reason: String| SchemaError::ReadVersion {
            keyspace: keyspace.into(),
            reason,
        };

        let session = self.session().map_err(read_err)?;
        let result = self
            .runtime
            .block_on(session.query(READ_SCHEMA_VERSION_CQL, (keyspace,)))
            .map_err(|e| read_err(e.to_string()))?;
        let (version,) = result
            .single_row_typed::<(String,)>()
            .map_err(|e| read_err(e.to_string()))?;

        Ok(version)
    }

    fn create_keyspace(
        &mut self,
        name: &str,
        replication: &Replication,
    ) -> Result<(), SchemaError> {
        let provisioning_err = |reason: String| SchemaError::Provisioning {
            keyspace: name.into(),
            reason,
        };

        let session = self.session().map_err(provisioning_err)?;
        self.runtime
            .block_on(session.query(create_keyspace_cql(name, replication), ()))
            .map_err(|e| provisioning_err(e.to_string()))?;

        Ok(())
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            let _guard = self.runtime.enter();
            drop(session);
            debug!(keyspace = %self.keyspace, "client closed");
        }
    }
}
