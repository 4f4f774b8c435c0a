// Error Taxonomy
//
// Every failure the kernel can produce. Errors are returned, never
// logged here; the invocation boundary owns reporting.

/// Errors produced by schema tooling operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Missing or invalid input.
    #[error("config error: {0}")]
    Config(String),

    /// A store declares a NoSQL plugin other than this backend.
    #[error("unknown NoSQL plugin name `{plugin}` for store `{store}`")]
    UnsupportedBackend { store: String, plugin: String },

    /// The client could not be established (network, auth, TLS).
    #[error("unable to create CQL client: {0}")]
    Connection(String),

    #[error("unable to read schema version for keyspace `{keyspace}`: {reason}")]
    ReadVersion { keyspace: String, reason: String },

    #[error("invalid schema version `{0}`")]
    InvalidVersion(String),

    /// Installed schema is older than the binary requires.
    #[error(
        "version mismatch for store `{store}` (keyspace `{keyspace}`): \
         expected version {expected} cannot be greater than installed version {installed}"
    )]
    VersionMismatch {
        store: String,
        keyspace: String,
        installed: String,
        expected: String,
    },

    #[error("error creating keyspace `{keyspace}`: {reason}")]
    Provisioning { keyspace: String, reason: String },
}

impl SchemaError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors caused by operator input rather than the backend.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SchemaError::Config(_) | SchemaError::UnsupportedBackend { .. }
        )
    }
}
