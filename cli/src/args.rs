use clap::Args;

use cqlschema_kernel::config::resolver::*;

/// Connection options shared by every command.
///
/// Each option falls back to a `CASSANDRA_*` environment variable.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Comma-separated list of Cassandra hosts
    #[arg(short = 'e', long, env = "CASSANDRA_HOST", default_value = "127.0.0.1")]
    pub endpoint: String,

    /// Native protocol port
    #[arg(short = 'p', long, env = "CASSANDRA_DB_PORT", default_value_t = 9042)]
    pub port: i64,

    #[arg(short = 'u', long, env = "CASSANDRA_USER")]
    pub user: Option<String>,

    #[arg(long, env = "CASSANDRA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Authenticator classes credentials may be sent to (empty = any)
    #[arg(
        long,
        env = "CASSANDRA_ALLOWED_AUTHENTICATORS",
        value_delimiter = ','
    )]
    pub allowed_authenticators: Vec<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, env = "CASSANDRA_TIMEOUT", default_value_t = 30)]
    pub timeout: i64,

    /// Connection timeout in seconds
    #[arg(long, env = "CASSANDRA_CONNECT_TIMEOUT", default_value_t = 2)]
    pub connect_timeout: i64,

    #[arg(short = 'k', long, env = "CASSANDRA_KEYSPACE", default_value = "cadence")]
    pub keyspace: String,

    /// Replication factor for keyspace creation
    #[arg(short = 'r', long, env = "CASSANDRA_REPLICATION_FACTOR", default_value_t = 1)]
    pub replication_factor: i64,

    /// Native protocol version (0 = driver default)
    #[arg(long, env = "CASSANDRA_PROTO_VERSION", default_value_t = 0)]
    pub protocol_version: i64,

    /// Connect over TLS
    #[arg(long = "tls", env = "CASSANDRA_ENABLE_TLS")]
    pub tls: bool,

    #[arg(long, env = "CASSANDRA_TLS_CERT")]
    pub tls_cert_file: Option<String>,

    #[arg(long, env = "CASSANDRA_TLS_KEY")]
    pub tls_key_file: Option<String>,

    #[arg(long, env = "CASSANDRA_TLS_CA")]
    pub tls_ca_file: Option<String>,

    /// Verify the server certificate
    #[arg(long, env = "CASSANDRA_TLS_VERIFY_HOST")]
    pub tls_enable_host_verification: bool,

    #[arg(long, env = "CASSANDRA_TLS_SERVER_NAME")]
    pub tls_server_name: Option<String>,
}

impl OptionSource for ConnectionArgs {
    fn string(&self, key: &str) -> Option<String> {
        match key {
            OPT_ENDPOINT => Some(self.endpoint.clone()),
            OPT_USER => self.user.clone(),
            OPT_PASSWORD => self.password.clone(),
            OPT_KEYSPACE => Some(self.keyspace.clone()),
            FLAG_TLS_CERT_FILE => self.tls_cert_file.clone(),
            FLAG_TLS_KEY_FILE => self.tls_key_file.clone(),
            FLAG_TLS_CA_FILE => self.tls_ca_file.clone(),
            FLAG_TLS_SERVER_NAME => self.tls_server_name.clone(),
            _ => None,
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        match key {
            OPT_PORT => Some(self.port),
            OPT_TIMEOUT => Some(self.timeout),
            OPT_CONNECT_TIMEOUT => Some(self.connect_timeout),
            OPT_REPLICATION_FACTOR => Some(self.replication_factor),
            OPT_PROTOCOL_VERSION => Some(self.protocol_version),
            _ => None,
        }
    }

    fn bool(&self, key: &str) -> bool {
        match key {
            FLAG_ENABLE_TLS => self.tls,
            FLAG_TLS_ENABLE_HOST_VERIFICATION => self.tls_enable_host_verification,
            _ => false,
        }
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        match key {
            OPT_ALLOWED_AUTHENTICATORS => self.allowed_authenticators.clone(),
            _ => Vec::new(),
        }
    }
}
