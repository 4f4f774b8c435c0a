use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use cqlschema_kernel::driver::ScyllaClientFactory;
use cqlschema_kernel::SchemaError;

mod args;
mod commands;

use commands::{
    run_check_version, run_create_keyspace, run_verify, CheckVersionArgs, CliOutput,
    CreateKeyspaceArgs, VerifyArgs,
};

/// Cassandra schema tooling for the workflow engine
#[derive(Parser, Debug)]
#[command(name = "cqlschema")]
#[command(version, about = "Cassandra schema version checks and keyspace provisioning", long_about = None)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a keyspace with simple or network-topology replication
    CreateKeyspace(CreateKeyspaceArgs),

    /// Check that one keyspace carries at least the expected schema version
    CheckVersion(CheckVersionArgs),

    /// Verify every store in a persistence config before engine startup
    Verify(VerifyArgs),
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let factory = ScyllaClientFactory::new();

    let output: CliOutput = match &cli.command {
        Command::CreateKeyspace(args) => run_create_keyspace(args, &factory)?,
        Command::CheckVersion(args) => run_check_version(args, &factory)?,
        Command::Verify(args) => run_verify(args, &factory)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Operator input errors exit with 2 so wrappers can tell a bad invocation
/// from an unreachable or outdated cluster.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SchemaError>() {
        Some(schema_err) if schema_err.is_config() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    // ----------------------------
    // Single reporting point for
    // terminal errors
    // ----------------------------
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = exit_status(&err);
            if status == 2 {
                error!("invalid configuration: {err:#}");
            } else {
                error!("{err:#}");
            }
            ExitCode::from(status)
        }
    }
}
