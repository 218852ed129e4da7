//! Podgen worker binary.

use clap::Parser;
use podgen::cli::{
    Cli, Commands, handle_config_command, handle_run_command, handle_serve_command,
};
use podgen_core::{LogFormat, init_observability, init_tracing, shutdown_observability};

const SERVICE_NAME: &str = "podgen";
const METRICS_EXPORT_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(LogFormat::from_env());
    init_observability(SERVICE_NAME, METRICS_EXPORT_INTERVAL_SECS)?;

    let result = match cli.command.unwrap_or_default() {
        Commands::Serve { host, port } => handle_serve_command(host, port).await,
        Commands::Run { input, pretty } => handle_run_command(&input, pretty).await,
        Commands::Config => handle_config_command(),
    };

    shutdown_observability();
    result
}
