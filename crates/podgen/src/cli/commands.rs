//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Serverless LLM inference worker.
#[derive(Parser, Debug)]
#[command(name = "podgen")]
#[command(about = "Serverless LLM inference worker over a vLLM-compatible engine")]
#[command(version)]
pub struct Cli {
    /// Command to run; defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the engine and accept jobs over HTTP
    Serve {
        /// Interface to bind (overrides PODGEN_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PODGEN_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single job and print its output
    Run {
        /// Job input as JSON, or @path to read it from a file
        #[arg(short, long)]
        input: String,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the resolved engine configuration and launch command
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["podgen"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::default());
    }

    #[test]
    fn test_run_takes_input() {
        let cli = Cli::try_parse_from(["podgen", "run", "--input", "@job.json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Run {
                input: "@job.json".to_string(),
                pretty: false,
            })
        );
    }

    #[test]
    fn test_run_requires_input() {
        assert!(Cli::try_parse_from(["podgen", "run"]).is_err());
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["podgen", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: Some(9000),
            })
        );
    }
}
