//! CLI for schemacheck: host the validation endpoint, or send one validation request.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schemacheck_core::http;
use schemacheck_core::request_validation;
use schemacheck_rs::{logging, RemoteValidationService, RequestDispatcher, ServerConfig};
use tokio::runtime::Handle;
use tracing::{error, info};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Parser)]
#[command(name = "schemacheck")]
#[command(about = "JSON validation endpoint: {data, schema} in, {validation, info} out")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host the endpoint; verdicts come from a remote validator.
    Serve {
        /// Validator that decides each verdict (e.g. http://127.0.0.1:9000/)
        #[arg(long)]
        upstream: String,
        /// Listen host (overrides env HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides env PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one validation request and print the verdict.
    Check {
        /// Validator endpoint URL
        #[arg(long)]
        url: String,
        /// File holding the raw data
        #[arg(long)]
        data: PathBuf,
        /// File holding the schema
        #[arg(long)]
        schema: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    logging::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            upstream,
            host,
            port,
        } => {
            let config =
                ServerConfig::from_env(DEFAULT_HOST, DEFAULT_PORT).with_overrides(host, port);
            info!(%upstream, "delegating verdicts");
            let service = RemoteValidationService::new(upstream, Handle::current())?;
            http::run(RequestDispatcher::from_service(service), &config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { url, data, schema } => {
            let data = fs::read_to_string(&data)?;
            let schema = fs::read_to_string(&schema)?;
            match request_validation(&url, &data, &schema).await {
                Ok(valid) => {
                    println!("{}", serde_json::json!({ "validation": valid }));
                    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::from(1) })
                }
                Err(e) => {
                    error!(error = %e, "validation request failed");
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}
