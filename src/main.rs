//! HeartScan Prediction Service - Main Entry Point
//!
//! With an argument, runs one prediction for a subprocess caller and prints
//! the JSON result on stdout. Without arguments, serves the HTTP API.

use anyhow::Result;
use clap::Parser;
use heartscan::{cli, config::AppConfig, server, InferenceEngine};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "heartscan", version, about = "Heart disease risk prediction service")]
struct Cli {
    /// Path to a JSON file, or an inline JSON string, with the feature
    /// mapping. Omit to start the HTTP server.
    input: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = AppConfig::load()?;
    init_tracing(&config)?;

    info!(environment = %config.environment, "Starting HeartScan prediction service");

    // Artifact load failure is fatal before either front-end starts
    let engine = Arc::new(InferenceEngine::from_config(&config)?);

    match args.input {
        Some(input) => {
            // Subprocess contract: stdout carries exactly one JSON object
            match cli::run_once(&engine, &input) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                    std::process::exit(1);
                }
            }
        }
        None => {
            server::serve(config, engine).await?;
        }
    }

    Ok(())
}

/// Initialize logging on stderr so CLI stdout stays machine-readable
fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("heartscan={}", config.logging.level).parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}
