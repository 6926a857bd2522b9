//! CI entry point: upload and optionally publish an extension package.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use webstore_publish::{
    deploy, format_secure_message, ClientOptions, Config, ConfigOverrides, Error, WebStoreClient,
};

mod cli;

use cli::Args;

const FAILURE_PREFIX: &str = "Unexpected error during deployment";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    // Load .env before building the filter so RUST_LOG from the file applies
    let dotenv_path = dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "loaded .env file");
    }
    debug!(?args, "CLI arguments parsed");

    let working_dir = std::env::current_dir()?;
    let overrides = ConfigOverrides {
        file_path: args.file,
        publish: args.publish,
    };
    let outcome = match Config::from_env_with(overrides) {
        Ok(config) => {
            let client = WebStoreClient::new().with_options(ClientOptions {
                timeout_ms: args.timeout_secs.saturating_mul(1_000),
                ..ClientOptions::default()
            });
            deploy(&client, &config, &working_dir).await.map(|_| ())
        }
        Err(err) => Err(Error::from(err)),
    };

    match outcome {
        Ok(()) => {
            info!("deployment finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_failure(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_failure(err: &Error) {
    let message = match err {
        Error::WebStore(err) => format_secure_message(
            &format!("{FAILURE_PREFIX}: {}", err.message()),
            Some(err.code()),
            Some(err.details()),
        ),
        Error::Config(_) | Error::Validation(_) => format!("{FAILURE_PREFIX}: {err}"),
    };

    eprintln!("{message}");
    if std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true") {
        println!("::error::{}", escape_workflow_data(&message));
    }
}

fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
