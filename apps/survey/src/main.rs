//! # Survey
//!
//! Environmental indicator survey: HTTP form server and CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! survey server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! survey catalog --verbose
//! survey submit -f response.toml --dry-run
//! survey rows -n 20
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // SURVEY_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("SURVEY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "survey=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = survey::cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = survey::cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r"
  Environmental Indicator Survey v{}
  Selection • Evaluation • Submission
",
        env!("CARGO_PKG_VERSION")
    );
}
