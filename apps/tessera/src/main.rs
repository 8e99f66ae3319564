//! # Tessera - Instance Navigator
//!
//! The main binary for Tessera.
//!
//! This application provides:
//! - HTTP REST API server (axum-based, read-only)
//! - CLI interface for loading records and reconstructing storages
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                apps/tessera (THE BINARY)              │
//! │                                                       │
//! │   ┌─────────────┐            ┌─────────────┐          │
//! │   │   CLI       │            │   HTTP API  │          │
//! │   │  (clap)     │            │   (axum)    │          │
//! │   └──────┬──────┘            └──────┬──────┘          │
//! │          └──────────────┬───────────┘                 │
//! │                         ▼                             │
//! │                 ┌───────────────┐                     │
//! │                 │ tessera-core  │                     │
//! │                 │  (THE LOGIC)  │                     │
//! │                 └───────────────┘                     │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Load raw records into a collection
//! tessera ingest -c people -f people.json
//!
//! # Reconstruct
//! tessera storages
//! tessera storage people
//! tessera instance alice -s people
//!
//! # Start the HTTP server
//! tessera server --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use tessera::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. TESSERA_LOG_FORMAT=json switches to JSON lines.
    let log_format = std::env::var("TESSERA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "tessera=debug,tessera_core=debug,tower_http=debug"
    } else {
        "tessera=info,tessera_core=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Tessera startup banner.
fn print_banner() {
    println!(
        r#"
  ▀█▀ █▀▀ █▀ █▀ █▀▀ █▀█ ▄▀█
   █  ██▄ ▄█ ▄█ ██▄ █▀▄ █▀█

  Instance Navigator v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
