//! vn_headlines binary: serve the extraction API or run one extraction offline.

use clap::Parser;
use std::error::Error;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use vn_headlines::api::{self, AppState};
use vn_headlines::cli::{Cli, Command};
use vn_headlines::config::{AppConfig, load_config};
use vn_headlines::{Catalog, Publisher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = load_config(args.config.as_deref())?;
    let catalog = Arc::new(Catalog::from_config(&config)?);

    match args.command {
        Command::Serve { bind } => serve(&bind, catalog, &config).await,
        Command::Extract { publisher, input } => extract(publisher, &input, &catalog, &config).await,
    }
}

#[instrument(level = "info", skip_all, fields(%bind))]
async fn serve(bind: &str, catalog: Arc<Catalog>, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let app = api::router(AppState::new(catalog, config.max_html_bytes));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, max_html_bytes = config.max_html_bytes, "HTTP API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[instrument(level = "info", skip(catalog, config))]
async fn extract(publisher: Publisher, input: &str, catalog: &Catalog, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let html = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        tokio::fs::read_to_string(input).await?
    };

    if html.len() > config.max_html_bytes {
        return Err(format!(
            "input of {} bytes exceeds the {} byte limit",
            html.len(),
            config.max_html_bytes
        )
        .into());
    }

    let extractor = catalog.get(publisher);
    let extraction = extractor.run(&html, extractor.now());
    info!(report = ?extraction.report, "Extraction report");

    println!("{}", serde_json::to_string_pretty(&extraction.records)?);
    Ok(())
}
