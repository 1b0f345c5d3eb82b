//! Command-line interface definitions.
//!
//! Arguments can be given as flags or through environment variables.

use crate::scrapers::Publisher;
use clap::{Parser, Subcommand};

/// Command-line arguments for vn_headlines.
///
/// # Examples
///
/// ```sh
/// # Serve the HTTP API on the default address
/// vn_headlines serve
///
/// # Serve with a custom profile file
/// vn_headlines --config ./vn_headlines.yaml serve --bind 127.0.0.1:9000
///
/// # Extract from a saved page
/// vn_headlines extract --publisher dantri --input ./dantri.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "VN_HEADLINES_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the extraction HTTP API
    Serve {
        /// Address to bind the HTTP server to (host:port)
        #[arg(short, long, env = "VN_HEADLINES_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
    },

    /// Extract recent articles from a saved HTML page and print them as JSON
    Extract {
        /// Publisher whose pipeline to run
        #[arg(short, long, value_enum)]
        publisher: Publisher,

        /// HTML file to read, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
}
