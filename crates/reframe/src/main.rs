//! Reframe CLI - Image crop, resize, and format conversion service.
//!
//! Reframe takes one source image and renders it into many variants: cropped,
//! scaled to a set of breakpoint widths, and re-encoded into web formats. It
//! runs either as an HTTP service that answers multipart uploads with a zip
//! archive, or as a local CLI for one-off and directory conversions.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP server
//! reframe serve --port 3000
//!
//! # Render one image at the bootstrap breakpoint widths
//! reframe convert -i photo.jpg -b bootstrap -f webp
//!
//! # Convert a directory of images
//! reframe batch -i ./photos/ -o ./out --recursive
//!
//! # View configuration
//! reframe config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Reframe - Image crop, resize, and format conversion service.
#[derive(Parser, Debug)]
#[command(name = "reframe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP conversion server
    Serve(server::ServeArgs),

    /// Render one image into a set of breakpoint widths
    Convert(cli::convert::ConvertArgs),

    /// Convert every image in a directory
    Batch(cli::batch::BatchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match reframe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `reframe config path`."
            );
            reframe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Reframe v{}", reframe_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => server::execute(args).await,
        Commands::Convert(args) => cli::convert::execute(args).await,
        Commands::Batch(args) => cli::batch::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
