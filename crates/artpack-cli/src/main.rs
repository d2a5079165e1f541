//! Artpack CLI - generate bubble-shooter art packs from the command line

mod commands;

use anyhow::Result;
use artpack_gen::ARCHIVE_FILE_NAME;
use clap::{Parser, Subcommand};
use commands::{catalog, generate, key, pack, providers, SessionOptions};

#[derive(Parser)]
#[command(name = "artpack")]
#[command(about = "Generate a consistent game art pack with an image model", long_about = None)]
#[command(version)]
struct Cli {
    /// Load the asset catalog from a TOML file instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the assets in the catalog
    Catalog {
        /// Only list one category (e.g. normal_bubbles, "Effects & FX")
        #[arg(long)]
        category: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the exact prompt sent for an asset
    Prompt {
        /// Asset id (e.g. b-red)
        id: String,

        /// Style guide name
        #[arg(long)]
        style: Option<String>,
    },

    /// Generate one or more assets and save them as PNG files
    Generate {
        /// Asset ids to generate
        #[arg(required = true)]
        ids: Vec<String>,

        /// Provider to use (gemini, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Style guide name
        #[arg(long)]
        style: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "generated")]
        output: String,
    },

    /// Generate every missing asset and export the pack as a zip
    Pack {
        /// Only generate one category
        #[arg(long)]
        category: Option<String>,

        /// Provider to use (gemini, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Style guide name
        #[arg(long)]
        style: Option<String>,

        /// Archive path
        #[arg(short, long, default_value = ARCHIVE_FILE_NAME)]
        output: String,
    },

    /// API key operations
    #[command(subcommand)]
    Key(key::KeyCommands),

    /// List providers and their status
    Providers,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "artpack_cli={level},artpack_gen={level},artpack_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog_path = cli.catalog.as_deref();
    match cli.command {
        Commands::Catalog { category, format } => {
            catalog::run_list(catalog_path, category.as_deref(), &format)
        }
        Commands::Prompt { id, style } => catalog::run_prompt(catalog_path, &id, style.as_deref()),
        Commands::Generate {
            ids,
            provider,
            style,
            output,
        } => {
            let options = SessionOptions {
                catalog: catalog_path,
                provider: provider.as_deref(),
                style: style.as_deref(),
            };
            generate::run(options, &ids, &output).await
        }
        Commands::Pack {
            category,
            provider,
            style,
            output,
        } => {
            let options = SessionOptions {
                catalog: catalog_path,
                provider: provider.as_deref(),
                style: style.as_deref(),
            };
            pack::run(options, category.as_deref(), &output).await
        }
        Commands::Key(cmd) => key::run(cmd).await,
        Commands::Providers => providers::run(),
    }
}
