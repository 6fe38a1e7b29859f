//! `pagelight` CLI - Score and highlight the important lines of a page

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pagelight::Config;

#[derive(Parser)]
#[command(name = "pagelight")]
#[command(about = "Score document lines by importance and highlight them")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/pagelight/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Local-only scoring: extractive summary, lexical + overlap similarity
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every line of a page and print the report
    Score {
        /// Input document (.json page file, or .pdf with the `pdf` feature)
        input: PathBuf,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a page and write the highlighted raster as PNG
    Render {
        /// Input document (.json page file, or .pdf with the `pdf` feature)
        input: PathBuf,

        /// Output PNG path
        output: PathBuf,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Raster resolution (default from config, 200)
        #[arg(long)]
        dpi: Option<f32>,
    },

    /// Print the proper nouns and topic keywords of a page
    Keywords {
        /// Input document (.json page file, or .pdf with the `pdf` feature)
        input: PathBuf,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: OutputFormat,
    },
}

/// Report output format for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Markdown output
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.offline {
        config = config.offline();
    }

    match cli.command {
        Commands::Score {
            input,
            page,
            format,
            output,
        } => {
            cmd::score::cmd_score(&config, &input, page, format, output).await?;
        }
        Commands::Render {
            input,
            output,
            page,
            dpi,
        } => {
            cmd::render::cmd_render(&config, &input, &output, page, dpi).await?;
        }
        Commands::Keywords {
            input,
            page,
            format,
        } => {
            cmd::keywords::cmd_keywords(&config, &input, page, format)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; `PAGELIGHT_LOG` or `RUST_LOG` override the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("PAGELIGHT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
