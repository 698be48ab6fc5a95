// src/main.rs
use clap::{Parser, Subcommand};
use sec_filing_tools::config::{EdgarConfig, RendererConfig};
use sec_filing_tools::converters;
use sec_filing_tools::edgar::{EdgarClient, SelectionCriteria};
use sec_filing_tools::mcp::{self, McpServer};
use sec_filing_tools::pipeline;
use sec_filing_tools::utils::{self, AppError};
use std::path::PathBuf;

/// Command Line Interface for SEC filing retrieval and conversion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// User-Agent sent to SEC (name and contact email)
    #[arg(long, env = "SEC_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Base URL of the submissions API
    #[arg(long, env = "SEC_DATA_BASE_URL", global = true)]
    data_base_url: Option<String>,

    /// Base URL of the filing archives
    #[arg(long, env = "SEC_ARCHIVE_BASE_URL", global = true)]
    archive_base_url: Option<String>,

    /// Headless browser used for HTML to PDF rendering
    #[arg(long, env = "HTML_RENDERER_BIN", global = true)]
    renderer: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a filing and print the path of its primary document
    Download {
        /// Central Index Key, zero-padded to 10 digits
        #[arg(long)]
        cik: String,

        /// Report year of the filing
        #[arg(long)]
        year: i32,

        /// SEC form type (e.g. 8-K, 10-K)
        #[arg(long)]
        form_type: String,

        /// Directory the filing archive is extracted into
        #[arg(short, long)]
        output_dir: PathBuf,
    },
    /// Render an HTML file to PDF
    Render {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a PDF or HTML document to markdown text
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        /// Write the text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run as MCP (Model Context Protocol) server over stdio
    Serve,
}

#[tokio::main]
async fn main() {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    if let Err(e) = run(args).await {
        tracing::error!("{}: {}", e.kind(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut edgar_config = EdgarConfig::from_env()?;
    if let Some(agent) = args.user_agent {
        edgar_config.user_agent = agent;
    }
    if let Some(url) = args.data_base_url {
        edgar_config.data_base_url = url;
    }
    if let Some(url) = args.archive_base_url {
        edgar_config.archive_base_url = url;
    }

    let mut renderer = RendererConfig::from_env();
    if let Some(binary) = args.renderer {
        renderer.binary = binary;
    }

    match args.command {
        Command::Download {
            cik,
            year,
            form_type,
            output_dir,
        } => {
            let client = EdgarClient::new(edgar_config)?;
            let criteria = SelectionCriteria::new(cik, year, form_type);
            let path = pipeline::download_filing(&client, &criteria, &output_dir).await?;
            println!("{}", path.display());
        }
        Command::Render { input, output } => {
            let path = converters::render_html_to_pdf(&renderer, &input, &output).await?;
            println!("{}", path.display());
        }
        Command::Convert { input, output } => {
            let text = converters::convert_to_text(&input)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    tracing::info!("Saved text to: {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Command::Serve => {
            let client = EdgarClient::new(edgar_config)?;
            mcp::run_server(McpServer::new(client, renderer)).await;
        }
    }

    Ok(())
}
