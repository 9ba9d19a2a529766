use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use consilium::{
    config::Config,
    dispatcher::{self, MODEL_IDS},
    provider::GeminiClient,
    rest, AppContext,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "consilium",
    about = "Consilium — multi-model medical consultation comparison service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP port for the query form and JSON API
    #[arg(long, env = "CONSILIUM_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "CONSILIUM_BIND")]
    bind_address: Option<String>,

    /// Optional config.toml path
    #[arg(long, env = "CONSILIUM_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CONSILIUM_LOG")]
    log: Option<String>,

    /// Emit logs as JSON lines instead of the compact format
    #[arg(long, env = "CONSILIUM_LOG_FORMAT")]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default when no subcommand given).
    Serve,
    /// Run one consultation batch from the terminal and print a summary.
    ///
    /// Examples:
    ///   consilium ask "persistent headache and dizziness for a week"
    Ask {
        /// The medical query to analyze
        query: String,
    },
    /// Verify the API key and report which of the fixed models it can reach.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref().unwrap_or("info"), args.log_json);

    let config = Config::load(args.config.as_deref(), args.port, args.bind_address)?;
    info!(%config, "configuration resolved");

    let client = Arc::new(GeminiClient::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
    ));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let ctx = Arc::new(AppContext::new(config, client));
            rest::start_rest_server(ctx).await
        }
        Command::Ask { query } => ask(client, &query).await,
        Command::Check => check(&client).await,
    }
}

fn init_logging(level: &str, json: bool) {
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .compact()
            .init();
    }
}

/// One-shot batch: print per-model scores and section titles.
async fn ask(client: Arc<GeminiClient>, query: &str) -> Result<()> {
    let results = dispatcher::dispatch(client, query).await?;
    for r in &results {
        println!("{} ({})", r.display_name, r.model);
        println!(
            "  confidence {:>3.0}%  accuracy {:>3.0}%  f1 {:>3.0}%",
            r.confidence * 100.0,
            r.accuracy * 100.0,
            r.f1 * 100.0
        );
        for section in consilium::parser::segment(&r.response) {
            println!("  - {}", section.title);
        }
        println!();
    }
    Ok(())
}

/// Report availability of the four fixed model identifiers.
async fn check(client: &GeminiClient) -> Result<()> {
    let available = client.list_models().await?;
    for id in MODEL_IDS {
        let ok = available.iter().any(|m| m == id);
        println!("{} {}", if ok { "ok     " } else { "missing" }, id);
    }
    Ok(())
}
