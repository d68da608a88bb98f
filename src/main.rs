use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use logscope_logs::RuleRegistry;
use logscope_web::AppState;

/// Logscope - A web UI for browsing rule-filtered log directories
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:9172")]
    listen: SocketAddr,

    /// Rule configuration file, re-read on every request
    #[arg(long, default_value = "saved.json")]
    config: PathBuf,

    /// Directory containing the log directories to browse
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Run the application
    let result = run_app(args).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    // Rule operators are registered once here; handlers only ever read them.
    let registry = Arc::new(RuleRegistry::builtin());
    let state = AppState::new(registry, args.config, args.root);

    logscope_web::serve_with_shutdown(state, args.listen, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}
