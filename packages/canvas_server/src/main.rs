use anyhow::{Context, Result};
use canvas_server::config::{FileConfig, ServerConfig, load_config};
use canvas_server::{AppState, router};
use clap::Parser;
use figment::providers::Serialized;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "canvas")]
#[command(about = "Shared pixel canvas server")]
struct Args {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_directive = if args.debug {
        "canvas=debug,canvas_server=debug,tower_http=debug,info"
    } else {
        "canvas=info,canvas_server=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let mut figment = load_config(args.config.as_deref());
    if let Some(port) = args.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }
    if let Some(host) = &args.host {
        figment = figment.merge(Serialized::default("server.host", host));
    }
    let file_config: FileConfig = figment.extract().context("Invalid configuration")?;
    let server_config = ServerConfig::from_file(&file_config.server)?;

    if let Some(dir) = &server_config.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    let bind_addr = server_config.bind_addr;
    let app = router(AppState::new(server_config));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    let actual_addr = listener.local_addr()?;

    info!("Canvas server listening on {}", actual_addr);
    info!("Open http://localhost:{}", actual_addr.port());

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}
