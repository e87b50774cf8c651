use anyhow::Context;
use clap::Parser;
use gemini_relay::{build_router, upstream, AppState, RelayConfig, SharedLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "gemini-relay",
    about = "Relay OpenAI/Anthropic-style chat requests to the Google Gemini API",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log request/response details
    #[arg(long)]
    debug: bool,

    /// Forward proxy for upstream calls, e.g. http://127.0.0.1:7890
    #[arg(long)]
    proxy: Option<String>,

    /// Also append logs to this file (JSONL)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in gemini_relay::config::config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = RelayConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.debug {
        config.debug = true;
    }
    if cli.proxy.is_some() {
        config.proxy = cli.proxy.clone();
    }

    let default_filter = if config.debug {
        "gemini_relay=debug,tower_http=debug"
    } else {
        "gemini_relay=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let logger = SharedLogger::new(cli.log_file.as_deref(), config.debug)?;
    let client = upstream::build_client(&config)?;
    let default_api_key = config.resolve_default_api_key();

    info!("gemini-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  Upstream:  {}", config.upstream.base_url);
    info!("  Port:      {}", config.port);
    info!("  Models:    {} mapped", config.models.len());
    info!(
        "  API key:   {}",
        if default_api_key.is_some() {
            format!("default from ${}", config.upstream.api_key_env)
        } else {
            "per request (Authorization / x-api-key)".to_string()
        }
    );
    match config.proxy.as_deref() {
        Some(proxy) => info!("  Proxy:     {}", proxy),
        None => info!("  Proxy:     none (use --proxy http://127.0.0.1:7890 to enable)"),
    }
    if config.debug {
        info!("  Debug:     on");
    }

    logger.info(
        "startup",
        format!(
            "Starting gemini-relay upstream={} port={}",
            config.upstream.base_url, config.port
        ),
    );

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        default_api_key,
        client,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    info!("");
    info!("  Point your client at:");
    info!("    base URL  http://127.0.0.1:{}/v1", port);
    info!("    API key   your Gemini API key");
    info!("    model     e.g. gemini-3-flash-preview");
    info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
