use anyhow::Context;
use clap::Parser;
use portal_gateway::api::build_app;
use portal_gateway::core::logger;
use portal_gateway::core::models::GatewayConfig;
use portal_gateway::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    #[arg(long, env = "BIND_ADDRESS")]
    bind: Option<String>,

    /// Backend base URL. Falls back to BACKEND_URL, NEXT_PUBLIC_API_URL, NEXT_PUBLIC_BACKEND_URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    request_timeout: Option<u64>,

    /// Egress proxy for backend calls (http://, https://, socks5://)
    #[arg(long, env = "UPSTREAM_PROXY_URL")]
    upstream_proxy: Option<String>,

    #[arg(long, env = "MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Directory for daily rolling log files
    #[arg(long, env = "LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// JSON config file; command line and environment take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    no_cors: bool,
}

impl Args {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(url) = self.backend_url {
            config.backend.base_url = Some(url);
        }
        if let Some(timeout) = self.request_timeout {
            config.backend.request_timeout = timeout;
        }
        if let Some(url) = self.upstream_proxy {
            config.backend.upstream_proxy.enabled = !url.is_empty();
            config.backend.upstream_proxy.url = url;
        }
        if let Some(limit) = self.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(dir);
        }
        if self.no_cors {
            config.enable_cors = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    };
    let env_source = config.apply_backend_env(|name| std::env::var(name).ok());
    let backend_source = if args.backend_url.is_some() {
        "--backend-url"
    } else {
        env_source.unwrap_or("config file")
    };
    args.apply(&mut config);

    let _log_guard = logger::init_logger(config.log_dir.as_deref());

    let addr = (config.bind_address.clone(), config.port);

    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        "Backend base URL {} (from {})",
        state.backend.base_url(),
        backend_source
    );

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((addr.0.as_str(), addr.1))
        .await
        .with_context(|| format!("failed to bind {}:{}", addr.0, addr.1))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
