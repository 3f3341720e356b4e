//! Paperlens HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use paperlens::config::Config;
use paperlens::service::{ModelHub, ModelPaths, ResearchService, ServiceSettings};
use paperlens::session::SessionStore;
use paperlens::source::ArxivClient;
use paperlens_server::gateway::{HandlerState, Renderer, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MAX_SESSIONS: u64 = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        arxiv_url = %config.arxiv_url,
        "Paperlens starting"
    );

    let paths = ModelPaths::from(&config);
    if paths.embedder.is_none() {
        tracing::warn!("No PAPERLENS_EMBEDDER_PATH configured, running embedder in stub mode");
    }
    if paths.generator.is_none() {
        tracing::warn!("No PAPERLENS_GENERATOR_PATH configured, running generator in stub mode");
    }

    let hub = Arc::new(ModelHub::new(paths));
    tracing::info!("Loading models...");
    hub.models().await?;

    let source = ArxivClient::new(config.arxiv_url.clone())?;
    let service = Arc::new(ResearchService::new(
        source,
        hub,
        ServiceSettings::from(&config),
    ));
    let sessions = SessionStore::new(config.session_idle(), MAX_SESSIONS);
    let renderer = Arc::new(Renderer::new()?);

    let app = create_router_with_state(HandlerState::new(service, sessions, renderer));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Paperlens shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("PAPERLENS_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
