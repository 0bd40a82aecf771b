use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use jira_mcp_server::config::{ServerConfig, Transport};
use jira_mcp_server::mcp::stdio;
use jira_mcp_server::state::{AppState, TrackerHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    dotenvy::dotenv().ok();

    // stdout carries the stdio protocol stream, so logs always go to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }

    let config = ServerConfig::from_env()?;

    // Jira credentials are read on the first tool call, not here.
    let state = AppState::new(TrackerHandle::from_env()).with_auth_secret(config.auth_secret.clone());

    match config.transport {
        Transport::Stdio => stdio::serve_stdio(state).await?,
        Transport::Http => serve_http(state, config.port).await?,
    }

    Ok(())
}

async fn serve_http(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = jira_mcp_server::create_router(state)
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Jira MCP server listening on http://{}/mcp", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
