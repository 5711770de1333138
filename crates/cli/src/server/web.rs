use axum::Router;
use std::net::SocketAddr;
use steer_dns_api::{create_api_routes, AppState};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

pub async fn bind_web(bind_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    Ok(TcpListener::bind(bind_addr).await?)
}

pub async fn serve_web(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bind_addr = listener.local_addr()?;
    info!(
        bind_address = %bind_addr,
        api_url = format!("http://{}/api", bind_addr),
        "Starting control API"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Control API stopped");
    Ok(())
}

fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_routes(state))
        .layer(TraceLayer::new_for_http())
}
