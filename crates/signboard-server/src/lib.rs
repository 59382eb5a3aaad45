pub mod embed;
pub mod error;
pub mod page;
pub mod refresh;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use chrono::Local;
use signboard_core::config::{Config, WarnLevel};
use signboard_core::render;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    Router::new()
        .route("/", get(routes::sign::index))
        .route("/update", post(routes::sign::update))
        .route("/display", get(routes::display::get_display))
        .route("/send_to_display", post(routes::display::send_to_display))
        .route("/api/sign", get(routes::sign::get_sign))
        .route("/static/{*path}", get(embed::static_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the sign server on `port`.
pub async fn serve(root: PathBuf, port: u16, refresh: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, refresh).await
}

/// Start the sign server on a pre-bound listener.
///
/// Renders the sign once before accepting requests and, when `refresh` is
/// set, starts the background refresh loop.
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    refresh: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();

    let config = Config::load(&root)?;
    for w in config.validate() {
        match w.level {
            WarnLevel::Error => tracing::error!("config: {}", w.message),
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
        }
    }

    let startup_root = root.clone();
    let startup_config = config.clone();
    tokio::task::spawn_blocking(move || {
        render::generate_sign(&startup_root, &startup_config, Local::now().date_naive())
    })
    .await??;

    if refresh {
        refresh::spawn(root.clone(), config.server.refresh_interval_secs);
    }

    tracing::info!("signboard listening on http://localhost:{actual_port}");

    let app = build_router(root);
    axum::serve(listener, app).await?;
    Ok(())
}
