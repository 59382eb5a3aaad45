use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use chrono::Local;
use signboard_core::config::Config;
use signboard_core::display::{self, PushOutcome};
use signboard_core::render;

use crate::error::AppError;
use crate::page;
use crate::state::AppState;

/// GET /display: the rendered sign as PNG. Rendered first if it does not
/// exist yet.
pub async fn get_display(State(app): State<AppState>) -> Result<Response, AppError> {
    let root = app.root.clone();
    let png = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let output = config.output_path(&root);
        if !output.exists() {
            render::generate_sign(&root, &config, Local::now().date_naive())?;
        }
        let png = std::fs::read(&output)?;
        Ok::<_, signboard_core::SignError>(png)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// POST /send_to_display: push the current sign to the panel. Always
/// answers 200 with a short message; failures are in the logs.
pub async fn send_to_display(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    let root = app.root.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let outcome = match display::panel_for(&config.display.target) {
            Ok(panel) => display::push_image(&config.output_path(&root), panel.as_deref()),
            Err(e) => {
                tracing::error!(error = %e, "could not set up display");
                PushOutcome::Failed(e.to_string())
            }
        };
        Ok::<_, signboard_core::SignError>(outcome)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Html(page::push_message(&outcome)))
}
