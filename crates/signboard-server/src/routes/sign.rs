use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use chrono::Local;
use serde::Deserialize;
use signboard_core::config::Config;
use signboard_core::record::{IncidentRecord, IncidentUpdate, Store};
use signboard_core::render;
use signboard_core::types::{parse_date, Reason};

use crate::error::AppError;
use crate::page;
use crate::state::AppState;

/// GET /: current counters, sign preview and the update form.
pub async fn index(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    let root = app.root.clone();
    let html = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let today = Local::now().date_naive();
        let record = Store::for_root(&root, &config).load()?.refreshed(today);
        let html = page::index(&record, &config.display.target, today)?;
        Ok::<_, anyhow::Error>(html)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Html(html))
}

#[derive(Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub incident_number: String,
    #[serde(default)]
    pub incident_date: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl UpdateForm {
    /// Validate the submitted fields. A blank reason means `Change`.
    fn into_update(self) -> Result<IncidentUpdate, signboard_core::SignError> {
        let incident_date = parse_date(&self.incident_date)?;
        let reason = match self.reason.as_deref().map(str::trim) {
            None | Some("") => Reason::Change,
            Some(s) => s.parse()?,
        };
        Ok(IncidentUpdate {
            incident_number: self.incident_number.trim().to_string(),
            incident_date,
            reason,
        })
    }
}

/// POST /update: record a new incident, re-render the sign, back to `/`.
pub async fn update(
    State(app): State<AppState>,
    Form(form): Form<UpdateForm>,
) -> Result<Redirect, AppError> {
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || {
        let update = form.into_update()?;
        let config = Config::load(&root)?;
        let store = Store::for_root(&root, &config);
        let mut record = store.load()?;

        let now = Local::now().naive_local();
        record.apply_update(update, now);
        store.save(&record)?;
        tracing::info!(
            incident = %record.incident_number,
            reason = %record.reason,
            days_since = record.days_since,
            "incident recorded"
        );

        render::generate_sign(&root, &config, now.date())?;
        Ok::<_, signboard_core::SignError>(())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Redirect::to("/"))
}

/// GET /api/sign: the refreshed record as JSON.
pub async fn get_sign(State(app): State<AppState>) -> Result<Json<IncidentRecord>, AppError> {
    let root = app.root.clone();
    let record = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let record = Store::for_root(&root, &config)
            .load()?
            .refreshed(Local::now().date_naive());
        Ok::<_, signboard_core::SignError>(record)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(record))
}
