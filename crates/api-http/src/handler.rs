//! HTTP Handlers
//!
//! Translate form submissions into Registry and ScheduleService calls.

use crate::error::HttpError;
use crate::page;
use crate::state::AppState;
use axum::extract::{Form, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;

/// `POST /add-device` body; absent fields are stored as empty strings
#[derive(Debug, Deserialize)]
pub struct AddDeviceForm {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default, rename = "outputFile")]
    pub output_file: String,
}

/// `POST /set-schedule` body
#[derive(Debug, Deserialize)]
pub struct SetScheduleForm {
    #[serde(default)]
    pub schedule: String,
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let devices = state.registry.list_devices().await?;
    let schedule = state.schedules.current_schedule().await?;
    let next_fire = state.schedules.controller().next_fire_time();

    Ok(Html(page::render_index(&devices, &schedule, next_fire)))
}

/// POST /add-device
pub async fn add_device(
    State(state): State<AppState>,
    Form(form): Form<AddDeviceForm>,
) -> Result<Redirect, HttpError> {
    state
        .registry
        .add_device(&form.user, &form.ip, &form.output_file)
        .await?;

    Ok(Redirect::to("/"))
}

/// POST /set-schedule
pub async fn set_schedule(
    State(state): State<AppState>,
    Form(form): Form<SetScheduleForm>,
) -> Result<Redirect, HttpError> {
    state.schedules.change_schedule(&form.schedule).await?;

    Ok(Redirect::to("/"))
}
