use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;
use tracing::warn;

use crate::amp::AmpError;
use crate::web::models::ModulesResponse;
use crate::web::{AppError, AppState};

async fn list_modules(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ModulesResponse>, AppError> {
    let client = app_state.amp.as_ref().ok_or(AmpError::NotConfigured)?;
    let modules = client.list_modules().await.inspect_err(|e| {
        warn!(error = %e, "Game panel module listing failed.");
    })?;
    Ok(Json(ModulesResponse {
        count: modules.len(),
        modules,
    }))
}

pub fn amp_router() -> Router<Arc<AppState>> {
    Router::new().route("/modules", get(list_modules))
}
