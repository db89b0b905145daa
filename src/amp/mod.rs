//! Client for the game-panel (AMP) module listing.

use reqwest::{Client, header};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Members that may hold the module array when the panel wraps it.
const LIST_KEYS: &[&str] = &["result", "modules", "Modules", "data"];

#[derive(Error, Debug)]
pub enum AmpError {
    #[error("Game panel API is not configured")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Game panel returned non-success status: {status}. Body: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Pulls the module list out of a panel response: either the array itself or
/// the first array found under one of [`LIST_KEYS`].
pub fn extract_module_list(value: Value) -> Result<Vec<Value>, AmpError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => LIST_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                let keys: Vec<&String> = map.keys().collect();
                AmpError::UnexpectedShape(format!("object without a module list (keys: {keys:?})"))
            }),
        other => Err(AmpError::UnexpectedShape(format!(
            "expected a list or an object, got {other}"
        ))),
    }
}

pub struct AmpClient {
    client: Client,
    base_url: String,
    session_token: String,
}

impl AmpClient {
    pub fn new(base_url: &str, session_token: String, timeout: Duration) -> Result<Self, AmpError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token,
        })
    }

    pub async fn list_modules(&self) -> Result<Vec<Value>, AmpError> {
        let url = format!("{}/API/ListModules", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&json!({ "SESSIONID": self.session_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(AmpError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let modules = extract_module_list(response.json::<Value>().await?)?;
        debug!(count = modules.len(), "Fetched module list from game panel.");
        Ok(modules)
    }
}
