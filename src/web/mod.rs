use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any as PanicPayload;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, warn};

use crate::amp::AmpClient;
use crate::inventory::service::InventoryService;
use crate::server::config::ServerConfig;
use crate::server::core_services::CoreServices;
use crate::version::VERSION;
use crate::web::models::VersionResponse;
use crate::web::routes::*;

pub use error::AppError;

pub mod error;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub amp: Option<Arc<AmpClient>>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse { version: VERSION })
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(detail = %detail, "Request handler panicked.");
    AppError::InternalServerError(detail).into_response()
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            warn!(error = %e, "FRONTEND_URL is not a valid origin. Allowing any origin.");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(vec![Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn create_axum_router(services: CoreServices, config: &ServerConfig) -> Router {
    let cors = cors_layer(config.frontend_url.as_deref());

    let app_state = Arc::new(AppState {
        inventory: services.inventory,
        amp: services.amp,
    });

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/version", get(version_handler))
        .nest("/api/dedicated", dedicated_routes::dedicated_router())
        .nest("/api/amp", amp_routes::amp_router())
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::inventory::catalog::CatalogConfig;
    use crate::inventory::fetcher::InventoryFetcher;
    use crate::server::config::{FileConfig, PartialServerConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    pub fn test_config() -> ServerConfig {
        ServerConfig::from_layers(FileConfig::default(), PartialServerConfig::default()).unwrap()
    }

    pub fn test_router_with_amp(
        fetcher: impl InventoryFetcher + 'static,
        amp: Option<AmpClient>,
    ) -> Router {
        let services = CoreServices {
            inventory: InventoryService::new(
                Arc::new(fetcher),
                Arc::new(CatalogConfig::default()),
            ),
            amp: amp.map(Arc::new),
        };
        create_axum_router(services, &test_config())
    }

    pub fn test_router(fetcher: impl InventoryFetcher + 'static) -> Router {
        test_router_with_amp(fetcher, None)
    }

    pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}
