use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::amp::{AmpClient, AmpError};
use crate::inventory::FetchError;
use crate::inventory::fetcher::{InventoryFetcher, ReliableSiteClient, UnconfiguredFetcher};
use crate::inventory::service::InventoryService;
use crate::server::config::ServerConfig;

#[derive(Error, Debug)]
pub enum CoreServicesError {
    #[error("Failed to build inventory client: {0}")]
    Inventory(#[from] FetchError),
    #[error("Failed to build game panel client: {0}")]
    Amp(#[from] AmpError),
}

/// Long-lived services shared by every request.
#[derive(Clone)]
pub struct CoreServices {
    pub inventory: InventoryService,
    pub amp: Option<Arc<AmpClient>>,
}

impl CoreServices {
    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreServicesError> {
        let catalog = Arc::new(config.catalog.clone());

        let fetcher: Arc<dyn InventoryFetcher> = match &config.reliablesite_api_url {
            Some(url) => {
                info!(
                    endpoint = %url,
                    timeout_secs = config.upstream_timeout.as_secs(),
                    "Inventory upstream configured."
                );
                Arc::new(ReliableSiteClient::new(
                    url.clone(),
                    config.reliablesite_namespace.clone(),
                    config.reliablesite_api_key.clone(),
                    config.upstream_timeout,
                )?)
            }
            None => {
                warn!("RELIABLESITE_API_URL is not set. Every inventory request will be served from fallback data.");
                Arc::new(UnconfiguredFetcher)
            }
        };

        let amp = match (&config.amp_api_url, &config.amp_api_token) {
            (Some(url), Some(token)) => {
                info!(endpoint = %url, "Game panel API configured.");
                Some(Arc::new(AmpClient::new(
                    url,
                    token.clone(),
                    config.upstream_timeout,
                )?))
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("AMP_API_URL and AMP_API_TOKEN must both be set. Module listing is disabled.");
                None
            }
            (None, None) => None,
        };

        if config.catalog.regions.is_empty() {
            warn!("Region map is empty. Any alphanumeric region code will be accepted.");
        }

        Ok(Self {
            inventory: InventoryService::new(fetcher, catalog),
            amp,
        })
    }
}
