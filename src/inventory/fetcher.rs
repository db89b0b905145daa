use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;

use super::soap;
use super::{FetchError, RawRecord};

/// A single best-effort attempt at pulling the raw inventory. Implementations
/// never retry; the caller decides what an error means.
#[async_trait]
pub trait InventoryFetcher: Send + Sync {
    async fn fetch_servers(&self) -> Result<Vec<RawRecord>, FetchError>;
}

/// Stand-in used when no upstream endpoint is configured.
pub struct UnconfiguredFetcher;

#[async_trait]
impl InventoryFetcher for UnconfiguredFetcher {
    async fn fetch_servers(&self) -> Result<Vec<RawRecord>, FetchError> {
        Err(FetchError::NotConfigured)
    }
}

/// SOAP client for the ReliableSite `ServersList` operation.
pub struct ReliableSiteClient {
    client: Client,
    endpoint: String,
    namespace: String,
    api_key: Option<String>,
}

impl ReliableSiteClient {
    pub fn new(
        endpoint: String,
        namespace: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            namespace,
            api_key,
        })
    }
}

#[async_trait]
impl InventoryFetcher for ReliableSiteClient {
    async fn fetch_servers(&self) -> Result<Vec<RawRecord>, FetchError> {
        let envelope = soap::servers_list_envelope(&self.namespace, self.api_key.as_deref());

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(&self.namespace))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // SOAP 1.1 reports faults with a 500; let the parser surface the fault text.
        if !status.is_success() && !body.contains("Fault>") {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let records = soap::parse_servers_list(&body)?;
        debug!(count = records.len(), "Fetched inventory records from upstream.");
        Ok(records)
    }
}
