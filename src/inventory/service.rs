use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::catalog::CatalogConfig;
use super::fallback::fallback_records;
use super::fetcher::InventoryFetcher;
use super::normalize::normalize_all;
use super::{InventorySource, NormalizedServer, Tier};

pub const ALL_REGIONS: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region '{0}'")]
pub struct InvalidRegion(pub String);

impl RegionFilter {
    /// `ALL` always passes. With a populated region map the code must be one
    /// of its keys; with an empty map any alphanumeric code is accepted.
    pub fn parse(raw: Option<&str>, catalog: &CatalogConfig) -> Result<Self, InvalidRegion> {
        let code = raw.map(str::trim).unwrap_or(ALL_REGIONS).to_uppercase();
        if code.is_empty() || code == ALL_REGIONS {
            return Ok(RegionFilter::All);
        }
        let known = if catalog.regions.is_empty() {
            code.chars().all(|c| c.is_ascii_alphanumeric())
        } else {
            catalog.regions.contains_key(&code)
        };
        if known {
            Ok(RegionFilter::Code(code))
        } else {
            Err(InvalidRegion(code))
        }
    }

    pub fn matches(&self, region: &str) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Code(code) => code == region,
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str(ALL_REGIONS),
            RegionFilter::Code(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub label: String,
    pub total: usize,
    pub available: usize,
}

#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub servers: Vec<NormalizedServer>,
    pub source: InventorySource,
}

#[derive(Debug, Clone)]
pub struct InventoryView {
    pub family: Tier,
    pub region: RegionFilter,
    pub region_summary: BTreeMap<String, RegionSummary>,
    pub servers: Vec<NormalizedServer>,
    pub source: InventorySource,
}

/// Per-region totals over `servers`, which should already be tier-filtered.
pub fn summarize_regions(
    servers: &[NormalizedServer],
    catalog: &CatalogConfig,
) -> BTreeMap<String, RegionSummary> {
    let mut summary: BTreeMap<String, RegionSummary> = BTreeMap::new();
    for server in servers {
        let entry = summary
            .entry(server.region.clone())
            .or_insert_with(|| RegionSummary {
                label: catalog.region_label(&server.region),
                total: 0,
                available: 0,
            });
        entry.total += 1;
        if server.availability.is_available() {
            entry.available += 1;
        }
    }
    summary
}

/// Tier filter, then the summary, then the region filter; the summary thus
/// covers every region of the chosen tier.
pub fn select(
    servers: Vec<NormalizedServer>,
    family: Tier,
    region: &RegionFilter,
    catalog: &CatalogConfig,
) -> (BTreeMap<String, RegionSummary>, Vec<NormalizedServer>) {
    let in_family: Vec<NormalizedServer> =
        servers.into_iter().filter(|s| s.tier == family).collect();
    let summary = summarize_regions(&in_family, catalog);
    let selected = in_family
        .into_iter()
        .filter(|s| region.matches(&s.region))
        .collect();
    (summary, selected)
}

#[derive(Clone)]
pub struct InventoryService {
    fetcher: Arc<dyn InventoryFetcher>,
    catalog: Arc<CatalogConfig>,
}

impl InventoryService {
    pub fn new(fetcher: Arc<dyn InventoryFetcher>, catalog: Arc<CatalogConfig>) -> Self {
        Self { fetcher, catalog }
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    /// Live inventory when the upstream answers, the static list otherwise.
    pub async fn load(&self) -> InventorySnapshot {
        match self.fetcher.fetch_servers().await {
            Ok(records) => {
                info!(count = records.len(), "Serving live inventory.");
                InventorySnapshot {
                    servers: normalize_all(&records, &self.catalog),
                    source: InventorySource::Soap,
                }
            }
            Err(e) => {
                warn!(error = %e, "Inventory upstream unavailable. Serving fallback inventory.");
                InventorySnapshot {
                    servers: normalize_all(fallback_records(), &self.catalog),
                    source: InventorySource::Fallback,
                }
            }
        }
    }

    pub async fn query(&self, family: Tier, region: RegionFilter) -> InventoryView {
        let snapshot = self.load().await;
        let (region_summary, servers) = select(snapshot.servers, family, &region, &self.catalog);
        InventoryView {
            family,
            region,
            region_summary,
            servers,
            source: snapshot.source,
        }
    }
}
