use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::inventory::service::RegionSummary;
use crate::inventory::{InventorySource, NormalizedServer, Tier};

#[derive(Debug, Default, Deserialize)]
pub struct DedicatedServersQuery {
    pub family: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMetaResponse {
    pub label: String,
    pub tagline: String,
    pub markup: f64,
    pub count: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedicatedServersResponse {
    pub family: Tier,
    pub region: String,
    pub meta: FamilyMetaResponse,
    pub region_summary: BTreeMap<String, RegionSummary>,
    pub servers: Vec<NormalizedServer>,
    pub source: InventorySource,
}

#[derive(Debug, Serialize)]
pub struct FamilyInfo {
    pub family: Tier,
    pub label: String,
    pub tagline: String,
    pub markup: f64,
}

#[derive(Debug, Serialize)]
pub struct ModulesResponse {
    pub modules: Vec<Value>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
