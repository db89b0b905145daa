//! Dedicated-server inventory: upstream records, their normalized shape and the
//! pipeline that turns one into the other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod catalog;
pub mod classify;
pub mod fallback;
pub mod fetcher;
pub mod normalize;
pub mod pricing;
pub mod service;
pub mod soap;

/// One upstream record as loosely-typed `field -> text` pairs.
pub type RawRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Basic,
    Core,
    Ultra,
    Titan,
    Velocity,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Basic,
        Tier::Core,
        Tier::Ultra,
        Tier::Titan,
        Tier::Velocity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "BASIC",
            Tier::Core => "CORE",
            Tier::Ultra => "ULTRA",
            Tier::Titan => "TITAN",
            Tier::Velocity => "VELOCITY",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown server family '{0}'")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTier(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Soldout,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedServer {
    pub id: String,
    pub cpu: String,
    pub ram: String,
    pub storage: String,
    pub bandwidth: String,
    pub location: String,
    pub region: String,
    pub availability: Availability,
    pub base_price: f64,
    pub marked_up_price: u64,
    pub tier: Tier,
    pub stock: u32,
}

/// Where the records behind a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventorySource {
    Soap,
    Fallback,
}

/// Reasons the upstream inventory is considered unavailable.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Inventory upstream is not configured")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Upstream returned non-success status: {status}. Body: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Malformed embedded JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SOAP fault: {0}")]
    Fault(String),
    #[error("Malformed SOAP envelope: {0}")]
    Malformed(String),
    #[error("Upstream returned no server records")]
    Empty,
}
