use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Tier;

/// Flat per-tier markup, expressed as a fraction (`0.25` = +25%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkupTable {
    rates: BTreeMap<Tier, f64>,
}

impl MarkupTable {
    pub fn new(rates: BTreeMap<Tier, f64>) -> Self {
        Self { rates }
    }

    /// Rate for `tier`; tiers without an entry are sold at base price.
    pub fn rate(&self, tier: Tier) -> f64 {
        self.rates.get(&tier).copied().unwrap_or(0.0)
    }

    /// Overrides individual tiers, leaving the rest untouched.
    pub fn merge(&mut self, overrides: BTreeMap<Tier, f64>) {
        self.rates.extend(overrides);
    }

    pub fn marked_up_price(&self, base_price: f64, tier: Tier) -> u64 {
        marked_up_price(base_price, self.rate(tier))
    }
}

impl Default for MarkupTable {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (Tier::Basic, 0.20),
            (Tier::Core, 0.25),
            (Tier::Ultra, 0.30),
            (Tier::Titan, 0.35),
            (Tier::Velocity, 0.40),
        ]))
    }
}

/// Negative and non-finite prices coerce to 0.
pub fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

pub fn marked_up_price(base_price: f64, markup: f64) -> u64 {
    let price = sanitize_price(base_price) * (1.0 + markup);
    if price.is_finite() && price > 0.0 {
        price.round() as u64
    } else {
        0
    }
}
