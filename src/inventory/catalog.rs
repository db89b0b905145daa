use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Tier;
use super::classify::TierClassifier;
use super::pricing::MarkupTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMeta {
    pub label: String,
    pub tagline: String,
}

/// Immutable catalog settings shared by the normalizer, the pricing step and
/// the routes. Built once at start-up.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub classifier: TierClassifier,
    pub markup: MarkupTable,
    /// Region code -> display label.
    pub regions: BTreeMap<String, String>,
    pub families: BTreeMap<Tier, FamilyMeta>,
}

/// File-level overrides; every table is merged key by key over the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogOverrides {
    #[serde(default)]
    pub markup: BTreeMap<Tier, f64>,
    #[serde(default)]
    pub regions: BTreeMap<String, String>,
    #[serde(default)]
    pub families: BTreeMap<Tier, FamilyMeta>,
}

impl CatalogConfig {
    pub fn with_overrides(overrides: CatalogOverrides) -> Self {
        let mut catalog = Self::default();
        catalog.markup.merge(overrides.markup);
        catalog.regions.extend(
            overrides
                .regions
                .into_iter()
                .map(|(code, label)| (code.trim().to_uppercase(), label)),
        );
        catalog.families.extend(overrides.families);
        catalog
    }

    pub fn region_label(&self, code: &str) -> String {
        self.regions
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn family_meta(&self, tier: Tier) -> FamilyMeta {
        self.families.get(&tier).cloned().unwrap_or_else(|| FamilyMeta {
            label: tier.as_str().to_string(),
            tagline: String::new(),
        })
    }
}

fn family(label: &str, tagline: &str) -> FamilyMeta {
    FamilyMeta {
        label: label.to_string(),
        tagline: tagline.to_string(),
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let regions = [
            ("MIA", "Miami, FL"),
            ("NYC", "New York, NY"),
            ("LAX", "Los Angeles, CA"),
            ("DAL", "Dallas, TX"),
            ("SEA", "Seattle, WA"),
        ]
        .into_iter()
        .map(|(code, label)| (code.to_string(), label.to_string()))
        .collect();

        let families = BTreeMap::from([
            (
                Tier::Basic,
                family("Basic", "Entry-level Xeon boxes for small communities"),
            ),
            (
                Tier::Core,
                family("Core", "Balanced servers for most game networks"),
            ),
            (
                Tier::Ultra,
                family("Ultra", "Multi-socket Xeon for busy networks"),
            ),
            (
                Tier::Titan,
                family("Titan", "High core-count EPYC and Platinum machines"),
            ),
            (
                Tier::Velocity,
                family("Velocity", "Top single-thread performance on Ryzen and EPYC"),
            ),
        ]);

        Self {
            classifier: TierClassifier::default(),
            markup: MarkupTable::default(),
            regions,
            families,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_merge_per_key() {
        let overrides: CatalogOverrides = toml::from_str(
            r#"
            [markup]
            TITAN = 0.5

            [regions]
            ams = "Amsterdam, NL"

            [families.CORE]
            label = "Core+"
            tagline = "More of everything"
            "#,
        )
        .unwrap();

        let catalog = CatalogConfig::with_overrides(overrides);
        assert_eq!(catalog.markup.rate(Tier::Titan), 0.5);
        assert_eq!(catalog.markup.rate(Tier::Basic), 0.20);
        assert_eq!(catalog.region_label("AMS"), "Amsterdam, NL");
        assert_eq!(catalog.region_label("MIA"), "Miami, FL");
        assert_eq!(catalog.family_meta(Tier::Core).label, "Core+");
        assert_eq!(catalog.family_meta(Tier::Ultra).label, "Ultra");
    }

    #[test]
    fn test_unknown_region_label_is_the_code() {
        let catalog = CatalogConfig::default();
        assert_eq!(catalog.region_label("MIAMIFL"), "MIAMIFL");
    }
}
