use super::Tier;

/// A single classification rule: the tier applies when the lower-cased CPU
/// description contains any of `keywords`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRule {
    pub tier: Tier,
    pub keywords: Vec<String>,
}

impl TierRule {
    pub fn new(tier: Tier, keywords: &[&str]) -> Self {
        Self {
            tier,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, cpu_lower: &str) -> bool {
        self.keywords.iter().any(|k| cpu_lower.contains(k.as_str()))
    }
}

/// Ordered rule table, first match wins, `default_tier` when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierClassifier {
    rules: Vec<TierRule>,
    default_tier: Tier,
}

impl TierClassifier {
    pub fn new(rules: Vec<TierRule>, default_tier: Tier) -> Self {
        Self {
            rules,
            default_tier,
        }
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.rules
    }

    pub fn default_tier(&self) -> Tier {
        self.default_tier
    }

    pub fn classify(&self, cpu: &str) -> Tier {
        let cpu_lower = cpu.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&cpu_lower))
            .map(|rule| rule.tier)
            .unwrap_or(self.default_tier)
    }
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::new(
            vec![
                TierRule::new(Tier::Velocity, &["threadripper", "ryzen"]),
                // Genoa and Siena parts
                TierRule::new(Tier::Velocity, &["epyc 9", "epyc 4"]),
                TierRule::new(Tier::Titan, &["epyc", "platinum"]),
                TierRule::new(Tier::Ultra, &["gold", "dual xeon", "2x xeon"]),
                TierRule::new(
                    Tier::Basic,
                    &[
                        "silver", "bronze", "xeon e3", "xeon e-2", "e3-12", "atom", "celeron",
                        "pentium",
                    ],
                ),
            ],
            Tier::Core,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_default_rule() {
        let classifier = TierClassifier::default();
        let cases = [
            ("AMD Ryzen 9 7950X", Tier::Velocity),
            ("AMD Ryzen Threadripper PRO 5975WX", Tier::Velocity),
            ("AMD EPYC 9354P", Tier::Velocity),
            ("AMD EPYC 4464P", Tier::Velocity),
            ("AMD EPYC 7543P", Tier::Titan),
            ("Intel Xeon Platinum 8280", Tier::Titan),
            ("Intel Xeon Gold 6248R", Tier::Ultra),
            ("Dual Xeon E5-2690 v4", Tier::Ultra),
            ("Intel Xeon Silver 4214", Tier::Basic),
            ("Intel Xeon E3-1240 v6", Tier::Basic),
            ("Intel Xeon E-2388G", Tier::Basic),
            ("Intel Xeon E5-2680 v4", Tier::Core),
        ];
        for (cpu, expected) in cases {
            assert_eq!(classifier.classify(cpu), expected, "cpu: {cpu}");
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let classifier = TierClassifier::default();
        assert_eq!(classifier.classify("amd RYZEN 7 5800x"), Tier::Velocity);
        assert_eq!(classifier.classify("INTEL XEON SILVER 4110"), Tier::Basic);
    }

    #[test]
    fn test_unrecognized_and_empty_fall_to_default() {
        let classifier = TierClassifier::default();
        assert_eq!(classifier.classify(""), Tier::Core);
        assert_eq!(classifier.classify("Unknown"), Tier::Core);
        assert_eq!(classifier.classify("Apple M2 Ultra"), Tier::Core);
    }

    #[test]
    fn test_rule_order_decides_overlaps() {
        // "epyc 9" must win over the generic "epyc" rule below it.
        let classifier = TierClassifier::default();
        assert_eq!(classifier.classify("2x AMD EPYC 9654"), Tier::Velocity);

        let reordered = TierClassifier::new(
            vec![
                TierRule::new(Tier::Basic, &["xeon"]),
                TierRule::new(Tier::Ultra, &["gold"]),
            ],
            Tier::Core,
        );
        assert_eq!(reordered.classify("Xeon Gold 6130"), Tier::Basic);
    }
}
