use finsight_core::{
    ClassificationResult, Classifier, Transaction, MAX_ENGINE_CONFIDENCE,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::default_rules::default_rules;

/// Keyword-only hits start this far below the rule's base confidence...
const KEYWORD_PENALTY: f64 = 0.3;
/// ...gain this much per distinct keyword found...
const KEYWORD_STEP: f64 = 0.1;
/// ...and never drop below this.
const KEYWORD_FLOOR: f64 = 0.4;

/// Confidence adjustment for transactions whose absolute amount lies in
/// `[min, max]`. A missing bound is open on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    pub boost: f64,
}

impl AmountRange {
    pub fn new(min: Option<f64>, max: Option<f64>, boost: f64) -> Self {
        Self { min, max, boost }
    }

    pub fn contains(&self, abs_amount: f64) -> bool {
        self.min.map_or(true, |min| abs_amount >= min) && self.max.map_or(true, |max| abs_amount <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub base_confidence: f64,
    /// Case-insensitive regular expressions.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Plain substrings, only consulted when no pattern matches.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// First containing range wins.
    #[serde(default)]
    pub amount_ranges: Vec<AmountRange>,
}

impl CategoryRule {
    pub fn new(category: &str, base_confidence: f64) -> Self {
        Self {
            category: category.to_string(),
            base_confidence,
            patterns: Vec::new(),
            keywords: Vec::new(),
            amount_ranges: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns.extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords.extend(keywords.iter().map(|k| k.to_string()));
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>, boost: f64) -> Self {
        self.amount_ranges.push(AmountRange::new(min, max, boost));
        self
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid pattern '{pattern}' in {category} rule: {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Base confidence {confidence} of {category} rule is outside (0, 1]")]
    InvalidConfidence { category: String, confidence: f64 },
    #[error("Amount range in {0} rule has a non-finite bound or boost")]
    InvalidAmountRange(String),
    #[error("Failed to parse rule table: {0}")]
    Toml(#[from] toml::de::Error),
}

/// On-disk shape of a rule table: a `[[rules]]` array of tables.
#[derive(Debug, Deserialize)]
struct RuleTable {
    rules: Vec<CategoryRule>,
}

/// Internal pairing of a rule with its compiled patterns and lower-cased keywords.
struct CompiledRule {
    rule: CategoryRule,
    patterns: Vec<Regex>,
    keywords: Vec<String>,
}

impl CompiledRule {
    fn compile(rule: CategoryRule) -> Result<Self, RuleError> {
        if !(rule.base_confidence > 0.0 && rule.base_confidence <= 1.0) {
            return Err(RuleError::InvalidConfidence {
                category: rule.category,
                confidence: rule.base_confidence,
            });
        }

        let ranges_ok = rule.amount_ranges.iter().all(|r| {
            r.boost.is_finite()
                && r.min.map_or(true, f64::is_finite)
                && r.max.map_or(true, f64::is_finite)
        });
        if !ranges_ok {
            return Err(RuleError::InvalidAmountRange(rule.category));
        }

        let patterns = rule
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleError::InvalidPattern {
                        category: rule.category.clone(),
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let keywords = rule.keywords.iter().map(|k| k.to_lowercase()).collect();

        Ok(CompiledRule {
            rule,
            patterns,
            keywords,
        })
    }

    /// Confidence before any amount boost, or `None` if the rule does not fire.
    fn match_confidence(&self, description: &str, lowered: &str) -> Option<f64> {
        if self.patterns.iter().any(|re| re.is_match(description)) {
            return Some(self.rule.base_confidence);
        }

        let hits = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count();
        if hits == 0 {
            return None;
        }

        Some(
            (self.rule.base_confidence - KEYWORD_PENALTY + hits as f64 * KEYWORD_STEP)
                .max(KEYWORD_FLOOR),
        )
    }

    fn boost_for(&self, abs_amount: f64) -> f64 {
        self.rule
            .amount_ranges
            .iter()
            .find(|r| r.contains(abs_amount))
            .map_or(0.0, |r| r.boost)
    }
}

/// Rule-based transaction classifier.
///
/// Rules are evaluated in declaration order and the most confident one wins;
/// on equal confidence the earlier rule is kept. The engine holds no mutable
/// state and can be shared freely between threads.
pub struct CategoryRuleEngine {
    rules: Vec<CompiledRule>,
}

impl CategoryRuleEngine {
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, RuleError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let table: RuleTable = toml::from_str(toml_content)?;
        Self::new(table.rules)
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter().map(|cr| &cr.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn classify(&self, description: &str, amount: Option<f64>) -> ClassificationResult {
        // Zero, NaN and infinities carry no size signal.
        let abs_amount = amount
            .filter(|a| a.is_finite() && *a != 0.0)
            .map(f64::abs);
        let lowered = description.to_lowercase();

        let mut best = ClassificationResult::uncategorized();
        for cr in &self.rules {
            let Some(mut confidence) = cr.match_confidence(description, &lowered) else {
                continue;
            };

            if let Some(abs) = abs_amount {
                confidence += cr.boost_for(abs);
            }
            let confidence = confidence.min(MAX_ENGINE_CONFIDENCE);

            if confidence > best.confidence {
                best = ClassificationResult::new(cr.rule.category.clone(), confidence);
            }
        }

        best
    }

    pub fn classify_transaction(&self, tx: &Transaction) -> ClassificationResult {
        self.classify(&tx.description, tx.amount_for_classification())
    }

    /// Results line up index-for-index with `items`.
    pub fn classify_batch(&self, items: &[(&str, Option<f64>)]) -> Vec<ClassificationResult> {
        items
            .iter()
            .map(|(description, amount)| self.classify(description, *amount))
            .collect()
    }
}

impl Default for CategoryRuleEngine {
    /// The built-in rule table. Its patterns are fixed and known to compile.
    fn default() -> Self {
        Self::new(default_rules()).expect("built-in rule table is valid")
    }
}

impl Classifier for CategoryRuleEngine {
    fn classify(&self, description: &str, amount: Option<f64>) -> ClassificationResult {
        CategoryRuleEngine::classify(self, description, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn engine() -> CategoryRuleEngine {
        CategoryRuleEngine::default()
    }

    // ── scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn woolworths_with_large_basket() {
        let r = engine().classify("WOOLWORTHS SANDTON", Some(1247.50));
        assert_eq!(r.category, "Groceries");
        assert!(approx(r.confidence, 0.95));
    }

    #[test]
    fn uber_trip_gets_ride_band_boost() {
        let r = engine().classify("UBER TRIP 27/05", Some(45.00));
        assert_eq!(r.category, "Transport");
        assert!(approx(r.confidence, 0.96));
    }

    #[test]
    fn unknown_merchant_is_uncategorized() {
        let r = engine().classify("RANDOM MERCHANT XYZ123", None);
        assert_eq!(r, ClassificationResult::new("Uncategorized", 0.3));
    }

    #[test]
    fn salary_without_amount_ranges() {
        let r = engine().classify("SALARY DEPOSIT", None);
        assert_eq!(r.category, "Income");
        assert!(approx(r.confidence, 0.96));

        let with_amount = engine().classify("SALARY DEPOSIT", Some(25_000.0));
        assert_eq!(with_amount, r);
    }

    #[test]
    fn single_keyword_fallback() {
        let r = engine().classify("food", None);
        assert_eq!(r.category, "Groceries");
        assert!(approx(r.confidence, 0.72));
    }

    // ── properties ────────────────────────────────────────────────────────────

    #[test]
    fn deterministic() {
        let e = engine();
        let a = e.classify("SHELL ULTRA CITY N1", Some(850.0));
        let b = e.classify("SHELL ULTRA CITY N1", Some(850.0));
        assert_eq!(a, b);
    }

    #[test]
    fn confidence_stays_in_bounds() {
        let e = engine();
        let inputs = [
            ("", None),
            ("ABSA MONTHLY ACCOUNT FEE", Some(75.0)),
            ("NETFLIX SUBSCRIPTION STREAMING", Some(199.0)),
            ("RENT PAYMENT", Some(12_000.0)),
            ("online delivery order purchase", Some(-350.0)),
            ("!!!", Some(f64::NAN)),
        ];
        for (desc, amount) in inputs {
            let r = e.classify(desc, amount);
            assert!(r.confidence >= 0.3, "{desc}: {}", r.confidence);
            assert!(r.confidence <= 0.99, "{desc}: {}", r.confidence);
        }
    }

    #[test]
    fn boost_is_clamped_below_one() {
        let r = engine().classify("ABSA MONTHLY ACCOUNT FEE", Some(75.0));
        assert_eq!(r.category, "Banking Fees");
        assert!(approx(r.confidence, 0.99));
    }

    #[test]
    fn pattern_match_uses_base_confidence() {
        // "food" is also a grocery keyword, but the pattern hit takes precedence.
        let r = engine().classify("CHECKERS FOOD", None);
        assert_eq!(r.category, "Groceries");
        assert!(approx(r.confidence, 0.92));
    }

    #[test]
    fn multiple_keywords_add_up() {
        let r = engine().classify("online delivery order", None);
        assert_eq!(r.category, "Shopping");
        assert!(approx(r.confidence, 0.85));
    }

    #[test]
    fn keyword_confidence_has_a_floor() {
        let e = CategoryRuleEngine::new(vec![
            CategoryRule::new("Hobbies", 0.5).with_keywords(&["craft"]),
        ])
        .unwrap();
        let r = e.classify("Craft supplies", None);
        assert_eq!(r.category, "Hobbies");
        assert!(approx(r.confidence, 0.4));
    }

    #[test]
    fn only_first_matching_range_applies() {
        let e = CategoryRuleEngine::new(vec![CategoryRule::new("Coffee", 0.8)
            .with_patterns(&["bean"])
            .with_amount_range(Some(10.0), Some(100.0), 0.02)
            .with_amount_range(None, Some(1000.0), 0.05)])
        .unwrap();
        assert!(approx(e.classify("BEAN THERE", Some(50.0)).confidence, 0.82));
        assert!(approx(e.classify("BEAN THERE", Some(500.0)).confidence, 0.85));
        assert!(approx(e.classify("BEAN THERE", Some(5_000.0)).confidence, 0.8));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = AmountRange::new(Some(15.0), Some(200.0), 0.08);
        assert!(range.contains(15.0));
        assert!(range.contains(200.0));
        assert!(!range.contains(14.99));
        assert!(AmountRange::new(None, None, 0.0).contains(1e12));
    }

    #[test]
    fn amount_sign_is_ignored() {
        let r = engine().classify("UBER TRIP", Some(-45.0));
        assert!(approx(r.confidence, 0.96));
    }

    #[test]
    fn unusable_amounts_disable_boost_only() {
        let e = engine();
        for amount in [None, Some(0.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let r = e.classify("UBER TRIP", amount);
            assert_eq!(r.category, "Transport");
            assert!(approx(r.confidence, 0.88));
        }
    }

    #[test]
    fn earlier_rule_wins_ties() {
        let e = CategoryRuleEngine::new(vec![
            CategoryRule::new("First", 0.9).with_patterns(&["acme"]),
            CategoryRule::new("Second", 0.9).with_patterns(&["acme"]),
        ])
        .unwrap();
        assert_eq!(e.classify("ACME LTD", None).category, "First");
    }

    #[test]
    fn later_rule_wins_when_strictly_higher() {
        let e = CategoryRuleEngine::new(vec![
            CategoryRule::new("Weak", 0.8).with_patterns(&["acme"]),
            CategoryRule::new("Strong", 0.81).with_patterns(&["acme"]),
        ])
        .unwrap();
        assert_eq!(e.classify("ACME LTD", None).category, "Strong");
    }

    #[test]
    fn fuel_outranks_generic_transport() {
        let r = engine().classify("SHELL PETROL STATION", Some(650.0));
        assert_eq!(r.category, "Transport");
        assert!(approx(r.confidence, 0.99));
    }

    #[test]
    fn empty_rule_table_always_defaults() {
        let e = CategoryRuleEngine::new(vec![]).unwrap();
        assert!(e.is_empty());
        assert_eq!(e.classify("WOOLWORTHS", Some(100.0)), ClassificationResult::uncategorized());
    }

    #[test]
    fn batch_preserves_order() {
        let results = engine().classify_batch(&[
            ("SALARY DEPOSIT", None),
            ("RANDOM MERCHANT XYZ123", None),
            ("UBER TRIP", Some(45.0)),
        ]);
        let categories: Vec<_> = results.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, ["Income", "Uncategorized", "Transport"]);
    }

    #[test]
    fn classify_through_trait_object() {
        let e = engine();
        let classifier: &dyn Classifier = &e;
        assert_eq!(classifier.classify("NETFLIX", None).category, "Entertainment");
    }

    // ── construction ──────────────────────────────────────────────────────────

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = CategoryRuleEngine::new(vec![CategoryRule::new("Broken", 0.9).with_patterns(&["(unclosed"])])
            .err()
            .unwrap();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn invalid_confidence_is_rejected() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let result = CategoryRuleEngine::new(vec![CategoryRule::new("Bad", bad)]);
            assert!(matches!(result, Err(RuleError::InvalidConfidence { .. })));
        }
    }

    #[test]
    fn non_finite_range_is_rejected() {
        let result = CategoryRuleEngine::new(vec![
            CategoryRule::new("Bad", 0.9).with_amount_range(Some(f64::NAN), None, 0.1),
        ]);
        assert!(matches!(result, Err(RuleError::InvalidAmountRange(_))));
    }

    #[test]
    fn from_toml_table() {
        let toml = r#"
            [[rules]]
            category = "Boodskappe"
            base_confidence = 0.9
            patterns = ["spar"]
            keywords = ["kos"]
            amount_ranges = [{ min = 50.0, max = 500.0, boost = 0.05 }]

            [[rules]]
            category = "Vervoer"
            base_confidence = 0.85
            keywords = ["taxi"]
        "#;
        let e = CategoryRuleEngine::from_toml(toml).unwrap();
        assert_eq!(e.len(), 2);

        let r = e.classify("SPAR KLOOF", Some(120.0));
        assert_eq!(r.category, "Boodskappe");
        assert!(approx(r.confidence, 0.95));

        let r = e.classify("minibus taxi", None);
        assert_eq!(r.category, "Vervoer");
        assert!(approx(r.confidence, 0.65));
    }

    #[test]
    fn from_toml_syntax_error() {
        assert!(matches!(
            CategoryRuleEngine::from_toml("[[rules]\ncategory ="),
            Err(RuleError::Toml(_))
        ));
    }
}
