use serde::{Deserialize, Serialize};

/// Label assigned when no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Confidence of the "nothing matched" result.
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

/// Ceiling for engine-produced confidence. 1.0 is reserved for manual and
/// provider-sourced categories.
pub const MAX_ENGINE_CONFIDENCE: f64 = 0.99;

/// Confidence recorded for manual choices and aggregation-provider categories.
pub const AUTHORITATIVE_CONFIDENCE: f64 = 1.0;

/// Below this a transaction is flagged for review.
pub const REVIEW_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn new(category: impl Into<String>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED, DEFAULT_CONFIDENCE)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self::uncategorized()
    }
}

/// Anything that can turn a transaction description into a category guess.
///
/// Implementations must be total: every input yields a result.
pub trait Classifier: Send + Sync {
    fn classify(&self, description: &str, amount: Option<f64>) -> ClassificationResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl ConfidenceLevel {
    /// Buckets used by the transaction list: >= 0.9 high, >= 0.7 medium.
    pub fn from_confidence(confidence: Option<f64>) -> Self {
        match confidence {
            None => ConfidenceLevel::Unknown,
            Some(c) if c <= 0.0 || c.is_nan() => ConfidenceLevel::Unknown,
            Some(c) if c >= 0.9 => ConfidenceLevel::High,
            Some(c) if c >= 0.7 => ConfidenceLevel::Medium,
            Some(_) => ConfidenceLevel::Low,
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
            ConfidenceLevel::Unknown => write!(f, "Unknown"),
        }
    }
}
