//! The request record and its feature vector.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Invoice amount feature.
pub const AMOUNT: &str = "amount";
/// Customer score feature (1-10).
pub const CUSTOMER_SCORE: &str = "customer_score";
/// Urgency feature (1-5).
pub const URGENCY: &str = "urgency";

/// Named numeric features, in column order.
pub type Features = IndexMap<String, f64>;

/// A pending request awaiting scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier within the batch.
    pub id: String,

    /// Feature vector, immutable once created.
    pub features: Features,
}

impl Request {
    /// Create a new request.
    pub fn new(id: impl Into<String>, features: Features) -> Self {
        Self {
            id: id.into(),
            features,
        }
    }

    /// Add a feature value.
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Get a feature value by name.
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }
}

/// Format a feature value for tabular export. Whole numbers drop the fraction.
pub(crate) fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
