//! Scored review items and the recommendation rule.

use serde::{Deserialize, Serialize};

use crate::error::{ApprovalError, Result};
use crate::request::{Features, Request};

/// The classifier's raw verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    Approve,
    Reject,
}

impl Suggestion {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Suggestion::Approve => "Approve",
            Suggestion::Reject => "Reject",
        }
    }
}

/// What the system recommends to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    Reject,
    ManualReview,
}

impl Recommendation {
    /// Derive a recommendation from a suggestion and its confidence.
    ///
    /// Confidence strictly inside the band overrides the suggestion with
    /// `ManualReview`; the band edges keep the raw suggestion.
    pub fn derive(suggestion: Suggestion, confidence: f64, band: &AmbiguityBand) -> Self {
        if band.contains(confidence) {
            return Recommendation::ManualReview;
        }
        match suggestion {
            Suggestion::Approve => Recommendation::Approve,
            Suggestion::Reject => Recommendation::Reject,
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Approve => "Approve",
            Recommendation::Reject => "Reject",
            Recommendation::ManualReview => "Manual Review",
        }
    }
}

/// Open confidence interval in which predictions count as ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbiguityBand {
    pub lower: f64,
    pub upper: f64,
}

impl AmbiguityBand {
    /// Create a band, checking `0 <= lower < upper <= 100`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        let band = Self { lower, upper };
        band.validate()?;
        Ok(band)
    }

    /// Check the band bounds.
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.lower) || !in_range(self.upper) || self.lower >= self.upper {
            return Err(ApprovalError::Config(format!(
                "Ambiguity band ({}, {}) must satisfy 0 <= lower < upper <= 100",
                self.lower, self.upper
            )));
        }
        Ok(())
    }

    /// Whether `confidence` lies strictly inside the band.
    pub fn contains(&self, confidence: f64) -> bool {
        self.lower < confidence && confidence < self.upper
    }
}

impl Default for AmbiguityBand {
    fn default() -> Self {
        Self {
            lower: 40.0,
            upper: 60.0,
        }
    }
}

/// A scored request awaiting an operator decision.
///
/// Fields are fixed once the scorer has annotated the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    features: Features,
    suggestion: Suggestion,
    confidence: f64,
    recommendation: Recommendation,
}

impl Item {
    /// Annotate a request with the scorer's verdict.
    pub fn annotate(
        request: Request,
        suggestion: Suggestion,
        confidence: f64,
        band: &AmbiguityBand,
    ) -> Self {
        Self {
            id: request.id,
            features: request.features,
            suggestion,
            confidence,
            recommendation: Recommendation::derive(suggestion, confidence, band),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn suggestion(&self) -> Suggestion {
        self.suggestion
    }

    /// Probability of approval, as a percentage.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    /// Check the fields a queue relies on, including that the recommendation
    /// is the one `band` derives.
    pub(crate) fn validate(&self, band: &AmbiguityBand) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ApprovalError::InvalidBatch(
                "Item has a blank id".to_string(),
            ));
        }
        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(ApprovalError::InvalidBatch(format!(
                "Item '{}' has confidence {} outside [0, 100]",
                self.id, self.confidence
            )));
        }
        let expected = Recommendation::derive(self.suggestion, self.confidence, band);
        if self.recommendation != expected {
            return Err(ApprovalError::InvalidBatch(format!(
                "Item '{}' recommends {} but {} at {:.1}% derives {}",
                self.id,
                self.recommendation.label(),
                self.suggestion.label(),
                self.confidence,
                expected.label()
            )));
        }
        Ok(())
    }
}
