//! The built-in approval classifier and its JSON model file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{ApprovalError, Result};
use crate::request::Features;

use super::scorer::{Prediction, Scorer};

/// Version of the model file format.
pub const MODEL_FORMAT_VERSION: &str = "1.0.0";

/// Logistic-regression classifier over standardized named features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalModel {
    /// Version of the model file format.
    pub format_version: String,

    /// Feature names, in weight order.
    pub features: Vec<String>,

    /// Per-feature mean used for standardization.
    pub means: Vec<f64>,

    /// Per-feature standard deviation used for standardization.
    pub scales: Vec<f64>,

    /// Per-feature weights.
    pub weights: Vec<f64>,

    /// Intercept.
    pub bias: f64,

    /// SHA-256 of the file the model was loaded from.
    #[serde(skip)]
    pub fingerprint: Option<String>,
}

impl ApprovalModel {
    /// Create a model, checking that every per-feature vector lines up.
    pub fn new(
        features: Vec<String>,
        means: Vec<f64>,
        scales: Vec<f64>,
        weights: Vec<f64>,
        bias: f64,
    ) -> Result<Self> {
        let model = Self {
            format_version: MODEL_FORMAT_VERSION.to_string(),
            features,
            means,
            scales,
            weights,
            bias,
            fingerprint: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Approval probability for a feature vector.
    pub fn probability(&self, features: &Features) -> Result<f64> {
        let mut z = self.bias;
        for (idx, name) in self.features.iter().enumerate() {
            let value = features.get(name).copied().ok_or_else(|| {
                ApprovalError::Model(format!("Missing feature '{}'", name))
            })?;
            z += self.weights[idx] * (value - self.means[idx]) / self.scales[idx];
        }
        Ok(sigmoid(z))
    }

    /// Save the model as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ApprovalError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| ApprovalError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| ApprovalError::io(path, e))?;

        info!(path = %path.display(), "saved approval model");
        Ok(())
    }

    /// Load a model file, recording its SHA-256 fingerprint.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| ApprovalError::io(path, e))?;

        let mut model: ApprovalModel = serde_json::from_slice(&contents).map_err(|e| {
            ApprovalError::Model(format!(
                "Failed to parse model file '{}': {}",
                path.display(),
                e
            ))
        })?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(ApprovalError::Model(format!(
                "Unsupported model format {} (expected {})",
                model.format_version, MODEL_FORMAT_VERSION
            )));
        }
        model.validate()?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        model.fingerprint = Some(format!("sha256:{:x}", hasher.finalize()));

        info!(path = %path.display(), features = model.features.len(), "loaded approval model");
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n = self.features.len();
        if n == 0 {
            return Err(ApprovalError::Model("Model has no features".to_string()));
        }
        if self.means.len() != n || self.scales.len() != n || self.weights.len() != n {
            return Err(ApprovalError::Model(format!(
                "Model vectors disagree: {} features, {} means, {} scales, {} weights",
                n,
                self.means.len(),
                self.scales.len(),
                self.weights.len()
            )));
        }
        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ApprovalError::Model(
                "Feature scales must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Scorer for ApprovalModel {
    fn name(&self) -> &str {
        "approval-model"
    }

    fn predict(&self, features: &Features) -> Result<Prediction> {
        Ok(Prediction::from_probability(self.probability(features)?))
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
