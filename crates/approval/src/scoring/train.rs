//! Offline training of the approval model on synthetic labeled data.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApprovalError, Result};
use crate::request::{Features, AMOUNT, CUSTOMER_SCORE, URGENCY};

use super::model::{sigmoid, ApprovalModel};

/// Training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of synthetic samples to draw.
    pub samples: usize,
    /// Seed for sampling and the train/test shuffle.
    pub seed: u64,
    /// Fraction of samples held out for evaluation.
    pub test_fraction: f64,
    /// Gradient descent passes over the training set.
    pub epochs: usize,
    /// Gradient descent step size.
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 2500,
            seed: 42,
            test_fraction: 0.2,
            epochs: 400,
            learning_rate: 0.5,
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ApprovalError::Config(format!(
                "test_fraction {} must be between 0 and 1",
                self.test_fraction
            )));
        }
        if self.samples < 10 {
            return Err(ApprovalError::Config(format!(
                "Need at least 10 samples, got {}",
                self.samples
            )));
        }
        if self.epochs == 0 || !(self.learning_rate > 0.0) {
            return Err(ApprovalError::Config(
                "epochs and learning_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One labeled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Features,
    pub approved: bool,
}

/// Draw synthetic labeled requests.
///
/// Approval probability starts at 0.65 and is pushed up for small amounts,
/// good customer scores and low urgency (and down for the opposite), with a
/// little gaussian noise, then clipped to [0, 1].
pub fn synthetic_samples(count: usize, seed: u64) -> Vec<Sample> {
    let mut rng = fastrand::Rng::with_seed(seed);

    (0..count)
        .map(|_| {
            let amount = rng.u32(100..=2000) as f64;
            let customer_score = rng.u32(1..=10) as f64;
            let urgency = rng.u32(1..=5) as f64;

            let mut probability = 0.65;

            if amount < 700.0 {
                probability += 0.25;
            } else if amount > 1500.0 {
                probability -= 0.25;
            }

            if customer_score >= 7.0 {
                probability += 0.25;
            } else if customer_score <= 3.0 {
                probability -= 0.25;
            }

            if urgency <= 2.0 {
                probability += 0.1;
            } else if urgency >= 4.0 {
                probability -= 0.15;
            }

            probability += 0.05 * standard_normal(&mut rng);
            let probability = probability.clamp(0.0, 1.0);

            let mut features = Features::new();
            features.insert(AMOUNT.to_string(), amount);
            features.insert(CUSTOMER_SCORE.to_string(), customer_score);
            features.insert(URGENCY.to_string(), urgency);

            Sample {
                features,
                approved: rng.f64() < probability,
            }
        })
        .collect()
}

/// Precision/recall figures for one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub support: usize,
}

impl ClassificationReport {
    /// Build a report from `(actual, predicted)` pairs.
    pub fn from_pairs(pairs: &[(bool, bool)]) -> Self {
        let classes = [("Reject", false), ("Approve", true)]
            .iter()
            .map(|(label, class)| {
                let tp = pairs.iter().filter(|(a, p)| a == class && p == class).count();
                let predicted = pairs.iter().filter(|(_, p)| p == class).count();
                let actual = pairs.iter().filter(|(a, _)| a == class).count();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, actual);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: actual,
                }
            })
            .collect();

        let correct = pairs.iter().filter(|(a, p)| a == p).count();

        Self {
            classes,
            accuracy: ratio(correct, pairs.len()),
            support: pairs.len(),
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class.label, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )
    }
}

/// A trained model with its evaluation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ApprovalModel,
    pub report: ClassificationReport,
    pub train_size: usize,
    pub test_size: usize,
}

/// Train an approval model on synthetic data and evaluate it on a held-out split.
pub fn train(config: &TrainingConfig) -> Result<TrainingOutcome> {
    config.validate()?;

    let mut samples = synthetic_samples(config.samples, config.seed);
    let mut rng = fastrand::Rng::with_seed(config.seed);
    rng.shuffle(&mut samples);

    let test_size = ((config.samples as f64) * config.test_fraction).round() as usize;
    let test_size = test_size.clamp(1, config.samples - 1);
    let (test, training) = samples.split_at(test_size);

    let names = vec![
        AMOUNT.to_string(),
        CUSTOMER_SCORE.to_string(),
        URGENCY.to_string(),
    ];
    let rows: Vec<Vec<f64>> = training
        .iter()
        .map(|s| names.iter().map(|n| s.features[n.as_str()]).collect())
        .collect();
    let labels: Vec<f64> = training
        .iter()
        .map(|s| if s.approved { 1.0 } else { 0.0 })
        .collect();

    let (means, scales) = standardization(&rows, names.len());
    let standardized: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, v)| (v - means[j]) / scales[j])
                .collect()
        })
        .collect();

    let n = standardized.len() as f64;
    let mut weights = vec![0.0; names.len()];
    let mut bias = 0.0;

    for epoch in 0..config.epochs {
        let mut grad_w = vec![0.0; names.len()];
        let mut grad_b = 0.0;

        for (row, label) in standardized.iter().zip(&labels) {
            let z = bias + row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>();
            let error = sigmoid(z) - label;
            for (g, x) in grad_w.iter_mut().zip(row) {
                *g += error * x;
            }
            grad_b += error;
        }

        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= config.learning_rate * g / n;
        }
        bias -= config.learning_rate * grad_b / n;

        if epoch % 100 == 0 {
            debug!(epoch, bias, "training step");
        }
    }

    let model = ApprovalModel::new(names, means, scales, weights, bias)?;

    let pairs = test
        .iter()
        .map(|s| Ok((s.approved, model.probability(&s.features)? > 0.5)))
        .collect::<Result<Vec<_>>>()?;
    let report = ClassificationReport::from_pairs(&pairs);

    info!(
        train = training.len(),
        test = test.len(),
        accuracy = report.accuracy,
        "trained approval model"
    );

    Ok(TrainingOutcome {
        model,
        report,
        train_size: training.len(),
        test_size: test.len(),
    })
}

/// Per-column mean and (population) standard deviation; zero spread maps to 1.
fn standardization(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let means: Vec<f64> = (0..width)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
        .collect();
    let scales = (0..width)
        .map(|j| {
            let var = rows.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            if std > 0.0 { std } else { 1.0 }
        })
        .collect();
    (means, scales)
}

/// Box-Muller draw from N(0, 1).
fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            samples: 1500,
            epochs: 200,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_synthetic_samples_are_seeded() {
        assert_eq!(synthetic_samples(50, 42), synthetic_samples(50, 42));
        assert_ne!(synthetic_samples(50, 42), synthetic_samples(50, 43));
    }

    #[test]
    fn test_training_learns_signal_direction() {
        let outcome = train(&quick_config()).unwrap();
        let w = &outcome.model.weights;

        assert!(w[0] < 0.0, "larger amounts should lower approval");
        assert!(w[1] > 0.0, "better customers should raise approval");
        assert!(w[2] < 0.0, "higher urgency should lower approval");
        assert!(outcome.report.accuracy > 0.6);
        assert_eq!(outcome.train_size + outcome.test_size, 1500);
        assert_eq!(outcome.test_size, 300);
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = train(&quick_config()).unwrap();
        let b = train(&quick_config()).unwrap();
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn test_invalid_config() {
        let config = TrainingConfig {
            test_fraction: 1.5,
            ..TrainingConfig::default()
        };
        assert!(matches!(train(&config), Err(ApprovalError::Config(_))));
    }

    #[test]
    fn test_report_metrics() {
        let pairs = [(true, true), (true, false), (false, false), (false, false)];
        let report = ClassificationReport::from_pairs(&pairs);

        assert!((report.accuracy - 0.75).abs() < 1e-9);
        let approve = &report.classes[1];
        assert_eq!(approve.support, 2);
        assert!((approve.precision - 1.0).abs() < 1e-9);
        assert!((approve.recall - 0.5).abs() < 1e-9);
        assert!(report.to_string().contains("accuracy"));
    }
}
