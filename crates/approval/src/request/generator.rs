//! Synthetic request generation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ApprovalError, Result};

use super::request::{Features, Request, AMOUNT, CUSTOMER_SCORE, URGENCY};

/// Number of requests in a freshly generated review batch.
pub const DEFAULT_BATCH_SIZE: usize = 12;

const INVOICE_MIN: u32 = 1000;
const INVOICE_MAX: u32 = 9999;

/// How request identifiers are assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdScheme {
    /// Random `INV-nnnn` identifiers, unique within a batch.
    #[default]
    Invoice,
    /// Consecutive identifiers such as `REQ-1000`, `REQ-1001`, ...
    Sequential { prefix: String, start: u64 },
}

impl IdScheme {
    /// Sequential `REQ-` identifiers starting at 1000.
    pub fn sequential() -> Self {
        IdScheme::Sequential {
            prefix: "REQ".to_string(),
            start: 1000,
        }
    }
}

/// Generates batches of synthetic pending requests.
pub struct RequestGenerator {
    rng: fastrand::Rng,
    id_scheme: IdScheme,
}

impl RequestGenerator {
    /// Create a generator with a random seed.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            id_scheme: IdScheme::default(),
        }
    }

    /// Create a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            id_scheme: IdScheme::default(),
        }
    }

    /// Set the identifier scheme.
    pub fn with_id_scheme(mut self, id_scheme: IdScheme) -> Self {
        self.id_scheme = id_scheme;
        self
    }

    /// Generate `count` requests with unique ids.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Request>> {
        if count == 0 {
            return Err(ApprovalError::InvalidBatch(
                "Cannot generate an empty batch".to_string(),
            ));
        }

        let ids = match &self.id_scheme {
            IdScheme::Invoice => self.invoice_ids(count)?,
            IdScheme::Sequential { prefix, start } => (0..count as u64)
                .map(|i| format!("{}-{}", prefix, start + i))
                .collect(),
        };

        let requests: Vec<Request> = ids
            .into_iter()
            .map(|id| {
                let mut features = Features::new();
                features.insert(AMOUNT.to_string(), self.rng.u32(100..=2000) as f64);
                features.insert(CUSTOMER_SCORE.to_string(), self.rng.u32(1..=10) as f64);
                features.insert(URGENCY.to_string(), self.rng.u32(1..=5) as f64);
                Request::new(id, features)
            })
            .collect();

        debug!(count = requests.len(), "generated pending requests");
        Ok(requests)
    }

    fn invoice_ids(&mut self, count: usize) -> Result<Vec<String>> {
        let capacity = (INVOICE_MAX - INVOICE_MIN + 1) as usize;
        if count > capacity {
            return Err(ApprovalError::InvalidBatch(format!(
                "Cannot draw {} unique invoice ids (at most {})",
                count, capacity
            )));
        }

        let mut seen = HashSet::with_capacity(count);
        let mut ids = Vec::with_capacity(count);
        while ids.len() < count {
            let number = self.rng.u32(INVOICE_MIN..=INVOICE_MAX);
            if seen.insert(number) {
                ids.push(format!("INV-{}", number));
            }
        }
        Ok(ids)
    }
}

impl Default for RequestGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_feature_bounds() {
        let mut generator = RequestGenerator::with_seed(7);
        let requests = generator.generate(200).unwrap();

        assert_eq!(requests.len(), 200);
        for req in &requests {
            let amount = req.feature(AMOUNT).unwrap();
            let score = req.feature(CUSTOMER_SCORE).unwrap();
            let urgency = req.feature(URGENCY).unwrap();
            assert!((100.0..=2000.0).contains(&amount));
            assert!((1.0..=10.0).contains(&score));
            assert!((1.0..=5.0).contains(&urgency));
        }
    }

    #[test]
    fn test_invoice_ids_unique() {
        let mut generator = RequestGenerator::with_seed(1);
        let requests = generator.generate(5000).unwrap();

        let ids: HashSet<_> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 5000);
        assert!(requests.iter().all(|r| r.id.starts_with("INV-")));
    }

    #[test]
    fn test_invoice_capacity_exceeded() {
        let mut generator = RequestGenerator::with_seed(1);
        let result = generator.generate(9001);
        assert!(matches!(result, Err(ApprovalError::InvalidBatch(_))));
    }

    #[test]
    fn test_sequential_ids() {
        let mut generator = RequestGenerator::with_seed(3).with_id_scheme(IdScheme::sequential());
        let requests = generator.generate(3).unwrap();

        let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["REQ-1000", "REQ-1001", "REQ-1002"]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut generator = RequestGenerator::new();
        assert!(matches!(
            generator.generate(0),
            Err(ApprovalError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = RequestGenerator::with_seed(42).generate(10).unwrap();
        let b = RequestGenerator::with_seed(42).generate(10).unwrap();
        assert_eq!(a, b);
    }
}
