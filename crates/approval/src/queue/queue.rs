//! The decision queue state machine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApprovalError, Result};

use super::decision::{Action, Decision};
use super::item::{AmbiguityBand, Item};

/// What the queue is waiting on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Current<'a> {
    /// The item at the cursor.
    Item(&'a Item),
    /// Every item has a decision.
    Terminal,
}

impl<'a> Current<'a> {
    /// The current item, if any.
    pub fn item(self) -> Option<&'a Item> {
        match self {
            Current::Item(item) => Some(item),
            Current::Terminal => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Current::Terminal)
    }
}

/// Counts of decisions by action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub approved: usize,
    pub rejected: usize,
    pub manual_review: usize,
}

impl Summary {
    /// Tally a sequence of decisions.
    pub fn from_decisions<'a>(decisions: impl IntoIterator<Item = &'a Decision>) -> Self {
        let mut summary = Self::default();
        for decision in decisions {
            match decision.action {
                Action::Approved => summary.approved += 1,
                Action::Rejected => summary.rejected += 1,
                Action::ManualReview => summary.manual_review += 1,
            }
        }
        summary
    }

    /// Number of decisions with the given action.
    pub fn count(&self, action: Action) -> usize {
        match action {
            Action::Approved => self.approved,
            Action::Rejected => self.rejected,
            Action::ManualReview => self.manual_review,
        }
    }

    /// Total number of decisions.
    pub fn total(&self) -> usize {
        self.approved + self.rejected + self.manual_review
    }
}

/// Plain `(band, items, decisions)` record used to rebuild a queue.
#[derive(Deserialize)]
pub(super) struct QueueSnapshot {
    band: AmbiguityBand,
    items: Vec<Item>,
    #[serde(default)]
    decisions: Vec<Decision>,
}

impl TryFrom<QueueSnapshot> for DecisionQueue {
    type Error = ApprovalError;

    fn try_from(snapshot: QueueSnapshot) -> Result<Self> {
        DecisionQueue::from_parts(snapshot.band, snapshot.items, snapshot.decisions)
    }
}

/// Ordered, exactly-once review of a fixed batch of items.
///
/// `decisions[i]` always resolves `items[i]`; the cursor is
/// `decisions.len()` and is never stored separately. Every item's
/// recommendation agrees with `band`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueueSnapshot")]
pub struct DecisionQueue {
    band: AmbiguityBand,
    items: Vec<Item>,
    decisions: Vec<Decision>,
}

impl DecisionQueue {
    /// Create a queue over items scored with the default band.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        Self::with_band(items, AmbiguityBand::default())
    }

    /// Create a queue over a non-empty batch of items scored with `band`.
    pub fn with_band(items: Vec<Item>, band: AmbiguityBand) -> Result<Self> {
        Self::from_parts(band, items, Vec::new())
    }

    /// Rebuild a queue from its band, items and the decisions recorded so far.
    ///
    /// The decisions must resolve a prefix of `items`, in order.
    pub fn from_parts(band: AmbiguityBand, items: Vec<Item>, decisions: Vec<Decision>) -> Result<Self> {
        band.validate()
            .map_err(|e| ApprovalError::InvalidBatch(e.to_string()))?;
        validate_items(&items, &band)?;

        if decisions.len() > items.len() {
            return Err(ApprovalError::InvalidBatch(format!(
                "{} decisions recorded for {} items",
                decisions.len(),
                items.len()
            )));
        }

        for (position, (item, decision)) in items.iter().zip(&decisions).enumerate() {
            if decision.item_id != item.id() {
                return Err(ApprovalError::InvalidBatch(format!(
                    "Decision {} resolves '{}' but item {} is '{}'",
                    position + 1,
                    decision.item_id,
                    position + 1,
                    item.id()
                )));
            }
        }

        Ok(Self {
            band,
            items,
            decisions,
        })
    }

    /// The item awaiting a decision, or the terminal marker.
    pub fn current(&self) -> Current<'_> {
        match self.items.get(self.cursor()) {
            Some(item) => Current::Item(item),
            None => Current::Terminal,
        }
    }

    /// Record a decision for the current item.
    pub fn decide(&mut self, item_id: &str, action: Action) -> Result<&Decision> {
        self.record(Decision::new(item_id, action))
    }

    /// Record a decision for the current item on behalf of an operator.
    pub fn decide_as(&mut self, item_id: &str, action: Action, operator: &str) -> Result<&Decision> {
        self.record(Decision::new(item_id, action).with_decided_by(operator))
    }

    /// Counts per action. Only available once every item is decided.
    pub fn summary(&self) -> Result<Summary> {
        self.ensure_terminal()?;
        Ok(Summary::from_decisions(&self.decisions))
    }

    /// Every item paired with its decision, in item order.
    pub fn merged_results(&self) -> Result<Vec<(&Item, &Decision)>> {
        self.ensure_terminal()?;
        Ok(self.items.iter().zip(&self.decisions).collect())
    }

    /// Counts over the decisions recorded so far.
    pub fn partial_summary(&self) -> Summary {
        Summary::from_decisions(&self.decisions)
    }

    /// Index of the next item to decide.
    pub fn cursor(&self) -> usize {
        self.decisions.len()
    }

    /// `(decided, total)`.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor(), self.items.len())
    }

    /// Fraction of items decided (0.0 to 1.0).
    pub fn progress(&self) -> f64 {
        self.cursor() as f64 / self.items.len() as f64
    }

    pub fn is_terminal(&self) -> bool {
        self.cursor() == self.items.len()
    }

    /// The band the items were scored with.
    pub fn band(&self) -> &AmbiguityBand {
        &self.band
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id() == item_id)
    }

    // Helper methods

    fn record(&mut self, decision: Decision) -> Result<&Decision> {
        let expected = match self.current() {
            Current::Item(item) => item.id(),
            Current::Terminal => return Err(ApprovalError::QueueExhausted),
        };

        if decision.item_id != expected {
            return Err(ApprovalError::OutOfOrderDecision {
                expected: expected.to_string(),
                received: decision.item_id,
            });
        }

        debug!(item = %decision.item_id, action = %decision.action, "recorded decision");
        self.decisions.push(decision);

        if self.is_terminal() {
            info!(items = self.items.len(), "decision queue complete");
        }

        let index = self.decisions.len() - 1;
        Ok(&self.decisions[index])
    }

    fn ensure_terminal(&self) -> Result<()> {
        if !self.is_terminal() {
            return Err(ApprovalError::QueueNotComplete {
                decided: self.cursor(),
                total: self.items.len(),
            });
        }
        Ok(())
    }
}

fn validate_items(items: &[Item], band: &AmbiguityBand) -> Result<()> {
    if items.is_empty() {
        return Err(ApprovalError::InvalidBatch(
            "A review batch needs at least one item".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        item.validate(band)?;
        if !seen.insert(item.id()) {
            return Err(ApprovalError::InvalidBatch(format!(
                "Duplicate item id '{}'",
                item.id()
            )));
        }
    }
    Ok(())
}
