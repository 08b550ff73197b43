//! Operator decisions on review items.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three verbs available to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Approved,
    Rejected,
    ManualReview,
}

impl Action {
    /// All actions, in display order.
    pub const ALL: [Action; 3] = [Action::Approved, Action::Rejected, Action::ManualReview];

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Approved => "Approved",
            Action::Rejected => "Rejected",
            Action::ManualReview => "Manual Review",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "a" | "approve" | "approved" => Ok(Action::Approved),
            "r" | "reject" | "rejected" => Ok(Action::Rejected),
            "m" | "manual" | "manual_review" | "review" => Ok(Action::ManualReview),
            _ => Err(format!(
                "Unknown action: {}. Use approve, reject, or manual.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A recorded resolution of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// ID of the item this decision resolves.
    pub item_id: String,

    /// What the operator chose.
    pub action: Action,

    /// When the decision was made.
    pub decided_at: DateTime<Utc>,

    /// Who made the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
}

impl Decision {
    /// Create a decision stamped with the current time.
    pub fn new(item_id: impl Into<String>, action: Action) -> Self {
        Self {
            item_id: item_id.into(),
            action,
            decided_at: Utc::now(),
            decided_by: None,
        }
    }

    /// Set who made the decision.
    pub fn with_decided_by(mut self, by: impl Into<String>) -> Self {
        self.decided_by = Some(by.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_aliases() {
        assert_eq!("a".parse::<Action>().unwrap(), Action::Approved);
        assert_eq!("Approve".parse::<Action>().unwrap(), Action::Approved);
        assert_eq!("rejected".parse::<Action>().unwrap(), Action::Rejected);
        assert_eq!("Manual Review".parse::<Action>().unwrap(), Action::ManualReview);
        assert_eq!("manual-review".parse::<Action>().unwrap(), Action::ManualReview);
        assert!("escalate".parse::<Action>().is_err());
    }

    #[test]
    fn test_new_decision() {
        let before = Utc::now();
        let dec = Decision::new("INV-1000", Action::Rejected).with_decided_by("admin");

        assert_eq!(dec.item_id, "INV-1000");
        assert_eq!(dec.action, Action::Rejected);
        assert!(dec.decided_at >= before);
        assert_eq!(dec.decided_by.as_deref(), Some("admin"));
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&Action::ManualReview).unwrap();
        assert_eq!(json, "\"manual_review\"");
    }
}
