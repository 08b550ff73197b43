//! Snapshot persistence so an interrupted review can resume.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{ApprovalError, Result};

use super::queue::{DecisionQueue, QueueSnapshot};

impl DecisionQueue {
    /// Save the queue as a JSON snapshot of `{band, items, decisions}`.
    ///
    /// The snapshot is written to a sibling temp file and renamed over the
    /// target, so a crash never leaves a half-written snapshot behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    ApprovalError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(|e| {
            ApprovalError::Persistence(format!(
                "Failed to create file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            ApprovalError::Persistence(format!("Failed to serialize queue snapshot: {}", e))
        })?;
        writer
            .flush()
            .map_err(|e| ApprovalError::io(&tmp_path, e))?;
        drop(writer);

        fs::rename(&tmp_path, path).map_err(|e| {
            ApprovalError::Persistence(format!(
                "Failed to move snapshot into place at '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), decided = self.cursor(), "saved queue snapshot");
        Ok(())
    }

    /// Load a queue from a snapshot, re-checking every queue invariant.
    ///
    /// Unreadable or malformed files fail with `Persistence`; a well-formed
    /// snapshot that breaks a queue invariant fails with `InvalidBatch`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            ApprovalError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let snapshot: QueueSnapshot = serde_json::from_reader(reader).map_err(|e| {
            ApprovalError::Persistence(format!(
                "Failed to parse queue snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;

        DecisionQueue::try_from(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{Action, AmbiguityBand, Item, Suggestion};
    use crate::request::{Features, Request, AMOUNT};
    use tempfile::TempDir;

    fn queue() -> DecisionQueue {
        let items = ["A", "B", "C"]
            .iter()
            .map(|id| {
                Item::annotate(
                    Request::new(*id, Features::new()).with_feature(AMOUNT, 500.0),
                    Suggestion::Reject,
                    22.5,
                    &AmbiguityBand::default(),
                )
            })
            .collect();
        DecisionQueue::new(items).unwrap()
    }

    #[test]
    fn test_resume_from_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("queue.snapshot.json");

        let mut original = queue();
        original.decide("A", Action::Approved).unwrap();
        original.save(&path).unwrap();

        let mut resumed = DecisionQueue::load(&path).unwrap();
        assert_eq!(resumed, original);
        assert_eq!(resumed.cursor(), 1);
        assert_eq!(resumed.current().item().map(Item::id), Some("B"));

        assert!(resumed.decide("A", Action::Approved).is_err());
        resumed.decide("B", Action::Rejected).unwrap();
    }

    #[test]
    fn test_tampered_snapshot_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queue.snapshot.json");

        let mut original = queue();
        original.decide("A", Action::Approved).unwrap();
        original.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let tampered = text.replace("\"item_id\": \"A\"", "\"item_id\": \"C\"");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            DecisionQueue::load(&path),
            Err(ApprovalError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_tampered_recommendation_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queue.snapshot.json");
        queue().save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let tampered = text.replacen("\"recommendation\": \"reject\"", "\"recommendation\": \"approve\"", 1);
        assert_ne!(tampered, text);
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            DecisionQueue::load(&path),
            Err(ApprovalError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_snapshot_records_band() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queue.snapshot.json");
        let narrow = AmbiguityBand::new(30.0, 70.0).unwrap();
        let items = vec![Item::annotate(
            Request::new("A", Features::new()),
            Suggestion::Approve,
            65.0,
            &narrow,
        )];
        DecisionQueue::with_band(items, narrow).unwrap().save(&path).unwrap();

        let resumed = DecisionQueue::load(&path).unwrap();
        assert_eq!(resumed.band(), &narrow);

        let text = fs::read_to_string(&path).unwrap();
        let widened = text.replacen("\"upper\": 70.0", "\"upper\": 60.0", 1);
        fs::write(&path, widened).unwrap();
        assert!(matches!(
            DecisionQueue::load(&path),
            Err(ApprovalError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_malformed_snapshot_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queue.snapshot.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            DecisionQueue::load(&path),
            Err(ApprovalError::Persistence(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(DecisionQueue::load(dir.path().join("nope.json")).is_err());
    }
}
