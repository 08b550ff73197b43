//! Integration tests for the review workflow: generate, score, decide, persist.

use std::fs;

use tempfile::TempDir;

use approval::queue::{AmbiguityBand, Current};
use approval::request::{read_requests, write_requests, IdScheme, AMOUNT};
use approval::scoring::{train, TrainingConfig};
use approval::sink::{write_scored, FileResultSink, ResultSink};
use approval::{
    Action, ApprovalError, ApprovalModel, Batch, DecisionQueue, MockScorer, PortalConfig,
    Prediction, Recommendation, RequestGenerator, Summary,
};

/// Score a seeded batch with a scripted scorer.
fn scored_batch(count: usize) -> Batch {
    let mut generator = RequestGenerator::with_seed(2024);
    let mut batch = Batch::generate(&mut generator, count).expect("generation failed");
    let scorer = MockScorer::scripted(vec![
        Prediction::from_probability(0.91),
        Prediction::from_probability(0.55),
        Prediction::from_probability(0.12),
    ]);
    batch
        .score(&scorer, &AmbiguityBand::default())
        .expect("scoring failed");
    batch
}

/// Decide every remaining item with a rotating action.
fn decide_all(queue: &mut DecisionQueue) {
    let mut round = 0;
    while let Current::Item(item) = queue.current() {
        let id = item.id().to_string();
        let action = Action::ALL[round % Action::ALL.len()];
        queue.decide(&id, action).expect("in-order decision failed");
        round += 1;
    }
}

// =============================================================================
// End-to-end review
// =============================================================================

#[test]
fn test_full_review_cycle() {
    let dir = TempDir::new().unwrap();
    let mut batch = scored_batch(6);
    let queue = batch.queue_mut().unwrap();

    decide_all(queue);

    let summary = queue.summary().unwrap();
    assert_eq!(summary.total(), 6);
    assert_eq!(
        summary,
        Summary {
            approved: 2,
            rejected: 2,
            manual_review: 2
        }
    );

    let path = FileResultSink::new(dir.path()).persist(queue).unwrap();
    let text = fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().count(), 7);
}

#[test]
fn test_recommendations_follow_scores() {
    let batch = scored_batch(3);
    let items = batch.queue().unwrap().items();

    assert_eq!(items[0].recommendation(), Recommendation::Approve);
    assert_eq!(items[1].recommendation(), Recommendation::ManualReview);
    assert_eq!(items[2].recommendation(), Recommendation::Reject);
}

#[test]
fn test_merged_results_follow_item_order() {
    let mut batch = scored_batch(5);
    let expected: Vec<String> = batch.requests().iter().map(|r| r.id.clone()).collect();

    let queue = batch.queue_mut().unwrap();
    decide_all(queue);

    let merged = queue.merged_results().unwrap();
    let ids: Vec<String> = merged.iter().map(|(item, _)| item.id().to_string()).collect();
    assert_eq!(ids, expected);
    for (item, decision) in merged {
        assert_eq!(item.id(), decision.item_id);
    }
}

#[test]
fn test_second_decision_is_never_recorded() {
    let mut batch = scored_batch(3);
    let queue = batch.queue_mut().unwrap();
    let ids: Vec<String> = queue.items().iter().map(|i| i.id().to_string()).collect();

    for (idx, id) in ids.iter().enumerate() {
        queue.decide(id, Action::Rejected).unwrap();
        let again = queue.decide(id, Action::Approved);
        if idx + 1 == ids.len() {
            assert!(matches!(again, Err(ApprovalError::QueueExhausted)));
        } else {
            assert!(matches!(again, Err(ApprovalError::OutOfOrderDecision { .. })));
        }
    }

    assert_eq!(queue.decisions().len(), 3);
    assert!(queue.decisions().iter().all(|d| d.action == Action::Rejected));
}

// =============================================================================
// Resume
// =============================================================================

#[test]
fn test_resume_after_interruption() {
    let dir = TempDir::new().unwrap();
    let config = PortalConfig {
        snapshot_path: dir.path().join("queue.snapshot.json"),
        ..PortalConfig::default()
    };

    let mut batch = scored_batch(4);
    {
        let queue = batch.queue_mut().unwrap();
        let first = queue.current().item().unwrap().id().to_string();
        queue.decide(&first, Action::Approved).unwrap();
        queue.save(&config.snapshot_path).unwrap();
    }

    let restored = DecisionQueue::load(&config.snapshot_path).unwrap();
    let mut resumed = Batch::from_queue(restored);
    assert_eq!(resumed.requests(), batch.requests());

    let queue = resumed.queue_mut().unwrap();
    assert_eq!(queue.position(), (1, 4));
    decide_all(queue);
    assert_eq!(queue.summary().unwrap().total(), 4);
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_request_file_feeds_a_batch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("requests.csv");
    let requests = RequestGenerator::with_seed(9)
        .with_id_scheme(IdScheme::sequential())
        .generate(10)
        .unwrap();
    write_requests(&path, &requests).unwrap();

    let batch = Batch::new(read_requests(&path).unwrap()).unwrap();
    assert_eq!(batch.requests().len(), 10);
    assert_eq!(batch.requests()[0].id, "REQ-1000");
    assert!(batch.requests()[0].feature(AMOUNT).is_some());
}

#[test]
fn test_scored_export() {
    let dir = TempDir::new().unwrap();
    let config = PortalConfig {
        results_dir: dir.path().join("results"),
        ..PortalConfig::default()
    };
    let batch = scored_batch(3);

    write_scored(config.scored_export_path(), batch.queue().unwrap().items()).unwrap();

    let text = fs::read_to_string(config.scored_export_path()).unwrap();
    assert!(text.lines().nth(2).unwrap().ends_with("55,Approve,Manual Review"));
}

// =============================================================================
// Trained model
// =============================================================================

#[test]
fn test_trained_model_scores_a_batch() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("approval_model.json");

    let outcome = train(&TrainingConfig {
        samples: 800,
        epochs: 150,
        ..TrainingConfig::default()
    })
    .unwrap();
    outcome.model.save(&model_path).unwrap();
    let model = ApprovalModel::load(&model_path).unwrap();

    let mut batch = Batch::generate(&mut RequestGenerator::with_seed(77), 12).unwrap();
    let items = batch.score(&model, &AmbiguityBand::default()).unwrap();

    assert_eq!(items.len(), 12);
    assert!(items
        .iter()
        .all(|i| (0.0..=100.0).contains(&i.confidence())));
}
