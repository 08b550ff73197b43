//! Fuzz target for queue snapshots.
//!
//! Any snapshot that decodes must describe a consistent queue: decisions form
//! an in-order prefix of the items.

#![no_main]

use libfuzzer_sys::fuzz_target;
use approval::DecisionQueue;

fuzz_target!(|data: &[u8]| {
    if let Ok(queue) = serde_json::from_slice::<DecisionQueue>(data) {
        assert!(queue.cursor() <= queue.len());
        for (item, decision) in queue.items().iter().zip(queue.decisions()) {
            assert_eq!(item.id(), decision.item_id);
        }
        assert_eq!(queue.is_terminal(), queue.summary().is_ok());
    }
});
