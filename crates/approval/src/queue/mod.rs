//! The decision queue: strictly sequential, exactly-once review of a batch.
//!
//! A queue owns an ordered batch of scored [`Item`]s and the append-only list
//! of operator [`Decision`]s. The cursor is always `decisions.len()`, so the
//! whole state can be rebuilt from the band the items were scored with plus
//! `(items, decisions)`.
//!
//! # Usage
//!
//! ```no_run
//! use approval::queue::{Action, Current, DecisionQueue};
//! # fn example(items: Vec<approval::queue::Item>) -> approval::Result<()> {
//! let mut queue = DecisionQueue::new(items)?;
//!
//! while let Current::Item(item) = queue.current() {
//!     let id = item.id().to_string();
//!     queue.decide(&id, Action::Approved)?;
//!     queue.save("results/queue.snapshot.json")?;
//! }
//!
//! println!("{:?}", queue.summary()?);
//! # Ok(())
//! # }
//! ```

mod decision;
mod item;
mod queue;
mod snapshot;

pub use decision::{Action, Decision};
pub use item::{AmbiguityBand, Item, Recommendation, Suggestion};
pub use queue::{Current, DecisionQueue, Summary};
