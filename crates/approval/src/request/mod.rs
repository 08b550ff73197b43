//! Pending requests: the raw, un-scored input of a review batch.

mod file;
mod generator;
mod request;

pub use file::{read_requests, write_requests};
pub use generator::{IdScheme, RequestGenerator, DEFAULT_BATCH_SIZE};
pub use request::{Features, Request, AMOUNT, CUSTOMER_SCORE, URGENCY};

pub(crate) use request::format_value;
