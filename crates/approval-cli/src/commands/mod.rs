//! CLI command implementations.

pub mod generate;
pub mod review;
pub mod serve;
pub mod status;
pub mod train;
