//! Atomic write units and the batched bulk writer

mod unit;
mod writer;

pub use unit::{StagedWrite, WriteUnit};
pub use writer::{BatchWriter, MAX_WRITES_PER_COMMIT, WriteOutcome};
