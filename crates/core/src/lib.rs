//! Database-independent pieces of `orderscope`: schema heuristics, row
//! records, report rendering and log redaction.

pub mod discovery;
pub mod error;
pub mod masking;
pub mod record;
pub mod report;

pub use error::CoreError;
