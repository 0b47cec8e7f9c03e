//! Failed-attempt tracking entities used by the rate limiter.

pub mod model;

pub use model::{AttemptKey, AttemptOperation, AttemptOutcome, AttemptRecord};
