//! Mock Deadline Implementation
//!
//! An in-process Deadline Web Service for tests and dry runs. It accepts
//! job submissions, assigns ids and keeps every payload for inspection.

mod deadline;

pub use deadline::{MockDeadline, MockJob};
