//! Nuke Deadline submitter
//!
//! Turns Nuke write-node publish instances into Deadline render jobs and
//! submits them to the Deadline Web Service. Baking jobs (review movies and
//! other derived renders) are chained behind the main render.

pub mod config;
pub mod environment;
pub mod expected;
pub mod frames;
pub mod host;
pub mod instance;
pub mod job;
pub mod mock;
pub mod pipeline;
pub mod telemetry;
pub mod validate;

pub use config::{EffectiveConfig, NukeSettings, SubmitSettings};
pub use host::{DeadlineClient, HttpTransport, MockTransport, Transport};
pub use instance::{Context, Instance};
pub use job::{JobRequest, PayloadBuilder};
pub use pipeline::{NukeSubmitDeadline, PipelineError, SubmissionOutcome};
