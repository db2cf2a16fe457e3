//! Deadline Web Service Job Types
//!
//! Defines the JSON body posted to `/api/jobs` and the response the
//! service sends back.

pub mod job_info;
pub mod payload;
pub mod plugin_info;
pub mod response;

pub use job_info::{JobInfo, JobType};
pub use payload::JobPayload;
pub use plugin_info::PluginInfo;
pub use response::{ResponseError, SubmissionResponse};

/// Path of the job submission endpoint, relative to the web service root.
pub const JOBS_ENDPOINT: &str = "/api/jobs";

/// Chunk size forcing a whole frame range into one task.
pub const SINGLE_CHUNK: u32 = 99_999_999;
