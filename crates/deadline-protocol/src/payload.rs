//! Complete job submission body.

use serde::Serialize;

use crate::job_info::JobInfo;
use crate::plugin_info::PluginInfo;

/// Body of `POST /api/jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPayload {
    #[serde(rename = "JobInfo")]
    pub job_info: JobInfo,
    #[serde(rename = "PluginInfo")]
    pub plugin_info: PluginInfo,
    /// Mandatory for Deadline, may be empty.
    #[serde(rename = "AuxFiles")]
    pub aux_files: Vec<String>,
}

impl JobPayload {
    /// Create a payload without auxiliary files.
    pub fn new(job_info: JobInfo, plugin_info: PluginInfo) -> Self {
        Self {
            job_info,
            plugin_info,
            aux_files: Vec::new(),
        }
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
