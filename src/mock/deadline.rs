//! Mock Deadline Web Service
//!
//! Records every submitted payload and answers like the real `/api/jobs`
//! endpoint.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::host::TransportError;

/// A job accepted by the mock service
#[derive(Debug, Clone)]
pub struct MockJob {
    /// Assigned job id
    pub id: String,
    /// URL the payload was posted to
    pub url: String,
    /// Posted body
    pub payload: Value,
    pub submitted_at: DateTime<Utc>,
}

impl MockJob {
    /// A `JobInfo` value of the posted payload
    pub fn job_info(&self, key: &str) -> Option<&Value> {
        self.payload.get("JobInfo").and_then(|info| info.get(key))
    }

    /// A `PluginInfo` value of the posted payload
    pub fn plugin_info(&self, key: &str) -> Option<&Value> {
        self.payload.get("PluginInfo").and_then(|info| info.get(key))
    }
}

#[derive(Debug, Default)]
struct MockDeadlineState {
    jobs: Vec<MockJob>,
    /// Status codes returned instead of accepting, consumed in order
    failures: Vec<u16>,
}

/// In-process stand-in for the Deadline Web Service
#[derive(Debug, Clone, Default)]
pub struct MockDeadline {
    state: Arc<Mutex<MockDeadlineState>>,
}

impl MockDeadline {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockDeadlineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Reject the next submission with an HTTP status
    pub fn fail_next(&self, status: u16) {
        self.state().failures.push(status);
    }

    /// All accepted jobs in submission order
    pub fn jobs(&self) -> Vec<MockJob> {
        self.state().jobs.clone()
    }

    /// Number of accepted jobs
    pub fn job_count(&self) -> usize {
        self.state().jobs.len()
    }

    /// Handle `POST <url>` with a JSON body
    pub fn handle_post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.state();

        if !state.failures.is_empty() {
            let status = state.failures.remove(0);
            return Err(TransportError::Status {
                status,
                body: "mock failure".to_string(),
            });
        }

        if !url.ends_with(deadline_protocol::JOBS_ENDPOINT) {
            return Err(TransportError::Status {
                status: 404,
                body: format!("no route for {}", url),
            });
        }

        let (Some(job_info), Some(_), Some(_)) = (
            body.get("JobInfo"),
            body.get("PluginInfo"),
            body.get("AuxFiles"),
        ) else {
            return Err(TransportError::Status {
                status: 400,
                body: "JobInfo, PluginInfo and AuxFiles are required".to_string(),
            });
        };

        let id = uuid::Uuid::new_v4().simple().to_string()[..24].to_string();
        let batch = job_info.get("BatchName").cloned().unwrap_or(Value::Null);
        let name = job_info.get("Name").cloned().unwrap_or(Value::Null);

        state.jobs.push(MockJob {
            id: id.clone(),
            url: url.to_string(),
            payload: body.clone(),
            submitted_at: Utc::now(),
        });

        Ok(json!({
            "_id": id,
            "Props": {"Batch": batch, "Name": name},
            "Stat": 6
        }))
    }
}
