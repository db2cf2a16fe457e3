//! Deadline Web Service Client
//!
//! Posts job payloads to `<url>/api/jobs` and decodes the submission
//! response. One request per job, no retries.

use std::sync::Arc;

use deadline_protocol::{JobPayload, ResponseError, SubmissionResponse, JOBS_ENDPOINT};

use super::transport::{Transport, TransportError};

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Response(#[from] ResponseError),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Deadline Web Service client
pub struct DeadlineClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl DeadlineClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    /// Jobs endpoint URL
    pub fn jobs_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), JOBS_ENDPOINT)
    }

    /// Submit one job and return the service response
    pub fn submit(&self, payload: &JobPayload) -> ClientResult<SubmissionResponse> {
        let url = self.jobs_url();
        let body = payload.to_value()?;

        tracing::debug!(url = %url, "submitting job");
        let value = self.transport.post_json(&url, &body)?;
        let response = SubmissionResponse::from_value(value)?;

        tracing::info!(
            job_id = response.job_id().unwrap_or("<none>"),
            batch = response.batch().unwrap_or(""),
            "job submitted"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::transport::MockTransport;
    use deadline_protocol::{JobInfo, PluginInfo};

    fn payload() -> JobPayload {
        JobPayload::new(
            JobInfo {
                batch_name: "shot010_comp_v001.nk".to_string(),
                name: "shot010_comp_v001.nk - Write1".to_string(),
                ..JobInfo::default()
            },
            PluginInfo::default(),
        )
    }

    #[test]
    fn test_jobs_url_trims_trailing_slash() {
        let client = DeadlineClient::new("http://farm:8081/", Arc::new(MockTransport::new()));
        assert_eq!(client.jobs_url(), "http://farm:8081/api/jobs");
    }

    #[test]
    fn test_submit_returns_response() {
        let transport = MockTransport::new();
        let client = DeadlineClient::new("http://farm:8081", Arc::new(transport.clone()));

        let response = client.submit(&payload()).unwrap();

        assert!(response.job_id().is_some());
        assert_eq!(response.batch(), Some("shot010_comp_v001.nk"));
        assert_eq!(transport.service().job_count(), 1);
        assert_eq!(
            transport.service().jobs()[0].url,
            "http://farm:8081/api/jobs"
        );
    }

    #[test]
    fn test_submit_propagates_status() {
        let transport = MockTransport::new();
        transport.service().fail_next(500);
        let client = DeadlineClient::new("http://farm:8081", Arc::new(transport.clone()));

        let err = client.submit(&payload()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Status { status: 500, .. })
        ));
        assert_eq!(transport.service().job_count(), 0);
    }
}
