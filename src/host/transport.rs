//! Transport Layer for the Deadline client
//!
//! Abstracts the HTTP connection for testability. Provides:
//! - Transport trait: interface for posting JSON to the web service
//! - MockTransport: in-process mock service for unit tests and dry runs
//! - HttpTransport: real blocking HTTP connection for production

use base64::Engine;
use serde_json::Value;

use crate::config::BasicAuth;
use crate::mock::MockDeadline;

/// Transport trait for web service communication
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the decoded JSON response
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Mock transport for testing - connects directly to a MockDeadline in-process
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    service: MockDeadline,
}

impl MockTransport {
    /// Create a new mock transport with a fresh mock service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock transport sharing a pre-configured service
    pub fn with_service(service: MockDeadline) -> Self {
        Self { service }
    }

    /// Get the underlying mock service for inspection
    pub fn service(&self) -> &MockDeadline {
        &self.service
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.service.handle_post(url, body)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Verify TLS certificates
    pub verify_ssl: bool,
    /// Basic auth credentials
    pub auth: Option<BasicAuth>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            auth: None,
        }
    }
}

/// Blocking HTTP transport
pub struct HttpTransport {
    agent: ureq::Agent,
    authorization: Option<String>,
}

impl HttpTransport {
    /// Create a transport from configuration
    pub fn new(config: HttpConfig) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!config.verify_ssl)
            .build();
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            authorization: config.auth.as_ref().map(basic_auth_header),
        }
    }
}

/// `Authorization` header value for basic auth
pub fn basic_auth_header(auth: &BasicAuth) -> String {
    let credentials = format!("{}:{}", auth.username, auth.password);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let mut request = self.agent.post(url);
        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization.as_str());
        }

        let mut response = request
            .send_json(body)
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
