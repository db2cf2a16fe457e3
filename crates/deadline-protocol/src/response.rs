//! Job submission response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Errors decoding a submission response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("invalid submission response: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Job properties echoed by the web service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProps {
    /// Batch the job was grouped under.
    #[serde(rename = "Batch", default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decoded response of `POST /api/jobs`.
///
/// Only the id and batch are interpreted; everything else is kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Props", default, deserialize_with = "null_as_default")]
    pub props: JobProps,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Servers answering without job properties send `"Props": null`.
fn null_as_default<'de, D>(deserializer: D) -> Result<JobProps, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<JobProps>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubmissionResponse {
    /// Decode a response body.
    pub fn from_value(value: Value) -> Result<Self, ResponseError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Job id assigned by the scheduler, if any.
    pub fn job_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Batch name the job was grouped under.
    pub fn batch(&self) -> Option<&str> {
        self.props.batch.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_keeps_unknown_fields() {
        let response = SubmissionResponse::from_value(json!({
            "_id": "abc123",
            "Props": {"Batch": "sceneA", "Name": "render.####.exr"},
            "Stat": 6
        }))
        .unwrap();

        assert_eq!(response.job_id(), Some("abc123"));
        assert_eq!(response.batch(), Some("sceneA"));
        assert_eq!(response.props.extra["Name"], "render.####.exr");
        assert_eq!(response.extra["Stat"], 6);
    }

    #[test]
    fn test_empty_id_is_none() {
        let response = SubmissionResponse::from_value(json!({"_id": ""})).unwrap();
        assert_eq!(response.job_id(), None);
        assert_eq!(response.batch(), None);
    }

    #[test]
    fn test_null_props_decode_as_empty() {
        let response =
            SubmissionResponse::from_value(json!({"_id": "x", "Props": null})).unwrap();

        assert_eq!(response.job_id(), Some("x"));
        assert_eq!(response.batch(), None);
        assert_eq!(response.props, JobProps::default());
    }
}
