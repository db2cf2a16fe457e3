//! Publish instance and context data
//!
//! The publishing framework owns these records. They arrive as JSON exports
//! of the instance/context data, and the submitter writes its results back
//! onto the instance for downstream publish steps.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use deadline_protocol::SubmissionResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::BasicAuth;

/// Tag marking representations that are published by the farm job itself.
pub const PUBLISH_ON_FARM_TAG: &str = "publish_on_farm";

/// Errors loading instance or context data
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, InstanceError> {
    let contents = fs::read_to_string(path).map_err(|source| InstanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| InstanceError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Where the instance's frames get rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// Rendered locally before publishing
    Local,
    /// Rendered and published on the farm
    #[default]
    Farm,
    /// Frames already exist; only the publish runs on the farm
    FramesFarm,
}

impl RenderTarget {
    /// Whether rendering and expected-file bookkeeping happen in a later stage
    pub fn defers_render(&self) -> bool {
        matches!(self, RenderTarget::FramesFarm)
    }
}

/// State the downstream publish job is created in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishJobState {
    Active,
    Suspended,
}

/// Per-instance overrides chosen by the artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeValues {
    pub priority: Option<u32>,
    pub chunk: Option<u32>,
    pub concurrency: Option<u32>,
    pub use_gpu: Option<bool>,
    pub workfile_dependency: Option<bool>,
    pub use_published_workfile: Option<bool>,
}

/// A derived "baking" render, e.g. a review movie made from the main output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakingScript {
    pub bake_render_path: String,
    pub bake_script_path: String,
    pub bake_write_node_name: String,
}

/// A representation already collected on the instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Representation {
    pub name: String,
    pub files: Vec<String>,
    pub tags: Vec<String>,
}

impl Representation {
    pub fn is_published_on_farm(&self) -> bool {
        self.tags.iter().any(|t| t == PUBLISH_ON_FARM_TAG)
    }
}

/// Deadline data collected per instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineTarget {
    /// Web service root chosen for this instance
    pub url: Option<String>,
    pub auth: Option<BasicAuth>,
    /// Extra keys merged into `PluginInfo`
    pub plugin_info_data: Map<String, Value>,
}

/// One renderable write node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    pub name: String,
    pub product_type: String,
    pub family: Option<String>,
    pub families: Vec<String>,
    /// Whether this instance is rendered on the farm at all
    pub farm: bool,
    pub render_target: RenderTarget,
    pub frame_start_handle: i64,
    pub frame_end_handle: i64,
    /// Render output template, e.g. `/renders/sh010.####.exr`
    pub path: String,
    pub write_node: String,
    /// A slate frame precedes the first frame
    pub slate: bool,
    /// Explicit frame list replacing the start-end range
    pub frames: Option<String>,
    pub attribute_values: AttributeValues,
    pub primary_pool: Option<String>,
    pub secondary_pool: Option<String>,
    pub baking_nuke_scripts: Vec<BakingScript>,
    pub representations: Vec<Representation>,
    /// Instance-scoped job environment
    pub job_env: BTreeMap<String, String>,
    pub deadline: DeadlineTarget,

    pub expected_files: Vec<String>,
    pub output_dir: Option<String>,
    pub deadline_submission_job: Option<SubmissionResponse>,
    pub publish_job_state: Option<PublishJobState>,
    pub baking_submission_jobs: Vec<String>,
}

impl Instance {
    /// Load an instance export
    pub fn load(path: &Path) -> Result<Self, InstanceError> {
        load_json(path)
    }

    /// Relabel the product after submission.
    ///
    /// Farm-rendered `render` and `prerender` products are integrated as
    /// `write` products; the original kind leads the families list.
    pub fn relabel_product(&mut self) {
        let leading = if self.product_type.contains("prerender") {
            "prerender"
        } else if self.product_type.contains("render") {
            "render2d"
        } else {
            return;
        };
        self.family = Some("write".to_string());
        self.product_type = "write".to_string();
        self.families.insert(0, leading.to_string());
    }
}

/// Context shared by all instances of one publish
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Context {
    /// Script currently open in the host
    pub current_file: String,
    /// Host version string, e.g. `15.1v3`
    pub host_version: String,
    pub comment: String,
    pub deadline_user: Option<String>,
    /// Environment every render job carries
    pub render_job_env: BTreeMap<String, String>,
    /// Where the workfile instance will be integrated, when known
    pub published_workfile: Option<String>,
}

impl Context {
    /// Load a context export
    pub fn load(path: &Path) -> Result<Self, InstanceError> {
        load_json(path)
    }

    /// Submitting user, falling back to the OS login
    pub fn user(&self) -> String {
        self.deadline_user
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_default()
    }
}
