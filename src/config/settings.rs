//! Typed submission settings
//!
//! Deserialized once from the merged layers and handed to the payload
//! builder and the client.

use nuke_scene::LimitGroupRule;
use serde::{Deserialize, Serialize};

/// Plugin name used when the setting is missing or blank.
pub const DEFAULT_PLUGIN_NAME: &str = "Nuke";

/// All settings consumed by a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitSettings {
    #[serde(default)]
    pub deadline: DeadlineSettings,
    #[serde(default)]
    pub nuke: NukeSettings,
}

/// Deadline Web Service connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineSettings {
    /// Web service root, e.g. `http://deadline:8082`.
    pub url: String,
    pub verify_ssl: bool,
    pub auth: Option<BasicAuth>,
}

impl Default for DeadlineSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            verify_ssl: true,
            auth: None,
        }
    }
}

/// HTTP basic auth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// A substring substitution applied to environment values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReplace {
    /// Substring to search for.
    pub name: String,
    /// Replacement.
    pub value: String,
}

/// Nuke submitter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NukeSettings {
    pub plugin_name: Option<String>,
    pub priority: u32,
    pub chunk_size: u32,
    pub concurrent_tasks: u32,
    pub department: String,
    pub group: String,
    pub use_gpu: bool,
    pub workfile_dependency: bool,
    pub use_published_workfile: bool,
    /// Extra process environment keys forwarded to the job.
    pub env_allowed_keys: Vec<String>,
    pub env_search_replace_values: Vec<SearchReplace>,
    pub node_class_limit_groups: Vec<LimitGroupRule>,
}

impl Default for NukeSettings {
    fn default() -> Self {
        Self {
            plugin_name: None,
            priority: 50,
            chunk_size: 10,
            concurrent_tasks: 1,
            department: String::new(),
            group: String::new(),
            use_gpu: true,
            workfile_dependency: true,
            use_published_workfile: true,
            env_allowed_keys: Vec::new(),
            env_search_replace_values: Vec::new(),
            node_class_limit_groups: Vec::new(),
        }
    }
}

impl NukeSettings {
    /// Deadline plugin name, falling back to `Nuke`.
    pub fn plugin_name(&self) -> &str {
        match self.plugin_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_PLUGIN_NAME,
        }
    }
}
