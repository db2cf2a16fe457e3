//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Deadline Web Service root (default: empty, must be configured)
    pub deadline_url: String,

    /// Verify TLS certificates of the web service (default: true)
    pub verify_ssl: bool,

    /// Deadline plugin name (default: "Nuke")
    pub plugin_name: String,

    /// Job priority (default: 50)
    pub priority: u32,

    /// Frames per task (default: 10)
    pub chunk_size: u32,

    /// Concurrent tasks per worker (default: 1)
    pub concurrent_tasks: u32,

    /// Render on GPU (default: true)
    pub use_gpu: bool,

    /// Add the script as an asset dependency (default: true)
    pub workfile_dependency: bool,

    /// Render from the published workfile (default: true)
    pub use_published_workfile: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            deadline_url: String::new(),
            verify_ssl: true,
            plugin_name: "Nuke".to_string(),
            priority: 50,
            chunk_size: 10,
            concurrent_tasks: 1,
            use_gpu: true,
            workfile_dependency: true,
            use_published_workfile: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "deadline": {
                "url": self.deadline_url,
                "verify_ssl": self.verify_ssl
            },
            "nuke": {
                "plugin_name": self.plugin_name,
                "priority": self.priority,
                "chunk_size": self.chunk_size,
                "concurrent_tasks": self.concurrent_tasks,
                "department": "",
                "group": "",
                "use_gpu": self.use_gpu,
                "workfile_dependency": self.workfile_dependency,
                "use_published_workfile": self.use_published_workfile,
                "env_allowed_keys": [],
                "env_search_replace_values": [],
                "node_class_limit_groups": []
            }
        })
    }
}
