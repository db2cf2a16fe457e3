//! `PluginInfo` section for the Nuke plugin.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plugin-level metadata of a Nuke submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginInfo {
    /// Script to render.
    pub scene_file: String,
    /// Output directory, forward-slash separated.
    pub output_file_path: String,
    /// Nuke `major.minor` version, mandatory for Deadline.
    pub version: String,
    /// Resolves relative references inside the script.
    pub project_path: String,
    #[serde(rename = "AWSAssetFile0")]
    pub aws_asset_file0: String,
    pub use_gpu: bool,
    /// Only this write node is rendered.
    pub write_node: String,
    /// Additional keys merged into the section as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginInfo {
    /// Merge additional key/values; known keys are overwritten in place.
    pub fn apply_additional(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            match (key.as_str(), value) {
                ("SceneFile", Value::String(s)) => self.scene_file = s.clone(),
                ("OutputFilePath", Value::String(s)) => self.output_file_path = s.clone(),
                ("Version", Value::String(s)) => self.version = s.clone(),
                ("ProjectPath", Value::String(s)) => self.project_path = s.clone(),
                ("WriteNode", Value::String(s)) => self.write_node = s.clone(),
                ("UseGpu", Value::Bool(b)) => self.use_gpu = *b,
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}
