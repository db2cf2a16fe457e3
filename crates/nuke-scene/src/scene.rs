//! In-memory scene snapshot.
//!
//! A snapshot is the JSON export of a script's node tree:
//!
//! ```json
//! {"nodes": [
//!     {"name": "Write1", "class": "Write"},
//!     {"name": "Group1", "class": "Group", "nodes": [
//!         {"name": "Neat1", "class": "OFXcom.neatvideo", "disable": true}
//!     ]}
//! ]}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{SceneGraph, SceneNode};

/// Errors loading a scene snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read scene snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A node of a scene snapshot, possibly a group with children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub disable: bool,
    /// Children of a group node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<SnapshotNode>,
}

impl SnapshotNode {
    /// Create an enabled node without children.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            disable: false,
            nodes: Vec::new(),
        }
    }

    /// Mark the node disabled.
    pub fn disabled(mut self) -> Self {
        self.disable = true;
        self
    }

    /// Attach children, turning the node into a group.
    pub fn with_children(mut self, nodes: Vec<SnapshotNode>) -> Self {
        self.nodes = nodes;
        self
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a dyn SceneNode>) {
        out.push(self);
        for child in &self.nodes {
            child.collect(out);
        }
    }
}

impl SceneNode for SnapshotNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> &str {
        &self.class
    }

    fn is_disabled(&self) -> bool {
        self.disable
    }
}

/// Scene graph backed by a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

impl Scene {
    /// Create a scene from top-level nodes.
    pub fn new(nodes: Vec<SnapshotNode>) -> Self {
        Self { nodes }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl SceneGraph for Scene {
    fn all_nodes(&self) -> Vec<&dyn SceneNode> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect(&mut out);
        }
        out
    }
}
