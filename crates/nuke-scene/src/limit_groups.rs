//! Limit group resolution.
//!
//! A limit group rule pairs a Deadline limit name with the node classes that
//! consume it (typically licensed plugins). A rule applies when the scene
//! contains at least one enabled node of one of its classes.

use serde::{Deserialize, Serialize};

use crate::SceneGraph;

/// Maps a Deadline limit group to the node classes that require it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitGroupRule {
    /// Limit group name.
    pub name: String,
    /// Node classes.
    #[serde(default)]
    pub value: Vec<String>,
}

impl LimitGroupRule {
    pub fn new(name: impl Into<String>, classes: &[&str]) -> Self {
        Self {
            name: name.into(),
            value: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn matches_class(&self, class: &str) -> bool {
        self.value.iter().any(|c| c == class)
    }
}

/// Resolve the limit groups used by a scene.
///
/// Disabled nodes never contribute. Each group is returned at most once, in
/// rule order.
pub fn resolve_limit_groups(scene: &dyn SceneGraph, rules: &[LimitGroupRule]) -> Vec<String> {
    let nodes = scene.all_nodes();
    let mut captured: Vec<String> = Vec::new();

    for rule in rules {
        if captured.contains(&rule.name) {
            continue;
        }
        let used = nodes
            .iter()
            .any(|node| !node.is_disabled() && rule.matches_class(node.class()));
        if used {
            captured.push(rule.name.clone());
        }
    }

    captured
}
