//! Nuke scene graph inspection.
//!
//! The host application owns the node graph. This crate describes the small
//! capability the submitter needs from it (walk all nodes, read their class
//! and disabled state) and resolves Deadline limit groups against it.

mod limit_groups;
mod scene;

pub use limit_groups::{resolve_limit_groups, LimitGroupRule};
pub use scene::{Scene, SceneError, SnapshotNode};

/// A single node in the scene graph.
pub trait SceneNode {
    /// Node name, e.g. `Write1`.
    fn name(&self) -> &str;

    /// Node class, e.g. `Write` or `OFXcom.neatvideo.neatvideo_v5`.
    fn class(&self) -> &str;

    /// Whether the node's `disable` knob is set.
    fn is_disabled(&self) -> bool;
}

/// Read access to a scene graph.
pub trait SceneGraph {
    /// All nodes in the scene, recursing into groups.
    fn all_nodes(&self) -> Vec<&dyn SceneNode>;
}
