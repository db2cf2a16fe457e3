//! Expected output files
//!
//! The publish job integrates whatever the render produces. Before the
//! render is submitted, every file it will write is enumerated on the
//! instance so the publish job knows what to wait for.

use tracing::debug;

use crate::frames::{format_frame, has_frame_placeholder, hashes_to_printf, split_dir, to_forward_slashes};
use crate::instance::Instance;

/// Enumerate the files a render of `path` over `[start, end]` produces.
///
/// Paths are appended to `instance.expected_files`. Returns how many were
/// added.
pub fn resolve_expected_files(instance: &mut Instance, path: &str, start: i64, end: i64) -> usize {
    if instance.render_target.defers_render() {
        debug!("expected files already collected for frames_farm, skipping");
        return 0;
    }

    let (dir, file) = split_dir(path);

    // Files published by the farm job itself are tracked by their representation.
    let already_tracked = instance
        .representations
        .iter()
        .filter(|repre| repre.is_published_on_farm())
        .any(|repre| repre.files.iter().any(|f| f == file));
    if already_tracked {
        debug!(path, "skipping expected file tracked by a representation");
        return 0;
    }

    let pattern = hashes_to_printf(file);

    if !has_frame_placeholder(&pattern) {
        instance.expected_files.push(path.to_string());
        return 1;
    }

    let first = if instance.slate { start - 1 } else { start };
    let dir = to_forward_slashes(dir);
    let before = instance.expected_files.len();

    for frame in first..=end {
        if let Some(name) = format_frame(&pattern, frame) {
            let full = if dir.is_empty() {
                name
            } else {
                format!("{}/{}", dir, name)
            };
            instance.expected_files.push(full);
        }
    }

    instance.expected_files.len() - before
}
