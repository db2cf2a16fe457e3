//! Job info validation
//!
//! Checks run before anything is sent to the farm.

use thiserror::Error;

use crate::frames::{parse_frame_ranges, FrameListError};

/// Validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("priority '{0}' must be between 0-100")]
    PriorityOutOfRange(u32),

    #[error("invalid custom frames '{frames}': {source}")]
    InvalidFrames {
        frames: String,
        #[source]
        source: FrameListError,
    },

    #[error("custom frames '{frames}' are outside of expected frame range '{start}'-'{end}'")]
    FramesOutOfRange { frames: String, start: i64, end: i64 },
}

/// Priority must lie within Deadline's 0–100 scale.
pub fn validate_priority(priority: u32) -> Result<(), ValidationError> {
    if priority > 100 {
        return Err(ValidationError::PriorityOutOfRange(priority));
    }
    Ok(())
}

/// A custom frame list must stay within the instance frame range.
pub fn validate_custom_frames(frames: &str, start: i64, end: i64) -> Result<(), ValidationError> {
    let ranges = parse_frame_ranges(frames).map_err(|source| ValidationError::InvalidFrames {
        frames: frames.to_string(),
        source,
    })?;

    let outside = ranges
        .iter()
        .any(|range| range.start < start || range.last() > end);
    if outside {
        return Err(ValidationError::FramesOutOfRange {
            frames: frames.to_string(),
            start,
            end,
        });
    }
    Ok(())
}
