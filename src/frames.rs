//! Frame-numbered path patterns and frame lists
//!
//! Render paths name their frame number either with a hash run
//! (`comp.####.exr`) or a printf placeholder (`comp.%04d.exr`).

use std::sync::OnceLock;

use regex_lite::{Captures, Regex};
use thiserror::Error;

fn hash_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#+").expect("valid hash run pattern"))
}

fn printf_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%(\d*)d").expect("valid printf pattern"))
}

/// Normalize separators to `/`.
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Split a path into its directory and file name at the last separator.
///
/// The directory is empty for bare file names.
pub fn split_dir(path: &str) -> (&str, &str) {
    match path.rfind(&['/', '\\'][..]) {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

/// Replace every hash run with a zero-padded printf placeholder.
///
/// `comp.####.exr` becomes `comp.%04d.exr`.
pub fn hashes_to_printf(name: &str) -> String {
    hash_run()
        .replace_all(name, |caps: &Captures| format!("%0{}d", caps[0].len()))
        .into_owned()
}

/// Replace printf placeholders with hash runs of the same padding.
///
/// `comp.%04d.exr` becomes `comp.####.exr`; an unpadded `%d` becomes `#`.
pub fn printf_to_hashes(name: &str) -> String {
    printf_placeholder()
        .replace_all(name, |caps: &Captures| {
            let width = caps[1].parse::<usize>().unwrap_or(1).max(1);
            "#".repeat(width)
        })
        .into_owned()
}

/// Whether the name contains a printf frame placeholder.
pub fn has_frame_placeholder(name: &str) -> bool {
    printf_placeholder().is_match(name)
}

/// Substitute a frame number into every printf placeholder.
///
/// Returns `None` when the name has no placeholder.
pub fn format_frame(name: &str, frame: i64) -> Option<String> {
    if !has_frame_placeholder(name) {
        return None;
    }
    let formatted = printf_placeholder().replace_all(name, |caps: &Captures| {
        let spec = &caps[1];
        let width = spec.parse::<usize>().unwrap_or(0);
        if spec.starts_with('0') {
            format!("{:0width$}", frame, width = width)
        } else {
            format!("{:width$}", frame, width = width)
        }
    });
    Some(formatted.into_owned())
}

/// Errors parsing a frame list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameListError {
    #[error("empty frame list")]
    Empty,

    #[error("invalid frame token '{0}'")]
    InvalidToken(String),

    #[error("invalid step in '{0}'")]
    InvalidStep(String),
}

fn parse_frame(token: &str, whole: &str) -> Result<i64, FrameListError> {
    token
        .trim()
        .parse::<i64>()
        .map_err(|_| FrameListError::InvalidToken(whole.to_string()))
}

/// One token of a Deadline frame list: `start-end` stepping by `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl FrameRange {
    /// Last frame actually rendered, `end` rounded down onto the step.
    pub fn last(&self) -> i64 {
        let span = (i128::from(self.end) - i128::from(self.start)) / i128::from(self.step);
        // Never exceeds `end`, so it fits.
        (i128::from(self.start) + span * i128::from(self.step)) as i64
    }
}

/// Parse a Deadline frame list such as `1001-1005,1010,1020-1030x2`.
///
/// Ranges are kept unexpanded.
pub fn parse_frame_ranges(list: &str) -> Result<Vec<FrameRange>, FrameListError> {
    let mut ranges = Vec::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (range, step) = match token.split_once('x') {
            Some((range, step)) => {
                let step = step
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| FrameListError::InvalidStep(token.to_string()))?;
                (range, step)
            }
            None => (token, 1),
        };

        // A leading '-' belongs to a negative start frame.
        let split_at = range
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(i, _)| i);

        let (start, end) = match split_at {
            Some(i) => (parse_frame(&range[..i], token)?, parse_frame(&range[i + 1..], token)?),
            None => {
                let frame = parse_frame(range, token)?;
                (frame, frame)
            }
        };
        if end < start {
            return Err(FrameListError::InvalidToken(token.to_string()));
        }
        ranges.push(FrameRange { start, end, step });
    }

    if ranges.is_empty() {
        return Err(FrameListError::Empty);
    }
    Ok(ranges)
}
