//! Log rotation policy
//!
//! Tracks the suffix the live file will be renamed to and decides when the
//! next rotation is due. The policy never touches the filesystem; the size
//! check for [`Rotation::Size`] is done by the owning backend.

use chrono::{DateTime, Local};
use lograte_core::constants::{DAY_SUFFIX_FORMAT, FIRST_SEQUENCE_SUFFIX, HOUR_SUFFIX_FORMAT};
use lograte_core::Rotation;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Rotation mode plus the suffix of the file currently being written
#[derive(Debug, Clone, Default)]
pub struct RotationPolicy {
    rotation: Rotation,
    suffix: String,
}

impl RotationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Size threshold in bytes, only set for size rotation
    pub fn threshold(&self) -> Option<u64> {
        match self.rotation {
            Rotation::Size(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Rotate on day change; the suffix is stamped with `now` so the first
    /// check compares against a real day.
    pub fn set_daily(&mut self, now: &DateTime<Local>) {
        self.rotation = Rotation::Daily;
        self.suffix = day_suffix(now);
    }

    /// Rotate on hour change, stamped like [`set_daily`](Self::set_daily)
    pub fn set_hourly(&mut self, now: &DateTime<Local>) {
        self.rotation = Rotation::Hourly;
        self.suffix = hour_suffix(now);
    }

    /// Rotate once the file reaches `threshold` bytes.
    ///
    /// Activation advances the sequence once: an empty suffix becomes `"0"`,
    /// an existing one is incremented.
    pub fn set_size(&mut self, threshold: u64) {
        self.rotation = Rotation::Size(threshold);
        self.suffix = next_sequence(&self.suffix);
    }

    /// Apply a rotation mode as if the matching `set_*` had been called
    pub fn apply(&mut self, rotation: Rotation, now: &DateTime<Local>) {
        match rotation {
            Rotation::None => self.rotation = Rotation::None,
            Rotation::Daily => self.set_daily(now),
            Rotation::Hourly => self.set_hourly(now),
            Rotation::Size(threshold) => self.set_size(threshold),
        }
    }

    /// Replace the tracked suffix, e.g. to continue an existing sequence
    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.suffix = suffix.into();
    }

    /// Logical due check.
    ///
    /// Returns the suffix to adopt after rotating. For size rotation this is
    /// always the next sequence number; the caller must still compare the
    /// file size against [`threshold`](Self::threshold).
    pub fn should_rotate(&self, now: &DateTime<Local>) -> Option<String> {
        let candidate = match self.rotation {
            Rotation::None => return None,
            Rotation::Daily => day_suffix(now),
            Rotation::Hourly => hour_suffix(now),
            Rotation::Size(_) => return Some(next_sequence(&self.suffix)),
        };
        (candidate != self.suffix).then_some(candidate)
    }

    /// Record the suffix of the freshly opened file
    pub fn adopt(&mut self, suffix: String) {
        self.suffix = suffix;
    }
}

pub fn day_suffix(now: &DateTime<Local>) -> String {
    now.format(DAY_SUFFIX_FORMAT).to_string()
}

pub fn hour_suffix(now: &DateTime<Local>) -> String {
    now.format(HOUR_SUFFIX_FORMAT).to_string()
}

/// Next number of the size-based sequence. Empty starts at `"0"`,
/// anything unparsable counts as 0.
pub fn next_sequence(suffix: &str) -> String {
    if suffix.is_empty() {
        return FIRST_SEQUENCE_SUFFIX.to_string();
    }
    let seq: i64 = suffix.parse().unwrap_or(0);
    seq.saturating_add(1).to_string()
}

/// Path a live file is renamed to: `<path>.<suffix>`
pub fn rotated_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
