//! Dotted version comparison
//!
//! Every `.`-separated segment is read as a base-36 number, so `10 > 9`
//! and `1b > 1a`. Versions are only comparable when they have the same
//! number of segments.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A version string together with its integer release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRelease {
    pub version: String,
    pub release: u32,
}

impl VersionRelease {
    pub fn new(version: impl Into<String>, release: u32) -> Self {
        Self {
            version: version.into(),
            release,
        }
    }

    /// `version.release`, used when both parts must be ordered at once.
    pub fn composite(&self) -> String {
        format!("{}.{}", self.version, self.release)
    }
}

impl fmt::Display for VersionRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.version, self.release)
    }
}

/// Parses `<version>-<release>`, the form the AUR reports.
impl FromStr for VersionRelease {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, release) = s
            .rsplit_once('-')
            .ok_or_else(|| VersionError::InvalidRelease(s.to_string()))?;
        reject_epoch(version)?;
        Ok(Self::new(version, parse_release(release)?))
    }
}

/// Parse a release number such as the `pkgrel` value of a recipe.
pub fn parse_release(value: &str) -> Result<u32, VersionError> {
    value
        .trim()
        .parse()
        .map_err(|_| VersionError::InvalidRelease(value.to_string()))
}

/// Compare two versions segment by segment.
///
/// Returns `Ordering::Greater` when `left` is newer than `right`.
pub fn compare_versions(left: &str, right: &str) -> Result<Ordering, VersionError> {
    let left_segments = segments(left)?;
    let right_segments = segments(right)?;

    if left_segments.len() != right_segments.len() {
        return Err(VersionError::FormatMismatch {
            left: left.to_string(),
            right: right.to_string(),
            left_segments: left_segments.len(),
            right_segments: right_segments.len(),
        });
    }

    let ordering = left_segments
        .iter()
        .zip(&right_segments)
        .map(|(l, r)| compare_segment(l, r))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal);
    Ok(ordering)
}

/// `1:2.0` carries an epoch, which takes precedence over every segment.
fn reject_epoch(version: &str) -> Result<(), VersionError> {
    if version.contains(':') {
        return Err(VersionError::EpochUnsupported {
            version: version.to_string(),
        });
    }
    Ok(())
}

fn segments(version: &str) -> Result<Vec<&str>, VersionError> {
    reject_epoch(version)?;
    version
        .split('.')
        .map(|segment| {
            if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                Err(VersionError::InvalidVersion {
                    version: version.to_string(),
                    segment: segment.to_string(),
                })
            } else {
                Ok(segment)
            }
        })
        .collect()
}

// Segments may be longer than any machine integer (commit hashes, dates),
// so compare digit strings directly instead of converting.
fn compare_segment(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');

    left.len().cmp(&right.len()).then_with(|| {
        left.chars()
            .zip(right.chars())
            .map(|(l, r)| digit(l).cmp(&digit(r)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn digit(c: char) -> u32 {
    // segments() already rejected anything outside [0-9a-zA-Z]
    c.to_digit(36).unwrap_or(0)
}
