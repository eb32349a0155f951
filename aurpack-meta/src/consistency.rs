//! Cross-source version checks
//!
//! Versions come from three places: the recipe itself, the upstream
//! project's release feed, and the registry the package is published to.

use std::cmp::Ordering;

use crate::error::{ConsistencyError, GateError};
use crate::version::{compare_versions, VersionRelease};

/// Result of a successful routine validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// The local version/release is ahead of the registry.
    pub publish_pending: bool,
}

/// Check that a new release may be published on top of `published`.
///
/// Same version: the release must be exactly one higher. New version: the
/// release must start again at 1 and the version must be newer.
pub fn check_publish_gate(
    local: &VersionRelease,
    published: &VersionRelease,
) -> Result<(), GateError> {
    match compare_versions(&local.version, &published.version)? {
        Ordering::Equal => {
            // u32::MAX has no valid successor
            let expected = u64::from(published.release) + 1;
            if u64::from(local.release) != expected {
                return Err(GateError::ReleaseNotIncremented {
                    version: local.version.clone(),
                    expected,
                    found: local.release,
                });
            }
        }
        ordering => {
            if local.release != 1 {
                return Err(GateError::ReleaseMustResetOnBump {
                    found: local.release,
                });
            }
            if ordering != Ordering::Greater {
                return Err(GateError::VersionNotNewer {
                    local: local.version.clone(),
                    published: published.version.clone(),
                });
            }
        }
    }
    Ok(())
}

/// The local recipe must package exactly the current upstream version.
pub fn check_upstream(local_version: &str, upstream: &str) -> Result<(), ConsistencyError> {
    match compare_versions(upstream, local_version)? {
        Ordering::Equal => Ok(()),
        Ordering::Greater => Err(ConsistencyError::UpstreamAhead {
            upstream: upstream.to_string(),
            local: local_version.to_string(),
        }),
        Ordering::Less => Err(ConsistencyError::LocalAheadOfUpstream {
            upstream: upstream.to_string(),
            local: local_version.to_string(),
        }),
    }
}

/// The registry may lag behind the recipe, never lead it.
pub fn check_registry(
    local: &VersionRelease,
    registry: &VersionRelease,
) -> Result<ConsistencyReport, ConsistencyError> {
    match compare_versions(&registry.composite(), &local.composite())? {
        Ordering::Greater => Err(ConsistencyError::RegistryAheadOfLocal {
            registry: registry.to_string(),
            local: local.to_string(),
        }),
        Ordering::Less => Ok(ConsistencyReport {
            publish_pending: true,
        }),
        Ordering::Equal => Ok(ConsistencyReport::default()),
    }
}

/// The generated `.SRCINFO` must describe the same release as the recipe.
pub fn check_metadata(
    recipe: &VersionRelease,
    metadata: &VersionRelease,
) -> Result<(), ConsistencyError> {
    let ordering = compare_versions(&metadata.composite(), &recipe.composite())?;
    if ordering.is_ne() {
        return Err(ConsistencyError::MetadataMismatch {
            recipe: recipe.to_string(),
            metadata: metadata.to_string(),
        });
    }
    Ok(())
}

/// Routine validation: upstream (when tracked) first, then the registry.
pub fn check_consistency(
    local: &VersionRelease,
    registry: &VersionRelease,
    upstream: Option<&str>,
) -> Result<ConsistencyReport, ConsistencyError> {
    if let Some(upstream) = upstream {
        check_upstream(&local.version, upstream)?;
    }
    check_registry(local, registry)
}
