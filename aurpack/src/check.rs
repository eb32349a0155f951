//! Version checks over a whole recipe
//!
//! Gathers versions from the recipe, its `.SRCINFO`, upstream and the AUR,
//! then hands them to the checks in `aurpack_meta`.

use tracing::{debug, info, warn};

use aurpack_meta::{
    check_consistency, check_metadata, check_publish_gate, check_upstream, GateError,
    VersionRelease,
};

use crate::recipe::Recipe;
use crate::registry::RegistryClient;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub name: String,
    pub local: VersionRelease,
    pub published: Option<VersionRelease>,
    pub upstream: Option<String>,
    /// The recipe holds a release the AUR doesn't have yet.
    pub publish_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub name: String,
    pub local: VersionRelease,
    pub published: Option<VersionRelease>,
}

/// Routine validation once every version is known.
pub fn evaluate_check(
    name: &str,
    local: VersionRelease,
    metadata: &VersionRelease,
    published: Option<VersionRelease>,
    upstream: Option<String>,
) -> Result<CheckReport> {
    check_metadata(&local, metadata)?;

    let publish_pending = match &published {
        Some(published) => {
            check_consistency(&local, published, upstream.as_deref())?.publish_pending
        }
        None => {
            if let Some(upstream) = &upstream {
                check_upstream(&local.version, upstream)?;
            }
            true
        }
    };

    Ok(CheckReport {
        name: name.to_string(),
        local,
        published,
        upstream,
        publish_pending,
    })
}

/// Publish gate once the published version is known. An unpublished
/// package must start at release 1.
pub fn evaluate_gate(
    name: &str,
    local: VersionRelease,
    published: Option<VersionRelease>,
) -> Result<GateReport> {
    match &published {
        Some(published) => check_publish_gate(&local, published)?,
        None if local.release != 1 => {
            return Err(GateError::ReleaseMustResetOnBump {
                found: local.release,
            }
            .into())
        }
        None => {}
    }

    Ok(GateReport {
        name: name.to_string(),
        local,
        published,
    })
}

pub async fn check_recipe(client: &RegistryClient, recipe: &Recipe) -> Result<CheckReport> {
    debug!("Checking {}", recipe.name);

    let local = recipe.local_version()?;
    let metadata = recipe.build_metadata()?.version_release()?;

    let upstream = match recipe.upstream() {
        Some(upstream) => Some(client.upstream_version(upstream).await?),
        None => None,
    };
    let published = client.published_version(&recipe.name).await?;

    let report = evaluate_check(&recipe.name, local, &metadata, published, upstream)?;

    match &report.published {
        None => warn!("{} {} is not on the AUR yet", report.name, report.local),
        Some(published) if report.publish_pending => info!(
            "{} {} is ready to publish (AUR has {})",
            report.name, report.local, published
        ),
        Some(_) => info!("{} {} is up to date", report.name, report.local),
    }

    Ok(report)
}

pub async fn gate_recipe(client: &RegistryClient, recipe: &Recipe) -> Result<GateReport> {
    debug!("Gating {}", recipe.name);

    let local = recipe.local_version()?;
    let published = client.published_version(&recipe.name).await?;
    let report = evaluate_gate(&recipe.name, local, published)?;

    match &report.published {
        Some(published) => info!(
            "{} {} may be published on top of {}",
            report.name, report.local, published
        ),
        None => info!("{} {} may be published for the first time", report.name, report.local),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use aurpack_meta::ConsistencyError;

    fn vr(version: &str, release: u32) -> VersionRelease {
        VersionRelease::new(version, release)
    }

    #[test]
    fn test_check_in_sync() {
        let report = evaluate_check(
            "foo",
            vr("1.0", 1),
            &vr("1.0", 1),
            Some(vr("1.0", 1)),
            Some("1.0".to_string()),
        )
        .unwrap();
        assert!(!report.publish_pending);
    }

    #[test]
    fn test_check_metadata_out_of_date() {
        let err = evaluate_check("foo", vr("1.1", 1), &vr("1.0", 1), None, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Meta(aurpack_meta::Error::Consistency(
                ConsistencyError::MetadataMismatch { .. }
            ))
        ));
    }

    #[test]
    fn test_check_unpublished_is_pending() {
        let report = evaluate_check(
            "foo",
            vr("1.0", 1),
            &vr("1.0", 1),
            None,
            Some("1.0".to_string()),
        )
        .unwrap();
        assert!(report.publish_pending);

        let err = evaluate_check(
            "foo",
            vr("1.0", 1),
            &vr("1.0", 1),
            None,
            Some("1.1".to_string()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Meta(aurpack_meta::Error::Consistency(
                ConsistencyError::UpstreamAhead { .. }
            ))
        ));
    }

    #[test]
    fn test_check_registry_ahead() {
        assert!(evaluate_check("foo", vr("1.0", 1), &vr("1.0", 1), Some(vr("1.0", 2)), None)
            .is_err());
    }

    #[test]
    fn test_gate() {
        assert!(evaluate_gate("foo", vr("1.0", 2), Some(vr("1.0", 1))).is_ok());
        assert!(evaluate_gate("foo", vr("1.0", 1), None).is_ok());
        assert!(matches!(
            evaluate_gate("foo", vr("1.0", 2), None),
            Err(Error::Meta(aurpack_meta::Error::Gate(
                GateError::ReleaseMustResetOnBump { found: 2 }
            )))
        ));
        assert!(evaluate_gate("foo", vr("0.9", 1), Some(vr("1.0", 1))).is_err());
    }
}
