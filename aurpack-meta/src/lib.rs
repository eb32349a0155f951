//! aurpack-meta: version and metadata checks for AUR recipes
//!
//! This crate provides:
//! - `.SRCINFO` parsing into base and sub-package sections
//! - Recipe settings (`.settings.yaml`) parsing
//! - Dotted base-36 version comparison
//! - Publish gate and cross-source consistency checks
//!
//! Everything here works on text already read into memory. Fetching
//! versions from registries and reading recipe directories is left to
//! the caller.

pub mod consistency;
pub mod error;
pub mod settings;
pub mod srcinfo;
pub mod version;

pub use consistency::{
    check_consistency, check_metadata, check_publish_gate, check_registry, check_upstream,
    ConsistencyReport,
};
pub use error::{
    ConsistencyError, Error, GateError, ParseError, Result, SchemaError, VersionError,
};
pub use settings::{RecipeSettings, Upstream, UpstreamKind};
pub use srcinfo::{BuildMetadata, FieldKind, FieldValue};
pub use version::{compare_versions, VersionRelease};
