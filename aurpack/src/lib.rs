//! aurpack: maintenance tooling for a collection of AUR recipes
//!
//! This crate provides:
//! - Recipe discovery (`PKGBUILD`, `.SRCINFO`, `.settings.yaml`, `.namcap_ignore`)
//! - AUR, PyPI and GitHub version lookups
//! - Routine version checks and the publish gate over whole recipes
//! - AUR dependency install ordering
//! - Lint output filtering

pub mod check;
pub mod config;
pub mod deps;
pub mod display;
pub mod error;
pub mod lint;
pub mod recipe;
pub mod registry;

pub use check::{check_recipe, gate_recipe, CheckReport, GateReport};
pub use config::Config;
pub use error::{Error, Result};
pub use recipe::{find_recipe, scan_recipes, Recipe};
pub use registry::RegistryClient;
