//! AUR dependency install order
//!
//! Only packages found on the AUR take part in the ordering. Anything
//! else is assumed to come from the official repositories.

use std::collections::HashSet;
use tracing::{debug, trace};

use crate::registry::{PackageInfo, RegistryClient};
use crate::{Error, Result};

/// `foo>=1.2` -> `foo`
pub fn strip_constraint(dep: &str) -> &str {
    dep.split(['<', '>', '='])
        .next()
        .unwrap_or(dep)
        .trim()
}

fn dependencies_of(info: &PackageInfo) -> impl Iterator<Item = &str> {
    info.depends
        .iter()
        .chain(info.make_depends.iter())
        .map(|dep| strip_constraint(dep))
}

/// Order `infos` so every package comes after its AUR dependencies.
///
/// Returns `[root]` when the root isn't on the AUR at all.
pub fn install_order(root: &str, infos: Vec<PackageInfo>) -> Result<Vec<String>> {
    if !infos.iter().any(|info| info.name == root) {
        return Ok(vec![root.to_string()]);
    }

    let mut pending = infos;
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|info| {
                dependencies_of(info).all(|dep| !pending.iter().any(|p| p.name == dep))
            })
            .ok_or_else(|| {
                let names: Vec<&str> = pending.iter().map(|p| p.name.as_str()).collect();
                Error::Registry(format!(
                    "Circular dependencies between {}",
                    names.join(", ")
                ))
            })?;
        order.push(pending.remove(next).name);
    }

    if order.last().map(String::as_str) != Some(root) {
        return Err(Error::Registry(format!(
            "Circular dependencies: {} is required by its own dependencies",
            root
        )));
    }

    Ok(order)
}

/// Fetch the AUR dependency tree of `root` and order it for installation.
pub async fn resolve_install_order(client: &RegistryClient, root: &str) -> Result<Vec<String>> {
    trace!("Calculating dependency install order for {}", root);

    let mut seen: HashSet<String> = HashSet::from([root.to_string()]);
    let mut frontier = vec![root.to_string()];
    let mut infos = Vec::new();

    while !frontier.is_empty() {
        let names: Vec<&str> = frontier.iter().map(String::as_str).collect();
        let found = client.info(&names).await?;

        let mut next = Vec::new();
        for info in &found {
            for dep in dependencies_of(info) {
                if seen.insert(dep.to_string()) {
                    next.push(dep.to_string());
                }
            }
        }

        infos.extend(found);
        frontier = next;
    }

    debug!("{} AUR package(s) in the dependency tree of {}", infos.len(), root);
    install_order(root, infos)
}
