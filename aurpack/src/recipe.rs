//! Recipe directories
//!
//! Every sub-directory of the packages directory is one recipe:
//!
//! ```text
//! packages/python-mopidy-mopify/
//!     PKGBUILD
//!     .SRCINFO          generated by makepkg --printsrcinfo
//!     .settings.yaml    optional
//!     .namcap_ignore    optional, one lint line per line
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

use aurpack_meta::{
    version::parse_release, BuildMetadata, RecipeSettings, Upstream, VersionRelease,
};

use crate::{Error, Result};

pub const PKGBUILD: &str = "PKGBUILD";
pub const SRCINFO: &str = ".SRCINFO";
pub const SETTINGS: &str = ".settings.yaml";
pub const NAMCAP_IGNORE: &str = ".namcap_ignore";

// https://www.gnu.org/software/bash/manual/bash.html#Definitions
static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.+)$").expect("valid variable pattern")
});

/// One recipe directory and the settings read from it.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub path: PathBuf,
    pub settings: RecipeSettings,
    /// Settings exclusions followed by `.namcap_ignore` lines.
    pub lint_exclusions: Vec<String>,
}

impl Recipe {
    /// Load a recipe from its directory.
    pub fn from_dir(path: &Path) -> Result<Self> {
        debug!("Reading package info from {}", path.display());

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Recipe(format!("Couldn't read name of {}", path.display())))?
            .to_string();

        let settings_text = read_optional(&path.join(SETTINGS))?;
        let settings = RecipeSettings::parse(settings_text.as_deref())?;
        trace!("Loaded settings for {}: {:?}", name, settings);

        let mut lint_exclusions = settings.lint_exclusions().to_vec();
        if let Some(ignore) = read_optional(&path.join(NAMCAP_IGNORE))? {
            lint_exclusions.extend(
                ignore
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            );
        }
        trace!("{} lint exclusions for {}", lint_exclusions.len(), name);

        Ok(Self {
            name,
            path: path.to_path_buf(),
            settings,
            lint_exclusions,
        })
    }

    pub fn upstream(&self) -> Option<&Upstream> {
        self.settings.upstream.as_ref()
    }

    /// Top-level assignments of the PKGBUILD.
    pub fn variables(&self) -> Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(self.path.join(PKGBUILD))?;
        Ok(extract_variables(&content))
    }

    /// `pkgver` and `pkgrel` as declared by the PKGBUILD.
    pub fn local_version(&self) -> Result<VersionRelease> {
        let vars = self.variables()?;
        let get = |key: &str| {
            vars.get(key).ok_or_else(|| {
                Error::Recipe(format!("{} has no {} in its {}", self.name, key, PKGBUILD))
            })
        };
        let version = get("pkgver")?;
        let release = parse_release(get("pkgrel")?)
            .map_err(|e| Error::Recipe(format!("{}: {}", self.name, e)))?;
        Ok(VersionRelease::new(version.as_str(), release))
    }

    /// Parse the generated `.SRCINFO` next to the PKGBUILD.
    pub fn build_metadata(&self) -> Result<BuildMetadata> {
        let path = self.path.join(SRCINFO);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Recipe(format!("Couldn't read {}: {}", path.display(), e))
        })?;
        Ok(BuildMetadata::parse(&content)?)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Extract `name=value` assignments. Multi-line arrays are not followed,
/// only the first line of the assignment is kept.
pub fn extract_variables(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| VARIABLE_PATTERN.captures(line))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = unquote(caps.get(2)?.as_str().trim()).to_string();
            Some((name, value))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Load every recipe directory below `dir`, sorted by name.
pub fn scan_recipes(dir: &Path) -> Result<Vec<Recipe>> {
    debug!("Initializing package manager using '{}'", dir.display());
    if !dir.is_dir() {
        return Err(Error::Recipe(format!(
            "Package directory {} does not exist",
            dir.display()
        )));
    }

    let pattern = dir.join("*");
    let mut recipes = Vec::new();

    for entry in glob::glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_dir() => match Recipe::from_dir(&path) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    warn!("Failed to read recipe {}: {}", path.display(), e);
                }
            },
            Ok(path) => {
                warn!("File '{}' in package directory. Ignoring", path.display());
            }
            Err(e) => {
                warn!("Glob error: {}", e);
            }
        }
    }

    recipes.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Loaded {} packages", recipes.len());
    Ok(recipes)
}

/// Look up a scanned recipe by directory name.
pub fn find_recipe<'a>(recipes: &'a [Recipe], name: &str) -> Result<&'a Recipe> {
    recipes
        .iter()
        .find(|recipe| recipe.name == name)
        .ok_or_else(|| Error::NotFound(name.to_string()))
}
