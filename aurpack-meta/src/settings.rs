//! Per-recipe settings (`.settings.yaml`)
//!
//! ```yaml
//! upstream:
//!   type: pypi
//!   name: Mopidy-Mopify
//! namcap:
//!   exclude_lines:
//!     - "python-mopidy-mopify W: Dependency included and not needed ('python')"
//! history:
//!   "1.6.1": "upstream yanked this release"
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SchemaError;

/// Release feeds that can be tracked for new upstream versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamKind {
    Pypi,
    Github,
}

impl UpstreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamKind::Pypi => "pypi",
            UpstreamKind::Github => "github",
        }
    }
}

impl fmt::Display for UpstreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Upstream {
    #[serde(rename = "type")]
    pub kind: UpstreamKind,
    /// Project name on PyPI, or `owner/repo` on GitHub.
    #[serde(deserialize_with = "string")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintSettings {
    #[serde(default, deserialize_with = "string_list")]
    pub exclude_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeSettings {
    #[serde(default, deserialize_with = "string_map")]
    pub history: BTreeMap<String, String>,

    #[serde(default)]
    pub upstream: Option<Upstream>,

    #[serde(default)]
    pub namcap: LintSettings,
}

impl RecipeSettings {
    /// Parse a settings document. `None` (no file) gives the defaults.
    pub fn parse(text: Option<&str>) -> Result<Self, SchemaError> {
        let Some(text) = text else {
            return Ok(Self::default());
        };
        if is_blank_document(text) {
            return Ok(Self::default());
        }

        let settings: Self =
            serde_yaml::from_str(text).map_err(|e| SchemaError::new(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if let Some(upstream) = &self.upstream {
            if upstream.name.trim().is_empty() {
                return Err(SchemaError::new(format!(
                    "upstream.name must not be empty for {} upstream",
                    upstream.kind
                )));
            }
        }
        Ok(())
    }

    pub fn lint_exclusions(&self) -> &[String] {
        &self.namcap.exclude_lines
    }
}

// YAML scalars like `5` or `true` would otherwise coerce into `String`.

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn expect_string<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(E::custom(format!(
            "expected a string, found a {}",
            kind(&other)
        ))),
    }
}

fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    expect_string(Value::deserialize(deserializer)?)
}

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items.into_iter().map(expect_string).collect(),
        other => Err(D::Error::custom(format!(
            "expected a list of strings, found a {}",
            kind(&other)
        ))),
    }
}

fn string_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Mapping(entries) => entries
            .into_iter()
            .map(|(key, value)| {
                Ok((
                    expect_string::<D::Error>(key)?,
                    expect_string::<D::Error>(value)?,
                ))
            })
            .collect(),
        other => Err(D::Error::custom(format!(
            "expected a mapping of strings, found a {}",
            kind(&other)
        ))),
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_equals_empty() {
        let absent = RecipeSettings::parse(None).unwrap();
        assert_eq!(absent, RecipeSettings::default());
        assert_eq!(RecipeSettings::parse(Some("")).unwrap(), absent);
        assert_eq!(RecipeSettings::parse(Some("{}")).unwrap(), absent);
        assert_eq!(RecipeSettings::parse(Some("# nothing yet\n")).unwrap(), absent);
    }

    #[test]
    fn test_defaults() {
        let settings = RecipeSettings::parse(None).unwrap();
        assert!(settings.upstream.is_none());
        assert!(settings.lint_exclusions().is_empty());
        assert!(settings.history.is_empty());
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
upstream:
  type: pypi
  name: Mopidy-Mopify
namcap:
  exclude_lines:
    - "W: Dependency included and not needed ('python')"
history:
  "1.6.1": "yanked"
"#;
        let settings = RecipeSettings::parse(Some(yaml)).unwrap();
        assert_eq!(
            settings.upstream,
            Some(Upstream {
                kind: UpstreamKind::Pypi,
                name: "Mopidy-Mopify".to_string(),
            })
        );
        assert_eq!(
            settings.lint_exclusions(),
            &["W: Dependency included and not needed ('python')".to_string()]
        );
        assert_eq!(settings.history.get("1.6.1").map(String::as_str), Some("yanked"));
    }

    #[test]
    fn test_github_upstream() {
        let yaml = "upstream:\n  type: github\n  name: camas/aur-packages\n";
        let settings = RecipeSettings::parse(Some(yaml)).unwrap();
        assert_eq!(settings.upstream.unwrap().kind, UpstreamKind::Github);
    }

    #[test]
    fn test_unsupported_upstream_type() {
        let yaml = "upstream:\n  type: crates\n  name: foo\n";
        assert!(RecipeSettings::parse(Some(yaml)).is_err());
    }

    #[test]
    fn test_upstream_requires_name() {
        assert!(RecipeSettings::parse(Some("upstream:\n  type: pypi\n")).is_err());
        assert!(RecipeSettings::parse(Some("upstream:\n  type: pypi\n  name: ''\n")).is_err());
    }

    #[test]
    fn test_non_string_scalars_rejected() {
        assert!(RecipeSettings::parse(Some("history:\n  \"1.0\": 5\n")).is_err());
        assert!(RecipeSettings::parse(Some("history:\n  1.0: yanked\n")).is_err());
        assert!(RecipeSettings::parse(Some("namcap:\n  exclude_lines: [5, true]\n")).is_err());
        assert!(RecipeSettings::parse(Some("upstream:\n  type: pypi\n  name: 123\n")).is_err());
    }

    #[test]
    fn test_quoted_scalars_accepted() {
        let yaml = "upstream:\n  type: pypi\n  name: \"123\"\nnamcap:\n  exclude_lines: [\"5\"]\n";
        let settings = RecipeSettings::parse(Some(yaml)).unwrap();
        assert_eq!(settings.upstream.as_ref().unwrap().name, "123");
        assert_eq!(settings.lint_exclusions(), &["5".to_string()]);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(RecipeSettings::parse(Some("colour: blue\n")).is_err());
        assert!(RecipeSettings::parse(Some("namcap:\n  exclude: []\n")).is_err());
        assert!(
            RecipeSettings::parse(Some("upstream:\n  type: pypi\n  name: a\n  url: b\n")).is_err()
        );
    }

    #[test]
    fn test_wrong_shapes_rejected() {
        assert!(RecipeSettings::parse(Some("history: [a, b]\n")).is_err());
        assert!(RecipeSettings::parse(Some("namcap:\n  exclude_lines: 5\n")).is_err());
        assert!(RecipeSettings::parse(Some("- just\n- a list\n")).is_err());
    }
}
