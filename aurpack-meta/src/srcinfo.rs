//! `.SRCINFO` parsing
//!
//! The document generated by `makepkg --printsrcinfo` is a list of
//! `key = value` lines. A `pkgbase` line opens the base section and every
//! `pkgname` line opens a sub-package section. Lines of any other shape
//! are skipped.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{ParseError, VersionError};
use crate::version::{parse_release, VersionRelease};

pub const BASE_MARKER: &str = "pkgbase";
pub const PACKAGE_MARKER: &str = "pkgname";

/// Single-valued fields allowed in any section.
pub const SCALAR_FIELDS: [&str; 4] = ["pkgdesc", "url", "install", "changelog"];

/// Single-valued fields only allowed in the pkgbase section.
pub const BASE_FIELDS: [&str; 3] = ["pkgver", "pkgrel", "epoch"];

/// Repeatable fields without architecture variants.
pub const ARRAY_FIELDS: [&str; 7] = [
    "arch",
    "groups",
    "license",
    "noextract",
    "options",
    "backup",
    "validpgpkeys",
];

/// Repeatable fields that may also carry an `_<arch>` suffix.
pub const ARCH_FIELDS: [&str; 16] = [
    "source",
    "depends",
    "makedepends",
    "checkdepends",
    "optdepends",
    "provides",
    "conflicts",
    "replaces",
    "md5sums",
    "sha1sums",
    "sha224sums",
    "sha256sums",
    "sha384sums",
    "sha512sums",
    "b2sums",
    "cksums",
];

const DEPENDENCY_FIELDS: [&str; 3] = ["depends", "makedepends", "checkdepends"];

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").expect("valid line pattern")
});

/// How a key behaves while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    BaseMarker,
    PackageMarker,
    Scalar,
    BaseScalar,
    Repeatable,
    Unknown,
}

/// Classify a key. Architecture-specific keys such as `depends_x86_64`
/// are repeatable when the part before the first underscore is.
pub fn classify(key: &str) -> FieldKind {
    if key == BASE_MARKER {
        return FieldKind::BaseMarker;
    }
    if key == PACKAGE_MARKER {
        return FieldKind::PackageMarker;
    }
    if SCALAR_FIELDS.contains(&key) {
        return FieldKind::Scalar;
    }
    if BASE_FIELDS.contains(&key) {
        return FieldKind::BaseScalar;
    }
    if ARRAY_FIELDS.contains(&key) || ARCH_FIELDS.contains(&key) {
        return FieldKind::Repeatable;
    }
    match key.split_once('_') {
        Some((prefix, _)) if ARCH_FIELDS.contains(&prefix) => FieldKind::Repeatable,
        _ => FieldKind::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::List(_) => None,
        }
    }

    /// Values in encounter order. A single value is a one-element slice.
    pub fn values(&self) -> &[String] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::List(values) => values,
        }
    }
}

pub type Section = IndexMap<String, FieldValue>;

/// Parsed `.SRCINFO` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub base: Section,
    pub packages: IndexMap<String, Section>,
}

impl BuildMetadata {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        text.lines()
            .enumerate()
            .filter_map(|(index, line)| {
                split_line(line).map(|(key, value)| (index + 1, key, value))
            })
            .try_fold(Accumulator::default(), |acc, (line, key, value)| {
                acc.apply(line, key, value)
            })?
            .finish()
    }

    fn base_str(&self, key: &str) -> Option<&str> {
        self.base.get(key).and_then(FieldValue::as_str)
    }

    pub fn pkgbase(&self) -> Option<&str> {
        self.base_str(BASE_MARKER)
    }

    pub fn version(&self) -> Option<&str> {
        self.base_str("pkgver")
    }

    pub fn release(&self) -> Option<&str> {
        self.base_str("pkgrel")
    }

    pub fn epoch(&self) -> Option<&str> {
        self.base_str("epoch")
    }

    pub fn version_release(&self) -> Result<VersionRelease, VersionError> {
        let version = self
            .version()
            .ok_or_else(|| VersionError::MissingField("pkgver".to_string()))?;
        let release = self
            .release()
            .ok_or_else(|| VersionError::MissingField("pkgrel".to_string()))?;
        Ok(VersionRelease::new(version, parse_release(release)?))
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Runtime, build and check dependencies of every section,
    /// architecture-specific ones included, deduplicated in order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        let sections = std::iter::once(&self.base).chain(self.packages.values());
        for section in sections {
            for (key, value) in section {
                let prefix = key.split('_').next().unwrap_or(key);
                if !DEPENDENCY_FIELDS.contains(&prefix) {
                    continue;
                }
                for dep in value.values() {
                    if !deps.contains(&dep.as_str()) {
                        deps.push(dep);
                    }
                }
            }
        }
        deps
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let captures = LINE_PATTERN.captures(line)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

#[derive(Debug, Clone)]
enum Cursor {
    Base,
    Package(String),
}

#[derive(Debug, Default)]
struct Accumulator {
    base: Option<Section>,
    packages: IndexMap<String, Section>,
    current: Option<Cursor>,
}

impl Accumulator {
    fn apply(mut self, line: usize, key: &str, value: &str) -> Result<Self, ParseError> {
        match classify(key) {
            FieldKind::Unknown => Err(ParseError::UnknownField {
                key: key.to_string(),
                line,
            }),
            FieldKind::BaseMarker => {
                if self.base.is_some() {
                    return Err(ParseError::AlreadyHasBase { line });
                }
                let mut section = Section::new();
                section.insert(key.to_string(), FieldValue::Single(value.to_string()));
                self.base = Some(section);
                self.current = Some(Cursor::Base);
                Ok(self)
            }
            FieldKind::PackageMarker => {
                if self.packages.contains_key(value) {
                    return Err(ParseError::DuplicatePackage {
                        name: value.to_string(),
                        line,
                    });
                }
                let mut section = Section::new();
                section.insert(key.to_string(), FieldValue::Single(value.to_string()));
                self.packages.insert(value.to_string(), section);
                self.current = Some(Cursor::Package(value.to_string()));
                Ok(self)
            }
            FieldKind::BaseScalar => {
                if let Some(Cursor::Package(name)) = &self.current {
                    return Err(ParseError::WrongSection {
                        key: key.to_string(),
                        section: name.clone(),
                        line,
                    });
                }
                self.set_scalar(line, key, value)
            }
            FieldKind::Scalar => self.set_scalar(line, key, value),
            FieldKind::Repeatable => {
                let (_, section) = self.current_section(line, key)?;
                let entry = section
                    .entry(key.to_string())
                    .or_insert_with(|| FieldValue::List(Vec::new()));
                match entry {
                    FieldValue::List(values) => values.push(value.to_string()),
                    FieldValue::Single(existing) => {
                        *entry = FieldValue::List(vec![existing.clone(), value.to_string()])
                    }
                }
                Ok(self)
            }
        }
    }

    fn set_scalar(mut self, line: usize, key: &str, value: &str) -> Result<Self, ParseError> {
        let (label, section) = self.current_section(line, key)?;
        if section.contains_key(key) {
            return Err(ParseError::DuplicateField {
                key: key.to_string(),
                section: label,
                line,
            });
        }
        section.insert(key.to_string(), FieldValue::Single(value.to_string()));
        Ok(self)
    }

    fn current_section(
        &mut self,
        line: usize,
        key: &str,
    ) -> Result<(String, &mut Section), ParseError> {
        let no_section = || ParseError::NoSection {
            key: key.to_string(),
            line,
        };
        match &self.current {
            Some(Cursor::Base) => {
                let section = self.base.as_mut().ok_or_else(no_section)?;
                Ok((BASE_MARKER.to_string(), section))
            }
            Some(Cursor::Package(name)) => {
                let label = name.clone();
                let section = self.packages.get_mut(name).ok_or_else(no_section)?;
                Ok((label, section))
            }
            None => Err(no_section()),
        }
    }

    fn finish(self) -> Result<BuildMetadata, ParseError> {
        Ok(BuildMetadata {
            base: self.base.ok_or(ParseError::MissingBase)?,
            packages: self.packages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLIT_PACKAGE: &str = r#"pkgbase = python-mopidy-mopify
	pkgdesc = A web client for Mopidy
	pkgver = 1.7.3
	pkgrel = 2
	url = https://github.com/dirkgroenen/mopidy-mopify
	arch = any
	license = GPL3
	makedepends = python-setuptools
	depends = mopidy
	depends = python-tornado
	source = https://files.pythonhosted.org/mopidy-mopify-1.7.3.tar.gz
	sha256sums = 4a0c5e1a2d
	sha256sums_x86_64 = deadbeef

pkgname = python-mopidy-mopify
	depends = python-requests
	provides = mopidy-mopify

pkgname = python-mopidy-mopify-docs
	pkgdesc = Documentation for mopidy-mopify
	arch = any
"#;

    #[test]
    fn test_parse_split_package() {
        let metadata = BuildMetadata::parse(SPLIT_PACKAGE).unwrap();

        assert_eq!(metadata.pkgbase(), Some("python-mopidy-mopify"));
        assert_eq!(metadata.version(), Some("1.7.3"));
        assert_eq!(metadata.release(), Some("2"));
        assert_eq!(metadata.epoch(), None);
        assert_eq!(
            metadata.version_release().unwrap(),
            VersionRelease::new("1.7.3", 2)
        );

        let names: Vec<&str> = metadata.package_names().collect();
        assert_eq!(names, vec!["python-mopidy-mopify", "python-mopidy-mopify-docs"]);

        let docs = &metadata.packages["python-mopidy-mopify-docs"];
        assert_eq!(
            docs["pkgname"],
            FieldValue::Single("python-mopidy-mopify-docs".to_string())
        );
        assert_eq!(
            docs["pkgdesc"].as_str(),
            Some("Documentation for mopidy-mopify")
        );
        assert_eq!(
            metadata.base["sha256sums_x86_64"],
            FieldValue::List(vec!["deadbeef".to_string()])
        );
    }

    #[test]
    fn test_repeated_array_field_keeps_order() {
        let text = "pkgbase = foo\n\
                    depends = c\n\
                    depends = a\n\
                    depends = b\n";
        let metadata = BuildMetadata::parse(text).unwrap();
        assert_eq!(
            metadata.base["depends"].values(),
            &["c".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_whitespace_and_junk_lines() {
        let text = "# Generated by makepkg\n\
                    \n\
                    pkgbase=foo\n\
                    this line is ignored\n\
                       pkgver   =   1.0   \n\
                    pkgrel = 1\n";
        let metadata = BuildMetadata::parse(text).unwrap();
        assert_eq!(metadata.pkgbase(), Some("foo"));
        assert_eq!(metadata.version(), Some("1.0"));
    }

    #[test]
    fn test_second_base_fails() {
        let text = "pkgbase = foo\npkgname = foo\npkgbase = bar\n";
        assert_eq!(
            BuildMetadata::parse(text).unwrap_err(),
            ParseError::AlreadyHasBase { line: 3 }
        );
    }

    #[test]
    fn test_unknown_field_names_key() {
        let text = "pkgbase = foo\nfoobar = x\n";
        match BuildMetadata::parse(text).unwrap_err() {
            ParseError::UnknownField { key, line } => {
                assert_eq!(key, "foobar");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }

        // classification happens before any section check
        assert!(matches!(
            BuildMetadata::parse("foobar = x"),
            Err(ParseError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_duplicate_scalar_fails() {
        let text = "pkgbase = foo\npkgdesc = one\npkgdesc = two\n";
        assert_eq!(
            BuildMetadata::parse(text).unwrap_err(),
            ParseError::DuplicateField {
                key: "pkgdesc".to_string(),
                section: "pkgbase".to_string(),
                line: 3,
            }
        );
    }

    #[test]
    fn test_duplicate_base_field_fails() {
        let text = "pkgbase = foo\n\tpkgver = 1.0\n\tpkgrel = 1\n\tpkgver = 1.1\n";
        assert_eq!(
            BuildMetadata::parse(text).unwrap_err(),
            ParseError::DuplicateField {
                key: "pkgver".to_string(),
                section: "pkgbase".to_string(),
                line: 4,
            }
        );
    }

    #[test]
    fn test_scalar_is_section_scoped() {
        let text = "pkgbase = foo\npkgdesc = base\npkgname = foo\npkgdesc = override\n";
        let metadata = BuildMetadata::parse(text).unwrap();
        assert_eq!(metadata.base["pkgdesc"].as_str(), Some("base"));
        assert_eq!(metadata.packages["foo"]["pkgdesc"].as_str(), Some("override"));
    }

    #[test]
    fn test_base_field_in_package_fails() {
        let text = "pkgbase = foo\npkgver = 1.0\npkgname = foo\npkgver = 2.0\n";
        assert_eq!(
            BuildMetadata::parse(text).unwrap_err(),
            ParseError::WrongSection {
                key: "pkgver".to_string(),
                section: "foo".to_string(),
                line: 4,
            }
        );
    }

    #[test]
    fn test_field_before_section_fails() {
        assert!(matches!(
            BuildMetadata::parse("pkgdesc = orphan\npkgbase = foo\n"),
            Err(ParseError::NoSection { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_base_fails() {
        assert_eq!(
            BuildMetadata::parse("pkgname = foo\n").unwrap_err(),
            ParseError::MissingBase
        );
        assert_eq!(BuildMetadata::parse("").unwrap_err(), ParseError::MissingBase);
    }

    #[test]
    fn test_duplicate_package_fails() {
        let text = "pkgbase = foo\npkgname = foo\npkgname = foo\n";
        assert!(matches!(
            BuildMetadata::parse(text),
            Err(ParseError::DuplicatePackage { line: 3, .. })
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("pkgbase"), FieldKind::BaseMarker);
        assert_eq!(classify("pkgname"), FieldKind::PackageMarker);
        assert_eq!(classify("url"), FieldKind::Scalar);
        assert_eq!(classify("epoch"), FieldKind::BaseScalar);
        assert_eq!(classify("license"), FieldKind::Repeatable);
        assert_eq!(classify("depends_aarch64"), FieldKind::Repeatable);
        assert_eq!(classify("license_x86_64"), FieldKind::Unknown);
        assert_eq!(classify("pkgdesc_x86_64"), FieldKind::Unknown);
    }

    #[test]
    fn test_dependencies() {
        let metadata = BuildMetadata::parse(SPLIT_PACKAGE).unwrap();
        assert_eq!(
            metadata.dependencies(),
            vec![
                "python-setuptools",
                "mopidy",
                "python-tornado",
                "python-requests"
            ]
        );
    }

    #[test]
    fn test_missing_version() {
        let metadata = BuildMetadata::parse("pkgbase = foo\npkgrel = 1\n").unwrap();
        assert_eq!(
            metadata.version_release().unwrap_err(),
            VersionError::MissingField("pkgver".to_string())
        );
    }

    #[test]
    fn test_serializes_lists_and_scalars() {
        let metadata = BuildMetadata::parse("pkgbase = foo\narch = any\n").unwrap();
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["base"]["pkgbase"], "foo");
        assert_eq!(json["base"]["arch"][0], "any");
    }
}
