use thiserror::Error;

/// Failure while reading a generated `.SRCINFO` document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: already read a pkgbase section")]
    AlreadyHasBase { line: usize },

    #[error("line {line}: value for {key} already exists in section {section}")]
    DuplicateField {
        key: String,
        section: String,
        line: usize,
    },

    #[error("line {line}: {key} can only be used in a pkgbase section (found in {section})")]
    WrongSection {
        key: String,
        section: String,
        line: usize,
    },

    #[error("line {line}: unknown key {key}")]
    UnknownField { key: String, line: usize },

    #[error("line {line}: {key} appears before any pkgbase or pkgname")]
    NoSection { key: String, line: usize },

    #[error("line {line}: package {name} is defined twice")]
    DuplicatePackage { name: String, line: usize },

    #[error("document has no pkgbase section")]
    MissingBase,
}

/// Recipe settings document does not match its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid recipe settings: {message}")]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error(
        "cannot compare {left} ({left_segments} segments) with {right} ({right_segments} segments)"
    )]
    FormatMismatch {
        left: String,
        right: String,
        left_segments: usize,
        right_segments: usize,
    },

    #[error("invalid segment {segment:?} in version {version}")]
    InvalidVersion { version: String, segment: String },

    #[error("epochs are not supported (version {version})")]
    EpochUnsupported { version: String },

    #[error("invalid release {0:?}")]
    InvalidRelease(String),

    #[error("no {0} field")]
    MissingField(String),
}

/// Publishing preconditions that were not met.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("release must be {expected} for version {version} (found {found})")]
    ReleaseNotIncremented {
        version: String,
        expected: u64,
        found: u32,
    },

    #[error("release must reset to 1 when the version changes (found {found})")]
    ReleaseMustResetOnBump { found: u32 },

    #[error("local version {local} is not newer than published version {published}")]
    VersionNotNewer { local: String, published: String },

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Version sources that disagree with each other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("upstream version {upstream} is ahead of local version {local}")]
    UpstreamAhead { upstream: String, local: String },

    #[error("local version {local} is ahead of upstream version {upstream}")]
    LocalAheadOfUpstream { upstream: String, local: String },

    #[error("registry version {registry} is ahead of local version {local}")]
    RegistryAheadOfLocal { registry: String, local: String },

    #[error("generated metadata version {metadata} does not match recipe version {recipe}")]
    MetadataMismatch { recipe: String, metadata: String },

    #[error(transparent)]
    Version(#[from] VersionError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("SRCINFO parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("Publish gate failed: {0}")]
    Gate(#[from] GateError),

    #[error("Inconsistent versions: {0}")]
    Consistency(#[from] ConsistencyError),
}

pub type Result<T> = std::result::Result<T, Error>;
