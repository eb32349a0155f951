use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error(transparent)]
    Meta(#[from] aurpack_meta::Error),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Recipe error: {0}")]
    Recipe(String),

    #[error("No package exists with the name {0}")]
    NotFound(String),

    #[error("Lint found {0} unexpected line(s)")]
    Lint(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! from_meta {
    ($($kind:ident),*) => {
        $(
            impl From<aurpack_meta::$kind> for Error {
                fn from(err: aurpack_meta::$kind) -> Self {
                    Error::Meta(err.into())
                }
            }
        )*
    };
}

from_meta!(ParseError, SchemaError, VersionError, GateError, ConsistencyError);
