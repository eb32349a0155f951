//! Runtime configuration shared by the collaborators.

use std::path::PathBuf;

pub const AUR_RPC_URL: &str = "https://aur.archlinux.org/rpc/?v=5&type=info";
pub const PYPI_URL: &str = "https://pypi.org/pypi";
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Longest request URI the AUR accepts.
pub const MAX_REQUEST_LEN: usize = 4443;

/// Newspaper-column width used for list output.
pub const LINE_WIDTH: usize = 66;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one sub-directory per recipe.
    pub packages_dir: PathBuf,
    pub line_width: usize,
    pub user_agent: String,
    pub aur_rpc_url: String,
    pub pypi_url: String,
    pub github_api_url: String,
    pub max_request_len: usize,
    pub github_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
            line_width: LINE_WIDTH,
            user_agent: format!("aurpack/{}", env!("CARGO_PKG_VERSION")),
            aur_rpc_url: AUR_RPC_URL.to_string(),
            pypi_url: PYPI_URL.to_string(),
            github_api_url: GITHUB_API_URL.to_string(),
            max_request_len: MAX_REQUEST_LEN,
            github_token: None,
        }
    }
}

impl Config {
    pub fn with_packages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.packages_dir = dir.into();
        self
    }
}
