//! Remote version sources
//!
//! The AUR RPC (v5) tells us what is published, PyPI and GitHub releases
//! tell us what upstream has shipped.

use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, trace};

use aurpack_meta::{Upstream, UpstreamKind, VersionRelease};

use crate::config::Config;
use crate::{Error, Result};

const AUR_RPC_VERSION: u32 = 5;
const AUR_INFO_TYPE: &str = "multiinfo";
const CONCURRENT_REQUESTS: usize = 4;

/// One package entry of an AUR `info` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub make_depends: Vec<String>,
}

impl PackageInfo {
    pub fn version_release(&self) -> Result<VersionRelease> {
        Ok(self.version.parse::<VersionRelease>()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Vec<PackageInfo>,
}

impl InfoResponse {
    /// Reject anything that isn't a v5 multiinfo answer.
    pub fn into_results(self) -> Result<Vec<PackageInfo>> {
        if let Some(error) = self.error {
            return Err(Error::Registry(format!("AUR returned an error: {}", error)));
        }
        if self.version != AUR_RPC_VERSION {
            return Err(Error::Registry(format!(
                "Unexpected AUR RPC version {} (expected {})",
                self.version, AUR_RPC_VERSION
            )));
        }
        if self.kind != AUR_INFO_TYPE {
            return Err(Error::Registry(format!(
                "Unexpected AUR response type '{}'",
                self.kind
            )));
        }
        Ok(self.results)
    }
}

#[derive(Debug, Deserialize)]
struct PypiProject {
    info: PypiInfo,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
}

/// Split `names` into AUR info request URLs no longer than `max_len`.
///
/// A single name that doesn't fit on its own still gets its own request.
pub fn batch_info_urls(base: &str, names: &[&str], max_len: usize) -> Result<Vec<Url>> {
    let base = Url::parse(base)
        .map_err(|e| Error::Registry(format!("Invalid AUR RPC URL '{}': {}", base, e)))?;

    let mut urls = Vec::new();
    let mut current: Option<Url> = None;

    for name in names {
        let mut candidate = current.clone().unwrap_or_else(|| base.clone());
        candidate.query_pairs_mut().append_pair("arg[]", name);

        match current.take() {
            Some(full) if candidate.as_str().len() > max_len => {
                urls.push(full);
                let mut fresh = base.clone();
                fresh.query_pairs_mut().append_pair("arg[]", name);
                current = Some(fresh);
            }
            _ => current = Some(candidate),
        }
    }

    urls.extend(current);
    Ok(urls)
}

/// GitHub tags are usually `v1.2.3`; versions are compared without the `v`.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

#[derive(Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    aur_rpc_url: String,
    pypi_url: String,
    github_api_url: String,
    max_request_len: usize,
    github_token: Option<String>,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(&config.user_agent)
                .build()
                .expect("Failed to create HTTP client"),
            aur_rpc_url: config.aur_rpc_url.clone(),
            pypi_url: config.pypi_url.trim_end_matches('/').to_string(),
            github_api_url: config.github_api_url.trim_end_matches('/').to_string(),
            max_request_len: config.max_request_len,
            github_token: config.github_token.clone(),
        }
    }

    async fn fetch_info(&self, url: Url) -> Result<Vec<PackageInfo>> {
        trace!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Registry(format!(
                "AUR info request failed: {}",
                response.status()
            )));
        }

        let body: InfoResponse = response.json().await.map_err(Error::Http)?;
        body.into_results()
    }

    /// AUR info for every name that exists on the registry.
    pub async fn info(&self, names: &[&str]) -> Result<Vec<PackageInfo>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let urls = batch_info_urls(&self.aur_rpc_url, names, self.max_request_len)?;
        debug!("Querying AUR for {} package(s) in {} request(s)", names.len(), urls.len());

        let batches: Vec<Vec<PackageInfo>> = stream::iter(urls)
            .map(|url| self.fetch_info(url))
            .buffered(CONCURRENT_REQUESTS)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }

    /// Version currently published to the AUR, `None` if not published.
    pub async fn published_version(&self, name: &str) -> Result<Option<VersionRelease>> {
        let infos = self.info(&[name]).await?;
        infos
            .iter()
            .find(|info| info.name == name)
            .map(PackageInfo::version_release)
            .transpose()
    }

    /// Latest release of a PyPI project (`info.version`).
    pub async fn pypi_version(&self, project: &str) -> Result<String> {
        let url = format!("{}/{}/json", self.pypi_url, project);
        trace!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        if response.status().as_u16() == 404 {
            return Err(Error::NotFound(format!("pypi:{}", project)));
        }
        if !response.status().is_success() {
            return Err(Error::Registry(format!(
                "Failed to fetch PyPI project {}: {}",
                project,
                response.status()
            )));
        }

        let body: PypiProject = response.json().await.map_err(Error::Http)?;
        Ok(body.info.version)
    }

    /// Tag of the latest GitHub release of `owner/repo`, without a leading `v`.
    pub async fn github_version(&self, repository: &str) -> Result<String> {
        let url = format!("{}/repos/{}/releases/latest", self.github_api_url, repository);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &self.github_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| Error::Registry("Invalid token".into()))?,
            );
        }

        trace!("GET {}", url);
        let response = self.client.get(&url).headers(headers).send().await?;

        if response.status().as_u16() == 404 {
            return Err(Error::NotFound(format!("github:{}", repository)));
        }
        if !response.status().is_success() {
            return Err(Error::Registry(format!(
                "Failed to fetch latest release of {}: {}",
                repository,
                response.status()
            )));
        }

        let release: GithubRelease = response.json().await.map_err(Error::Http)?;
        Ok(strip_tag_prefix(&release.tag_name).to_string())
    }

    /// Current upstream version for the configured release feed.
    pub async fn upstream_version(&self, upstream: &Upstream) -> Result<String> {
        debug!("Fetching {} version of {}", upstream.kind, upstream.name);
        match upstream.kind {
            UpstreamKind::Pypi => self.pypi_version(&upstream.name).await,
            UpstreamKind::Github => self.github_version(&upstream.name).await,
        }
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
