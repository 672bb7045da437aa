//! Remote configuration documents with an on-disk fallback cache
//!
//! Remote documents are fetched with a short timeout. Every successful
//! fetch is written to `.swiftlint/RemoteConfigCache/v1/` under the working
//! directory so later runs can fall back to it when the network is slow or
//! unavailable.

use std::sync::Arc;
use std::time::Duration;

use lint_fs::{LintPath, NormalizedPath, gitignore, io};

use crate::{Error, Result, WarningSession};

/// Default timeout when no cached copy exists.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default timeout when a cached copy can be used as a fallback.
pub const DEFAULT_TIMEOUT_IF_CACHED: Duration = Duration::from_secs(1);

/// Why a remote document could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("response body is not valid UTF-8 text")]
    Undecodable,
    #[error("{0}")]
    Network(String),
}

/// Network access used to download remote documents.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<String, FetchError>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<String, FetchError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(e.to_string())
            }
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(classify)?;
        let response = client.get(url).send().map_err(classify)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().map_err(classify)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::Undecodable)
    }
}

/// Fetcher for runs without network access; every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl RemoteFetcher for OfflineFetcher {
    fn fetch(&self, _url: &str, _timeout: Duration) -> std::result::Result<String, FetchError> {
        Err(FetchError::Network("network access is disabled".to_string()))
    }
}

/// Fetches remote documents, maintaining and falling back to the cache.
#[derive(Clone)]
pub struct RemoteConfigCache {
    working_directory: NormalizedPath,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl std::fmt::Debug for RemoteConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfigCache")
            .field("working_directory", &self.working_directory)
            .finish_non_exhaustive()
    }
}

impl RemoteConfigCache {
    pub fn new(working_directory: NormalizedPath, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            working_directory,
            fetcher,
        }
    }

    /// Versioned directory cached documents are stored in.
    pub fn cache_directory(&self) -> NormalizedPath {
        self.working_directory
            .join(LintPath::RemoteCacheRoot.as_str())
            .join(LintPath::RemoteCacheVersion.as_str())
    }

    /// Deterministic cache file for `url`.
    ///
    /// Besides `/`, the characters `\ : < > " | ? *` become `_` and leading or
    /// trailing dots are trimmed, so the name is valid on every platform.
    pub fn cache_path_for(&self, url: &str) -> NormalizedPath {
        let name: String = url
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*' => '_',
                other => other,
            })
            .collect();
        self.cache_directory()
            .join(&format!("{}.yml", name.trim_matches('.')))
    }

    /// Fetch `url`, falling back to the cached copy on any failure.
    pub fn resolve(
        &self,
        url: &str,
        timeout: Duration,
        timeout_if_cached: Duration,
        session: &WarningSession,
    ) -> Result<String> {
        self.maintain();

        let cache_path = self.cache_path_for(url);
        let cached = cache_path.is_file();
        let budget = if cached { timeout_if_cached } else { timeout };

        tracing::debug!(url, cached, timeout = ?budget, "Fetching remote configuration");
        let failure = match self.fetcher.fetch(url, budget) {
            Ok(content) => match io::write_text(&cache_path, &with_provenance_header(url, &content)) {
                Ok(()) => return Ok(content),
                Err(e) => format!("could not write cache file {cache_path}: {e}"),
            },
            Err(FetchError::Timeout) => {
                return self.fall_back(
                    url,
                    &cache_path,
                    cached,
                    format!("Timeout ({} sec): ", budget.as_secs_f64()),
                    "request timed out".to_string(),
                    session,
                );
            }
            Err(e) => e.to_string(),
        };
        self.fall_back(url, &cache_path, cached, String::new(), failure, session)
    }

    fn fall_back(
        &self,
        url: &str,
        cache_path: &NormalizedPath,
        cached: bool,
        prefix: String,
        reason: String,
        session: &WarningSession,
    ) -> Result<String> {
        if cached {
            if let Ok(content) = io::read_text(cache_path) {
                session.warn_once(
                    format!("remote-fallback:{url}"),
                    format!("{prefix}Unable to load remote config from '{url}'. Using cached version as a fallback."),
                );
                return Ok(content);
            }
        }
        Err(Error::RemoteFetch {
            url: url.to_string(),
            reason: format!("{prefix}{reason}"),
        })
    }

    /// Create the versioned directory, drop stale versions, keep `.gitignore` current.
    ///
    /// Failures here never abort a run; they only cost the fallback.
    fn maintain(&self) {
        let directory = self.cache_directory();
        if let Err(e) = io::ensure_dir(&directory) {
            tracing::warn!(%directory, error = %e, "Could not create remote config cache directory");
            return;
        }

        let root = self.working_directory.join(LintPath::RemoteCacheRoot.as_str());
        match io::list_subdirectories(&root) {
            Ok(versions) => {
                for version in versions
                    .iter()
                    .filter(|v| v.as_str() != LintPath::RemoteCacheVersion.as_str())
                {
                    let stale = root.join(version);
                    if let Err(e) = io::remove_dir_all(&stale) {
                        tracing::warn!(%stale, error = %e, "Could not remove outdated cache");
                    }
                }
            }
            Err(e) => tracing::warn!(%root, error = %e, "Could not list cache versions"),
        }

        let gitignore_path = self.working_directory.join(LintPath::Gitignore.as_str());
        if let Err(e) = gitignore::ensure_entry(
            &gitignore_path,
            "Lint Remote Config Cache",
            LintPath::RemoteCacheRoot.as_str(),
        ) {
            tracing::warn!(path = %gitignore_path, error = %e, "Could not update .gitignore");
        }
    }
}

fn with_provenance_header(url: &str, content: &str) -> String {
    let now = chrono::Local::now();
    format!(
        "#\n# Automatically downloaded from {url} by lint on {}.\n#\n{content}",
        now.format("%d/%m/%Y at %H:%M:%S")
    )
}
