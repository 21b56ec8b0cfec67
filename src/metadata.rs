//! Repository references and the metadata lookup contract.
//!
//! A raw reference string is normalized into a [`RepoRef`] before any network
//! traffic happens; everything the remote returns is held in the read-only
//! [`RepositoryMetadata`] record. The lookup itself sits behind the
//! [`MetadataFetcher`] trait so the state machine can be exercised without a
//! live endpoint.

use crate::error::LookupError;
use crate::StudioConfig;
use serde::Deserialize;
use std::time::Duration;

/// A normalized `(owner, name)` repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Normalizes a free-text reference into an `(owner, name)` pair.
    ///
    /// Accepted shapes: `owner/name`, `github.com/owner/name`,
    /// `https://github.com/owner/name`, each optionally with a `www.` host
    /// prefix and/or trailing path segments (which are ignored). Anything
    /// that does not yield two non-empty segments is malformed.
    pub fn parse(raw: &str) -> std::result::Result<Self, LookupError> {
        let trimmed = raw.trim();
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let rest = rest.strip_prefix("www.").unwrap_or(rest);
        let rest = match rest.strip_prefix("github.com/") {
            Some(after_host) => after_host,
            None if rest == "github.com" => "",
            None => rest,
        };

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some(owner), Some(name)) => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(LookupError::MalformedReference),
        }
    }

    /// `owner/name` form, used in log lines.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Repository owner as the remote reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
}

/// Public repository metadata, deserialized straight off the wire.
///
/// Read-only once fetched; the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryMetadata {
    pub owner: RepoOwner,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

/// Contract the flow controller consumes to resolve a reference.
///
/// Implementations must be side-effect-free on failure and must not retry;
/// a transient failure is surfaced to the user, who may resubmit.
pub trait MetadataFetcher {
    fn resolve(&self, reference: &RepoRef) -> std::result::Result<RepositoryMetadata, LookupError>;
}

/// Production fetcher backed by the GitHub REST API.
///
/// The base URL is configurable so tests can point it at a local fixture
/// server.
pub struct GithubFetcher {
    client: reqwest::blocking::Client,
    api_base: String,
}

impl GithubFetcher {
    pub fn new(config: &StudioConfig) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| crate::Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

impl MetadataFetcher for GithubFetcher {
    fn resolve(&self, reference: &RepoRef) -> std::result::Result<RepositoryMetadata, LookupError> {
        let url = format!("{}/repos/{}/{}", self.api_base, reference.owner, reference.name);
        log::debug!("resolving {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| LookupError::Transient(format!("request failed: {e}")))?;

        let status = response.status();
        match status.as_u16() {
            404 => return Err(LookupError::NotFound),
            403 | 429 => return Err(LookupError::RateLimited),
            _ if !status.is_success() => {
                return Err(LookupError::Transient(format!("unexpected status {status}")))
            }
            _ => {}
        }

        let body = response
            .text()
            .map_err(|e| LookupError::Transient(format!("failed to read response body: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| LookupError::Transient(format!("malformed metadata body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_prefix_forms_normalize_identically() {
        let forms = [
            "octocat/Hello-World",
            "github.com/octocat/Hello-World",
            "www.github.com/octocat/Hello-World",
            "https://github.com/octocat/Hello-World",
            "https://www.github.com/octocat/Hello-World",
            "https://github.com/octocat/Hello-World/tree/main/src",
        ];
        let expected = RepoRef {
            owner: "octocat".to_string(),
            name: "Hello-World".to_string(),
        };
        for form in forms {
            assert_eq!(RepoRef::parse(form).unwrap(), expected, "form: {form}");
        }
    }

    #[test]
    fn malformed_references_are_rejected() {
        for raw in ["", "   ", "octocat", "https://github.com/", "github.com", "///"] {
            assert_eq!(
                RepoRef::parse(raw),
                Err(LookupError::MalformedReference),
                "raw: {raw:?}"
            );
        }
    }

    #[test]
    fn empty_segments_are_dropped() {
        let parsed = RepoRef::parse("github.com//octocat//Hello-World//").unwrap();
        assert_eq!(parsed.slug(), "octocat/Hello-World");
    }

    #[test]
    fn metadata_deserializes_github_shape() {
        let body = r#"{
            "owner": {"login": "octocat", "avatar_url": "https://example.test/a.png"},
            "name": "Hello-World",
            "description": null,
            "stargazers_count": 1500,
            "forks_count": 1000,
            "language": null
        }"#;
        let metadata: RepositoryMetadata = serde_json::from_str(body).unwrap();
        assert_eq!(metadata.owner.login, "octocat");
        assert_eq!(metadata.stargazers_count, 1500);
        assert!(metadata.description.is_none());
        assert!(metadata.language.is_none());
    }
}
