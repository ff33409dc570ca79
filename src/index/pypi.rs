//! PyPI JSON API client.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use super::VersionSource;
use crate::error::{FloorError, Result};
use crate::requirements::Version;

/// Default JSON API root.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    yanked: bool,
}

/// Queries `{index_url}/{name}/json` for the release list.
pub struct PypiClient {
    client: Client,
    index_url: String,
}

impl PypiClient {
    /// Create a client for the given index root with a 30-second timeout.
    pub fn new(index_url: &str) -> Result<Self> {
        Self::with_timeout(index_url, Duration::from_secs(30))
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(index_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("floorcheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FloorError::Other(e.into()))?;
        Ok(Self {
            client,
            index_url: index_url.trim_end_matches('/').to_string(),
        })
    }

    /// The index root this client talks to.
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/{}/json", self.index_url, name)
    }
}

impl VersionSource for PypiClient {
    fn releases(&self, name: &str) -> Result<Vec<Version>> {
        let url = self.project_url(name);
        tracing::debug!("GET {}", url);

        let unavailable = |message: String| FloorError::IndexUnavailable {
            name: name.to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FloorError::PackageNotFound {
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {} fetching {}", response.status(), url)));
        }

        let body: ProjectResponse = response
            .json()
            .map_err(|e| unavailable(format!("unreadable response: {}", e)))?;

        let mut versions = Vec::new();
        for (raw, files) in body.releases {
            // Releases without files cannot be installed; fully yanked ones
            // are skipped by installers unless pinned.
            if files.is_empty() || files.iter().all(|f| f.yanked) {
                continue;
            }
            match raw.parse::<Version>() {
                Ok(v) => versions.push(v),
                Err(_) => tracing::debug!("Skipping unparseable version {} of {}", raw, name),
            }
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> PypiClient {
        PypiClient::with_timeout(&server.url("/pypi/"), Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn lists_installable_releases() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pypi/attrs/json");
            then.status(200).json_body(json!({
                "info": {"name": "attrs"},
                "releases": {
                    "17.4.0": [{"filename": "attrs-17.4.0.tar.gz", "yanked": false}],
                    "18.1.0": [{"filename": "attrs-18.1.0.tar.gz"}],
                    "19.0.0": [],
                    "19.1.0": [{"filename": "attrs-19.1.0.tar.gz", "yanked": true}],
                    "not-a-version": [{"filename": "x.tar.gz"}]
                }
            }));
        });

        let mut versions = client_for(&server).releases("attrs").unwrap();
        versions.sort();
        let listed: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(listed, vec!["17.4.0", "18.1.0"]);
    }

    #[test]
    fn unknown_package_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pypi/nope/json");
            then.status(404).body("Not Found");
        });

        let err = client_for(&server).releases("nope").unwrap_err();
        assert!(matches!(err, FloorError::PackageNotFound { .. }));
    }

    #[test]
    fn server_error_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pypi/attrs/json");
            then.status(500).body("Internal Server Error");
        });

        let err = client_for(&server).releases("attrs").unwrap_err();
        assert!(matches!(err, FloorError::IndexUnavailable { .. }));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = PypiClient::new("https://pypi.org/pypi/").unwrap();
        assert_eq!(client.index_url(), "https://pypi.org/pypi");
        assert_eq!(client.project_url("attrs"), "https://pypi.org/pypi/attrs/json");
    }
}
