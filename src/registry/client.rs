use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{DeprankError, Result};
use crate::registry::manifest;

#[derive(Debug, Clone)]
pub struct RegistryClient {
    pub host: String,
    delay: Duration,
    client: Client,
}

impl RegistryClient {
    pub fn new(host: impl Into<String>, delay: Duration) -> Self {
        Self {
            host: normalize_host(&host.into()),
            delay,
            client: Client::new(),
        }
    }

    pub fn manifest_url(&self, package: &str, version: &str, tests: bool) -> String {
        let prefix = if tests { "tests/" } else { "" };
        format!(
            "{}/{}/{}/{}elm-package.json",
            self.host, package, version, prefix
        )
    }

    /// Fetches one manifest and extracts its dependency names. Non-success
    /// statuses and unparsable bodies are errors; the caller decides whether
    /// a failed half degrades to empty or skips the package.
    pub fn fetch_dependency_names(&self, url: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "deprank")
            .send()
            .map_err(|err| {
                DeprankError::Http(anyhow::anyhow!("request failed for {}: {}", url, err))
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| {
            DeprankError::Http(anyhow::anyhow!(
                "failed reading response body from {}: {}",
                url,
                err
            ))
        })?;

        if !status.is_success() {
            return Err(DeprankError::Http(anyhow::anyhow!(
                "registry returned {} for {}",
                status,
                url
            )));
        }

        manifest::dependency_names(&body)
    }

    /// Deliberate pacing between requests.
    pub fn pace(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "https://raw.githubusercontent.com".to_string();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    format!("https://{trimmed}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::registry::client::{normalize_host, RegistryClient};

    #[test]
    fn normalizes_host_forms() {
        assert_eq!(normalize_host(""), "https://raw.githubusercontent.com");
        assert_eq!(
            normalize_host("raw.githubusercontent.com/"),
            "https://raw.githubusercontent.com"
        );
        assert_eq!(normalize_host("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn builds_main_and_test_manifest_urls() {
        let client = RegistryClient::new("raw.githubusercontent.com", Duration::ZERO);
        assert_eq!(
            client.manifest_url("alpha/core", "1.0.0", false),
            "https://raw.githubusercontent.com/alpha/core/1.0.0/elm-package.json"
        );
        assert_eq!(
            client.manifest_url("alpha/core", "1.0.0", true),
            "https://raw.githubusercontent.com/alpha/core/1.0.0/tests/elm-package.json"
        );
    }
}
