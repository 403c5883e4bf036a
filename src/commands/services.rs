//! Service factory for building the run's API clients.
//!
//! Client construction is kept apart from the configuration: the
//! configuration holds plain values, and the clients built from it carry
//! the credentials.

use anyhow::Result;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};

use crate::{
    http::{HttpClient, build_http_client},
    packages::GitHubPackages,
    registry::GhcrRegistry,
};

use super::config::Config;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Build an HTTP client for the GitHub REST API.
pub fn build_api_client(config: &Config) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        HeaderName::from_static("x-github-api-version"),
        HeaderValue::from_static(GITHUB_API_VERSION),
    );
    build_http_client(Some(&config.token), headers, config.request_timeout)
}

/// Exchange the credential for a pull token and build the registry client.
pub async fn build_registry(config: &Config) -> Result<GhcrRegistry> {
    GhcrRegistry::connect(
        &config.registry_url,
        &config.image,
        &config.actor,
        &config.token,
        config.request_timeout,
    )
    .await
}

/// Look up the owner kind and build the Packages API client.
pub async fn build_packages(config: &Config) -> Result<GitHubPackages> {
    GitHubPackages::resolve(
        build_api_client(config)?,
        &config.api_url,
        &config.owner,
        &config.package,
    )
    .await
}
