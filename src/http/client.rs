//! HTTP client with status classification and redacted credentials.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

use super::error::classify_status;
use super::secret::Secret;

/// Build an HTTP client with an optional bearer token and extra default headers.
///
/// Without `timeout` requests use reqwest's defaults (no overall deadline).
pub fn build_http_client(
    token: Option<&Secret>,
    mut headers: HeaderMap,
    timeout: Option<Duration>,
) -> Result<HttpClient> {
    if let Some(token) = token {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .context("Token contains characters not allowed in a header")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("HTTP client configured with authentication");
    }

    let mut builder = Client::builder()
        .user_agent(concat!("ghcr-prune/", env!("GHCR_PRUNE_VERSION")))
        .default_headers(headers);
    if let Some(timeout) = timeout {
        debug!("HTTP request timeout set to {:?}", timeout);
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(HttpClient::new(client))
}

/// Thin wrapper over [`reqwest::Client`]. Every non-success status becomes an
/// [`super::ApiError`]; nothing is retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        parse_json(error_for_status(response, url).await?, url).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        parse_json(error_for_status(response, url).await?, url).await
    }

    /// Performs a content-negotiated GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json_with_accept<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: &str,
    ) -> Result<T> {
        debug!("GET JSON from {} accepting {}...", url, accept);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        parse_json(error_for_status(response, url).await?, url).await
    }

    /// Performs a GET request authenticated with HTTP basic credentials.
    #[tracing::instrument(skip(self, query, password))]
    pub async fn get_json_with_basic_auth<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        username: &str,
        password: &Secret,
    ) -> Result<T> {
        debug!("GET JSON from {} with basic auth...", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(username, Some(password.expose()))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        parse_json(error_for_status(response, url).await?, url).await
    }

    /// Performs a HEAD request and returns the named response header, if present.
    #[tracing::instrument(skip(self))]
    pub async fn head_header(
        &self,
        url: &str,
        accept: &str,
        header: &str,
    ) -> Result<Option<String>> {
        debug!("HEAD {} accepting {}...", url, accept);

        let response = self
            .client
            .head(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let response = error_for_status(response, url).await?;

        let value = response
            .headers()
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(value)
    }

    /// Performs a DELETE request, discarding the response body.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> Result<()> {
        debug!("DELETE {}...", url);

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        error_for_status(response, url).await?;
        Ok(())
    }
}

async fn error_for_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("{} returned HTTP {}: {}", url, status.as_u16(), body);

    Err(classify_status(status, &body, url).into())
}

async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse JSON response from {}", url))
}
