//! Registry token exchange.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::http::{HttpClient, Secret};

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Exchanges basic credentials for a bearer token scoped to pulling `image`.
///
/// Nothing here is logged: the request carries the user's credential and
/// the response carries the pull token.
pub async fn exchange_pull_token(
    http_client: &HttpClient,
    registry_url: &str,
    image: &str,
    actor: &str,
    token: &Secret,
) -> Result<Secret> {
    let url = format!("{}/token", registry_url);
    let scope = format!("repository:{}:pull", image);

    let response: TokenResponse = http_client
        .get_json_with_basic_auth(&url, &[("scope", scope.as_str())], actor, token)
        .await
        .context("Failed to exchange credentials for a registry pull token")?;

    match response.token.or(response.access_token) {
        Some(pull_token) if !pull_token.is_empty() => Ok(Secret::new(pull_token)),
        _ => bail!("Registry token endpoint returned no token"),
    }
}
