//! GitHub Packages REST API implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::http::HttpClient;

use super::{OwnerKind, PackageApi, PackageVersion};

#[derive(Deserialize, Debug)]
struct Account {
    #[serde(rename = "type")]
    account_type: String,
}

/// A container package under a user or organization namespace.
pub struct GitHubPackages {
    http_client: HttpClient,
    /// `{api}/{orgs|users}/{owner}/packages/container/{package}`
    package_url: String,
}

impl GitHubPackages {
    /// Create for an owner whose kind is already known.
    pub fn new(
        http_client: HttpClient,
        api_url: &str,
        owner_kind: OwnerKind,
        owner: &str,
        package: &str,
    ) -> Self {
        let package_url = format!(
            "{}/{}/{}/packages/container/{}",
            api_url.trim_end_matches('/'),
            owner_kind.path_segment(),
            owner,
            encode_package_name(package)
        );
        Self {
            http_client,
            package_url,
        }
    }

    /// Look up the owner's account type, then create.
    #[tracing::instrument(skip(http_client))]
    pub async fn resolve(
        http_client: HttpClient,
        api_url: &str,
        owner: &str,
        package: &str,
    ) -> Result<Self> {
        let owner_kind = fetch_owner_kind(&http_client, api_url, owner).await?;
        debug!("Owner {} is a {}", owner, owner_kind);
        Ok(Self::new(http_client, api_url, owner_kind, owner, package))
    }

    #[cfg(test)]
    pub(crate) fn package_url(&self) -> &str {
        &self.package_url
    }
}

/// Determine whether `owner` is an organization or a user.
pub async fn fetch_owner_kind(
    http_client: &HttpClient,
    api_url: &str,
    owner: &str,
) -> Result<OwnerKind> {
    let url = format!("{}/users/{}", api_url.trim_end_matches('/'), owner);
    let account: Account = http_client
        .get_json(&url)
        .await
        .with_context(|| format!("Failed to look up account type of {}", owner))?;
    Ok(OwnerKind::from_account_type(&account.account_type))
}

/// Package names may contain `/`, which must be escaped inside a path segment.
fn encode_package_name(package: &str) -> String {
    package.replace('/', "%2F")
}

#[async_trait]
impl PackageApi for GitHubPackages {
    #[tracing::instrument(skip(self))]
    async fn list_versions_page(&self, page: u32, per_page: u32) -> Result<Vec<PackageVersion>> {
        let url = format!("{}/versions", self.package_url);
        let per_page = per_page.to_string();
        let page_number = page.to_string();
        self.http_client
            .get_json_with_query(
                &url,
                &[("per_page", per_page.as_str()), ("page", page_number.as_str())],
            )
            .await
            .with_context(|| format!("Failed to list package versions (page {})", page))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_version(&self, id: u64) -> Result<()> {
        let url = format!("{}/versions/{}", self.package_url, id);
        self.http_client
            .delete(&url)
            .await
            .with_context(|| format!("Failed to delete package version {}", id))
    }
}
