//! GitHub Packages API access.
//!
//! Versions of a container package are listed page by page and deleted by
//! id. [`PackageApi`] is the seam the candidate lister and the deleter are
//! written against.

mod github;
mod pages;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub use github::GitHubPackages;
pub use pages::{PER_PAGE, list_all_versions, version_pages};

/// Whether a namespace belongs to an organization or a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    Organization,
    User,
}

impl OwnerKind {
    /// Maps the `type` field of `GET /users/{owner}`. Anything that is not
    /// an organization is addressed through the users prefix.
    pub fn from_account_type(account_type: &str) -> Self {
        if account_type.eq_ignore_ascii_case("organization") {
            OwnerKind::Organization
        } else {
            OwnerKind::User
        }
    }

    /// API path segment for this owner kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            OwnerKind::Organization => "orgs",
            OwnerKind::User => "users",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Organization => write!(f, "organization"),
            OwnerKind::User => write!(f, "user"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ContainerMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VersionMetadata {
    #[serde(default)]
    pub container: Option<ContainerMetadata>,
}

/// One version of a container package.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PackageVersion {
    pub id: u64,
    /// Manifest digest of this version.
    pub name: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<VersionMetadata>,
}

impl PackageVersion {
    pub fn digest(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        self.metadata
            .as_ref()
            .and_then(|m| m.container.as_ref())
            .map(|c| c.tags.as_slice())
            .unwrap_or_default()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageApi: Send + Sync {
    /// Fetch one page (1-based) of package versions.
    async fn list_versions_page(&self, page: u32, per_page: u32) -> Result<Vec<PackageVersion>>;

    /// Delete a package version by id.
    async fn delete_version(&self, id: u64) -> Result<()>;
}
