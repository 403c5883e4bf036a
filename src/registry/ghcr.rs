//! GitHub container registry (ghcr.io) implementation.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::header::HeaderMap;

use crate::http::{ApiError, HttpClient, Secret, build_http_client};

use super::manifest::{self, ImageIndex};
use super::token::exchange_pull_token;
use super::{Digest, Registry};

/// Registry client bound to one image and authenticated with a pull token.
pub struct GhcrRegistry {
    http_client: HttpClient,
    registry_url: String,
    image: String,
}

impl GhcrRegistry {
    /// Create from an HttpClient that already carries the pull token.
    pub fn from_http_client(http_client: HttpClient, registry_url: &str, image: &str) -> Self {
        Self {
            http_client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
            image: image.to_string(),
        }
    }

    /// Exchange `actor`/`token` for a pull token and build a client around it.
    #[tracing::instrument(skip(token))]
    pub async fn connect(
        registry_url: &str,
        image: &str,
        actor: &str,
        token: &Secret,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let registry_url = registry_url.trim_end_matches('/');
        let anonymous = build_http_client(None, HeaderMap::new(), timeout)?;
        let pull_token = exchange_pull_token(&anonymous, registry_url, image, actor, token).await?;
        debug!("Obtained registry pull token for {}", image);

        let http_client = build_http_client(Some(&pull_token), HeaderMap::new(), timeout)?;
        Ok(Self::from_http_client(http_client, registry_url, image))
    }

    fn manifest_url(&self, tag: &str) -> String {
        format!("{}/v2/{}/manifests/{}", self.registry_url, self.image, tag)
    }
}

#[async_trait]
impl Registry for GhcrRegistry {
    #[tracing::instrument(skip(self))]
    async fn index_children(&self, tag: &str) -> Option<Vec<Digest>> {
        let url = self.manifest_url(tag);
        let index: ImageIndex = match self
            .http_client
            .get_json_with_accept(&url, &manifest::index_accept())
            .await
        {
            Ok(index) => index,
            Err(e) => {
                debug!("Tag {} is not an index: {:#}", tag, e);
                return None;
            }
        };

        if index.manifests.is_empty() {
            debug!("Tag {} resolved to a manifest without children", tag);
            return None;
        }

        Some(index.manifests.into_iter().map(|m| m.digest).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn manifest_digest(&self, tag: &str) -> Result<Digest> {
        let url = self.manifest_url(tag);
        let digest = self
            .http_client
            .head_header(
                &url,
                &manifest::any_manifest_accept(),
                manifest::CONTENT_DIGEST_HEADER,
            )
            .await?;

        digest.ok_or_else(|| ApiError::MissingDigest(url).into())
    }
}
