//! Container registry access.
//!
//! The pruning pipeline needs exactly two questions answered per keep tag:
//! which child manifests an index references, and which digest the tag
//! itself points at. [`Registry`] abstracts those so the protected-set
//! builder can be tested without a registry.

mod ghcr;
pub mod manifest;
mod token;

use anyhow::Result;
use async_trait::async_trait;

pub use ghcr::GhcrRegistry;
pub use token::exchange_pull_token;

/// Content-addressed manifest identifier, e.g. `sha256:...`.
pub type Digest = String;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Child manifest digests if `tag` resolves to a non-empty index.
    ///
    /// Returns `None` when the tag is not an index or the probe fails;
    /// absence is expected for single-platform tags and is not an error.
    async fn index_children(&self, tag: &str) -> Option<Vec<Digest>>;

    /// Canonical digest of whatever `tag` points at, index or single manifest.
    async fn manifest_digest(&self, tag: &str) -> Result<Digest>;
}
