//! Protected-set builder.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::registry::{Digest, Registry};

/// Digests that must survive the run.
pub type ProtectedSet = BTreeSet<Digest>;

/// Resolve every keep tag to the digests it protects.
///
/// A tag contributes its own manifest digest and, when it is an index,
/// every child digest. A tag that is not an index only contributes its own
/// digest. Failing to resolve the tag's own digest is fatal.
#[tracing::instrument(skip(registry))]
pub async fn build_protected_set<G: Registry + ?Sized>(
    registry: &G,
    keep_tags: &[String],
) -> Result<ProtectedSet> {
    let mut protected = ProtectedSet::new();

    for tag in keep_tags {
        match registry.index_children(tag).await {
            Some(children) => {
                debug!(
                    "Keep tag {} is an index with {} child manifest(s)",
                    tag,
                    children.len()
                );
                protected.extend(children);
            }
            None => debug!("Keep tag {} has no index; protecting its digest only", tag),
        }

        let digest = registry
            .manifest_digest(tag)
            .await
            .with_context(|| format!("Failed to resolve digest of keep tag {}", tag))?;
        info!("Keep tag {} -> {}", tag, digest);
        protected.insert(digest);
    }

    Ok(protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MockRegistry;
    use mockall::predicate::eq;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_index_children_and_top_level_are_protected() {
        let mut registry = MockRegistry::new();
        registry
            .expect_index_children()
            .with(eq("latest"))
            .returning(|_| Some(vec!["sha256:d1".into(), "sha256:d2".into()]));
        registry
            .expect_manifest_digest()
            .with(eq("latest"))
            .returning(|_| Ok("sha256:index".into()));

        let protected = build_protected_set(&registry, &tags(&["latest"]))
            .await
            .unwrap();

        let expected: ProtectedSet = ["sha256:d1", "sha256:d2", "sha256:index"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(protected, expected);
    }

    #[tokio::test]
    async fn test_single_platform_tag_contributes_own_digest() {
        let mut registry = MockRegistry::new();
        registry
            .expect_index_children()
            .with(eq("stable"))
            .returning(|_| None);
        registry
            .expect_manifest_digest()
            .with(eq("stable"))
            .returning(|_| Ok("sha256:single".into()));

        let protected = build_protected_set(&registry, &tags(&["stable"]))
            .await
            .unwrap();

        assert_eq!(protected.len(), 1);
        assert!(protected.contains("sha256:single"));
    }

    #[tokio::test]
    async fn test_aliased_tags_are_deduplicated() {
        let mut registry = MockRegistry::new();
        registry
            .expect_index_children()
            .returning(|_| Some(vec!["sha256:d1".into()]));
        registry
            .expect_manifest_digest()
            .times(2)
            .returning(|_| Ok("sha256:same".into()));

        let protected = build_protected_set(&registry, &tags(&["latest", "v1"]))
            .await
            .unwrap();

        assert_eq!(protected.len(), 2);
    }

    #[tokio::test]
    async fn test_unresolvable_keep_tag_is_fatal() {
        let mut registry = MockRegistry::new();
        registry.expect_index_children().returning(|_| None);
        registry
            .expect_manifest_digest()
            .with(eq("missing"))
            .returning(|_| Err(anyhow::anyhow!("Not found")));

        let err = build_protected_set(&registry, &tags(&["missing"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("keep tag missing"));
    }
}
