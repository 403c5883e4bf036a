//! Sequential deletion of candidate versions.

use anyhow::{Context, Result};
use log::info;

use crate::packages::{PackageApi, PackageVersion};

/// Delete every candidate in order, stopping at the first failure.
///
/// Versions deleted before a failure stay deleted. Returns the number of
/// deletions issued.
#[tracing::instrument(skip_all, fields(count = candidates.len()))]
pub async fn delete_versions<P: PackageApi + ?Sized>(
    api: &P,
    candidates: &[PackageVersion],
) -> Result<usize> {
    let mut deleted = 0;

    for version in candidates {
        api.delete_version(version.id).await.with_context(|| {
            format!(
                "Aborted after deleting {} of {} candidate version(s)",
                deleted,
                candidates.len()
            )
        })?;
        info!(
            "Deleted version {} ({}) tags={:?}",
            version.id,
            version.digest(),
            version.tags()
        );
        deleted += 1;
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::MockPackageApi;
    use chrono::Utc;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn version(id: u64) -> PackageVersion {
        PackageVersion {
            id,
            name: format!("sha256:{}", id),
            updated_at: Utc::now(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_deletes_in_order() {
        let mut api = MockPackageApi::new();
        let mut seq = Sequence::new();
        for id in [3, 1, 2] {
            api.expect_delete_version()
                .with(eq(id))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let deleted = delete_versions(&api, &[version(3), version(1), version(2)])
            .await
            .unwrap();
        assert_eq!(deleted, 3);
    }

    #[tokio::test]
    async fn test_nothing_to_delete() {
        let mut api = MockPackageApi::new();
        api.expect_delete_version().never();

        assert_eq!(delete_versions(&api, &[]).await.unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_first_failure_aborts() {
        let mut api = MockPackageApi::new();
        api.expect_delete_version()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        api.expect_delete_version()
            .with(eq(2))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("HTTP 403")));
        api.expect_delete_version().with(eq(3)).never();

        let err = delete_versions(&api, &[version(1), version(2), version(3)])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("after deleting 1 of 3"));
        assert!(format!("{:#}", err).contains("HTTP 403"));
    }
}
