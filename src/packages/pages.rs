//! Lazy pagination over package versions.

use std::collections::HashSet;
use std::pin::pin;

use anyhow::Result;
use futures_util::{Stream, TryStreamExt, stream};
use log::{debug, warn};

use super::{PackageApi, PackageVersion};

/// Page size requested from the Packages API (its maximum).
pub const PER_PAGE: u32 = 100;

/// A finite, single-pass stream of version pages.
///
/// Pages are fetched on demand starting at page 1. The stream ends after
/// an empty page or the first page shorter than `per_page`, which is at
/// least 1.
pub fn version_pages<P: PackageApi + ?Sized>(
    api: &P,
    per_page: u32,
) -> impl Stream<Item = Result<Vec<PackageVersion>>> + '_ {
    let per_page = per_page.max(1);
    stream::try_unfold(Some(1), move |next| fetch_page(api, next, per_page))
}

async fn fetch_page<P: PackageApi + ?Sized>(
    api: &P,
    page: Option<u32>,
    per_page: u32,
) -> Result<Option<(Vec<PackageVersion>, Option<u32>)>> {
    let Some(page) = page else {
        return Ok(None);
    };

    let versions = api.list_versions_page(page, per_page).await?;
    debug!("Page {} returned {} version(s)", page, versions.len());

    if versions.is_empty() {
        return Ok(None);
    }

    let next = (versions.len() >= per_page as usize).then_some(page + 1);
    Ok(Some((versions, next)))
}

/// Materializes every page into one flat list.
///
/// Versions are kept in page order. A version id already seen on an
/// earlier page (the listing shifted while paging) is dropped.
pub async fn list_all_versions<P: PackageApi + ?Sized>(
    api: &P,
    per_page: u32,
) -> Result<Vec<PackageVersion>> {
    let mut pages = pin!(version_pages(api, per_page));
    let mut seen = HashSet::new();
    let mut versions = Vec::new();

    while let Some(page) = pages.try_next().await? {
        for version in page {
            if seen.insert(version.id) {
                versions.push(version);
            } else {
                warn!(
                    "Version {} appeared on more than one page, keeping the first",
                    version.id
                );
            }
        }
    }

    Ok(versions)
}
