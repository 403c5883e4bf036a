use anyhow::Result;
use log::{debug, info};

use crate::application::{
    CandidateFilter, build_protected_set, delete_versions, retention_cutoff,
};
use crate::packages::{PER_PAGE, PackageApi, list_all_versions};
use crate::registry::Registry;
use crate::runtime::Runtime;

use super::config::{Config, PruneOptions};
use super::services::{build_packages, build_registry};

/// Counters reported by one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    pub protected: usize,
    pub raw_total: usize,
    pub candidates: usize,
    pub deleted: usize,
}

/// Prune temporary tags of one container image.
#[tracing::instrument(skip(runtime, options))]
pub async fn prune<R: Runtime>(runtime: R, options: PruneOptions) -> Result<PruneSummary> {
    let config = Config::load(&runtime, options)?;
    info!(
        "Pruning {} (package {} of {}), keeping {:?}, retention {} day(s)",
        config.image,
        config.package,
        config.owner,
        config.keep_tags,
        config.retention_days
    );

    let registry = build_registry(&config).await?;
    let packages = build_packages(&config).await?;

    run(&runtime, &config, &registry, &packages).await
}

/// Build the protected set, list and filter candidates, then delete them.
pub async fn run<R, G, P>(
    runtime: &R,
    config: &Config,
    registry: &G,
    packages: &P,
) -> Result<PruneSummary>
where
    R: Runtime,
    G: Registry + ?Sized,
    P: PackageApi + ?Sized,
{
    let mut summary = PruneSummary::default();

    let protected = build_protected_set(registry, &config.keep_tags).await?;
    summary.protected = protected.len();
    println!("Protected digests: {}", protected.len());

    let versions = list_all_versions(packages, PER_PAGE).await?;
    summary.raw_total = versions.len();
    println!("raw_total={}", versions.len());

    let cutoff = retention_cutoff(runtime.now(), config.retention_days);
    debug!("Retention cutoff: {}", cutoff.to_rfc3339());
    let filter = CandidateFilter::new(config.temp_tag_regex.clone(), cutoff);
    let candidates = filter.select(versions, &protected);
    summary.candidates = candidates.len();
    println!("after_filter={}", candidates.len());

    if candidates.is_empty() {
        println!("Nothing to delete.");
        return Ok(summary);
    }

    if config.dry_run {
        for version in &candidates {
            println!(
                "would delete id={} digest={} tags={}",
                version.id,
                version.digest(),
                version.tags().join(",")
            );
        }
        println!("Deleted=0");
        return Ok(summary);
    }

    summary.deleted = delete_versions(packages, &candidates).await?;
    println!("Deleted={}", summary.deleted);

    Ok(summary)
}
