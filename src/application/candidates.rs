//! Candidate filtering.

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use regex::Regex;

use crate::packages::PackageVersion;

use super::protect::ProtectedSet;

/// `now` minus `retention_days`, clamped to the earliest representable instant.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::days(i64::from(retention_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Decides which package versions are eligible for deletion.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    temp_tag: Regex,
    cutoff: DateTime<Utc>,
}

impl CandidateFilter {
    pub fn new(temp_tag: Regex, cutoff: DateTime<Utc>) -> Self {
        Self { temp_tag, cutoff }
    }

    #[cfg(test)]
    pub(crate) fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// True iff some tag matches the temporary pattern, the version was last
    /// updated strictly before the cutoff, and its digest is unprotected.
    pub fn is_candidate(&self, version: &PackageVersion, protected: &ProtectedSet) -> bool {
        let has_temp_tag = version.tags().iter().any(|t| self.temp_tag.is_match(t));
        if !has_temp_tag {
            return false;
        }

        if version.updated_at >= self.cutoff {
            debug!(
                "Version {} ({:?}) is newer than the cutoff",
                version.id,
                version.tags()
            );
            return false;
        }

        if protected.contains(version.digest()) {
            debug!(
                "Version {} ({}) is protected by a keep tag",
                version.id,
                version.digest()
            );
            return false;
        }

        true
    }

    /// Keep only the deletion candidates, preserving order.
    pub fn select(
        &self,
        versions: Vec<PackageVersion>,
        protected: &ProtectedSet,
    ) -> Vec<PackageVersion> {
        versions
            .into_iter()
            .filter(|v| self.is_candidate(v, protected))
            .collect()
    }
}
