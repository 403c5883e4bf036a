//! Application layer - the three pruning phases.
//!
//! Protected set, candidate filter, and deletion are independent of the
//! transport; they are written against the `Registry` and `PackageApi`
//! traits.

mod candidates;
mod delete;
mod protect;

pub use candidates::{CandidateFilter, retention_cutoff};
pub use delete::delete_versions;
pub use protect::{ProtectedSet, build_protected_set};
