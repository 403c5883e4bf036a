//! Command layer: configuration, client construction, and the prune run.

pub mod config;
mod prune;
mod services;

pub use config::{Config, ConfigError, PruneOptions, RepoId};
pub use prune::{PruneSummary, prune, run};
