//! Runtime abstraction for system operations.
//!
//! The pruning pipeline only touches the process environment and the
//! wall clock. Both go through [`Runtime`] so that configuration loading
//! and retention cutoffs can be tested without a real environment.

mod env;

use chrono::{DateTime, Utc};
use std::env as std_env;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // Clock
    /// Current wall-clock time, used to compute the retention cutoff.
    fn now(&self) -> DateTime<Utc>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn now(&self) -> DateTime<Utc> {
        self.now_impl()
    }
}
