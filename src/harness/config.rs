//! Harness configuration.
//!
//! Read from the environment by [`HarnessConfig::from_env`]:
//! - `CASEBOOK_PARALLEL`: number of parallel sub-tests allowed to run at once
//! - `CASEBOOK_RUN`: sub-test name filter, one substring per `/`-separated level
//! - `CASEBOOK_VERBOSE`: print every report when its root test completes
//! - `CASEBOOK_FAIL_FAST`: stop starting sub-tests after the first failure

use std::num::NonZeroUsize;
use std::thread;

use crate::errors::ConfigError;

pub const PARALLEL_VAR: &str = "CASEBOOK_PARALLEL";
pub const RUN_VAR: &str = "CASEBOOK_RUN";
pub const VERBOSE_VAR: &str = "CASEBOOK_VERBOSE";
pub const FAIL_FAST_VAR: &str = "CASEBOOK_FAIL_FAST";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Maximum number of released parallel sub-tests running at once
    pub parallelism: NonZeroUsize,
    /// Name filter, split per sub-test level
    pub filter: Option<Vec<String>>,
    /// Print the rendered report when the root test completes
    pub verbose: bool,
    /// Do not start new sub-tests once one has failed
    pub fail_fast: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            parallelism: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
            filter: None,
            verbose: false,
            fail_fast: false,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(PARALLEL_VAR) {
            let parallelism = raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::invalid(PARALLEL_VAR, &raw, "expected a positive integer"))?;
            config.parallelism = parallelism;
        }
        if let Some(raw) = lookup(RUN_VAR) {
            config = config.with_filter(&raw);
        }
        if let Some(raw) = lookup(VERBOSE_VAR) {
            config.verbose = parse_flag(VERBOSE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(FAIL_FAST_VAR) {
            config.fail_fast = parse_flag(FAIL_FAST_VAR, &raw)?;
        }

        Ok(config)
    }

    /// Set the number of parallel slots
    pub fn with_parallelism(mut self, parallelism: NonZeroUsize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the name filter. A blank pattern clears it.
    pub fn with_filter(mut self, pattern: &str) -> Self {
        let pattern = pattern.trim();
        self.filter = if pattern.is_empty() {
            None
        } else {
            Some(pattern.split('/').map(str::to_string).collect())
        };
        self
    }

    /// Enable or disable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable fail-fast
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Whether a sub-test whose path below the root is `levels` should run.
    ///
    /// Each filter element must be a substring of the name at the same level;
    /// levels deeper than the filter always run.
    pub fn selects(&self, levels: &[&str]) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        filter
            .iter()
            .zip(levels)
            .all(|(pattern, level)| level.contains(pattern.as_str()))
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected a boolean")),
    }
}
