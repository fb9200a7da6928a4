//! Config for the evaluator behaviors
//!
//! Configuration can be created programmatically using
//! [`Configuration::new()`] or by reading environment variables using
//! [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are case-insensitive and enabled by
//! setting the value to `"true"`.
//!
//! - `DUEL_VERBOSE` — Print series results to stdout (default: `true`)
//! - `DUEL_LOG` — Enable logging to a file (default: `false`)
//! - `DUEL_MATCHES_PER_PAIRING` (usize) — Matches per ordered pair (default: `100`)
//! - `DUEL_ROUND_CAP` (usize) — Rounds before a match is declared a draw (default: `100`)
//! - `DUEL_POOL_SIZE` (usize) — Worker pool size (default: available CPUs)
//! - `DUEL_OUTPUT_DIR` — Directory for the tournament artifacts (default: `.`)
//! - `DUEL_RECORD_MATCH_LOGS` — Write one log artifact per match (default: `true`)

use std::path::{Path, PathBuf};

/// Configuration for evaluator behaviors.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) matches_per_pairing: usize,
    pub(crate) round_cap: usize,
    pub(crate) pool_size: Option<usize>,
    pub(crate) output_dir: PathBuf,
    pub(crate) record_match_logs: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Series results are printed to stdout.
    /// - Logging to file is disabled.
    /// - Each ordered pair plays 100 matches of at most 100 rounds.
    /// - The worker pool is sized to the number of available CPUs.
    /// - Artifacts land in the current directory, match logs included.
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            matches_per_pairing: 100,
            round_cap: 100,
            pool_size: None,
            output_dir: PathBuf::from("."),
            record_match_logs: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults (see
    /// module documentation for the variable list).
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_usize(var: &str) -> Option<usize> {
            std::env::var(var).ok()?.parse().ok()
        }

        let defaults = Self::new();
        Self {
            verbose: get_env_flag("DUEL_VERBOSE", defaults.verbose),
            log: get_env_flag("DUEL_LOG", defaults.log),
            matches_per_pairing: get_env_usize("DUEL_MATCHES_PER_PAIRING")
                .unwrap_or(defaults.matches_per_pairing),
            round_cap: get_env_usize("DUEL_ROUND_CAP").unwrap_or(defaults.round_cap),
            pool_size: get_env_usize("DUEL_POOL_SIZE"),
            output_dir: std::env::var_os("DUEL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            record_match_logs: get_env_flag("DUEL_RECORD_MATCH_LOGS", defaults.record_match_logs),
        }
    }

    /// Enable or disable printing series results to stdout.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Sets how many matches each ordered pair plays.
    pub fn with_matches_per_pairing(mut self, value: usize) -> Self {
        self.matches_per_pairing = value;
        self
    }

    /// Sets the hard round cap after which a match is declared a draw.
    pub fn with_round_cap(mut self, value: usize) -> Self {
        self.round_cap = value;
        self
    }

    /// Sets the worker pool size explicitly.
    ///
    /// Without this, the pool is sized to the number of available CPUs.
    pub fn with_pool_size(mut self, value: usize) -> Self {
        self.pool_size = Some(value);
        self
    }

    /// Sets the directory the artifacts are written to.
    pub fn with_output_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.output_dir = value.into();
        self
    }

    /// Enable or disable the per-match log artifacts.
    pub fn with_record_match_logs(mut self, value: bool) -> Self {
        self.record_match_logs = value;
        self
    }

    /// Matches each ordered pair plays.
    pub fn matches_per_pairing(&self) -> usize {
        self.matches_per_pairing
    }

    /// Rounds before a match is declared a draw.
    pub fn round_cap(&self) -> usize {
        self.round_cap
    }

    /// True when per-match log artifacts are recorded.
    pub fn record_match_logs(&self) -> bool {
        self.record_match_logs
    }

    /// Artifact directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub(crate) fn worker_pool_size(&self) -> usize {
        self.pool_size.unwrap_or_else(num_cpus::get).max(1)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Configuration::new();
        assert!(config.verbose);
        assert!(!config.log);
        assert_eq!(config.matches_per_pairing(), 100);
        assert_eq!(config.round_cap(), 100);
        assert!(config.record_match_logs());
        assert!(config.worker_pool_size() >= 1);
    }

    #[test]
    fn builders_chain() {
        let config = Configuration::new()
            .with_verbose(false)
            .with_matches_per_pairing(5)
            .with_round_cap(10)
            .with_pool_size(2)
            .with_record_match_logs(false)
            .with_output_dir("/tmp/arena");
        assert!(!config.verbose);
        assert_eq!(config.matches_per_pairing(), 5);
        assert_eq!(config.round_cap(), 10);
        assert_eq!(config.worker_pool_size(), 2);
        assert!(!config.record_match_logs());
        assert_eq!(config.output_dir(), Path::new("/tmp/arena"));
    }
}
