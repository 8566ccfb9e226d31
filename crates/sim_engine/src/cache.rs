//! Fingerprint-keyed, single-flight run cache.
//!
//! The cache guarantees at most one concurrent computation per fingerprint:
//! a cache miss starts exactly one run, and concurrent callers with the same
//! configuration block on that run and share its result instead of
//! recomputing. Each entry is an `Arc<OnceLock>`; `OnceLock::get_or_init`
//! provides the blocking single-flight semantics, and the outer mutex is
//! held only long enough to look up or insert the entry, never across a run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use sim_core::{ConfigError, RunConfig, RunFingerprint};

use crate::run::{RunArtifacts, Simulator};

/// Shared run cache.
///
/// # Examples
///
/// ```
/// use sim_core::RunConfig;
/// use sim_engine::RunCache;
///
/// let config = RunConfig::builder()
///     .seed(1)
///     .run_count(100)
///     .horizon_months(12)
///     .option("a", "A", 1.0, 2.0)
///     .build()
///     .unwrap();
///
/// let cache = RunCache::new();
/// let first = cache.get_or_run(&config).unwrap();
/// let second = cache.get_or_run(&config).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
#[derive(Default)]
pub struct RunCache {
    entries: Mutex<HashMap<String, Arc<OnceLock<Arc<RunArtifacts>>>>>,
}

impl RunCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `config`, computing it at most once.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] without touching the cache when the
    /// configuration is invalid.
    pub fn get_or_run(&self, config: &RunConfig) -> Result<Arc<RunArtifacts>, ConfigError> {
        config.validate()?;
        let fingerprint = RunFingerprint::of(config).to_hex();

        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.entry(fingerprint.clone()).or_default().clone()
        };

        let mut computed = false;
        let artifacts = cell
            .get_or_init(|| {
                computed = true;
                let simulator = Simulator::new_validated(config.clone());
                Arc::new(simulator.run())
            })
            .clone();
        if !computed {
            debug!(%fingerprint, "run cache hit");
        }
        Ok(artifacts)
    }

    /// Whether a completed result is cached for this fingerprint.
    pub fn contains(&self, fingerprint_hex: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(fingerprint_hex)
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Number of completed results in the cache.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.get().is_some()).count()
    }

    /// Whether the cache holds no completed results.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
