//! Engine error types.

use sim_core::ConfigError;
use thiserror::Error;

/// Errors from the simulation engine.
///
/// Configuration problems are the only failure mode: once a config has
/// validated, a run is infallible (numeric degeneracies recover locally and
/// surface as notices on the result, never as errors).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The configuration was rejected before any sampling started.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: EngineError = ConfigError::NoOptions.into();
        assert!(err.to_string().contains("option"));
    }
}
