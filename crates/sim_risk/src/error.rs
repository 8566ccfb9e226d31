//! Analysis error types.

use sim_core::ConfigError;
use sim_engine::EngineError;
use thiserror::Error;

/// Errors from the sensitivity and stress layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The requested option does not exist in the baseline run.
    #[error("unknown option id '{0}'")]
    UnknownOption(String),

    /// An override references a variable absent from the configuration.
    #[error("unknown variable id '{0}'")]
    UnknownVariable(String),

    /// A perturbed configuration failed validation or execution.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        Self::Engine(EngineError::Config(err))
    }
}
