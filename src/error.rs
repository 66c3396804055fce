//! Error types for the simulator.
//!
//! Setup problems surface as `SimError` before any stepping happens. Halts in
//! the middle of a run (instability, particles leaving the integration volume)
//! are not errors: drivers report them through `RunOutcome` and keep what they
//! recorded.

use thiserror::Error;

/// Result type alias for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid run, field or bunch configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Too many energy draws at or below the rest energy.
    #[error(
        "bunch energy sampling degenerate after {attempts} draws \
         (mean {mean:.6e} J, rest energy {rest_energy:.6e} J)"
    )]
    DegenerateSampling {
        attempts: usize,
        mean: f64,
        rest_energy: f64,
    },

    /// A field was referenced that the aggregator does not hold.
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_is_descriptive() {
        let err = SimError::config("duration must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: duration must be positive"
        );
    }

    #[test]
    fn io_errors_convert() {
        fn open_missing() -> SimResult<()> {
            std::fs::read("/definitely/not/here.json")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(SimError::Io(_))));
    }
}
