//! Simulation-specific error types.
//!
//! Only the configuration and mission layer returns errors.  The per-frame
//! tick path never fails: pool exhaustion and stale references degrade to
//! no-ops instead.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skirmish::error::SimResult;
//! use skirmish::missions::{MissionCatalog, MISSIONS_PATH};
//!
//! fn seed_of(name: &str) -> SimResult<u64> {
//!     let catalog = MissionCatalog::load(MISSIONS_PATH)?;
//!     Ok(catalog.find(name)?.definition.seed)
//! }
//! ```

use std::fmt;

/// Top-level error enum for the skirmish simulation.
#[derive(Debug)]
pub enum SimError {
    /// A configuration or mission file exists but could not be read.
    ConfigRead {
        path: String,
        reason: String,
    },

    /// A configuration or mission file is not valid TOML for its schema.
    ConfigParse {
        path: String,
        reason: String,
    },

    /// A mission name was requested that the catalog does not contain.
    MissionNotFound {
        name: String,
    },

    /// Tuning value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the value (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigRead { path, reason } => {
                write!(f, "could not read '{}': {}", path, reason)
            }
            SimError::ConfigParse { path, reason } => {
                write!(f, "could not parse '{}': {}", path, reason)
            }
            SimError::MissionNotFound { name } => {
                write!(f, "no mission named '{}'", name)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` lies in `(0, ∞)`.
pub fn validate_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
///
/// Used for probabilities.
pub fn validate_unit_interval(name: &'static str, value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// Returns an error unless `value` is a valid dot-product threshold in `[-1, 1]`.
pub fn validate_dot_threshold(name: &'static str, value: f32) -> SimResult<()> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[-1.0, 1.0]",
        })
    }
}
