//! Error Types for Estimation and Control
//!
//! ## Design Philosophy
//!
//! Misuse of a filter or controller (updating before initialization, a zero time
//! step) is reported through `Result` rather than asserted away in release builds:
//!
//! 1. **Small Size**: Errors carry only inline data, no `String`, so they can be
//!    returned from a 1 kHz control loop without touching the allocator.
//!
//! 2. **Copy Semantics**: Every error is `Copy` and can be stored or forwarded
//!    freely.
//!
//! 3. **No Silent Recovery**: An operation that fails leaves the estimator or
//!    controller exactly as it was. Nothing is clamped, skipped or guessed.
//!
//! ## Error Categories
//!
//! ### Lifecycle Violations
//! - `NotSetUp`: model matrices were never assigned
//! - `NotInitialized`: the state and covariance were never seeded
//!
//! ### Numeric Degeneracy
//! - `SingularInnovation`: `H·P·Hᵀ + R` cannot be inverted (checked updates only;
//!   a plain measurement update lets the NaN/Inf through)
//! - `IndeterminateOutput`: the control law evaluated to NaN, e.g. `+inf - inf`
//!   when two terms overflow in opposite directions
//!
//! ### Control Contract Violations
//! - `InvalidTimeStep`: `dt` must be finite and strictly positive
//! - `InvalidLimits`: `min > max` on an output bound
//! - `InvalidSaturation`: negative integral clamp
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use controlkit_core::{EstimateError, KalmanFilter, KalmanModel};
//!
//! let mut kf = KalmanFilter::<f64, 2, 1>::new(KalmanModel::default());
//! match kf.time_update() {
//!     Ok(_) => {}
//!     Err(EstimateError::NotInitialized) => {
//!         // Seed the filter first
//!         kf.initialize([[1.0, 0.0], [0.0, 1.0]], [0.0, 0.0]).unwrap();
//!     }
//!     Err(e) => panic!("unexpected: {e}"),
//! }
//! assert!(kf.is_initialized());
//! ```

use thiserror_no_std::Error;

/// Result type for estimator operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Result type for controller operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Estimator errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    /// Model matrices (F, H, Q, R) have not been assigned
    #[error("Kalman filter is not set up")]
    NotSetUp,

    /// State estimate and covariance have not been seeded
    #[error("Kalman filter is not initialized")]
    NotInitialized,

    /// Innovation covariance S = H·P·Hᵀ + R is singular
    #[error("Innovation covariance is singular")]
    SingularInnovation,
}

/// Controller errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ControlError {
    /// Time step is zero, negative or not a number
    #[error("Time step {dt}s must be finite and positive")]
    InvalidTimeStep {
        /// The rejected time step in seconds
        dt: f64,
    },

    /// Minimum output exceeds maximum output
    #[error("Output limits are inverted (min > max)")]
    InvalidLimits,

    /// Integral saturation bound is negative or NaN
    #[error("Integral saturation {bound} must be non-negative")]
    InvalidSaturation {
        /// The rejected bound
        bound: f64,
    },

    /// Control law produced NaN, so no bound applies to it
    #[error("Controller output is NaN")]
    IndeterminateOutput,
}

/// Any failure in an estimate-then-control loop
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Estimator failure
    #[error("Estimation failed: {0}")]
    Estimate(#[from] EstimateError),

    /// Controller failure
    #[error("Control failed: {0}")]
    Control(#[from] ControlError),
}

#[cfg(feature = "defmt")]
impl defmt::Format for EstimateError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotSetUp => defmt::write!(fmt, "KF not set up"),
            Self::NotInitialized => defmt::write!(fmt, "KF not initialized"),
            Self::SingularInnovation => defmt::write!(fmt, "Singular innovation covariance"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControlError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidTimeStep { dt } => defmt::write!(fmt, "Invalid dt {}", dt),
            Self::InvalidLimits => defmt::write!(fmt, "Inverted output limits"),
            Self::InvalidSaturation { bound } => {
                defmt::write!(fmt, "Invalid saturation {}", bound)
            }
            Self::IndeterminateOutput => defmt::write!(fmt, "NaN controller output"),
        }
    }
}
