//! Estimate-then-control building blocks for embedded loops
//!
//! A discrete-time Kalman filter fuses noisy observations into a state
//! estimate; a controller (PID or full-state feedback) turns a measured or
//! estimated input into a bounded actuation command.
//!
//! Key constraints:
//! - No heap allocation: matrices are const-generic stack arrays
//! - No clock: the caller pushes `dt` and drives every tick
//! - Misuse (updating an uninitialized filter, `dt <= 0`) is a `Result`, never
//!   a silent no-op
//!
//! ```no_run
//! use controlkit_core::{Controller, KalmanFilter, KalmanModel, Pid, PidGains};
//!
//! let model = KalmanModel::<f32, 1, 1>::default()
//!     .with_process_noise([[1e-3]])
//!     .with_measurement_noise([[0.2]]);
//! let mut kf = KalmanFilter::with_initial(model, [[1.0]], [0.0]);
//!
//! let z = 21.7; // read_sensor()
//! kf.time_update()?;
//! let estimate = kf.measurement_update(&[z])?[0];
//!
//! let mut pid = Pid::new(PidGains::new(0.8, 0.1, 0.0), move || estimate);
//! pid.set_target(22.0);
//! let heater = pid.calculate(0.1)?;
//! # Ok::<(), controlkit_core::Error>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(any(feature = "std", feature = "alloc"))]
extern crate alloc;

#[macro_use]
mod logging;

pub mod control;
pub mod errors;
pub mod estimation;
pub mod math;

// Public API
pub use control::{
    Constant, Controller, ControllerCore, OutputLimits, Pid, PidGains, Signal, Source,
    StateFeedback, StateSpace,
};
pub use errors::{ControlError, ControlResult, EstimateError, EstimateResult, Error};
pub use estimation::{Estimator, KalmanFilter, KalmanModel, Kf};
pub use math::{Matrix, Scalar, SquareMatrix, Vector};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
