//! State estimation
//!
//! ## Overview
//!
//! A recursive Bayesian estimator turns a stream of noisy observations into a
//! best estimate of a hidden state plus its uncertainty:
//!
//! ```text
//! sensor z ──→ measurement_update ──→ x̂, P ──→ controller source
//!                     ↑                 │
//!                     └── time_update ←─┘   (once per tick)
//! ```
//!
//! The caller owns the cadence. Nothing here samples a clock; one
//! `time_update` + `measurement_update` pair is one tick of the model.

pub mod kalman;

pub use kalman::{KalmanFilter, KalmanModel, Kf};

use crate::{
    errors::EstimateResult,
    math::{Scalar, Vector},
};

/// Common interface of discrete-time state estimators
///
/// - `NX`: state vector dimension
/// - `NZ`: measurement vector dimension
pub trait Estimator<T: Scalar, const NX: usize, const NZ: usize> {
    /// Propagate the estimate one step through the process model
    fn time_update(&mut self) -> EstimateResult<Vector<T, NX>>;

    /// Fold a measurement into the estimate
    fn measurement_update(&mut self, measurement: &Vector<T, NZ>) -> EstimateResult<Vector<T, NX>>;

    /// Current state estimate
    fn estimate(&self) -> EstimateResult<Vector<T, NX>>;

    /// True once the estimator may be updated and read
    fn is_ready(&self) -> bool;

    /// One full tick: predict, then correct with `measurement`
    fn step(&mut self, measurement: &Vector<T, NZ>) -> EstimateResult<Vector<T, NX>> {
        self.time_update()?;
        self.measurement_update(measurement)
    }
}
