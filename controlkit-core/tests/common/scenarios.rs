//! Pre-built scenarios
//!
//! ### Falling body
//! A body thrown upward at roughly 6 m/s from 1 m, tracked at 30 Hz by a noisy
//! altimeter. State is `[position, velocity, acceleration]`; only position is
//! measured.

use controlkit_core::{KalmanModel, SquareMatrix, Vector};

pub const FALLING_BODY_DT: f64 = 1.0 / 30.0;

/// Raw altimeter readings, one per tick
pub const FALLING_BODY_MEASUREMENTS: [f64; 45] = [
    1.042, 1.107, 1.553, 1.714, 1.801, 2.036, 2.334, 2.380, 2.570, 2.582, 2.695, 2.754, 2.605,
    2.970, 2.980, 3.020, 2.787, 2.799, 2.910, 2.958, 3.037, 2.970, 3.002, 2.816, 2.873, 2.815,
    2.609, 2.805, 2.564, 2.529, 2.189, 2.041, 1.944, 1.817, 1.739, 1.516, 1.244, 0.984, 0.826,
    0.814, 0.339, 0.223, -0.009, -0.503, -0.603,
];

pub fn falling_body_model() -> KalmanModel<f64, 3, 1> {
    let dt = FALLING_BODY_DT;
    KalmanModel::new(
        [[1.0, dt, 0.0], [0.0, 1.0, dt], [0.0, 0.0, 1.0]],
        [[1.0, 0.0, 0.0]],
        [[0.05, 0.05, 0.0], [0.05, 0.05, 0.0], [0.0, 0.0, 0.0]],
        [[5.0]],
    )
}

pub fn falling_body_initial_covariance() -> SquareMatrix<f64, 3> {
    [[0.1, 0.1, 0.1], [0.1, 10000.0, 10.0], [0.1, 10.0, 100.0]]
}

pub fn falling_body_initial_state() -> Vector<f64, 3> {
    [1.0, 2.0, -9.81]
}
