//! Discrete-Time Linear Kalman Filter
//!
//! ## Overview
//!
//! Recursive minimum-variance estimator for a hidden state `x` observed through
//! noisy linear measurements `z = H·x + v`. The caller drives the recursion one
//! tick at a time: a time update propagates the estimate through the model, a
//! measurement update folds in a new observation.
//!
//! ### 1. Time Update (predict)
//! ```text
//! State extrapolation:      x ← F·x
//! Covariance extrapolation: P ← F·P·Fᵀ + Q
//! ```
//!
//! ### 2. Measurement Update (correct)
//! ```text
//! Innovation:      y = z - H·x
//! Innovation cov:  S = H·P·Hᵀ + R
//! Kalman gain:     K = P·Hᵀ·S⁻¹
//! State update:    x ← x + K·y
//! Covariance:      P ← (I - K·H)·P·(I - K·H)ᵀ + K·R·Kᵀ
//! ```
//!
//! The covariance correction is always the Joseph form. The shorter
//! `P ← (I - K·H)·P` loses symmetry and positive semi-definiteness under
//! rounding and is not offered.
//!
//! ## Lifecycle
//!
//! ```text
//! Default ──set_up()──→ SetUp ──initialize()──→ Initialized ──┐
//!                         ↑                         │  ↑        │ time_update()
//!                         └──────set_up()───────────┘  └────────┘ measurement_update()
//! ```
//!
//! Updating or reading the estimate outside the `Initialized` state returns
//! [`EstimateError::NotSetUp`] or [`EstimateError::NotInitialized`].
//!
//! ## Dimensions
//!
//! `NX` states and `NZ` measurements are const generics. `NX >= NZ` and
//! `NX >= 1` are checked at compile time when a filter is constructed.
//!
//! ## Usage Example
//!
//! ```rust
//! use controlkit_core::{KalmanFilter, KalmanModel};
//!
//! // Constant-velocity model, position measured
//! let dt = 0.1;
//! let model = KalmanModel::<f64, 2, 1>::default()
//!     .with_transition([[1.0, dt], [0.0, 1.0]])
//!     .with_observation([[1.0, 0.0]])
//!     .with_process_noise_diagonal([1e-4, 1e-3])
//!     .with_measurement_noise_diagonal([0.25]);
//!
//! let mut kf = KalmanFilter::with_initial(model, [[1.0, 0.0], [0.0, 1.0]], [0.0, 0.0]);
//!
//! for z in [0.11, 0.19, 0.32, 0.41] {
//!     kf.time_update()?;
//!     kf.measurement_update(&[z])?;
//! }
//! assert!(kf.estimate()?[1] > 0.0);
//! # Ok::<(), controlkit_core::EstimateError>(())
//! ```

use crate::{
    errors::{EstimateError, EstimateResult},
    estimation::Estimator,
    math::{
        matrix::{
            add, identity, invert, is_finite, make_symmetric, matvec, multiply, subtract, transpose,
            zeros,
        },
        Matrix, Scalar, SquareMatrix, Vector,
    },
};

/// Model matrices of a linear Gaussian system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanModel<T: Scalar, const NX: usize, const NZ: usize> {
    /// State transition matrix (F)
    pub transition: SquareMatrix<T, NX>,
    /// Observation matrix (H) - maps state to measurements
    pub observation: Matrix<T, NZ, NX>,
    /// Process noise covariance (Q)
    pub process_noise: SquareMatrix<T, NX>,
    /// Measurement noise covariance (R)
    pub measurement_noise: SquareMatrix<T, NZ>,
}

impl<T: Scalar, const NX: usize, const NZ: usize> Default for KalmanModel<T, NX, NZ> {
    fn default() -> Self {
        // Simple measurement matrix (first NZ states observed)
        let mut observation = zeros::<T, NZ, NX>();
        for i in 0..NZ.min(NX) {
            observation[i][i] = T::ONE;
        }

        Self {
            transition: identity(),
            observation,
            process_noise: zeros(),
            measurement_noise: identity(),
        }
    }
}

impl<T: Scalar, const NX: usize, const NZ: usize> KalmanModel<T, NX, NZ> {
    /// Model from explicit F, H, Q, R
    pub fn new(
        transition: SquareMatrix<T, NX>,
        observation: Matrix<T, NZ, NX>,
        process_noise: SquareMatrix<T, NX>,
        measurement_noise: SquareMatrix<T, NZ>,
    ) -> Self {
        Self {
            transition,
            observation,
            process_noise,
            measurement_noise,
        }
    }

    /// Set state transition matrix
    pub fn with_transition(mut self, transition: SquareMatrix<T, NX>) -> Self {
        self.transition = transition;
        self
    }

    /// Set observation matrix
    pub fn with_observation(mut self, observation: Matrix<T, NZ, NX>) -> Self {
        self.observation = observation;
        self
    }

    /// Set full process noise covariance (higher = less trust in model)
    pub fn with_process_noise(mut self, process_noise: SquareMatrix<T, NX>) -> Self {
        self.process_noise = process_noise;
        self
    }

    /// Set uncorrelated process noise variances
    pub fn with_process_noise_diagonal(mut self, variances: Vector<T, NX>) -> Self {
        self.process_noise = crate::math::matrix::diagonal(&variances);
        self
    }

    /// Set full measurement noise covariance
    pub fn with_measurement_noise(mut self, measurement_noise: SquareMatrix<T, NZ>) -> Self {
        self.measurement_noise = measurement_noise;
        self
    }

    /// Set uncorrelated measurement noise variances, one per sensor
    pub fn with_measurement_noise_diagonal(mut self, variances: Vector<T, NZ>) -> Self {
        self.measurement_noise = crate::math::matrix::diagonal(&variances);
        self
    }
}

/// Linear Kalman filter
///
/// ## Type Parameters
/// - `T`: scalar type (`f32` or `f64`)
/// - `NX`: state vector dimension
/// - `NZ`: measurement vector dimension, at most `NX`
#[derive(Debug, Clone)]
pub struct KalmanFilter<T: Scalar, const NX: usize, const NZ: usize> {
    model: KalmanModel<T, NX, NZ>,
    /// State vector (x)
    state: Vector<T, NX>,
    /// Estimate covariance (P)
    covariance: SquareMatrix<T, NX>,
    /// Kalman gain (K) from the most recent correction
    gain: Matrix<T, NX, NZ>,
    /// Residual z - H·x from the most recent correction
    innovation: Vector<T, NZ>,
    set_up: bool,
    initialized: bool,
}

/// Short alias
pub type Kf<T, const NX: usize, const NZ: usize> = KalmanFilter<T, NX, NZ>;

impl<T: Scalar, const NX: usize, const NZ: usize> Default for KalmanFilter<T, NX, NZ> {
    /// Filter with no model assigned; call [`KalmanFilter::set_up`] before use
    fn default() -> Self {
        let () = Self::DIMENSIONS_OK;

        Self {
            model: KalmanModel::default(),
            state: [T::ZERO; NX],
            covariance: zeros(),
            gain: zeros(),
            innovation: [T::ZERO; NZ],
            set_up: false,
            initialized: false,
        }
    }
}

impl<T: Scalar, const NX: usize, const NZ: usize> KalmanFilter<T, NX, NZ> {
    const DIMENSIONS_OK: () = assert!(
        NX >= 1 && NX >= NZ,
        "a Kalman filter needs at least one state and no more measurements than states"
    );

    /// Number of states
    pub const STATES: usize = NX;

    /// Number of measurements
    pub const MEASUREMENTS: usize = NZ;

    /// Create a set-up but uninitialized filter
    pub fn new(model: KalmanModel<T, NX, NZ>) -> Self {
        let mut kf = Self::default();
        kf.set_up(model);
        kf
    }

    /// Create a set-up filter from explicit F, H, Q, R
    pub fn from_matrices(
        transition: SquareMatrix<T, NX>,
        observation: Matrix<T, NZ, NX>,
        process_noise: SquareMatrix<T, NX>,
        measurement_noise: SquareMatrix<T, NZ>,
    ) -> Self {
        Self::new(KalmanModel::new(
            transition,
            observation,
            process_noise,
            measurement_noise,
        ))
    }

    /// Create a filter that is set up and initialized in one go
    pub fn with_initial(
        model: KalmanModel<T, NX, NZ>,
        initial_covariance: SquareMatrix<T, NX>,
        initial_state: Vector<T, NX>,
    ) -> Self {
        let mut kf = Self::new(model);
        kf.seed(initial_covariance, initial_state);
        kf
    }

    /// Replace the model matrices
    ///
    /// Invalidates the current estimate: the filter must be initialized again
    /// before the next update.
    pub fn set_up(&mut self, model: KalmanModel<T, NX, NZ>) {
        if self.initialized {
            log_debug!("Kalman filter ({}x{}) reconfigured, estimate invalidated", NX, NZ);
        }
        self.model = model;
        self.set_up = true;
        self.initialized = false;
    }

    /// Seed the estimate: `P = P0`, `x = x0`
    ///
    /// Returns the new state estimate.
    pub fn initialize(
        &mut self,
        initial_covariance: SquareMatrix<T, NX>,
        initial_state: Vector<T, NX>,
    ) -> EstimateResult<Vector<T, NX>> {
        if !self.set_up {
            return Err(EstimateError::NotSetUp);
        }
        self.seed(initial_covariance, initial_state);
        Ok(self.state)
    }

    /// Replace the model and seed the estimate in one call
    pub fn reinitialize(
        &mut self,
        model: KalmanModel<T, NX, NZ>,
        initial_covariance: SquareMatrix<T, NX>,
        initial_state: Vector<T, NX>,
    ) -> Vector<T, NX> {
        self.set_up(model);
        self.seed(initial_covariance, initial_state);
        self.state
    }

    fn seed(&mut self, initial_covariance: SquareMatrix<T, NX>, initial_state: Vector<T, NX>) {
        self.covariance = initial_covariance;
        self.state = initial_state;
        self.gain = zeros();
        self.innovation = [T::ZERO; NZ];
        self.initialized = true;
        log_debug!("Kalman filter ({}x{}) initialized", NX, NZ);
    }

    fn ensure_ready(&self) -> EstimateResult<()> {
        if !self.set_up {
            Err(EstimateError::NotSetUp)
        } else if !self.initialized {
            Err(EstimateError::NotInitialized)
        } else {
            Ok(())
        }
    }

    /// Predict step: `x ← F·x`, `P ← F·P·Fᵀ + Q`
    ///
    /// Returns the predicted state.
    pub fn time_update(&mut self) -> EstimateResult<Vector<T, NX>> {
        self.ensure_ready()?;
        let f = &self.model.transition;

        // State extrapolation
        let mut predicted = [T::ZERO; NX];
        matvec(f, &self.state, &mut predicted);
        self.state = predicted;

        // Covariance extrapolation: F·P·Fᵀ + Q
        let mut fp = zeros::<T, NX, NX>();
        multiply(f, &self.covariance, &mut fp);

        let mut f_t = zeros::<T, NX, NX>();
        transpose(f, &mut f_t);

        let mut fpf_t = zeros::<T, NX, NX>();
        multiply(&fp, &f_t, &mut fpf_t);

        add(&fpf_t, &self.model.process_noise, &mut self.covariance);
        make_symmetric(&mut self.covariance);

        Ok(self.state)
    }

    /// Correct step with measurement `z`
    ///
    /// Returns the corrected state. `S` is inverted unconditionally: a singular
    /// innovation covariance (say `R = 0` with `P = 0`) leaves NaN or infinite
    /// values in the estimate, which [`is_finite`] on the result detects. Use
    /// [`KalmanFilter::checked_measurement_update`] to reject such samples
    /// instead.
    pub fn measurement_update(
        &mut self,
        measurement: &Vector<T, NZ>,
    ) -> EstimateResult<Vector<T, NX>> {
        self.ensure_ready()?;
        self.correct(measurement, false)
    }

    /// Correct step that refuses a singular innovation covariance
    ///
    /// Same as [`KalmanFilter::measurement_update`], except that when `S` has a
    /// pivot below [`Scalar::PIVOT_EPSILON`] it returns
    /// [`EstimateError::SingularInnovation`] and leaves the estimate, covariance,
    /// gain and innovation untouched.
    pub fn checked_measurement_update(
        &mut self,
        measurement: &Vector<T, NZ>,
    ) -> EstimateResult<Vector<T, NX>> {
        self.ensure_ready()?;
        self.correct(measurement, true)
    }

    fn correct(
        &mut self,
        measurement: &Vector<T, NZ>,
        reject_singular: bool,
    ) -> EstimateResult<Vector<T, NX>> {
        let h = &self.model.observation;
        let r = &self.model.measurement_noise;

        // Innovation: y = z - H·x
        let mut hx = [T::ZERO; NZ];
        matvec(h, &self.state, &mut hx);
        let mut innovation = [T::ZERO; NZ];
        for i in 0..NZ {
            innovation[i] = measurement[i] - hx[i];
        }

        // Innovation covariance: S = H·P·Hᵀ + R
        let mut h_t = zeros::<T, NX, NZ>();
        transpose(h, &mut h_t);

        let mut hp = zeros::<T, NZ, NX>();
        multiply(h, &self.covariance, &mut hp);

        let mut hph_t = zeros::<T, NZ, NZ>();
        multiply(&hp, &h_t, &mut hph_t);

        let mut s = zeros::<T, NZ, NZ>();
        add(&hph_t, r, &mut s);

        let mut s_inv = zeros::<T, NZ, NZ>();
        if !invert(&s, &mut s_inv) {
            if reject_singular {
                log_warn!("Kalman filter ({}x{}): singular innovation, sample rejected", NX, NZ);
                return Err(EstimateError::SingularInnovation);
            }
            log_debug!("Kalman filter ({}x{}): innovation covariance is singular", NX, NZ);
        }

        // Kalman gain: K = P·Hᵀ·S⁻¹
        let mut ph_t = zeros::<T, NX, NZ>();
        multiply(&self.covariance, &h_t, &mut ph_t);
        multiply(&ph_t, &s_inv, &mut self.gain);

        // State update: x = x + K·y
        let mut correction = [T::ZERO; NX];
        matvec(&self.gain, &innovation, &mut correction);
        for i in 0..NX {
            self.state[i] += correction[i];
        }
        self.innovation = innovation;

        self.joseph_form_update();

        if !is_finite(&[self.state]) {
            log_warn!("Kalman filter ({}x{}): estimate is no longer finite", NX, NZ);
        }

        Ok(self.state)
    }

    /// Covariance correction `P = (I - K·H)·P·(I - K·H)ᵀ + K·R·Kᵀ`
    fn joseph_form_update(&mut self) {
        let h = &self.model.observation;
        let r = &self.model.measurement_noise;

        // I - K·H
        let mut kh = zeros::<T, NX, NX>();
        multiply(&self.gain, h, &mut kh);
        let mut i_kh = zeros::<T, NX, NX>();
        subtract(&identity(), &kh, &mut i_kh);

        let mut i_kh_t = zeros::<T, NX, NX>();
        transpose(&i_kh, &mut i_kh_t);

        // (I - K·H)·P·(I - K·H)ᵀ
        let mut left = zeros::<T, NX, NX>();
        multiply(&i_kh, &self.covariance, &mut left);
        let mut sandwich = zeros::<T, NX, NX>();
        multiply(&left, &i_kh_t, &mut sandwich);

        // K·R·Kᵀ
        let mut kr = zeros::<T, NX, NZ>();
        multiply(&self.gain, r, &mut kr);
        let mut k_t = zeros::<T, NZ, NX>();
        transpose(&self.gain, &mut k_t);
        let mut krk_t = zeros::<T, NX, NX>();
        multiply(&kr, &k_t, &mut krk_t);

        add(&sandwich, &krk_t, &mut self.covariance);
        make_symmetric(&mut self.covariance);
    }

    /// Current state estimate
    pub fn estimate(&self) -> EstimateResult<Vector<T, NX>> {
        self.ensure_ready()?;
        Ok(self.state)
    }

    /// Current estimate covariance
    pub fn covariance(&self) -> EstimateResult<&SquareMatrix<T, NX>> {
        self.ensure_ready()?;
        Ok(&self.covariance)
    }

    /// Variance of each state (diagonal of P)
    pub fn uncertainty(&self) -> EstimateResult<Vector<T, NX>> {
        self.ensure_ready()?;
        let mut variances = [T::ZERO; NX];
        for (i, variance) in variances.iter_mut().enumerate() {
            *variance = self.covariance[i][i];
        }
        Ok(variances)
    }

    /// Gain used by the most recent measurement update (zero before the first)
    pub fn gain(&self) -> &Matrix<T, NX, NZ> {
        &self.gain
    }

    /// Residual of the most recent measurement update (zero before the first)
    pub fn innovation(&self) -> &Vector<T, NZ> {
        &self.innovation
    }

    /// Model matrices currently in use
    pub fn model(&self) -> &KalmanModel<T, NX, NZ> {
        &self.model
    }

    /// Whether model matrices have been assigned
    pub fn is_set_up(&self) -> bool {
        self.set_up
    }

    /// Whether the state and covariance have been seeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<T: Scalar, const NX: usize, const NZ: usize> Estimator<T, NX, NZ> for KalmanFilter<T, NX, NZ> {
    fn time_update(&mut self) -> EstimateResult<Vector<T, NX>> {
        KalmanFilter::time_update(self)
    }

    fn measurement_update(&mut self, measurement: &Vector<T, NZ>) -> EstimateResult<Vector<T, NX>> {
        KalmanFilter::measurement_update(self, measurement)
    }

    fn estimate(&self) -> EstimateResult<Vector<T, NX>> {
        KalmanFilter::estimate(self)
    }

    fn is_ready(&self) -> bool {
        self.set_up && self.initialized
    }
}
