//! PID controller with anti-windup
//!
//! ```text
//! e  = target - source()
//! P  = Kp·e
//! I  = clamp(I + Ki·e·dt, -I_sat, +I_sat)
//! D  = Kd·(e - e_prev) / dt
//! u  = clamp(P + I + D, min_output, max_output)
//! ```
//!
//! Two independent clamps keep the loop sane when the actuator saturates: the
//! integral sum is bounded by the integral saturation, and the output by the
//! output limits. Changing the setpoint also zeroes the integral sum.
//!
//! Gains large enough to overflow can turn `P + I + D` into `inf - inf`. That
//! tick fails with [`ControlError::IndeterminateOutput`] and the integral and
//! derivative history stay as they were.

use crate::{
    control::{check_time_step, Controller, ControllerCore, Signal, Source},
    errors::{ControlError, ControlResult},
    math::Scalar,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidGains<T> {
    /// Proportional gain
    pub kp: T,
    /// Integral gain
    pub ki: T,
    /// Derivative gain
    pub kd: T,
}

impl<T> PidGains<T> {
    /// Gains from Kp, Ki, Kd
    pub const fn new(kp: T, ki: T, kd: T) -> Self {
        Self { kp, ki, kd }
    }
}

/// Scalar output bounds, usable as loadable configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputLimits<T> {
    /// Lower bound
    pub min: T,
    /// Upper bound
    pub max: T,
}

impl<T: Scalar> Default for OutputLimits<T> {
    fn default() -> Self {
        Self {
            min: T::LOWEST,
            max: T::MAX,
        }
    }
}

/// Proportional-integral-derivative controller
#[derive(Debug, Clone)]
pub struct Pid<T: Scalar, S> {
    core: ControllerCore<T, T, S>,
    gains: PidGains<T>,
    integral_sum: T,
    integral_saturation: T,
    last_error: T,
}

impl<T: Scalar + Signal, S: Source<T>> Pid<T, S> {
    /// Create a controller reading its input from `source`
    ///
    /// Target, integral sum and last error start at zero; output and integral
    /// are unbounded until limits are set.
    pub fn new(gains: PidGains<T>, source: S) -> Self {
        Self {
            core: ControllerCore::new(source),
            gains,
            integral_sum: T::ZERO,
            integral_saturation: T::MAX,
            last_error: T::ZERO,
        }
    }

    /// Apply output limits while building
    pub fn with_limits(mut self, limits: OutputLimits<T>) -> ControlResult<Self> {
        self.core.set_output_limits(limits.min, limits.max)?;
        Ok(self)
    }

    /// Current gains
    pub fn gains(&self) -> PidGains<T> {
        self.gains
    }

    /// Replace all three gains
    pub fn set_gains(&mut self, gains: PidGains<T>) {
        self.gains = gains;
    }

    /// Proportional gain
    pub fn kp(&self) -> T {
        self.gains.kp
    }

    /// Integral gain
    pub fn ki(&self) -> T {
        self.gains.ki
    }

    /// Derivative gain
    pub fn kd(&self) -> T {
        self.gains.kd
    }

    /// Set proportional gain
    pub fn set_kp(&mut self, kp: T) {
        self.gains.kp = kp;
    }

    /// Set integral gain
    pub fn set_ki(&mut self, ki: T) {
        self.gains.ki = ki;
    }

    /// Set derivative gain
    pub fn set_kd(&mut self, kd: T) {
        self.gains.kd = kd;
    }

    /// Bound the integral sum to `[-bound, bound]`
    ///
    /// Independent of the output limits. The current sum is clamped right away
    /// so the invariant holds between calls too.
    pub fn set_integral_saturation(&mut self, bound: T) -> ControlResult<()> {
        if !(bound >= T::ZERO) {
            return Err(ControlError::InvalidSaturation { bound: bound.to_f64() });
        }
        self.integral_saturation = bound;
        self.integral_sum = self.integral_sum.saturate(-bound, bound);
        Ok(())
    }

    /// Symmetric integral clamp
    pub fn integral_saturation(&self) -> T {
        self.integral_saturation
    }

    /// Accumulated integral term
    pub fn integral_sum(&self) -> T {
        self.integral_sum
    }

    /// Error seen by the most recent calculation
    pub fn last_error(&self) -> T {
        self.last_error
    }

    /// Forget integral and derivative history
    pub fn reset(&mut self) {
        self.integral_sum = T::ZERO;
        self.last_error = T::ZERO;
    }
}

impl<T: Scalar + Signal, S: Source<T>> Controller for Pid<T, S> {
    type Real = T;
    type Input = T;
    type Output = T;
    type Source = S;

    fn core(&self) -> &ControllerCore<T, T, S> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ControllerCore<T, T, S> {
        &mut self.core
    }

    fn calculate(&mut self, dt: T) -> ControlResult<T> {
        check_time_step(dt)?;
        let PidGains { kp, ki, kd } = self.gains;
        let error = self.core.error();

        let proportional = kp * error;

        let unbounded = self.integral_sum + ki * error * dt;
        let bound = self.integral_saturation;
        let integral = unbounded.saturate(-bound, bound);

        let derivative = kd * (error - self.last_error) / dt;

        let output = self.core.limit(proportional + integral + derivative)?;
        if integral != unbounded {
            log_trace!("PID integral saturated at {}", integral);
        }
        self.integral_sum = integral;
        self.last_error = error;

        Ok(output)
    }

    /// Zero the integral sum, then move the setpoint
    fn set_target(&mut self, target: T) {
        self.integral_sum = T::ZERO;
        self.core.set_target(target);
    }
}
