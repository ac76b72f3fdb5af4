//! Feedback Controllers
//!
//! ## Overview
//!
//! A controller reads a measured or estimated input from its source, compares it
//! with a target and produces a bounded actuation command:
//!
//! ```text
//!            target
//!              │
//! source() ──→ (−) ──→ control law ──→ limit(min, max) ──→ actuator
//!    │                     ↑
//!    └── last_input        dt (pushed by the caller)
//! ```
//!
//! ## Architecture
//!
//! Bookkeeping shared by every variant lives in [`ControllerCore`]: target,
//! input source, output bounds and the last input/output. A variant embeds a
//! core and implements [`Controller::calculate`]; everything else comes from the
//! trait's provided methods, which a variant may override (PID resets its
//! integral on [`Controller::set_target`]).
//!
//! Controllers never read a clock. `dt` is supplied on every call and must be
//! finite and strictly positive, otherwise [`ControlError::InvalidTimeStep`] is
//! returned and nothing changes.
//!
//! ## Variants
//!
//! | Variant | Input | Output | Memory |
//! |---------|-------|--------|--------|
//! | [`Pid`] | scalar | scalar | integral sum, last error |
//! | [`StateFeedback`] | state vector | control vector | none |

pub mod model;
pub mod pid;
pub mod state_feedback;

pub use model::StateSpace;
pub use pid::{OutputLimits, Pid, PidGains};
pub use state_feedback::StateFeedback;

use crate::{
    errors::{ControlError, ControlResult},
    math::{Scalar, Vector},
};

/// Value a controller consumes or produces: a scalar or a fixed-size vector
pub trait Signal: Copy + PartialEq + core::fmt::Debug {
    /// All-zero value
    fn zero() -> Self;

    /// Most negative representable value, the default lower output bound
    fn lowest() -> Self;

    /// Largest representable value, the default upper output bound
    fn highest() -> Self;

    /// `self - other`, elementwise for vectors
    fn difference(self, other: Self) -> Self;

    /// Clamp into `[min, max]`, elementwise for vectors
    fn limit(self, min: &Self, max: &Self) -> Self;

    /// True when `min <= max` holds (for every element)
    fn is_ordered(min: &Self, max: &Self) -> bool;

    /// True when the value (or any element) is NaN
    fn is_indeterminate(&self) -> bool;
}

macro_rules! impl_scalar_signal {
    ($($t:ty),*) => {$(
        impl Signal for $t {
            fn zero() -> Self {
                <$t as Scalar>::ZERO
            }

            fn lowest() -> Self {
                <$t as Scalar>::LOWEST
            }

            fn highest() -> Self {
                <$t as Scalar>::MAX
            }

            fn difference(self, other: Self) -> Self {
                self - other
            }

            fn limit(self, min: &Self, max: &Self) -> Self {
                Scalar::saturate(self, *min, *max)
            }

            fn is_ordered(min: &Self, max: &Self) -> bool {
                min <= max
            }

            fn is_indeterminate(&self) -> bool {
                Scalar::is_nan(*self)
            }
        }
    )*};
}

impl_scalar_signal!(f32, f64);

impl<T: Scalar, const N: usize> Signal for Vector<T, N> {
    fn zero() -> Self {
        [T::ZERO; N]
    }

    fn lowest() -> Self {
        [T::LOWEST; N]
    }

    fn highest() -> Self {
        [T::MAX; N]
    }

    fn difference(self, other: Self) -> Self {
        let mut result = self;
        for (value, other) in result.iter_mut().zip(other) {
            *value -= other;
        }
        result
    }

    fn limit(self, min: &Self, max: &Self) -> Self {
        let mut result = self;
        for i in 0..N {
            result[i] = result[i].saturate(min[i], max[i]);
        }
        result
    }

    fn is_ordered(min: &Self, max: &Self) -> bool {
        min.iter().zip(max).all(|(lo, hi)| lo <= hi)
    }

    fn is_indeterminate(&self) -> bool {
        self.iter().any(|value| value.is_nan())
    }
}

/// Where a controller gets its input from
///
/// Read exactly once per [`Controller::error`] or [`Controller::calculate`]
/// call, synchronously, inside the control tick.
pub trait Source<T> {
    /// Current measured or estimated input
    fn read(&mut self) -> T;
}

impl<T, F: FnMut() -> T> Source<T> for F {
    fn read(&mut self) -> T {
        self()
    }
}

/// Source that always yields the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant<T>(pub T);

impl<T: Copy> Source<T> for Constant<T> {
    fn read(&mut self) -> T {
        self.0
    }
}

/// Heap-allocated source, so one controller can be re-pointed at unrelated closures
#[cfg(any(feature = "std", feature = "alloc"))]
pub type BoxedSource<'a, T> = alloc::boxed::Box<dyn FnMut() -> T + 'a>;

/// State shared by every controller variant
#[derive(Debug, Clone)]
pub struct ControllerCore<I, O, S> {
    target: I,
    source: S,
    min_output: O,
    max_output: O,
    last_input: I,
    last_output: O,
}

impl<I: Signal, O: Signal, S: Source<I>> ControllerCore<I, O, S> {
    /// Core with a zero target and no effective output bounds
    pub fn new(source: S) -> Self {
        Self {
            target: I::zero(),
            source,
            min_output: O::lowest(),
            max_output: O::highest(),
            last_input: I::zero(),
            last_output: O::zero(),
        }
    }

    /// Setpoint
    pub fn target(&self) -> I {
        self.target
    }

    /// Replace the setpoint
    pub fn set_target(&mut self, target: I) {
        self.target = target;
    }

    /// Replace the input source
    pub fn set_source(&mut self, source: S) {
        self.source = source;
    }

    /// Read the source once, recording the value as the last input
    pub fn read(&mut self) -> I {
        let input = self.source.read();
        self.last_input = input;
        input
    }

    /// `target - source()`, recording the input
    pub fn error(&mut self) -> I {
        let input = self.read();
        self.target.difference(input)
    }

    /// Clamp a raw command into the output bounds and record it
    ///
    /// Infinite commands clamp like any other value. A NaN command has no place
    /// in the bounds and is rejected without being recorded.
    pub fn limit(&mut self, raw: O) -> ControlResult<O> {
        if raw.is_indeterminate() {
            log_warn!("Controller output {:?} is indeterminate", raw);
            return Err(ControlError::IndeterminateOutput);
        }
        let output = raw.limit(&self.min_output, &self.max_output);
        if output != raw {
            log_trace!("Controller output {:?} limited to {:?}", raw, output);
        }
        self.last_output = output;
        Ok(output)
    }

    /// Set both output bounds
    pub fn set_output_limits(&mut self, min: O, max: O) -> ControlResult<()> {
        if !O::is_ordered(&min, &max) {
            return Err(ControlError::InvalidLimits);
        }
        self.min_output = min;
        self.max_output = max;
        Ok(())
    }

    /// Lower output bound
    pub fn min_output(&self) -> O {
        self.min_output
    }

    /// Upper output bound
    pub fn max_output(&self) -> O {
        self.max_output
    }

    /// Input seen by the most recent read
    pub fn last_input(&self) -> I {
        self.last_input
    }

    /// Output produced by the most recent calculation
    pub fn last_output(&self) -> O {
        self.last_output
    }
}

/// Reject a time step that is zero, negative or not finite
pub(crate) fn check_time_step<T: Scalar>(dt: T) -> ControlResult<()> {
    if dt > T::ZERO && dt.is_finite() {
        Ok(())
    } else {
        log_warn!("Rejected controller time step dt = {}", dt);
        Err(ControlError::InvalidTimeStep { dt: dt.to_f64() })
    }
}

/// Uniform interface over controller variants
pub trait Controller {
    /// Scalar type of gains and time steps
    type Real: Scalar;
    /// What the source yields and the target is expressed in
    type Input: Signal;
    /// Actuation command type
    type Output: Signal;
    /// Input source type
    type Source: Source<Self::Input>;

    /// Shared controller state
    fn core(&self) -> &ControllerCore<Self::Input, Self::Output, Self::Source>;

    /// Shared controller state, mutably
    fn core_mut(&mut self) -> &mut ControllerCore<Self::Input, Self::Output, Self::Source>;

    /// Run the control law for a tick of `dt` seconds
    ///
    /// The returned value is also available from [`Controller::last_output`]
    /// and always lies within the output bounds. A law that evaluates to NaN
    /// returns [`ControlError::IndeterminateOutput`] instead.
    fn calculate(&mut self, dt: Self::Real) -> ControlResult<Self::Output>;

    /// Setpoint
    fn target(&self) -> Self::Input {
        self.core().target()
    }

    /// Replace the setpoint
    fn set_target(&mut self, target: Self::Input) {
        self.core_mut().set_target(target);
    }

    /// Replace the input source
    fn set_source(&mut self, source: Self::Source) {
        self.core_mut().set_source(source);
    }

    /// `target - source()`; reads the source once and records the input
    fn error(&mut self) -> Self::Input {
        self.core_mut().error()
    }

    /// Set both output bounds; fails if `min > max` anywhere
    fn set_output_limits(&mut self, min: Self::Output, max: Self::Output) -> ControlResult<()> {
        self.core_mut().set_output_limits(min, max)
    }

    /// Set the lower output bound only
    fn set_min_output(&mut self, min: Self::Output) -> ControlResult<()> {
        let max = self.core().max_output();
        self.core_mut().set_output_limits(min, max)
    }

    /// Set the upper output bound only
    fn set_max_output(&mut self, max: Self::Output) -> ControlResult<()> {
        let min = self.core().min_output();
        self.core_mut().set_output_limits(min, max)
    }

    /// Lower output bound
    fn min_output(&self) -> Self::Output {
        self.core().min_output()
    }

    /// Upper output bound
    fn max_output(&self) -> Self::Output {
        self.core().max_output()
    }

    /// Input seen by the most recent read
    fn last_input(&self) -> Self::Input {
        self.core().last_input()
    }

    /// Output of the most recent [`Controller::calculate`]
    fn last_output(&self) -> Self::Output {
        self.core().last_output()
    }
}
