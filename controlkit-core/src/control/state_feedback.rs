//! Full-state feedback
//!
//! Memoryless proportional law on the whole state vector:
//!
//! ```text
//! u = clamp(−K·x, min_output, max_output)
//! ```
//!
//! `x` usually comes from an estimator (see [`crate::estimation`]). The gain is
//! supplied by the caller; synthesising it (LQR, pole placement) is out of scope.

use crate::{
    control::{check_time_step, Controller, ControllerCore, Source},
    errors::ControlResult,
    math::{matrix::matvec, Matrix, Scalar, Vector},
};

/// State-feedback controller with `NX` states and `NU` control inputs
#[derive(Debug, Clone)]
pub struct StateFeedback<T: Scalar, const NX: usize, const NU: usize, S> {
    core: ControllerCore<Vector<T, NX>, Vector<T, NU>, S>,
    gain: Matrix<T, NU, NX>,
}

impl<T, const NX: usize, const NU: usize, S> StateFeedback<T, NX, NU, S>
where
    T: Scalar,
    S: Source<Vector<T, NX>>,
{
    /// Controller with gain `K` reading the state from `source`
    pub fn new(gain: Matrix<T, NU, NX>, source: S) -> Self {
        Self {
            core: ControllerCore::new(source),
            gain,
        }
    }

    /// Feedback gain K
    pub fn gain(&self) -> &Matrix<T, NU, NX> {
        &self.gain
    }

    /// Replace the feedback gain
    pub fn set_gain(&mut self, gain: Matrix<T, NU, NX>) {
        self.gain = gain;
    }
}

impl<T: Scalar, const NX: usize, const NU: usize, S: Source<Vector<T, NX>>> Controller
    for StateFeedback<T, NX, NU, S>
{
    type Real = T;
    type Input = Vector<T, NX>;
    type Output = Vector<T, NU>;
    type Source = S;

    fn core(&self) -> &ControllerCore<Self::Input, Self::Output, S> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ControllerCore<Self::Input, Self::Output, S> {
        &mut self.core
    }

    /// `dt` is validated but unused: the law has no dynamics
    fn calculate(&mut self, dt: T) -> ControlResult<Vector<T, NU>> {
        check_time_step(dt)?;
        let state = self.core.read();

        let mut kx = [T::ZERO; NU];
        matvec(&self.gain, &state, &mut kx);
        for value in kx.iter_mut() {
            *value = -*value;
        }

        self.core.limit(kx)
    }
}
