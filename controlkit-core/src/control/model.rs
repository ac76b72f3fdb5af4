//! Discrete-time state-space plant model
//!
//! ```text
//! x[k+1] = A·x[k] + B·u[k]
//! y[k]   = C·x[k] + D·u[k]
//! ```
//!
//! Handy for closing a loop in simulation: the plant produces measurements for
//! the estimator and consumes the controller's output.

use crate::math::{
    matrix::{matvec, zeros},
    Matrix, Scalar, SquareMatrix, Vector,
};

/// Linear plant with `NX` states, `NU` inputs and `NY` outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpace<T: Scalar, const NX: usize, const NU: usize, const NY: usize> {
    /// State matrix
    pub a: SquareMatrix<T, NX>,
    /// Input matrix
    pub b: Matrix<T, NX, NU>,
    /// Output matrix
    pub c: Matrix<T, NY, NX>,
    /// Feedthrough matrix
    pub d: Matrix<T, NY, NU>,
}

impl<T: Scalar, const NX: usize, const NU: usize, const NY: usize> StateSpace<T, NX, NU, NY> {
    /// Model from A, B, C, D
    pub fn new(
        a: SquareMatrix<T, NX>,
        b: Matrix<T, NX, NU>,
        c: Matrix<T, NY, NX>,
        d: Matrix<T, NY, NU>,
    ) -> Self {
        Self { a, b, c, d }
    }

    /// Model without feedthrough (D = 0)
    pub fn strictly_proper(
        a: SquareMatrix<T, NX>,
        b: Matrix<T, NX, NU>,
        c: Matrix<T, NY, NX>,
    ) -> Self {
        Self::new(a, b, c, zeros())
    }

    /// Next state `A·x + B·u`
    pub fn propagate(&self, state: &Vector<T, NX>, input: &Vector<T, NU>) -> Vector<T, NX> {
        let mut ax = [T::ZERO; NX];
        let mut bu = [T::ZERO; NX];
        matvec(&self.a, state, &mut ax);
        matvec(&self.b, input, &mut bu);
        for (next, forced) in ax.iter_mut().zip(bu) {
            *next += forced;
        }
        ax
    }

    /// Output `C·x + D·u`
    pub fn output(&self, state: &Vector<T, NX>, input: &Vector<T, NU>) -> Vector<T, NY> {
        let mut cx = [T::ZERO; NY];
        let mut du = [T::ZERO; NY];
        matvec(&self.c, state, &mut cx);
        matvec(&self.d, input, &mut du);
        for (out, feedthrough) in cx.iter_mut().zip(du) {
            *out += feedthrough;
        }
        cx
    }
}
