//! Fixed-size linear algebra for estimation and control
//!
//! Everything here works on stack arrays sized by const generics, so a filter or
//! controller never allocates. Matrices are row-major `[[T; C]; R]`.
//!
//! ```text
//! Matrix<T, R, C>     = [[T; C]; R]
//! SquareMatrix<T, N>  = Matrix<T, N, N>
//! Vector<T, N>        = [T; N]
//! ```

pub mod matrix;
pub mod scalar;

pub use matrix::{Matrix, SquareMatrix, Vector};
pub use scalar::Scalar;
