//! Matrix operations for the filter and controller equations
//!
//! Provides the small set of linear algebra the Kalman recursion and the
//! state-feedback law need, without heap allocation. Results are written into
//! caller-supplied buffers so the hot path can reuse a workspace.

use super::Scalar;

/// Matrix type using const generics
pub type Matrix<T, const R: usize, const C: usize> = [[T; C]; R];

/// Square matrix type
pub type SquareMatrix<T, const N: usize> = Matrix<T, N, N>;

/// Vector type
pub type Vector<T, const N: usize> = [T; N];

/// All-zero matrix
pub fn zeros<T: Scalar, const R: usize, const C: usize>() -> Matrix<T, R, C> {
    [[T::ZERO; C]; R]
}

/// Identity matrix
pub fn identity<T: Scalar, const N: usize>() -> SquareMatrix<T, N> {
    let mut result = zeros::<T, N, N>();
    for i in 0..N {
        result[i][i] = T::ONE;
    }
    result
}

/// Diagonal matrix from a vector
pub fn diagonal<T: Scalar, const N: usize>(values: &Vector<T, N>) -> SquareMatrix<T, N> {
    let mut result = zeros::<T, N, N>();
    for i in 0..N {
        result[i][i] = values[i];
    }
    result
}

/// Matrix multiplication: C = A × B
///
/// Dimensions: A[R×K] × B[K×C] = C[R×C]
pub fn multiply<T: Scalar, const R: usize, const K: usize, const C: usize>(
    a: &Matrix<T, R, K>,
    b: &Matrix<T, K, C>,
    result: &mut Matrix<T, R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            let mut sum = T::ZERO;
            for k in 0..K {
                sum += a[i][k] * b[k][j];
            }
            result[i][j] = sum;
        }
    }
}

/// Matrix transpose: B = Aᵀ
pub fn transpose<T: Scalar, const R: usize, const C: usize>(
    a: &Matrix<T, R, C>,
    result: &mut Matrix<T, C, R>,
) {
    for i in 0..R {
        for j in 0..C {
            result[j][i] = a[i][j];
        }
    }
}

/// Matrix addition: C = A + B
pub fn add<T: Scalar, const R: usize, const C: usize>(
    a: &Matrix<T, R, C>,
    b: &Matrix<T, R, C>,
    result: &mut Matrix<T, R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            result[i][j] = a[i][j] + b[i][j];
        }
    }
}

/// Matrix subtraction: C = A - B
pub fn subtract<T: Scalar, const R: usize, const C: usize>(
    a: &Matrix<T, R, C>,
    b: &Matrix<T, R, C>,
    result: &mut Matrix<T, R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            result[i][j] = a[i][j] - b[i][j];
        }
    }
}

/// Matrix-vector multiplication: y = A × x
pub fn matvec<T: Scalar, const R: usize, const C: usize>(
    matrix: &Matrix<T, R, C>,
    vector: &Vector<T, C>,
    result: &mut Vector<T, R>,
) {
    for i in 0..R {
        let mut sum = T::ZERO;
        for j in 0..C {
            sum += matrix[i][j] * vector[j];
        }
        result[i] = sum;
    }
}

/// Make matrix symmetric: A = (A + Aᵀ) / 2
///
/// Rounding in `A·P·Aᵀ` leaves the two triangles a few ULPs apart; averaging
/// them keeps a covariance exactly symmetric.
pub fn make_symmetric<T: Scalar, const N: usize>(matrix: &mut SquareMatrix<T, N>) {
    for i in 0..N {
        for j in i + 1..N {
            let avg = (matrix[i][j] + matrix[j][i]) * T::HALF;
            matrix[i][j] = avg;
            matrix[j][i] = avg;
        }
    }
}

/// Check `A == Aᵀ` within an absolute tolerance
pub fn is_symmetric<T: Scalar, const N: usize>(matrix: &SquareMatrix<T, N>, tolerance: T) -> bool {
    for i in 0..N {
        for j in i + 1..N {
            if (matrix[i][j] - matrix[j][i]).abs() > tolerance {
                return false;
            }
        }
    }
    true
}

/// Sum of the diagonal
pub fn trace<T: Scalar, const N: usize>(matrix: &SquareMatrix<T, N>) -> T {
    let mut sum = T::ZERO;
    for i in 0..N {
        sum += matrix[i][i];
    }
    sum
}

/// True when no element is NaN or infinite
pub fn is_finite<T: Scalar, const R: usize, const C: usize>(matrix: &Matrix<T, R, C>) -> bool {
    matrix.iter().flatten().all(|value| value.is_finite())
}

/// Matrix inversion using Gauss-Jordan elimination with partial pivoting
///
/// Row operations are applied to a working copy of `a` and, in lockstep, to
/// `inv` seeded with the identity. Elimination always runs to completion.
/// Returns false if any pivot fell below [`Scalar::PIVOT_EPSILON`] (or was
/// NaN); a singular matrix then leaves NaN or infinite entries in `inv`.
pub fn invert<T: Scalar, const N: usize>(
    a: &SquareMatrix<T, N>,
    inv: &mut SquareMatrix<T, N>,
) -> bool {
    let mut work = *a;
    *inv = identity();
    let mut regular = true;

    for k in 0..N {
        // Find pivot
        let mut max_row = k;
        let mut max_val = work[k][k].abs();
        for i in (k + 1)..N {
            if work[i][k].abs() > max_val {
                max_val = work[i][k].abs();
                max_row = i;
            }
        }

        // NaN pivots fail this comparison too
        if !(max_val >= T::PIVOT_EPSILON) {
            regular = false;
        }

        if max_row != k {
            work.swap(k, max_row);
            inv.swap(k, max_row);
        }

        // Scale pivot row
        let pivot = work[k][k];
        for j in 0..N {
            work[k][j] /= pivot;
            inv[k][j] /= pivot;
        }

        // Eliminate column
        for i in 0..N {
            if i != k {
                let factor = work[i][k];
                for j in 0..N {
                    work[i][j] -= factor * work[k][j];
                    inv[i][j] -= factor * inv[k][j];
                }
            }
        }
    }

    regular
}
