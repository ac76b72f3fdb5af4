//! Floating point abstraction shared by filters and controllers
//!
//! Implemented for `f32` (the usual choice on microcontrollers with a single
//! precision FPU) and `f64`. Absolute value goes through `libm` so the same code
//! builds without `std`.

use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Real number type usable as a filter or controller element
pub trait Scalar:
    Copy
    + Default
    + PartialOrd
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
    /// One half, used for symmetrisation
    const HALF: Self;
    /// Largest finite value
    const MAX: Self;
    /// Most negative finite value
    const LOWEST: Self;
    /// Pivot magnitude below which a matrix is treated as singular
    const PIVOT_EPSILON: Self;

    /// Absolute value
    fn abs(self) -> Self;

    /// True unless NaN or infinite
    fn is_finite(self) -> bool;

    /// True for NaN
    fn is_nan(self) -> bool;

    /// Widening conversion for error reporting
    fn to_f64(self) -> f64;

    /// Limit to `[min, max]`
    ///
    /// Unlike `f32::clamp` this never panics: NaN passes through unchanged and an
    /// inverted range resolves to `max`.
    fn saturate(self, min: Self, max: Self) -> Self {
        let lower = if self < min { min } else { self };
        if lower > max {
            max
        } else {
            lower
        }
    }
}

macro_rules! impl_scalar {
    ($t:ty, $abs:path, $pivot:expr) => {
        impl Scalar for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const HALF: Self = 0.5;
            const MAX: Self = <$t>::MAX;
            const LOWEST: Self = <$t>::MIN;
            const PIVOT_EPSILON: Self = $pivot;

            #[inline]
            fn abs(self) -> Self {
                $abs(self)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar!(f32, libm::fabsf, f32::MIN_POSITIVE);
impl_scalar!(f64, libm::fabs, f64::MIN_POSITIVE);
