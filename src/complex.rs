//! Complex scalars.
//!
//! `Complex` is `num_complex::Complex64`, which supplies the field arithmetic,
//! `conj`, `norm`, `norm_sqr`, `exp`, `ln`, `sqrt` and `powi`. [`ComplexExt`]
//! adds the branch-aware pieces the matrix code relies on and the conversions
//! to and from `cpx_coords::Cpx`.

use cpx_coords::Cpx;
use num_complex::Complex64;

/// A complex number `re + im·i` with `f64` parts.
pub type Complex = Complex64;

/// Represents 0.
pub const ZERO: Complex = Complex::new(0.0, 0.0);
/// Represents 1.
pub const ONE: Complex = Complex::new(1.0, 0.0);
/// Represents the imaginary unit i.
pub const I: Complex = Complex::new(0.0, 1.0);

/// Operations on [`Complex`] beyond those of `num_complex`.
pub trait ComplexExt: Sized {
    /// Returns `e^(i·phase)`, exact on the multiples of π/2.
    fn expi(phase: f64) -> Self;

    /// Returns the argument in (−π, π]. A signed-zero imaginary part counts as zero.
    fn phase(self) -> f64;

    /// Returns the unit complex number with the same phase. Zero maps to one.
    fn unit(self) -> Self;

    /// Checks whether the distance to `other` is at most `epsilon`.
    fn is_approximately_equal_to(self, other: Self, epsilon: f64) -> bool;

    /// Raises to a complex power on the principal branch of [`ComplexExt::phase`].
    ///
    /// `x^0 = 1` for every `x`, and `0^e = 0` for non-zero `e`.
    fn pow(self, exponent: impl Into<Complex>) -> Self;

    /// Converts from the `cpx-coords` scalar.
    fn from_cpx(c: Cpx<f64>) -> Self;

    /// Converts to the `cpx-coords` scalar in its regularized form.
    fn to_cpx(self) -> Cpx<f64>;
}

impl ComplexExt for Complex {
    fn expi(phase: f64) -> Self {
        use core::f64::consts::FRAC_PI_2;
        let quarter = phase / FRAC_PI_2;
        if quarter == quarter.round() && quarter.abs() < 1e15 {
            match (quarter as i64).rem_euclid(4) {
                0 => ONE,
                1 => I,
                2 => Complex::new(-1.0, 0.0),
                _ => Complex::new(0.0, -1.0),
            }
        } else {
            Complex::from_polar(1.0, phase)
        }
    }

    fn phase(self) -> f64 {
        (self.im + 0.0).atan2(self.re)
    }

    fn unit(self) -> Self {
        let m = self.norm();
        if m == 0.0 { ONE } else { self / m }
    }

    fn is_approximately_equal_to(self, other: Self, epsilon: f64) -> bool {
        (self - other).norm() <= epsilon
    }

    fn pow(self, exponent: impl Into<Complex>) -> Self {
        let exponent = exponent.into();
        if exponent == ZERO {
            return ONE;
        }
        if self == ZERO {
            return ZERO;
        }
        let ln = Complex::new(self.norm().ln(), self.phase());
        (ln * exponent).exp()
    }

    fn from_cpx(c: Cpx<f64>) -> Self {
        Complex::new(c.re(), c.im())
    }

    fn to_cpx(self) -> Cpx<f64> {
        Cpx::PL {
            rad: self.norm(),
            ph: self.phase(),
        }
        .regularize()
    }
}
