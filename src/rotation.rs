//! Single-qubit rotation parameterizations and small geometric helpers.
//!
//! A qubit operation `U` is described as `e^(i·phase) · (cos(θ/2)·I − i·sin(θ/2)·(n·σ))`
//! where `n` is a unit axis and `σ = (X, Y, Z)`. The inverse map returns the
//! representative with `θ` and `phase` in (−π, π] and the first non-zero axis
//! component positive.

use core::f64::consts::PI;

use tracing::trace;

use crate::complex::{Complex, ComplexExt, I, ONE};
use crate::format::{format_complex, Format};
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::UNITARY_EPSILON;

/// Below this length a rotation vector has no meaningful direction.
const AXIS_EPSILON: f64 = 1e-12;

/// A rotation of `angle` radians around the unit `axis`, times the global phase `e^(i·phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleAxisPhase {
    /// Represents the rotation angle in radians.
    pub angle: f64,
    /// Represents the unit rotation axis `(x, y, z)`.
    pub axis: [f64; 3],
    /// Represents the global phase in radians.
    pub phase: f64,
}

impl AngleAxisPhase {
    /// Rebuilds the 2×2 operator this parameterization describes.
    pub fn to_operator(&self) -> Matrix {
        Matrix::from_angle_axis_phase_rotation(self.angle, self.axis, self.phase)
    }

    /// Checks whether every field is within `epsilon` of `other`'s.
    pub fn is_approximately_equal_to(&self, other: &AngleAxisPhase, epsilon: f64) -> bool {
        (self.angle - other.angle).abs() <= epsilon
            && (self.phase - other.phase).abs() <= epsilon
            && self.axis.iter().zip(&other.axis).all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl From<AngleAxisPhase> for Matrix {
    fn from(r: AngleAxisPhase) -> Self {
        r.to_operator()
    }
}

impl Matrix {
    /// Returns `e^(i·phase) · (cos(angle/2)·I − i·sin(angle/2)·(x·X + y·Y + z·Z))`.
    ///
    /// `axis` is expected to be a unit vector. Angles and phases on multiples of
    /// π/2 produce exact entries.
    pub fn from_angle_axis_phase_rotation(angle: f64, axis: [f64; 3], phase: f64) -> Matrix {
        let [x, y, z] = axis;
        let half = Complex::expi(angle / 2.0);
        let (cos, sin) = (half.re, half.im);
        let global = Complex::expi(phase);
        let a = Complex::new(cos, -sin * z);
        let b = Complex::new(-sin * y, -sin * x);
        let c = Complex::new(sin * y, -sin * x);
        let d = Complex::new(cos, sin * z);
        Matrix::from_2x2([[a * global, b * global], [c * global, d * global]])
    }

    /// Recovers the canonical angle, axis and phase of a 2×2 unitary.
    ///
    /// # Errors
    /// `UnsupportedShape` for anything but 2×2, `NotUnitary` if the operator is
    /// not unitary within `UNITARY_EPSILON`.
    pub fn qubit_operation_to_angle_axis_rotation(&self) -> Result<AngleAxisPhase> {
        const OP: &str = "qubit_operation_to_angle_axis_rotation";
        let [a, b, c, d] = self.breakdown_2x2(OP)?;
        if !self.is_approximately_unitary(UNITARY_EPSILON) {
            return Err(MatrixError::NotUnitary { operation: OP });
        }

        // Dividing out a square root of the determinant leaves an element of SU(2).
        let mut phase = (a * d - b * c).phase() / 2.0;
        let unphase = Complex::expi(-phase);
        let [a, b, c, d] = [a * unphase, b * unphase, c * unphase, d * unphase];

        let w = ((a + d) / 2.0).re;
        let v = [
            (I * (b + c) / 2.0).re,
            ((c - b) / 2.0).re,
            (I * (a - d) / 2.0).re,
        ];
        let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        let mut angle = 2.0 * length.atan2(w);
        let mut axis = if length <= AXIS_EPSILON {
            [1.0, 0.0, 0.0]
        } else {
            [v[0] / length, v[1] / length, v[2] / length]
        };

        if axis.iter().find(|e| e.abs() > crate::DEFAULT_EPSILON).is_some_and(|e| *e < 0.0) {
            axis = [-axis[0], -axis[1], -axis[2]];
            angle = -angle;
        }
        // A full turn negates the operator.
        if angle <= -PI {
            angle += 2.0 * PI;
            phase += PI;
        } else if angle > PI {
            angle -= 2.0 * PI;
            phase += PI;
        }
        let phase = wrap_phase(phase);
        trace!(angle, ?axis, phase, "recovered qubit rotation");
        Ok(AngleAxisPhase { angle, axis, phase })
    }

    /// Returns the operator for the Pauli-weight vector `(x, y, z)`.
    ///
    /// The rotation turns `2π·|v|` radians around `v/|v|` with global phase
    /// `π·s·|v|`, where `s = sign(11x + 13y + 17z)`. Half turns along an axis give
    /// the matching Pauli operator for either sign, and
    /// `from_pauli_rotation(v)² = from_pauli_rotation(2v)`.
    pub fn from_pauli_rotation(x: f64, y: f64, z: f64) -> Matrix {
        let length = (x * x + y * y + z * z).sqrt();
        if length == 0.0 {
            return Matrix::identity(2);
        }
        let sign = if 11.0 * x + 13.0 * y + 17.0 * z >= 0.0 { 1.0 } else { -1.0 };
        let axis = [x / length, y / length, z / length];
        Matrix::from_angle_axis_phase_rotation(2.0 * PI * length, axis, PI * sign * length)
    }

    /// Returns `(Tr(ρX), Tr(ρY), Tr(ρZ))` of a single-qubit density matrix `ρ`.
    ///
    /// # Errors
    /// `InvalidDensityMatrix` unless the matrix is 2×2, Hermitian, has unit trace
    /// and is positive semi-definite, all within `UNITARY_EPSILON`.
    pub fn qubit_density_matrix_to_bloch_vector(&self) -> Result<[f64; 3]> {
        let invalid = |reason: String| MatrixError::InvalidDensityMatrix { reason };
        let [a, b, c, d] = self
            .breakdown_2x2("qubit_density_matrix_to_bloch_vector")
            .map_err(|_| invalid(format!("expected a 2×2 matrix, got {}×{}", self.width(), self.height())))?;
        if !self.is_approximately_hermitian(UNITARY_EPSILON) {
            return Err(invalid("not Hermitian".to_string()));
        }
        let trace = a + d;
        if !trace.is_approximately_equal_to(ONE, UNITARY_EPSILON) {
            return Err(invalid(format!("trace is {}, expected 1", format_complex(trace, Format::Exact))));
        }

        let x = (b + c).re;
        let y = (I * (b - c)).re;
        let z = (a - d).re;
        // The smaller eigenvalue is (1 − |r|)/2.
        let length = (x * x + y * y + z * z).sqrt();
        if length > 1.0 + UNITARY_EPSILON {
            return Err(invalid(format!("not positive semi-definite, Bloch vector length {}", length)));
        }
        Ok([x, y, z])
    }

    /// Returns the `2^qubit_count`-sized permutation that exchanges bits `a` and `b`
    /// of the basis-state index.
    ///
    /// # Errors
    /// `WireOutOfRange` unless both wires are below `qubit_count`.
    ///
    /// # Panics
    /// Panics if `2^qubit_count` does not fit in `usize`.
    pub fn from_wire_swap(qubit_count: usize, a: usize, b: usize) -> Result<Matrix> {
        if let Some(&wire) = [a, b].iter().find(|&&w| w >= qubit_count) {
            return Err(MatrixError::WireOutOfRange {
                operation: "from_wire_swap",
                wire,
                qubit_count,
            });
        }
        assert!(qubit_count < usize::BITS as usize, "Wire swap dimension overflows usize.");
        let size = 1usize << qubit_count;
        let swap = |i: usize| {
            let (bit_a, bit_b) = ((i >> a) & 1, (i >> b) & 1);
            let cleared = i & !((1 << a) | (1 << b));
            cleared | (bit_a << b) | (bit_b << a)
        };
        Ok(Matrix::generate(size, size, |r, c| if c == swap(r) { 1.0 } else { 0.0 }))
    }

    /// Returns the cross product of two 3-vectors of the same orientation.
    pub fn cross3(&self, other: &Matrix) -> Result<Matrix> {
        let (w, h) = (self.width(), self.height());
        if !matches!((w, h), (1, 3) | (3, 1)) {
            return Err(self.unsupported("cross3"));
        }
        if other.width() != w || other.height() != h {
            return Err(MatrixError::DimensionMismatch {
                operation: "cross3",
                left: (w, h),
                right: (other.width(), other.height()),
            });
        }
        let [u, v] = [self, other].map(|m| {
            let e = |k: usize| if w == 1 { m.entry(k, 0) } else { m.entry(0, k) };
            [e(0), e(1), e(2)]
        });
        let cross = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        Ok(Matrix::generate(w, h, |r, c| cross[r + c]))
    }

    /// Returns the real 2D rotation `{{cos θ, −sin θ}, {sin θ, cos θ}}`.
    pub fn rotation(theta: f64) -> Matrix {
        let (sin, cos) = theta.sin_cos();
        Matrix::generate(2, 2, |r, c| match (r, c) {
            (0, 0) | (1, 1) => cos,
            (0, 1) => -sin,
            _ => sin,
        })
    }
}

/// Wraps a phase into (−π, π].
fn wrap_phase(phase: f64) -> f64 {
    let wrapped = (phase + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}
