//! Unitarity tests and closed-form spectral decompositions of 2×2 operators.

use tracing::debug;

use crate::complex::{Complex, ComplexExt, ONE, ZERO};
use crate::error::Result;
use crate::matrix::Matrix;

/// Squared lengths below this fraction of the reference squared length count as zero.
///
/// Eigenvector candidates are measured against the operator's squared Frobenius
/// norm and pivots against the column's own, so results do not depend on scale.
const DEGENERATE_RATIO: f64 = 1e-24;

/// An eigenvalue together with a unit eigenvector (column).
#[derive(Debug, Clone, PartialEq)]
pub struct EigenComponent {
    /// Represents the eigenvalue.
    pub value: Complex,
    /// Represents the unit eigenvector as a 2×1 column.
    pub vector: Matrix,
}

/// Factors `m = u · s · v` with `u`, `v` unitary and `s` diagonal, non-negative and descending.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularValueDecomposition {
    /// Represents the left unitary factor.
    pub u: Matrix,
    /// Represents the diagonal of singular values.
    pub s: Matrix,
    /// Represents the right unitary factor.
    pub v: Matrix,
}

impl Matrix {
    /// Checks whether the matrix is square and `m · m⁺ ≈ I` within `epsilon`.
    pub fn is_approximately_unitary(&self, epsilon: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        match self.times(&self.adjoint()) {
            Ok(p) => p.is_approximately_equal_to(&Matrix::identity(self.width()), epsilon),
            Err(_) => false,
        }
    }

    /// Checks whether the matrix is square and `m ≈ m⁺` within `epsilon`.
    pub fn is_approximately_hermitian(&self, epsilon: f64) -> bool {
        self.is_square() && self.is_approximately_equal_to(&self.adjoint(), epsilon)
    }

    /// Returns both eigenvalues of a 2×2 operator with unit eigenvectors.
    ///
    /// Components are ordered by ascending real part, then imaginary part. Each
    /// vector is phased so its first non-zero entry is real and positive. For a
    /// multiple of the identity the standard basis is returned.
    pub fn eigen_decomposition(&self) -> Result<Vec<EigenComponent>> {
        let [a, b, c, d] = self.breakdown_2x2("eigen_decomposition")?;
        let mean = (a + d) / 2.0;
        let det = a * d - b * c;
        let offset = (mean * mean - det).sqrt();
        let scale = norm2(&[a, b]) + norm2(&[c, d]);
        let mut values = [mean - offset, mean + offset];
        values.sort_by(|x, y| x.re.total_cmp(&y.re).then(x.im.total_cmp(&y.im)));

        let components = values
            .iter()
            .enumerate()
            .map(|(k, &value)| {
                let first = [b, value - a];
                let second = [value - d, c];
                let (n1, n2) = (norm2(&first), norm2(&second));
                let candidate = if n1.max(n2) <= DEGENERATE_RATIO * scale {
                    if k == 0 { [ONE, ZERO] } else { [ZERO, ONE] }
                } else if n1 >= n2 {
                    first
                } else {
                    second
                };
                EigenComponent {
                    value,
                    vector: unit_column(candidate),
                }
            })
            .collect();
        Ok(components)
    }

    /// Rebuilds the operator after applying `f` to each eigenvalue: `Σ f(λ)·v·v⁺`.
    ///
    /// Only meaningful for normal operators (unitary or Hermitian), where the
    /// eigenvectors are orthonormal. 2×2 operators only.
    pub fn lift_apply<F>(&self, f: F) -> Result<Matrix>
    where
        F: Fn(Complex) -> Complex,
    {
        let mut total = Matrix::zero(2, 2);
        for EigenComponent { value, vector } in self.eigen_decomposition()? {
            let projector = vector.times(&vector.adjoint())?;
            total = total.plus(&projector.scaled_by(f(value)))?;
        }
        Ok(total)
    }

    /// Returns the singular value decomposition of a 2×2 operator.
    ///
    /// The zero matrix decomposes into `u = v = I`, `s = 0`.
    pub fn singular_value_decomposition(&self) -> Result<SingularValueDecomposition> {
        let [a, b, c, d] = self.breakdown_2x2("singular_value_decomposition")?;
        let gram = self.adjoint().times(self)?;
        let eigen = gram.eigen_decomposition()?;
        // Ties keep the first component so diagonal inputs keep the standard basis order.
        let top = if eigen[1].value.re > eigen[0].value.re { &eigen[1] } else { &eigen[0] };

        let sigma1 = top.value.re.max(0.0).sqrt();
        if sigma1 == 0.0 {
            return Ok(SingularValueDecomposition {
                u: Matrix::identity(2),
                s: Matrix::zero(2, 2),
                v: Matrix::identity(2),
            });
        }
        // |det m| = σ₁σ₂ keeps the small singular value accurate.
        let sigma2 = (a * d - b * c).norm() / sigma1;

        let v1 = &top.vector;
        let v2 = &orthogonal_unit_column(v1);
        let u1 = self.times(v1)?.scaled_by(1.0 / sigma1);
        let u2 = if sigma2 > crate::DEFAULT_EPSILON * sigma1 {
            self.times(v2)?.scaled_by(1.0 / sigma2)
        } else {
            debug!(sigma1, sigma2, "rank deficient operator, completing u by orthogonality");
            Matrix::col(&[-u1.entry(1, 0).conj(), u1.entry(0, 0).conj()])?
        };

        let u = Matrix::generate(2, 2, |r, k| if k == 0 { u1.entry(r, 0) } else { u2.entry(r, 0) });
        let s = Matrix::generate(2, 2, |r, k| match (r, k) {
            (0, 0) => sigma1,
            (1, 1) => sigma2,
            _ => 0.0,
        });
        let v = Matrix::generate(2, 2, |r, k| {
            let vec = if r == 0 { v1 } else { v2 };
            vec.entry(k, 0).conj()
        });
        Ok(SingularValueDecomposition { u, s, v })
    }

    /// Returns the unitary nearest to the operator in Frobenius distance, `u · v`
    /// from its singular value decomposition. The zero matrix maps to the identity.
    pub fn closest_unitary(&self) -> Result<Matrix> {
        let SingularValueDecomposition { u, v, .. } = self.singular_value_decomposition()?;
        u.times(&v)
    }
}

fn norm2(v: &[Complex; 2]) -> f64 {
    v[0].norm_sqr() + v[1].norm_sqr()
}

/// Returns the unit column orthogonal to a unit 2-column, phased like `unit_column`.
fn orthogonal_unit_column(v: &Matrix) -> Matrix {
    unit_column([-v.entry(1, 0).conj(), v.entry(0, 0).conj()])
}

/// Normalizes to unit length with the first non-zero entry real and positive.
fn unit_column(v: [Complex; 2]) -> Matrix {
    let length2 = norm2(&v);
    let length = length2.sqrt();
    let pivot = if v[0].norm_sqr() > DEGENERATE_RATIO * length2 { v[0] } else { v[1] };
    let fix = pivot.unit().conj() / length;
    Matrix::generate(1, 2, |r, _| v[r] * fix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::I;
    use core::f64::consts::PI;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    fn col(values: &[Complex]) -> Matrix {
        Matrix::col(values).unwrap()
    }

    fn assert_components(actual: &[EigenComponent], expected: &[(Complex, Matrix)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, (value, vector)) in actual.iter().zip(expected) {
            assert!(a.value.is_approximately_equal_to(*value, 1e-9), "{:?} vs {:?}", a.value, value);
            assert!(a.vector.is_approximately_equal_to(vector, 1e-9), "{} vs {}", a.vector, vector);
        }
    }

    #[test]
    fn test_is_approximately_unitary() {
        assert!(!Matrix::row(&[1.0, 1.0]).unwrap().is_approximately_unitary(999.0));
        assert!(!Matrix::col(&[1.0, 1.0]).unwrap().is_approximately_unitary(999.0));
        assert!(Matrix::row(&[1.0]).unwrap().is_approximately_unitary(0.0));
        assert!(Matrix::row(&[I]).unwrap().is_approximately_unitary(0.0));
        assert!(Matrix::row(&[-1.0]).unwrap().is_approximately_unitary(0.0));
        assert!(!Matrix::row(&[-2.0]).unwrap().is_approximately_unitary(0.0));
        assert!(!Matrix::row(&[0.0]).unwrap().is_approximately_unitary(0.0));
        assert!(Matrix::row(&[-2.0]).unwrap().is_approximately_unitary(999.0));

        assert!(Matrix::identity(2).is_approximately_unitary(0.0));
        assert!(Matrix::rotation(1.0).is_approximately_unitary(0.001));
        assert!(Matrix::pauli_x().is_approximately_unitary(0.0));
        assert!(Matrix::pauli_y().is_approximately_unitary(0.0));
        assert!(Matrix::pauli_z().is_approximately_unitary(0.0));
        assert!(Matrix::hadamard().is_approximately_unitary(0.001));
    }

    #[test]
    fn test_is_approximately_hermitian() {
        let sq = |v: &[Complex]| Matrix::square(v).unwrap();
        assert!(!Matrix::row(&[1.0, 1.0]).unwrap().is_approximately_hermitian(999.0));
        assert!(Matrix::row(&[-2.0]).unwrap().is_approximately_hermitian(0.0));
        assert!(!Matrix::row(&[I]).unwrap().is_approximately_hermitian(0.0));
        assert!(!Matrix::row(&[I]).unwrap().is_approximately_hermitian(0.5));
        assert!(Matrix::row(&[I]).unwrap().is_approximately_hermitian(999.0));

        assert!(Matrix::pauli_x().is_approximately_hermitian(0.0));
        assert!(Matrix::pauli_y().is_approximately_hermitian(0.0));
        assert!(Matrix::pauli_z().is_approximately_hermitian(0.0));
        assert!(Matrix::hadamard().is_approximately_hermitian(0.001));

        assert!(!sq(&[ONE, ONE, c(1.5, 0.0), ONE]).is_approximately_hermitian(0.0));
        assert!(sq(&[ONE, ONE, c(1.5, 0.0), ONE]).is_approximately_hermitian(0.75));
        assert!(!sq(&[ONE, I, I, ONE]).is_approximately_hermitian(0.0));
        assert!(sq(&[ONE, I, -I, ONE]).is_approximately_hermitian(0.0));
        assert!(!sq(&[ONE, I, I * -1.5, ONE]).is_approximately_hermitian(0.0));
        assert!(sq(&[ONE, I, I * -1.5, ONE]).is_approximately_hermitian(0.75));
    }

    #[test]
    fn test_eigen_decomposition_exact_cases() {
        let identity = Matrix::identity(2).eigen_decomposition().unwrap();
        assert_eq!(
            identity,
            vec![
                EigenComponent { value: ONE, vector: col(&[ONE, ZERO]) },
                EigenComponent { value: ONE, vector: col(&[ZERO, ONE]) },
            ]
        );
        let z = Matrix::pauli_z().eigen_decomposition().unwrap();
        assert_eq!(
            z,
            vec![
                EigenComponent { value: -ONE, vector: col(&[ZERO, ONE]) },
                EigenComponent { value: ONE, vector: col(&[ONE, ZERO]) },
            ]
        );
    }

    #[test]
    fn test_eigen_decomposition_approximate_cases() {
        let s = 0.5f64.sqrt();
        let r2 = 2f64.sqrt();
        assert_components(
            &Matrix::pauli_x().eigen_decomposition().unwrap(),
            &[(-ONE, col(&[c(s, 0.0), c(-s, 0.0)])), (ONE, col(&[c(s, 0.0), c(s, 0.0)]))],
        );
        assert_components(
            &Matrix::pauli_y().eigen_decomposition().unwrap(),
            &[(-ONE, col(&[c(s, 0.0), c(0.0, -s)])), (ONE, col(&[c(s, 0.0), c(0.0, s)]))],
        );
        let low = col(&[c(1.0 - r2, 0.0), ONE]).scaled_by(-1.0 / (4.0 - 2.0 * r2).sqrt());
        let high = col(&[c(1.0 + r2, 0.0), ONE]).scaled_by(1.0 / (4.0 + 2.0 * r2).sqrt());
        assert_components(
            &Matrix::square(&[1.0, 1.0, 1.0, -1.0]).unwrap().eigen_decomposition().unwrap(),
            &[(c(-r2, 0.0), low.clone()), (c(r2, 0.0), high.clone())],
        );
        assert_components(
            &Matrix::hadamard().eigen_decomposition().unwrap(),
            &[(-ONE, low), (ONE, high)],
        );
        assert!(Matrix::identity(3).eigen_decomposition().is_err());
    }

    #[test]
    fn test_eigen_decomposition_reconstructs_non_hermitian() {
        let m = Matrix::square(&[c(1.0, 2.0), c(0.5, 0.0), c(-3.0, 1.0), c(0.0, -1.0)]).unwrap();
        for EigenComponent { value, vector } in m.eigen_decomposition().unwrap() {
            let lhs = m.times(&vector).unwrap();
            assert!(lhs.is_approximately_equal_to(&vector.scaled_by(value), 1e-9));
            assert!((vector.norm2() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_lift_apply() {
        let s = 0.5f64.sqrt();
        let sq = |v: &[Complex]| Matrix::square(v).unwrap();
        let t_expi = |t: f64| move |c: Complex| (c * I * t).exp();
        let t_pow = |t: f64| move |c: Complex| c.pow(t);
        let check = |m: Matrix, expected: Matrix| {
            assert!(m.is_approximately_equal_to(&expected, 1e-9), "{} vs {}", m, expected);
        };
        let (x, y, z) = (Matrix::pauli_x(), Matrix::pauli_y(), Matrix::pauli_z());

        check(x.lift_apply(t_expi(PI)).unwrap(), Matrix::identity(2).scaled_by(-1.0));
        check(x.lift_apply(t_expi(PI / 2.0)).unwrap(), sq(&[ZERO, I, I, ZERO]));
        check(x.lift_apply(t_expi(PI / 4.0)).unwrap(), sq(&[ONE, I, I, ONE]).scaled_by(s));
        check(y.lift_apply(t_expi(PI / 2.0)).unwrap(), sq(&[ZERO, ONE, -ONE, ZERO]));
        check(y.lift_apply(t_expi(PI / 4.0)).unwrap(), sq(&[ONE, ONE, -ONE, ONE]).scaled_by(s));
        check(z.lift_apply(t_expi(PI / 2.0)).unwrap(), sq(&[I, ZERO, ZERO, -I]));

        check(x.lift_apply(t_pow(0.5)).unwrap(), sq(&[I, ONE, ONE, I]).scaled_by(c(0.5, -0.5)));
        check(x.lift_apply(t_pow(-0.5)).unwrap(), sq(&[-I, ONE, ONE, -I]).scaled_by(c(0.5, 0.5)));
        check(y.lift_apply(t_pow(0.5)).unwrap(), sq(&[ONE, -ONE, ONE, ONE]).scaled_by(c(0.5, 0.5)));
        check(y.lift_apply(t_pow(-0.5)).unwrap(), sq(&[ONE, ONE, -ONE, ONE]).scaled_by(c(0.5, -0.5)));
        check(z.lift_apply(t_pow(0.5)).unwrap(), sq(&[ONE, ZERO, ZERO, I]));
        check(z.lift_apply(t_pow(-0.5)).unwrap(), sq(&[ONE, ZERO, ZERO, -I]));

        assert!(Matrix::identity(4).lift_apply(|c| c).is_err());
    }

    #[test]
    fn test_singular_value_decomposition() {
        let zero = Matrix::zero(2, 2).singular_value_decomposition().unwrap();
        assert!(zero.u.is_approximately_equal_to(&Matrix::identity(2), 1e-9));
        assert!(zero.s.is_approximately_equal_to(&Matrix::zero(2, 2), 1e-9));
        assert!(zero.v.is_approximately_equal_to(&Matrix::identity(2), 1e-9));

        let identity = Matrix::identity(2).singular_value_decomposition().unwrap();
        assert!(identity.u.is_approximately_equal_to(&Matrix::identity(2), 1e-9));
        assert!(identity.s.is_approximately_equal_to(&Matrix::identity(2), 1e-9));
        assert!(identity.v.is_approximately_equal_to(&Matrix::identity(2), 1e-9));

        let m = Matrix::square(&[ONE, I * 2.0, c(3.0, 0.0), c(4.0, 0.0)]).unwrap();
        let svd = m.singular_value_decomposition().unwrap();
        let rebuilt = svd.u.times(&svd.s).unwrap().times(&svd.v).unwrap();
        assert!(rebuilt.is_approximately_equal_to(&m, 1e-9));
        assert!(svd.s.is_approximately_equal_to(&Matrix::square(&[5.305935, 0.0, 0.0, 1.359063]).unwrap(), 1e-5));
        assert!(svd.u.is_approximately_unitary(1e-9));
        assert!(svd.v.is_approximately_unitary(1e-9));

        assert!(Matrix::identity(3).singular_value_decomposition().is_err());
    }

    #[test]
    fn test_singular_value_decomposition_rank_one() {
        let m = Matrix::square(&[ONE, I, -ONE, -I]).unwrap();
        let svd = m.singular_value_decomposition().unwrap();
        let rebuilt = svd.u.times(&svd.s).unwrap().times(&svd.v).unwrap();
        assert!(rebuilt.is_approximately_equal_to(&m, 1e-9));
        assert!(svd.u.is_approximately_unitary(1e-9));
        assert!(svd.s.entry(1, 1).norm() < 1e-9);
    }

    #[test]
    fn test_closest_unitary() {
        let sq = |v: &[Complex]| Matrix::square(v).unwrap();
        let check = |m: Matrix, expected: Matrix| {
            let u = m.closest_unitary().unwrap();
            assert!(u.is_approximately_equal_to(&expected, 1e-6), "{} vs {}", u, expected);
        };
        check(Matrix::zero(2, 2), Matrix::identity(2));
        check(sq(&[c(2.0, 0.0), ZERO, ZERO, c(0.0001, 0.0)]), Matrix::identity(2));
        check(sq(&[ZERO, c(0.5, 0.0), c(0.0001, 0.0), ZERO]), Matrix::pauli_x());
        check(sq(&[ONE, I, -ONE, -I]), sq(&[ONE, ZERO, ZERO, -I]));
        check(Matrix::hadamard(), Matrix::hadamard());
        check(Matrix::pauli_y(), Matrix::pauli_y());
    }

    fn relative_distance(actual: &Matrix, expected: &Matrix) -> f64 {
        actual.minus(expected).unwrap().norm2().sqrt() / expected.norm2().sqrt()
    }

    #[test]
    fn test_decompositions_of_small_operators() {
        let s = 0.5f64.sqrt();
        let tiny = Matrix::square(&[1e-7, 1e-7, 0.0, 0.0]).unwrap();
        let svd = tiny.singular_value_decomposition().unwrap();
        let rebuilt = svd.u.times(&svd.s).unwrap().times(&svd.v).unwrap();
        assert!(relative_distance(&rebuilt, &tiny) < 1e-9, "{} rebuilt as {}", tiny, rebuilt);
        assert!(svd.u.is_approximately_unitary(1e-9));
        assert!(svd.v.is_approximately_unitary(1e-9));

        let closest = tiny.closest_unitary().unwrap();
        assert!(closest.is_approximately_unitary(1e-9));
        assert!(closest.is_approximately_equal_to(&Matrix::square(&[s, s, s, -s]).unwrap(), 1e-9));

        let x = Matrix::pauli_x().scaled_by(1e-13);
        for EigenComponent { value, vector } in x.eigen_decomposition().unwrap() {
            let lhs = x.times(&vector).unwrap();
            let residual = lhs.minus(&vector.scaled_by(value)).unwrap().norm2().sqrt();
            assert!(residual <= 1e-9 * x.norm2().sqrt(), "residual {} for {:?}", residual, value);
            assert!((vector.norm2() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_decompositions_are_scale_invariant() {
        let m = Matrix::square(&[ONE, I * 2.0, c(3.0, 0.0), c(4.0, 0.0)]).unwrap();
        let reference = m.closest_unitary().unwrap();
        for exponent in [-12, -6, 6, 12] {
            let scaled = m.scaled_by(10f64.powi(exponent));
            let svd = scaled.singular_value_decomposition().unwrap();
            let rebuilt = svd.u.times(&svd.s).unwrap().times(&svd.v).unwrap();
            assert!(relative_distance(&rebuilt, &scaled) < 1e-9, "10^{}", exponent);
            assert!(scaled.closest_unitary().unwrap().is_approximately_equal_to(&reference, 1e-9));
        }
    }
}
