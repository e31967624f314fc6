//! Dense complex matrices: construction, comparison, text form and algebra.

use core::fmt;
use core::ops::{Mul, Neg};
use core::str::FromStr;

use cpx_coords::Cpx;

use crate::complex::{Complex, ComplexExt, ONE, ZERO};
use crate::error::{MatrixError, Result};
use crate::format::{format_complex, parse_complex, Format};

/// An immutable dense complex matrix.
///
/// Entries are stored row-major as interleaved `(re, im)` pairs, so the backing
/// buffer always holds exactly `2 * width * height` scalars.
#[derive(Debug, Clone)]
pub struct Matrix {
    width: usize,
    height: usize,
    buffer: Vec<f64>,
}

impl Matrix {
    /// Wraps an interleaved row-major buffer.
    pub fn from_raw(width: usize, height: usize, buffer: Vec<f64>) -> Result<Matrix> {
        if width == 0 || height == 0 {
            return Err(MatrixError::EmptyMatrix);
        }
        let expected = 2 * width * height;
        if buffer.len() != expected {
            return Err(MatrixError::BufferLength {
                expected,
                actual: buffer.len(),
            });
        }
        Ok(Matrix {
            width,
            height,
            buffer,
        })
    }

    /// Builds a matrix whose entry at `(row, col)` is `f(row, col)`.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn generate<T, F>(width: usize, height: usize, f: F) -> Matrix
    where
        T: Into<Complex>,
        F: Fn(usize, usize) -> T,
    {
        assert!(width > 0 && height > 0, "Matrix dimensions must be positive.");
        let mut buffer = Vec::with_capacity(2 * width * height);
        for row in 0..height {
            for col in 0..width {
                let c: Complex = f(row, col).into();
                buffer.push(c.re);
                buffer.push(c.im);
            }
        }
        Matrix {
            width,
            height,
            buffer,
        }
    }

    /// Builds a matrix from rows of equal length.
    pub fn from_rows<T, R>(rows: &[R]) -> Result<Matrix>
    where
        T: Into<Complex> + Copy,
        R: AsRef<[T]>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if height == 0 || width == 0 {
            return Err(MatrixError::EmptyMatrix);
        }
        if let Some(bad) = rows.iter().find(|r| r.as_ref().len() != width) {
            return Err(MatrixError::DimensionMismatch {
                operation: "from_rows",
                left: (width, 1),
                right: (bad.as_ref().len(), 1),
            });
        }
        Ok(Matrix::generate(width, height, |r, c| rows[r].as_ref()[c]))
    }

    /// Builds a square matrix from its entries in row-major order.
    pub fn square<T: Into<Complex> + Copy>(values: &[T]) -> Result<Matrix> {
        let n = (values.len() as f64).sqrt().round() as usize;
        if n == 0 || n * n != values.len() {
            return Err(MatrixError::NotSquareCount {
                count: values.len(),
            });
        }
        Ok(Matrix::generate(n, n, |r, c| values[r * n + c]))
    }

    /// Builds a 1×n row vector.
    pub fn row<T: Into<Complex> + Copy>(values: &[T]) -> Result<Matrix> {
        if values.is_empty() {
            return Err(MatrixError::EmptyMatrix);
        }
        Ok(Matrix::generate(values.len(), 1, |_, c| values[c]))
    }

    /// Builds an n×1 column vector.
    pub fn col<T: Into<Complex> + Copy>(values: &[T]) -> Result<Matrix> {
        if values.is_empty() {
            return Err(MatrixError::EmptyMatrix);
        }
        Ok(Matrix::generate(1, values.len(), |r, _| values[r]))
    }

    /// Returns the `size`×`size` identity.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn identity(size: usize) -> Matrix {
        Matrix::generate(size, size, |r, c| if r == c { ONE } else { ZERO })
    }

    /// Returns the all-zero matrix of the given shape.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn zero(width: usize, height: usize) -> Matrix {
        Matrix::generate(width, height, |_, _| ZERO)
    }

    /// Represents the Pauli X operator.
    pub fn pauli_x() -> Matrix {
        Matrix::from_2x2([[ZERO, ONE], [ONE, ZERO]])
    }

    /// Represents the Pauli Y operator.
    pub fn pauli_y() -> Matrix {
        Matrix::from_2x2([[ZERO, -crate::I], [crate::I, ZERO]])
    }

    /// Represents the Pauli Z operator.
    pub fn pauli_z() -> Matrix {
        Matrix::from_2x2([[ONE, ZERO], [ZERO, -ONE]])
    }

    /// Represents the Hadamard operator.
    pub fn hadamard() -> Matrix {
        let s = Complex::from(0.5f64.sqrt());
        Matrix::from_2x2([[s, s], [s, -s]])
    }

    pub(crate) fn from_2x2(m: [[Complex; 2]; 2]) -> Matrix {
        Matrix::generate(2, 2, |r, c| m[r][c])
    }

    /// Returns the entries of a 2×2 matrix as `[a, b, c, d]` (row-major).
    pub(crate) fn breakdown_2x2(&self, operation: &'static str) -> Result<[Complex; 4]> {
        if self.width != 2 || self.height != 2 {
            return Err(self.unsupported(operation));
        }
        Ok([
            self.entry(0, 0),
            self.entry(0, 1),
            self.entry(1, 0),
            self.entry(1, 1),
        ])
    }

    pub(crate) fn unsupported(&self, operation: &'static str) -> MatrixError {
        MatrixError::UnsupportedShape {
            operation,
            width: self.width,
            height: self.height,
        }
    }

    fn mismatch(&self, other: &Matrix, operation: &'static str) -> MatrixError {
        MatrixError::DimensionMismatch {
            operation,
            left: (self.width, self.height),
            right: (other.width, other.height),
        }
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns the entry at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the position is out of range.
    pub fn entry(&self, row: usize, col: usize) -> Complex {
        assert!(row < self.height && col < self.width, "Entry out of range.");
        let k = 2 * (row * self.width + col);
        Complex::new(self.buffer[k], self.buffer[k + 1])
    }

    /// Returns the entries grouped by row.
    pub fn rows(&self) -> Vec<Vec<Complex>> {
        (0..self.height)
            .map(|r| (0..self.width).map(|c| self.entry(r, c)).collect())
            .collect()
    }

    /// Returns the entries of one column.
    pub fn column(&self, col: usize) -> Vec<Complex> {
        (0..self.height).map(|r| self.entry(r, col)).collect()
    }

    /// Returns the interleaved row-major `(re, im)` backing buffer.
    pub fn raw_buffer(&self) -> &[f64] {
        &self.buffer
    }

    /// Exact elementwise equality; `None` is never equal.
    pub fn is_equal_to(&self, other: Option<&Matrix>) -> bool {
        other.is_some_and(|o| self == o)
    }

    /// Checks that shapes match and the Frobenius norm of the difference is at most `epsilon`.
    ///
    /// The bound is global: a larger matrix spreads the same `epsilon` over more entries.
    pub fn is_approximately_equal_to(&self, other: &Matrix, epsilon: f64) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        let distance2: f64 = self
            .buffer
            .iter()
            .zip(&other.buffer)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        distance2.sqrt() <= epsilon
    }

    /// Renders as nested brace groups, e.g. `{{1, 0}, {-i, 2-3i}}`.
    pub fn to_string_with(&self, format: Format) -> String {
        let separator = format.separator();
        let rows: Vec<String> = (0..self.height)
            .map(|r| {
                let entries: Vec<String> = (0..self.width)
                    .map(|c| format_complex(self.entry(r, c), format))
                    .collect();
                format!("{{{}}}", entries.join(separator))
            })
            .collect();
        format!("{{{}}}", rows.join(separator))
    }

    /// Parses the text produced by `to_string_with(Format::Exact | Format::Simplified)`.
    pub fn parse(text: &str) -> Result<Matrix> {
        let malformed = |reason: &str| MatrixError::MalformedLiteral {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let body = text
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| malformed("expected an outer '{...}' group"))?;

        let mut rows: Vec<Vec<Complex>> = Vec::new();
        let mut rest = body.trim_start();
        loop {
            let inner = rest
                .strip_prefix('{')
                .ok_or_else(|| malformed("expected '{' to open a row"))?;
            let close = inner
                .find('}')
                .ok_or_else(|| malformed("unterminated row"))?;
            let row = inner[..close]
                .split(',')
                .map(parse_complex)
                .collect::<Result<Vec<Complex>>>()?;
            rows.push(row);

            rest = inner[close + 1..].trim_start();
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| malformed("expected ',' between rows"))?
                .trim_start();
        }
        Matrix::from_rows(&rows)
    }

    /// Multiplies every entry by `scale`.
    pub fn scaled_by(&self, scale: impl Into<Complex>) -> Matrix {
        let s = scale.into();
        Matrix::generate(self.width, self.height, |r, c| self.entry(r, c) * s)
    }

    /// Returns the elementwise sum.
    pub fn plus(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "plus", |a, b| a + b)
    }

    /// Returns the elementwise difference.
    pub fn minus(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "minus", |a, b| a - b)
    }

    fn zip_with(&self, other: &Matrix, operation: &'static str, f: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
        if self.width != other.width || self.height != other.height {
            return Err(self.mismatch(other, operation));
        }
        let buffer = self.buffer.iter().zip(&other.buffer).map(|(a, b)| f(*a, *b)).collect();
        Ok(Matrix {
            width: self.width,
            height: self.height,
            buffer,
        })
    }

    /// Returns the matrix product `self · other`.
    ///
    /// A row times a column is their inner product (1×1); a column times a row is
    /// their outer product, which equals their tensor product.
    pub fn times(&self, other: &Matrix) -> Result<Matrix> {
        if self.width != other.height {
            return Err(self.mismatch(other, "times"));
        }
        let (w, h, n) = (other.width, self.height, self.width);
        let mut buffer = vec![0.0; 2 * w * h];
        for r in 0..h {
            for c in 0..w {
                let (mut re, mut im) = (0.0, 0.0);
                for k in 0..n {
                    let a = 2 * (r * n + k);
                    let b = 2 * (k * w + c);
                    let (ar, ai) = (self.buffer[a], self.buffer[a + 1]);
                    let (br, bi) = (other.buffer[b], other.buffer[b + 1]);
                    re += ar * br - ai * bi;
                    im += ar * bi + ai * br;
                }
                buffer[2 * (r * w + c)] = re;
                buffer[2 * (r * w + c) + 1] = im;
            }
        }
        Ok(Matrix {
            width: w,
            height: h,
            buffer,
        })
    }

    /// Returns the conjugate transpose.
    pub fn adjoint(&self) -> Matrix {
        Matrix::generate(self.height, self.width, |r, c| self.entry(c, r).conj())
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Matrix {
        Matrix::generate(self.height, self.width, |r, c| self.entry(c, r))
    }

    /// Returns the sum of the diagonal. Square matrices only.
    pub fn trace(&self) -> Result<Complex> {
        if !self.is_square() {
            return Err(self.unsupported("trace"));
        }
        Ok((0..self.width).fold(ZERO, |acc, i| acc + self.entry(i, i)))
    }

    /// Returns the determinant by cofactor expansion. Square matrices only.
    pub fn determinant(&self) -> Result<Complex> {
        if !self.is_square() {
            return Err(self.unsupported("determinant"));
        }
        let entries: Vec<Complex> = self.rows().into_iter().flatten().collect();
        Ok(cofactor_determinant(&entries, self.width))
    }

    /// Returns the Kronecker product: entry `(r1·h2 + r2, c1·w2 + c2)` is `a[r1, c1]·b[r2, c2]`.
    pub fn tensor_product(&self, other: &Matrix) -> Matrix {
        let (w2, h2) = (other.width, other.height);
        Matrix::generate(self.width * w2, self.height * h2, |r, c| {
            self.entry(r / h2, c / w2) * other.entry(r % h2, c % w2)
        })
    }

    /// Returns the `exponent`-fold tensor product of the matrix with itself; `{{1}}` for zero.
    pub fn tensor_power(&self, exponent: u32) -> Matrix {
        (0..exponent).fold(Matrix::identity(1), |acc, _| acc.tensor_product(self))
    }

    /// Returns the sum of squared magnitudes of all entries.
    pub fn norm2(&self) -> f64 {
        self.buffer.iter().map(|x| x * x).sum()
    }

    /// Returns the entries of a 2×2 matrix as `cpx-coords` scalars.
    pub fn to_cpx_2x2(&self) -> Result<[[Cpx<f64>; 2]; 2]> {
        let [a, b, c, d] = self.breakdown_2x2("to_cpx_2x2")?;
        Ok([[a.to_cpx(), b.to_cpx()], [c.to_cpx(), d.to_cpx()]])
    }
}

fn cofactor_determinant(entries: &[Complex], n: usize) -> Complex {
    match n {
        1 => entries[0],
        2 => entries[0] * entries[3] - entries[1] * entries[2],
        _ => {
            let mut total = ZERO;
            let mut minor = Vec::with_capacity((n - 1) * (n - 1));
            for col in 0..n {
                if entries[col] == ZERO {
                    continue;
                }
                minor.clear();
                for r in 1..n {
                    for c in (0..n).filter(|&c| c != col) {
                        minor.push(entries[r * n + c]);
                    }
                }
                let term = entries[col] * cofactor_determinant(&minor, n - 1);
                total = if col % 2 == 0 { total + term } else { total - term };
            }
            total
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.buffer == other.buffer
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(Format::Exact))
    }
}

impl FromStr for Matrix {
    type Err = MatrixError;
    fn from_str(s: &str) -> Result<Matrix> {
        Matrix::parse(s)
    }
}

impl From<[[Cpx<f64>; 2]; 2]> for Matrix {
    fn from(m: [[Cpx<f64>; 2]; 2]) -> Self {
        Matrix::generate(2, 2, |r, c| Complex::from_cpx(m[r][c]))
    }
}

impl Neg for &Matrix {
    type Output = Matrix;
    fn neg(self) -> Matrix {
        self.scaled_by(-1.0)
    }
}
impl Mul<Complex> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Complex) -> Matrix {
        self.scaled_by(rhs)
    }
}
impl Mul<f64> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: f64) -> Matrix {
        self.scaled_by(rhs)
    }
}
