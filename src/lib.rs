//! The `cpx-matrix` library provides a dense complex matrix type for representing
//! and manipulating quantum gate operators and state vectors.
//!
//! Beyond general linear algebra it offers closed-form spectral analysis of 2×2
//! operators, single-qubit rotation parameterizations, and controlled application
//! of small operators to chosen wires of a state vector. Scalars interoperate with
//! the `cpx-coords` crate.

pub mod apply;
pub mod complex;
pub mod error;
pub mod format;
pub mod matrix;
pub mod rotation;
pub mod spectral;

pub use apply::Controls;
pub use complex::{Complex, ComplexExt, I, ONE, ZERO};
pub use error::{MatrixError, Result};
pub use format::Format;
pub use matrix::Matrix;
pub use rotation::AngleAxisPhase;
pub use spectral::{EigenComponent, SingularValueDecomposition};

/// Tolerance used by assertions and fallbacks that need "close enough".
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Distance within which `Format::Simplified` snaps a value to a recognized constant.
pub const SIMPLIFY_EPSILON: f64 = 5e-4;

/// Tolerance for the unitarity, hermiticity, trace and positivity preconditions
/// of the qubit parameterizations.
pub const UNITARY_EPSILON: f64 = 1e-3;
