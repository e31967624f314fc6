//! Error types for matrix operations.

use thiserror::Error;

/// Errors reported by matrix construction, algebra and analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// Binary operation on incompatible shapes. Shapes are `(width, height)`.
    #[error("Dimension mismatch in {operation}: {left:?} vs {right:?}")]
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Operation only defined for some shapes (square, 2×2, column, ...).
    #[error("{operation} is not supported for a {width}x{height} matrix")]
    UnsupportedShape {
        operation: &'static str,
        width: usize,
        height: usize,
    },

    /// Operation requires a unitary operand.
    #[error("{operation} requires a unitary matrix")]
    NotUnitary { operation: &'static str },

    /// Bloch vector extraction on something that is not a qubit density matrix.
    #[error("Invalid density matrix: {reason}")]
    InvalidDensityMatrix { reason: String },

    /// Wire index outside the `qubit_count` wires of the operation.
    #[error("{operation}: wire {wire} is out of range for {qubit_count} qubits")]
    WireOutOfRange {
        operation: &'static str,
        wire: usize,
        qubit_count: usize,
    },

    /// Control mask selects one of the wires the operation acts on.
    #[error("Control mask {inclusion_mask:#b} overlaps the target wires {target_mask:#b}")]
    ControlOverlapsTarget {
        inclusion_mask: usize,
        target_mask: usize,
    },

    /// Text could not be parsed as a matrix.
    #[error("Malformed matrix literal {text:?}: {reason}")]
    MalformedLiteral { text: String, reason: String },

    /// `square` was given a number of entries that is not a non-zero perfect square.
    #[error("{count} entries do not form a square matrix")]
    NotSquareCount { count: usize },

    /// Matrices need at least one row and one column.
    #[error("Matrix must have at least one row and one column")]
    EmptyMatrix,

    /// Raw buffer does not hold `2 * width * height` scalars.
    #[error("Buffer length {actual} does not match expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
