//! Controlled application of small operators to wires of a state vector.

use tracing::trace;

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Conditions on basis-state bits that must hold for an operation to apply.
///
/// A basis index `i` satisfies the controls when
/// `i & inclusion_mask == value_mask`. Bits outside the inclusion mask are
/// unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Controls {
    inclusion_mask: usize,
    value_mask: usize,
}

impl Controls {
    /// Matches every basis state.
    pub const NONE: Controls = Controls {
        inclusion_mask: 0,
        value_mask: 0,
    };

    /// Requires the bits selected by `inclusion_mask` to equal those of `value_mask`.
    /// Bits of `value_mask` outside the inclusion mask are ignored.
    pub const fn new(inclusion_mask: usize, value_mask: usize) -> Controls {
        Controls {
            inclusion_mask,
            value_mask: value_mask & inclusion_mask,
        }
    }

    /// Requires wire `wire` to be on (`true`) or off (`false`).
    ///
    /// # Panics
    /// Panics if `wire` is not below `usize::BITS`.
    pub const fn bit(wire: usize, value: bool) -> Controls {
        assert!(wire < usize::BITS as usize, "Control wire is out of range.");
        let mask = 1 << wire;
        Controls {
            inclusion_mask: mask,
            value_mask: if value { mask } else { 0 },
        }
    }

    /// Represents the wires that carry a condition.
    pub fn inclusion_mask(&self) -> usize {
        self.inclusion_mask
    }

    /// Represents the required values of the constrained wires.
    pub fn value_mask(&self) -> usize {
        self.value_mask
    }

    /// Checks whether no wire is constrained.
    pub fn is_none(&self) -> bool {
        self.inclusion_mask == 0
    }

    /// Checks whether basis index `index` satisfies the controls.
    #[inline]
    pub fn allows(&self, index: usize) -> bool {
        index & self.inclusion_mask == self.value_mask
    }

    /// Requires both sets of conditions. `None` if they disagree on a shared wire.
    pub fn combine(self, other: Controls) -> Option<Controls> {
        let shared = self.inclusion_mask & other.inclusion_mask;
        if self.value_mask & shared != other.value_mask & shared {
            return None;
        }
        Some(Controls {
            inclusion_mask: self.inclusion_mask | other.inclusion_mask,
            value_mask: self.value_mask | other.value_mask,
        })
    }
}

impl Matrix {
    /// Applies a `2^k × 2^k` operation to wires `target_wire .. target_wire + k`
    /// of this state vector, on the basis states allowed by `controls`.
    ///
    /// Amplitude tuples that differ only in the target bits are multiplied by the
    /// operation when their shared index passes the controls and are copied
    /// unchanged otherwise. The result is a new column; runs in time linear in the
    /// state length for fixed `k`.
    ///
    /// # Errors
    /// - `UnsupportedShape` if `self` is not a column of power-of-two length, or
    ///   `operation` is not a square of power-of-two size at least 2.
    /// - `DimensionMismatch` if the target wires do not fit in the state.
    /// - `ControlOverlapsTarget` if a control wire is also a target wire.
    pub fn times_qubit_operation(&self, operation: &Matrix, target_wire: usize, controls: Controls) -> Result<Matrix> {
        const OP: &str = "times_qubit_operation";
        let length = self.height();
        if self.width() != 1 || !length.is_power_of_two() {
            return Err(self.unsupported(OP));
        }
        let span = operation.width();
        if !operation.is_square() || span < 2 || !span.is_power_of_two() {
            return Err(operation.unsupported(OP));
        }
        let qubit_count = length.trailing_zeros() as usize;
        let operation_qubits = span.trailing_zeros() as usize;
        if target_wire.checked_add(operation_qubits).is_none_or(|end| end > qubit_count) {
            return Err(MatrixError::DimensionMismatch {
                operation: OP,
                left: (self.width(), length),
                right: (span, span),
            });
        }
        let target_mask = (span - 1) << target_wire;
        if controls.inclusion_mask & target_mask != 0 {
            return Err(MatrixError::ControlOverlapsTarget {
                inclusion_mask: controls.inclusion_mask,
                target_mask,
            });
        }
        trace!(qubit_count, target_wire, operation_qubits, ?controls, "applying qubit operation");

        let state = self.raw_buffer();
        let op = operation.raw_buffer();
        let mut out = state.to_vec();
        // Scratch for one amplitude tuple, reused across tuples.
        let mut amps = vec![0.0; 2 * span];

        for base in (0..length).filter(|i| i & target_mask == 0) {
            if !controls.allows(base) {
                continue;
            }
            for (j, amp) in amps.chunks_exact_mut(2).enumerate() {
                let k = 2 * (base | (j << target_wire));
                amp[0] = state[k];
                amp[1] = state[k + 1];
            }
            for r in 0..span {
                let (mut re, mut im) = (0.0, 0.0);
                for (c, amp) in amps.chunks_exact(2).enumerate() {
                    let e = 2 * (r * span + c);
                    let (or, oi) = (op[e], op[e + 1]);
                    re += or * amp[0] - oi * amp[1];
                    im += or * amp[1] + oi * amp[0];
                }
                let k = 2 * (base | (r << target_wire));
                out[k] = re;
                out[k + 1] = im;
            }
        }
        Matrix::from_raw(1, length, out)
    }
}
