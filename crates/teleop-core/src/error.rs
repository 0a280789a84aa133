use thiserror::Error;

/// Axis-mapping faults. These indicate a wiring bug, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("axis shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("axis index {index} out of range for snapshot of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
