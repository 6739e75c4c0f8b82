//! Error types for the contraction kernels

use std::fmt;

/// Failure of a kernel call, always tagged with the kernel's name
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Operand extents disagree
    DimensionMismatch {
        operation: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// Axis index outside `0..ndim`
    InvalidMode {
        operation: &'static str,
        mode: usize,
        ndim: usize,
    },

    /// Operand `index` carries `actual` rank columns instead of `expected`
    RankMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
        index: usize,
    },

    /// A required input list was empty
    EmptyInput {
        operation: &'static str,
        parameter: &'static str,
    },
}

impl KernelError {
    pub fn dimension_mismatch(
        operation: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation,
            expected,
            actual,
            context: context.into(),
        }
    }

    pub fn invalid_mode(operation: &'static str, mode: usize, ndim: usize) -> Self {
        KernelError::InvalidMode {
            operation,
            mode,
            ndim,
        }
    }

    pub fn rank_mismatch(
        operation: &'static str,
        expected: usize,
        actual: usize,
        index: usize,
    ) -> Self {
        KernelError::RankMismatch {
            operation,
            expected,
            actual,
            index,
        }
    }

    pub fn empty_input(operation: &'static str, parameter: &'static str) -> Self {
        KernelError::EmptyInput {
            operation,
            parameter,
        }
    }

    /// Name of the kernel that failed
    pub fn operation(&self) -> &'static str {
        match self {
            KernelError::DimensionMismatch { operation, .. }
            | KernelError::InvalidMode { operation, .. }
            | KernelError::RankMismatch { operation, .. }
            | KernelError::EmptyInput { operation, .. } => operation,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::DimensionMismatch {
                operation,
                expected,
                actual,
                context,
            } => write!(
                f,
                "{}: expected extents {:?}, found {:?} ({})",
                operation, expected, actual, context
            ),
            KernelError::InvalidMode {
                operation,
                mode,
                ndim,
            } => write!(
                f,
                "{}: axis {} out of range for {} axes",
                operation, mode, ndim
            ),
            KernelError::RankMismatch {
                operation,
                expected,
                actual,
                index,
            } => write!(
                f,
                "{}: operand {} has {} rank columns, expected {}",
                operation, index, actual, expected
            ),
            KernelError::EmptyInput {
                operation,
                parameter,
            } => write!(f, "{}: '{}' must not be empty", operation, parameter),
        }
    }
}

impl std::error::Error for KernelError {}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_operand() {
        let err = KernelError::rank_mismatch("reduce_modes", 3, 2, 1);
        assert_eq!(
            err.to_string(),
            "reduce_modes: operand 1 has 2 rank columns, expected 3"
        );
        assert_eq!(err.operation(), "reduce_modes");
    }

    #[test]
    fn test_invalid_mode_display() {
        let err = KernelError::invalid_mode("reduce_modes", 4, 3);
        assert_eq!(err.to_string(), "reduce_modes: axis 4 out of range for 3 axes");
    }
}
