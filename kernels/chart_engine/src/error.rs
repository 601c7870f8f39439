// Error taxonomy for the aggregation/layout core
//
// Only two things can actually fail here: a caller asking for a reduction
// without the column it needs, and a feature vector that does not match the
// chart's feature order. Empty input is never an error (empty, well-typed
// results come back instead), and numeric parse failures are recovered
// locally inside aggregation.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    // A reducer or query referenced a column/field that is not there
    #[error("missing required column '{column}' for {operation}")]
    Configuration { column: String, operation: String },

    // Feature vector length does not match the chart's feature order
    #[error("feature vector has {got} values but the feature order names {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

impl EngineError {
    pub fn missing_column(column: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Configuration {
            column: column.into(),
            operation: operation.into(),
        }
    }
}
