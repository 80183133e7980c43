use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The objective keeps the same sign across the whole rate bracket.
    #[error("goal unreachable with the given parameters")]
    RootNotBracketed { lower: f64, upper: f64 },
}

impl PlanError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlanError::InvalidParameter(msg.into())
    }
}
