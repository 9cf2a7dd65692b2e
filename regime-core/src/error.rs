use thiserror::Error;

/// Errors raised by the regime calculators and the comparison engine.
///
/// Revenue above a regime's legal ceiling is not an error: it is reported
/// through [`crate::RegimeResult::applicable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegimeError {
    /// The caller supplied a value the calculation cannot accept
    /// (non-positive revenue, negative amounts, malformed period, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The activity classification is not one of the known tags.
    #[error("unsupported activity classification '{0}'")]
    UnsupportedActivity(String),

    /// An internal invariant was violated. Fixed tables never trigger this;
    /// seeing it means the core itself is wrong.
    #[error("computation precondition violated: {0}")]
    ComputationPrecondition(String),
}

impl RegimeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// `true` for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnsupportedActivity(_))
    }
}
