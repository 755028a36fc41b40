//! Error taxonomy for the session core.
//!
//! Every failure is local-recoverable: the user can retry the same intent,
//! and the session guarantees no partial chat/record state is left behind
//! when the reaction service fails.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompanionError {
    /// An action that needs user settings was invoked before onboarding.
    #[error("onboarding has not been completed")]
    Precondition,

    /// A required field was empty or malformed (event title, wake time).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The reaction service failed. The mock never produces this; real
    /// backends map their failures here.
    #[error("reaction service failed: {0}")]
    Service(String),
}

impl CompanionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CompanionError::Validation(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        CompanionError::Service(msg.into())
    }
}
