//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ValidationFailed | 400 |
//! | InvalidState | 409 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Errors returned by subscription operations.
///
/// "No active subscription" on read paths is not an error (those return
/// `false`/`None`); `NotFound` is only for operations that need a record
/// to act on, such as `extend`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The user has no Active subscription.
    #[error("No active subscription found for user: {0}")]
    NotFound(UserId),

    /// Input rejected before touching state.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// The record's state does not allow the operation.
    #[error("Cannot {attempted} subscription: {reason}")]
    InvalidState { attempted: String, reason: String },

    /// Storage or other unexpected failure.
    #[error("Subscription storage error: {0}")]
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(user_id: UserId) -> Self {
        SubscriptionError::NotFound(user_id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(attempted: impl Into<String>, reason: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            attempted: attempted.into(),
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubscriptionError::Infrastructure(_))
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::InvalidStateTransition | ErrorCode::Conflict => {
                SubscriptionError::InvalidState {
                    attempted: "modify".to_string(),
                    reason: err.message,
                }
            }
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
