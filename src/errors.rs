use thiserror::Error;

pub type Result<T> = std::result::Result<T, IapError>;

/// Every failure the engine surfaces to application code.
///
/// Nothing is retried internally. Use [`IapError::is_retryable`] to decide
/// whether the call is worth repeating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IapError {
    /// The billing connection is not established yet. Retry after a delay.
    #[error("billing backend is not ready")]
    BackendUnready,

    /// Malformed caller input (missing token, malformed UUID, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("another purchase is already in progress")]
    ConcurrentPurchaseInProgress,

    /// The user closed the purchase sheet.
    #[error("purchase canceled by user")]
    UserCanceled,

    #[error("failed to launch purchase flow: {0}")]
    LaunchFailed(String),

    #[error("purchase failed: {0}")]
    PurchaseFailed(String),

    /// Opaque platform failure, passed through for diagnostics.
    #[error("billing backend error: {0}")]
    BackendError(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

impl IapError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, IapError::BackendUnready | IapError::BackendError(_))
    }

    pub(crate) fn native_call(method: &str, detail: impl std::fmt::Display) -> Self {
        IapError::BackendError(format!("{method}: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_not_retryable_but_backend_failure_is() {
        assert!(!IapError::UserCanceled.is_retryable());
        assert!(!IapError::InvalidArgument("token".into()).is_retryable());
        assert!(IapError::BackendUnready.is_retryable());
        assert!(IapError::BackendError("timeout".into()).is_retryable());
    }

    #[test]
    fn native_call_error_names_the_method() {
        let err = IapError::native_call("queryPurchases", "bridge closed");
        assert_eq!(
            err,
            IapError::BackendError("queryPurchases: bridge closed".to_string())
        );
        assert_eq!(
            err.to_string(),
            "billing backend error: queryPurchases: bridge closed"
        );
    }
}
