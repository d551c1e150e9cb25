use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::constants::ERROR_MESSAGES;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Transaction rejected")]
    Rejected,

    #[error("Transaction cancelled")]
    Cancelled,

    #[error("Remote failure: {0}")]
    RemoteFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation already in progress")]
    OperationInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure categories reported by the node and signer adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    InsufficientFunds,
    Rejected,
    Cancelled,
    Other(String),
}

impl RemoteErrorKind {
    /// Classifies raw failure text from algod or a wallet.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("overspend") || lowered.contains("insufficient") {
            Self::InsufficientFunds
        } else if lowered.contains("rejected") {
            Self::Rejected
        } else if lowered.contains("cancelled") || lowered.contains("canceled") {
            Self::Cancelled
        } else {
            Self::Other(message.trim().to_string())
        }
    }
}

impl From<RemoteErrorKind> for AppError {
    fn from(kind: RemoteErrorKind) -> Self {
        match kind {
            RemoteErrorKind::InsufficientFunds => AppError::InsufficientFunds,
            RemoteErrorKind::Rejected => AppError::Rejected,
            RemoteErrorKind::Cancelled => AppError::Cancelled,
            RemoteErrorKind::Other(message) => AppError::RemoteFailure(message),
        }
    }
}

impl AppError {
    /// Converts raw remote text into the matching category.
    pub fn remote(message: impl AsRef<str>) -> Self {
        RemoteErrorKind::classify(message.as_ref()).into()
    }

    /// Text shown to the user in the transient notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotConnected => ERROR_MESSAGES.wallet_not_connected.to_string(),
            AppError::InsufficientFunds => ERROR_MESSAGES.insufficient_balance.to_string(),
            AppError::Rejected => ERROR_MESSAGES.transaction_rejected.to_string(),
            AppError::Cancelled => ERROR_MESSAGES.transaction_cancelled.to_string(),
            AppError::OperationInProgress => ERROR_MESSAGES.operation_in_progress.to_string(),
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::RemoteFailure(msg) => {
                msg.clone()
            }
            AppError::Config(_) | AppError::Internal(_) => {
                ERROR_MESSAGES.transaction_failed.to_string()
            }
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotConnected => (StatusCode::UNAUTHORIZED, "NOT_CONNECTED"),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::InsufficientFunds => (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS"),
            AppError::Rejected => (StatusCode::FORBIDDEN, "REJECTED"),
            AppError::Cancelled => (StatusCode::CONFLICT, "CANCELLED"),
            AppError::RemoteFailure(_) => (StatusCode::BAD_GATEWAY, "REMOTE_FAILURE"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::OperationInProgress => (StatusCode::CONFLICT, "OPERATION_IN_PROGRESS"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RemoteFailure(err.to_string())
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let details = match &self {
            AppError::Config(msg) | AppError::Internal(msg) => {
                Some(serde_json::json!({ "reason": msg }))
            }
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.user_message(),
                details,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_wallet_and_node_wording() {
        assert_eq!(
            RemoteErrorKind::classify("TransactionPool.Remember: transaction ABC: overspend"),
            RemoteErrorKind::InsufficientFunds
        );
        assert_eq!(
            RemoteErrorKind::classify("User Rejected Request"),
            RemoteErrorKind::Rejected
        );
        assert_eq!(
            RemoteErrorKind::classify("Operation cancelled by user"),
            RemoteErrorKind::Cancelled
        );
        assert_eq!(
            RemoteErrorKind::classify(" logic eval error: assert failed "),
            RemoteErrorKind::Other("logic eval error: assert failed".to_string())
        );
    }

    #[test]
    fn remote_keeps_raw_message_for_unknown_failures() {
        match AppError::remote("Game is full") {
            AppError::RemoteFailure(msg) => assert_eq!(msg, "Game is full"),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(matches!(AppError::remote("overspend"), AppError::InsufficientFunds));
    }

    #[test]
    fn user_message_uses_notification_texts() {
        assert_eq!(
            AppError::NotConnected.user_message(),
            "Please connect your wallet to continue"
        );
        assert_eq!(
            AppError::Rejected.user_message(),
            "Transaction was rejected in wallet"
        );
        assert_eq!(
            AppError::InvalidInput("Minimum stake is 1 ALGO".into()).user_message(),
            "Minimum stake is 1 ALGO"
        );
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::NotFound("x".into()).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::OperationInProgress.status_and_code().1,
            "OPERATION_IN_PROGRESS"
        );
        assert_eq!(
            AppError::RemoteFailure("x".into()).status_and_code().0,
            StatusCode::BAD_GATEWAY
        );
    }
}
