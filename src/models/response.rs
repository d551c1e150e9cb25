use serde::Serialize;

use crate::chain::Address;

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Notification text for the user, when the action warrants one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

// ==================== TRANSACTIONS ====================
/// Confirmed submission as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_id: String,
    pub confirmed_round: u64,
    pub sender: Address,
    /// Decoded ABI return string, when the method returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success_sets_flag() {
        // Memastikan helper ApiResponse::success mengisi flag sukses
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
        assert!(response.message.is_none());
    }

    #[test]
    fn message_is_serialized_only_when_present() {
        let plain = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert!(plain.get("message").is_none());
        let noted = serde_json::to_value(ApiResponse::with_message(1, "Game created!")).unwrap();
        assert_eq!(noted["message"], "Game created!");
    }
}
