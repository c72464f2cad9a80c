//! The JSON envelope returned by every endpoint
//!
//! Success and failure responses alike are wrapped in
//! `{success, message, data}`. Clients watch for one exact failure shape
//! (`success=false`, the invalid-token message, `data=null`) to know the
//! session is no longer usable, so the message text below is part of the
//! wire contract and must not drift.

use serde::{Deserialize, Serialize};

/// Failure message that signals a dead session to clients.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Response envelope shared by all endpoints.
///
/// `data` serializes as `null` when absent; clients depend on that for the
/// session-invalidation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful response with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failure response; `data` is always null.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// True when this is the exact combination that forces a client back to
    /// the login surface.
    pub fn invalidates_session(&self) -> bool {
        !self.success && self.message == INVALID_TOKEN_MESSAGE && self.data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_null_data() {
        let env: Envelope<serde_json::Value> = Envelope::failure(INVALID_TOKEN_MESSAGE);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["message"], serde_json::json!("Invalid or expired token"));
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_invalidation_requires_exact_combination() {
        let invalid: Envelope<serde_json::Value> = Envelope::failure(INVALID_TOKEN_MESSAGE);
        assert!(invalid.invalidates_session());

        let forbidden: Envelope<serde_json::Value> =
            Envelope::failure("You do not have permission to perform this action");
        assert!(!forbidden.invalidates_session());

        let success = Envelope::ok(INVALID_TOKEN_MESSAGE, serde_json::json!({}));
        assert!(!success.invalidates_session());
    }
}
