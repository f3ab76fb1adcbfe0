/// Success response envelope
///
/// Every successful handler responds with
/// `{ "success": true, "message": "...", "data": ... }`; `data` is omitted
/// when there is nothing to return. Errors use the mirrored envelope in
/// [`crate::error`].
use axum::Json;
use serde::Serialize;

/// Success envelope wrapping handler output
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true
    pub success: bool,

    /// Human-readable status message
    pub message: String,

    /// Payload, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Builds a success response carrying data
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// Builds a success response with a message only
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_with_data() {
        let Json(response) = ApiResponse::ok("Created", json!({ "id": 7 }));
        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized["success"], true);
        assert_eq!(serialized["message"], "Created");
        assert_eq!(serialized["data"]["id"], 7);
    }

    #[test]
    fn test_envelope_omits_empty_data() {
        let Json(response) = ApiResponse::message("Done");
        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized["success"], true);
        assert!(serialized.get("data").is_none());
    }
}
