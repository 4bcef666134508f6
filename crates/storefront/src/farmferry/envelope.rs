//! The documented backend response envelope.
//!
//! Every backend endpoint responds with one schema:
//!
//! ```json
//! { "success": true, "message": "optional human text", "data": { ... } }
//! ```
//!
//! Responses that do not fit this shape are rejected with
//! [`ApiError::UnexpectedShape`] naming what was actually received, so a
//! drifting backend contract shows up in logs instead of being silently
//! papered over.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// The backend's response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Whether the backend considers the operation successful.
    pub success: bool,
    /// Optional human-readable message, forwarded to clients on failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Endpoint-specific payload, present on success.
    #[serde(default)]
    pub data: Option<T>,
}

/// Decode a response body into the `data` payload of a successful envelope.
///
/// # Errors
///
/// - [`ApiError::UnexpectedShape`] if the body is not the documented envelope
/// - [`ApiError::Backend`] if the envelope reports `success: false`
/// - [`ApiError::Parse`] if `data` does not match the endpoint's schema
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope = decode_envelope(body)?;

    if !envelope.success {
        return Err(ApiError::Backend(
            envelope
                .message
                .unwrap_or_else(|| "no message provided".to_owned()),
        ));
    }

    let data = envelope.data.ok_or_else(|| {
        ApiError::UnexpectedShape("success envelope is missing `data`".to_owned())
    })?;

    serde_json::from_value(data).map_err(ApiError::Parse)
}

/// Decode a response body that acknowledges an operation without a payload
/// (logout, OTP send, password reset). Returns the envelope message, if any.
///
/// # Errors
///
/// - [`ApiError::UnexpectedShape`] if the body is not the documented envelope
/// - [`ApiError::Backend`] if the envelope reports `success: false`
pub fn decode_ack(body: &str) -> Result<Option<String>, ApiError> {
    let envelope = decode_envelope(body)?;

    if !envelope.success {
        return Err(ApiError::Backend(
            envelope
                .message
                .unwrap_or_else(|| "no message provided".to_owned()),
        ));
    }

    Ok(envelope.message)
}

/// Extract the envelope message from an error response body, falling back to
/// a truncated raw prefix when the body is not an envelope.
pub fn error_message(body: &str) -> String {
    if let Ok(envelope) = decode_envelope(body)
        && let Some(message) = envelope.message
    {
        return message;
    }
    body.chars().take(200).collect()
}

fn decode_envelope(body: &str) -> Result<Envelope<Value>, ApiError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| ApiError::UnexpectedShape("response body is not JSON".to_owned()))?;

    let Some(object) = value.as_object() else {
        return Err(ApiError::UnexpectedShape(format!(
            "expected a response object, got {}",
            json_kind(&value)
        )));
    };

    if !matches!(object.get("success"), Some(Value::Bool(_))) {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        return Err(ApiError::UnexpectedShape(format!(
            "response object has no boolean `success` field (keys: {})",
            keys.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        count: u32,
    }

    #[test]
    fn test_decode_data_success() {
        let body = r#"{"success": true, "message": "ok", "data": {"count": 3}}"#;
        let payload: Payload = decode_data(body).expect("valid envelope");
        assert_eq!(payload, Payload { count: 3 });
    }

    #[test]
    fn test_decode_data_backend_failure() {
        let body = r#"{"success": false, "message": "cart is empty"}"#;
        let err = decode_data::<Payload>(body).expect_err("failure envelope");
        assert!(matches!(err, ApiError::Backend(msg) if msg == "cart is empty"));
    }

    #[test]
    fn test_decode_data_missing_data() {
        let body = r#"{"success": true}"#;
        let err = decode_data::<Payload>(body).expect_err("missing data");
        assert!(matches!(err, ApiError::UnexpectedShape(_)));
    }

    #[test]
    fn test_decode_data_wrong_payload_schema() {
        let body = r#"{"success": true, "data": {"count": "three"}}"#;
        let err = decode_data::<Payload>(body).expect_err("bad payload");
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_bare_array_is_rejected_not_guessed() {
        // A bare item array is not the documented contract, even when it
        // would deserialize cleanly
        let body = r#"[{"count": 1}]"#;
        let err = decode_data::<Vec<Payload>>(body).expect_err("bare array");
        assert!(matches!(err, ApiError::UnexpectedShape(msg) if msg.contains("array")));
    }

    #[test]
    fn test_object_without_success_is_rejected() {
        let body = r#"{"items": [], "cartTotal": 0}"#;
        let err = decode_data::<Payload>(body).expect_err("no success field");
        let ApiError::UnexpectedShape(msg) = err else {
            panic!("expected UnexpectedShape, got {err:?}");
        };
        assert!(msg.contains("items"));
        assert!(msg.contains("cartTotal"));
    }

    #[test]
    fn test_non_json_body() {
        let err = decode_data::<Payload>("<html>bad gateway</html>").expect_err("not json");
        assert!(matches!(err, ApiError::UnexpectedShape(msg) if msg.contains("not JSON")));
    }

    #[test]
    fn test_decode_ack() {
        let message =
            decode_ack(r#"{"success": true, "message": "OTP sent"}"#).expect("valid ack");
        assert_eq!(message.as_deref(), Some("OTP sent"));

        let err = decode_ack(r#"{"success": false, "message": "unknown phone"}"#)
            .expect_err("failed ack");
        assert!(matches!(err, ApiError::Backend(msg) if msg == "unknown phone"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"success": false, "message": "invalid credentials"}"#),
            "invalid credentials"
        );
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }
}
