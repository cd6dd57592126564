//! Error body normalization.

use serde_json::Value;

/// Reduce an error response body to one human-readable message.
///
/// Resolution order:
/// 1. `error` is an object: its first value in the order the server sent it
/// 2. `error` is a string
/// 3. `message` is a string
/// 4. `Request failed with status {status}`
///
/// Bodies that are not JSON take the fallback. Never fails.
#[must_use]
pub fn parse_error(status: u16, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback(status);
    };

    match value.get("error") {
        Some(Value::Object(fields)) => {
            if let Some(message) = fields.values().next().and_then(describe) {
                return message;
            }
        }
        Some(Value::String(message)) if !message.is_empty() => return message.clone(),
        _ => {}
    }

    match value.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => fallback(status),
    }
}

fn fallback(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// `None` for values that carry no message: null, empty strings, empty lists.
fn describe(value: &Value) -> Option<String> {
    let message = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(describe)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_object_first_value() {
        assert_eq!(parse_error(422, r#"{"error":{"email":"already taken"}}"#), "already taken");
    }

    #[test]
    fn test_error_object_keeps_wire_order() {
        let body = r#"{"error":{"password":"must be at least 8 bytes long","email":"must be provided"}}"#;
        assert_eq!(parse_error(422, body), "must be at least 8 bytes long");
    }

    #[test]
    fn test_error_string_and_message() {
        assert_eq!(parse_error(404, r#"{"error":"the requested resource could not be found"}"#),
            "the requested resource could not be found");
        assert_eq!(parse_error(500, r#"{"message":"boom"}"#), "boom");
        assert_eq!(parse_error(500, r#"{"error":42,"message":"boom"}"#), "boom");
    }

    #[test]
    fn test_non_json_uses_status() {
        let message = parse_error(502, "<html>Bad Gateway</html>");
        assert!(message.contains("502"));
        assert_eq!(parse_error(500, ""), "Request failed with status 500");
    }

    #[test]
    fn test_odd_shapes_fall_back() {
        assert_eq!(parse_error(400, r#"{"error":{}}"#), "Request failed with status 400");
        assert_eq!(parse_error(400, r#"["error"]"#), "Request failed with status 400");
        assert_eq!(parse_error(422, r#"{"error":{"items":["too few","too many"]}}"#), "too few, too many");
    }

    #[test]
    fn test_blank_field_message_falls_back() {
        assert_eq!(parse_error(422, r#"{"error":{"email":null}}"#), "Request failed with status 422");
        assert_eq!(parse_error(422, r#"{"error":{"email":""}}"#), "Request failed with status 422");
        assert_eq!(parse_error(422, r#"{"error":{"email":[]}}"#), "Request failed with status 422");
        assert_eq!(parse_error(422, r#"{"error":{"email":[null]}}"#), "Request failed with status 422");
        assert_eq!(parse_error(400, r#"{"error":"","message":"bad input"}"#), "bad input");
        assert_eq!(parse_error(422, r#"{"error":{"email":null},"message":"invalid"}"#), "invalid");
        assert_eq!(parse_error(500, r#"{"message":""}"#), "Request failed with status 500");
    }
}
