//! Turning raw HTTP responses into values or `TransportError`s.
//!
//! HTTP clients live outside this crate; they hand us status, headers and body
//! text and get back the same error shape the rest of the core understands.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;

const FALLBACK_MESSAGE: &str = "Request failed";

/// Metadata of the response being decoded.
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub status: u16,
    pub status_text: &'a str,
    pub content_type: Option<&'a str>,
    pub body: &'a str,
}

impl RawResponse<'_> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("application/problem+json")
            })
            .unwrap_or(false)
    }

    /// JSON when the content type says so and it parses, else the text body.
    /// Empty bodies carry no payload.
    fn payload(&self) -> Option<Value> {
        if self.is_json() {
            if let Ok(value) = serde_json::from_str::<Value>(self.body) {
                return Some(value);
            }
        }
        if self.body.is_empty() {
            None
        } else {
            Some(Value::String(self.body.to_string()))
        }
    }
}

/// Decode a response. `204` and empty success bodies yield `None`.
///
/// A success body that is not JSON is handed to `T` as a JSON string, so
/// `decode::<String>` returns the text as-is; any other `T` reports it as a
/// malformed body.
pub fn decode<T: DeserializeOwned>(raw: RawResponse<'_>) -> Result<Option<T>, TransportError> {
    if raw.status == 204 {
        return Ok(None);
    }

    let payload = raw.payload();

    if !raw.is_success() {
        let fallback = if raw.status_text.is_empty() {
            FALLBACK_MESSAGE
        } else {
            raw.status_text
        };
        let message = payload
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| fallback.to_string());

        return Err(TransportError {
            message,
            status: raw.status,
            status_text: raw.status_text.to_string(),
            url: raw.url.to_string(),
            method: raw.method.to_ascii_uppercase(),
            payload,
        });
    }

    match payload {
        None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|err| TransportError::malformed(raw.method, raw.url, raw.status, err)),
    }
}

/// Best-effort human text from an error payload.
///
/// Order: first field error, `detail`, `title`, `message`, `error`; a plain
/// string payload is used as-is.
pub fn extract_message(payload: &Value) -> Option<String> {
    match payload {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => {
            if let Some(Value::Array(errors)) = map.get("errors") {
                if let Some(first) = errors.first() {
                    return Some(format_field_error(first));
                }
            }

            ["detail", "title", "message", "error"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find(|text| !text.trim().is_empty())
                .map(str::to_string)
        }
        _ => None,
    }
}

fn format_field_error(entry: &Value) -> String {
    match entry {
        Value::Object(fields) => {
            let field = fields
                .get("field")
                .and_then(Value::as_str)
                .filter(|f| !f.is_empty())
                .map(|f| format!("{f}: "))
                .unwrap_or_default();
            let message = fields
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Invalid value");
            format!("{field}{message}")
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
