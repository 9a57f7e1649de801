use serde_json::Value;
use thiserror::Error;

/// Best-effort body of a failed response.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorPayload {
    Json(Value),
    Text(String),
}

impl ErrorPayload {
    /// Parse an error body. Returns `None` when the body is empty or claims
    /// to be JSON but does not parse.
    #[must_use]
    pub fn parse(body: &str, is_json: bool) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        if is_json {
            return serde_json::from_str(body).ok().map(Self::Json);
        }
        Some(Self::Text(body.to_string()))
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request {
        message: String,
        status: u16,
        payload: Option<ErrorPayload>,
    },
    #[error("unable to reach the server: {0}")]
    Network(#[source] reqwest::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid API URL: {0}")]
    Url(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, payload: Option<ErrorPayload>) -> Self {
        let message = payload
            .as_ref()
            .and_then(ErrorPayload::as_json)
            .and_then(server_message)
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        Self::Request {
            message,
            status,
            payload,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Request { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

// `detail` wins over `message`. Empty or falsy values fall through.
fn server_message(body: &Value) -> Option<String> {
    field_message(body.get("detail")).or_else(|| field_message(body.get("message")))
}

fn field_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        // Validation failures: [{"loc": [...], "msg": "...", "type": "..."}]
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                Some(Value::Array(items.clone()).to_string())
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_string_becomes_message() {
        let payload = ErrorPayload::Json(json!({"detail": "Not found"}));
        let err = ApiError::from_status(404, Some(payload.clone()));

        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.payload(), Some(&payload));
    }

    #[test]
    fn detail_wins_over_message() {
        let err = ApiError::from_status(
            400,
            Some(ErrorPayload::Json(json!({"detail": "first", "message": "second"}))),
        );
        assert_eq!(err.to_string(), "first");
    }

    #[test]
    fn message_used_when_detail_missing_or_empty() {
        let err = ApiError::from_status(
            409,
            Some(ErrorPayload::Json(json!({"detail": "", "message": "taken"}))),
        );
        assert_eq!(err.to_string(), "taken");
    }

    #[test]
    fn validation_detail_joins_messages() {
        let err = ApiError::from_status(
            422,
            Some(ErrorPayload::Json(json!({"detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
                {"loc": ["body", "password"], "msg": "field required", "type": "missing"}
            ]}))),
        );
        assert_eq!(
            err.to_string(),
            "value is not a valid email address; field required"
        );
    }

    #[test]
    fn text_payload_uses_generic_message() {
        let err = ApiError::from_status(502, ErrorPayload::parse("Bad Gateway", false));
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert_eq!(
            err.payload(),
            Some(&ErrorPayload::Text("Bad Gateway".to_string()))
        );
    }

    #[test]
    fn unparseable_json_body_is_omitted() {
        assert_eq!(ErrorPayload::parse("<html>oops</html>", true), None);
        assert_eq!(ErrorPayload::parse("   ", false), None);

        let err = ApiError::from_status(500, ErrorPayload::parse("<html>oops</html>", true));
        assert_eq!(err.to_string(), "Request failed with status 500");
        assert!(err.payload().is_none());
    }

    #[test]
    fn unauthorized_helper() {
        assert!(ApiError::from_status(401, None).is_unauthorized());
        assert!(!ApiError::from_status(403, None).is_unauthorized());
        assert!(!ApiError::Decode("x".to_string()).is_unauthorized());
    }
}
