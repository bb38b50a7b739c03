//! API client - typed calls on top of the HTTP transport
//!
//! Attaches the bearer token of the current session and turns non-2xx
//! responses into `Error::Unauthorized` / `Error::Api` carrying the
//! server's message.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method};

/// Supplies the bearer token for outgoing requests
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            transport,
            tokens: Some(tokens),
        }
    }

    /// Client that never sends a token (login, registration)
    pub fn anonymous(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            tokens: None,
        }
    }

    /// Send a request and return the 2xx response
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Vec<(String, String)>,
        body: Option<JsonValue>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, path);
        request.params = params;
        request.body = body;
        if let Some(token) = self.tokens.as_ref().and_then(|t| t.bearer_token()) {
            request = request.with_bearer_token(token);
        }

        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(&response))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let response = self.request(Method::Get, path, params, None).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: JsonValue) -> Result<T> {
        let response = self.request(Method::Post, path, Vec::new(), Some(body)).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: JsonValue) -> Result<T> {
        let response = self.request(Method::Put, path, Vec::new(), Some(body)).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::Delete, path, Vec::new(), None).await?;
        Ok(())
    }
}

/// Server message for a failed response.
///
/// Validation failures come back as `{errors: [...]}`, everything else as
/// `{error}` or `{message}`. Token rejections use `{msg}`.
pub fn server_message(data: &JsonValue) -> Option<String> {
    if let Some(errors) = data.get("errors").and_then(JsonValue::as_array) {
        let messages: Vec<&str> = errors.iter().filter_map(JsonValue::as_str).collect();
        if !messages.is_empty() {
            return Some(messages.join(", "));
        }
    }
    ["error", "message", "msg"]
        .iter()
        .find_map(|key| data.get(*key).and_then(JsonValue::as_str))
        .map(str::to_string)
}

fn error_from_response(response: &HttpResponse) -> Error {
    let message = server_message(&response.data)
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    if response.status == 401 {
        Error::Unauthorized(message)
    } else {
        Error::Api {
            status: response.status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_message_precedence() {
        let data = json!({"errors": ["Email already registered", "Weak password"], "error": "ignored"});
        assert_eq!(
            server_message(&data).as_deref(),
            Some("Email already registered, Weak password")
        );

        let data = json!({"error": "Invalid email or password", "message": "ignored"});
        assert_eq!(server_message(&data).as_deref(), Some("Invalid email or password"));

        assert_eq!(server_message(&json!({"message": "Bookmark removed"})).as_deref(), Some("Bookmark removed"));
        assert_eq!(server_message(&json!({"msg": "Token has expired"})).as_deref(), Some("Token has expired"));
        assert_eq!(server_message(&json!("Bad Gateway")), None);
    }

    #[test]
    fn test_error_mapping() {
        let err = error_from_response(&HttpResponse::new(401, json!({"error": "Invalid token"})));
        assert!(matches!(err, Error::Unauthorized(ref m) if m == "Invalid token"));

        let err = error_from_response(&HttpResponse::new(502, JsonValue::Null));
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "HTTP 502");
    }
}
