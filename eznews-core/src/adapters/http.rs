//! News API HTTP client
//!
//! Sends requests to the REST API below a fixed base URL, attaching the
//! bearer token when the request carries one.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method};

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport for the API rooted at `base_url`
    /// (e.g. `http://localhost:5000/api`)
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url).context("Invalid API URL format")?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("API URL must use http or https");
        }
        if parsed.host_str().unwrap_or("").is_empty() {
            anyhow::bail!("API URL must include a host");
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::Network(format!("Unable to connect to {}", self.base_url))
        } else {
            Error::Network(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;

        // Error pages are not always JSON; keep their text as the body
        let data = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(HttpResponse { status, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockNewsServer, MockResponse};

    #[test]
    fn test_accepts_http_and_https() {
        assert!(ReqwestTransport::new("http://localhost:5000/api", Duration::from_secs(5)).is_ok());
        assert!(ReqwestTransport::new("https://news.example.com/api/", Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        let result = ReqwestTransport::new("ftp://news.example.com/api", Duration::from_secs(5));
        assert!(result.unwrap_err().to_string().contains("http or https"));

        let result = ReqwestTransport::new("not a url", Duration::from_secs(5));
        assert!(result.unwrap_err().to_string().contains("Invalid API URL"));
    }

    #[test]
    fn test_url_join_trims_slashes() {
        let transport = ReqwestTransport::new("http://localhost:5000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:5000/api");
        assert_eq!(transport.url_for("/articles"), "http://localhost:5000/api/articles");
        assert_eq!(transport.url_for("bookmarks/4"), "http://localhost:5000/api/bookmarks/4");
    }

    #[tokio::test]
    async fn test_sends_query_params_and_bearer_token() {
        let server = MockNewsServer::start(vec![MockResponse::json(
            200,
            r#"{"items": [], "pages": 0, "total": 0}"#,
        )]);
        let transport = ReqwestTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();

        let request = HttpRequest::new(Method::Get, "/articles")
            .with_param("page", "2")
            .with_param("search", "banjir jakarta")
            .with_bearer_token("tok-123");
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.data["pages"], 0);

        let recorded = server.requests();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].request_line.starts_with("GET /api/articles?"));
        assert!(recorded[0].request_line.contains("page=2"));
        assert!(recorded[0].request_line.contains("search=banjir+jakarta"));
        assert_eq!(recorded[0].header("authorization"), Some("Bearer tok-123"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_response() {
        let server = MockNewsServer::start(vec![
            MockResponse::json(401, r#"{"error": "Invalid email or password"}"#),
            MockResponse::text(500, "Internal Server Error"),
        ]);
        let transport = ReqwestTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();

        let body = serde_json::json!({"email": "a@b.co", "password": "x"});
        let response = transport
            .send(HttpRequest::new(Method::Post, "/auth/login").with_body(body))
            .await
            .unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(response.data["error"], "Invalid email or password");

        let response = transport.send(HttpRequest::new(Method::Get, "/categories")).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.data, JsonValue::String("Internal Server Error".into()));

        let recorded = server.requests();
        assert!(recorded[0].body.contains("\"email\":\"a@b.co\""));
        assert_eq!(recorded[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport =
            ReqwestTransport::new(&format!("http://127.0.0.1:{}/api", port), Duration::from_secs(2)).unwrap();

        let err = transport
            .send(HttpRequest::new(Method::Get, "/articles"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
