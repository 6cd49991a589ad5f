//! HTTP utilities for DoubleCloud REST API calls

use super::error::{ApiError, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying a per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Error payload returned by the API gateway
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client wrapper for DoubleCloud API calls
#[derive(Clone, Debug)]
pub struct DcHttpClient {
    client: Client,
}

impl DcHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("terraform-provider-doublecloud/{}", crate::VERSION))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let body = self.send(self.request(Method::GET, url, token)).await?;
        decode(&body)
    }

    /// Make a POST request with a JSON body
    pub async fn post<B, T>(&self, url: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, url, token).json(body);
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch<B, T>(&self, url: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, url, token).json(body);
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let body = self.send(self.request(Method::DELETE, url, token)).await?;
        decode(&body)
    }

    /// POST an urlencoded form without authentication (token exchange)
    pub async fn post_form<F, T>(&self, url: &str, form: &F) -> Result<T>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {} (form)", url);
        let body = self.send(self.client.post(url).form(form)).await?;
        decode(&body)
    }

    fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("{} {} [{}]", method, url, request_id);

        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, request_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(status_error(status, &body));
        }

        Ok(body)
    }
}

/// Map a non-success response to an [`ApiError`]
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_default();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::UNAUTHORIZED => ApiError::Auth(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Decode a response body; empty bodies decode as JSON `null`
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(StatusCode::NOT_FOUND, r#"{"code":5,"message":"network abc not found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "resource not found: network abc not found");

        let err = status_error(StatusCode::BAD_REQUEST, "");
        assert_eq!(err.to_string(), "API request failed: 400 - Bad Request");

        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "{}"),
            ApiError::Auth(_)
        ));
    }

    #[test]
    fn test_decode_empty_body() {
        let value: Option<serde_json::Value> = decode("").unwrap();
        assert!(value.is_none());
    }
}
