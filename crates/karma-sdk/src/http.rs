//! Request helper
//!
//! One call per request: attach the bearer key, send the JSON body, parse the
//! reply as JSON and turn any non-2xx status into [`KarmaError::Api`]. There
//! are no retries and no timeout.

use reqwest::{Client, Method};
use karma_types::ApiErrorBody;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{KarmaError, KarmaResult};

/// A single API call, built fluently
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    method: Method,
    path: String,
    credential: Option<&'a str>,
    body: Option<serde_json::Value>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            credential: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Send `Authorization: Bearer <key>`
    pub fn bearer(mut self, key: &'a str) -> Self {
        self.credential = Some(key);
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> KarmaResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// HTTP transport shared by the owner and agent clients
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> KarmaResult<Self> {
        if config.base_url.is_empty() {
            return Err(KarmaError::Config("API base URL is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("karma-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform the call and decode a 2xx body into `T`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> KarmaResult<T> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(key) = request.credential {
            builder = builder.bearer_auth(key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "karma api call"
        );

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        // Bodiless 2xx replies decode as JSON null
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}

/// Build the error for a non-2xx reply
pub(crate) fn api_error(status: u16, text: &str) -> KarmaError {
    let body = serde_json::from_str::<serde_json::Value>(text)
        .unwrap_or_else(|_| serde_json::Value::String(text.to_string()));

    let message = match ApiErrorBody::deserialize(&body) {
        Ok(ApiErrorBody {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(ApiErrorBody { error, .. }) => error,
        Err(_) => format!("API error {status}"),
    };

    KarmaError::Api {
        status,
        message,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(err: KarmaError) -> (u16, String, serde_json::Value) {
        match err {
            KarmaError::Api { status, message, body } => (status, message, body),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_field_becomes_message() {
        let (status, message, body) = parts(api_error(402, r#"{"error":"insufficient_funds"}"#));
        assert_eq!(status, 402);
        assert_eq!(message, "insufficient_funds");
        assert_eq!(body["error"], "insufficient_funds");
    }

    #[test]
    fn test_details_are_appended() {
        let (_, message, _) =
            parts(api_error(400, r#"{"error":"Invalid request","details":"email is required"}"#));
        assert_eq!(message, "Invalid request: email is required");
    }

    #[test]
    fn test_generic_message_without_error_field() {
        let (status, message, _) = parts(api_error(500, r#"{"oops":true}"#));
        assert_eq!(status, 500);
        assert_eq!(message, "API error 500");
    }

    #[test]
    fn test_non_string_error_field_uses_generic_message() {
        let (_, message, body) = parts(api_error(422, r#"{"error":{"code":7}}"#));
        assert_eq!(message, "API error 422");
        assert_eq!(body["error"]["code"], 7);
    }

    #[test]
    fn test_non_json_body_kept_as_string() {
        let (_, message, body) = parts(api_error(502, "<html>Bad gateway</html>"));
        assert_eq!(message, "API error 502");
        assert_eq!(body, serde_json::Value::String("<html>Bad gateway</html>".into()));
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::post("/api/spend/can-spend")
            .bearer("sk_agent_x")
            .json(&serde_json::json!({"amount": 1.0}))
            .unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/api/spend/can-spend");
        assert_eq!(req.credential, Some("sk_agent_x"));
        assert_eq!(req.body.unwrap()["amount"], 1.0);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = HttpClient::new(&Config { base_url: String::new() }).unwrap_err();
        assert!(matches!(err, KarmaError::Config(_)));
    }
}
