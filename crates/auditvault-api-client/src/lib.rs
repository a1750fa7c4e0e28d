//! HTTP client for the AuditVault external services.
//!
//! Provides a minimal JSON-over-HTTP client with optional auth, generic
//! GET/POST helpers, and two domain clients:
//!
//! - [`AnalysisClient`] for the forgery analysis service
//! - [`LedgerClient`] for content upload, signing, submission, certificates
//!   and the activity feed
//!
//! Both implement the gateway traits from `auditvault_core::gateway`. None of
//! the calls retry: a failure is returned to the caller as an [`ApiError`].

pub mod analysis;
pub mod ledger;

use std::time::Duration;

use auditvault_core::{ApiError, ClientConfig};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub use analysis::AnalysisClient;
pub use ledger::LedgerClient;

/// Authentication strategy for the services.
#[derive(Clone, Debug)]
pub enum Auth {
    None,
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// HTTP client bound to one service base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    /// Build a client. `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, auth: Auth, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode_response(response).await
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "GET");
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(request).await
    }

    /// POST with query parameters and no body.
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST");
        self.send(self.client.post(&url).query(query)).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST json");
        self.send(self.client.post(&url).json(body)).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST multipart");
        self.send(self.client.post(&url).multipart(form)).await
    }
}

/// Build the analysis and ledger clients described by the configuration.
pub fn clients_from_config(
    config: &ClientConfig,
) -> Result<(AnalysisClient, LedgerClient), ApiError> {
    let auth = match &config.api_key {
        Some(key) => Auth::XApiKey(key.clone()),
        None => Auth::None,
    };
    let timeout = config.http_timeout();

    let analysis = ApiClient::new(&config.analysis_url, auth.clone(), timeout)?;
    let ledger = ApiClient::new(&config.ledger_url, auth, timeout)?;

    Ok((AnalysisClient::new(analysis), LedgerClient::new(ledger)))
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let detail = extract_detail(&body);
        tracing::warn!(status = %status, detail = ?detail, "Service request failed");
        return Err(ApiError::Service {
            status: status.as_u16(),
            detail,
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull the `detail` field out of an error body. String details are returned
/// as-is; structured details (validation error lists) are re-serialized.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Build a single-file multipart form under the field name `file`.
pub(crate) fn file_form(file: &auditvault_core::models::UploadedFile) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(file.content().to_vec()).file_name(file.name().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail":"IPFS node unreachable"}"#).as_deref(),
            Some("IPFS node unreachable")
        );
    }

    #[test]
    fn extract_detail_structured() {
        let body = r#"{"detail":[{"loc":["query","ipfs_cid"],"msg":"field required"}]}"#;
        let detail = extract_detail(body).unwrap();
        assert!(detail.contains("field required"));
    }

    #[test]
    fn extract_detail_absent_or_not_json() {
        assert_eq!(extract_detail(r#"{"error":"x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":null}"#), None);
        assert_eq!(extract_detail("Internal Server Error"), None);
    }

    #[test]
    fn build_url_trims_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:8001/", Auth::None, None).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8001");
        assert_eq!(
            client.build_url("/activity/recent"),
            "http://127.0.0.1:8001/activity/recent"
        );
    }

    #[tokio::test]
    async fn api_key_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Auth::XApiKey("secret".into()), None).unwrap();
        let body: serde_json::Value = client.get("/ping", &[]).await.unwrap();

        assert_eq!(body["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Auth::None, None).unwrap();
        let err = client
            .get::<serde_json::Value>("/ping", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = ApiClient::new("http://127.0.0.1:9", Auth::None, None).unwrap();
        let err = client
            .get::<serde_json::Value>("/ping", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
