//! HTTP gateway implementation
//!
//! Talks JSON to the backend with `reqwest`. Non-success responses are
//! turned into `ApiError::Status`, carrying the body's `detail` field when
//! the backend provides one.

use crate::api::gateway::Gateway;
use crate::api::types::{
    AuthenticatedUser, ConnectionDraft, ConnectionId, ConnectionProfile, ConnectionTestRequest,
    LoginPayload, QueryResult, RegisterPayload, Session, SqlRequest, TestOutcome,
};
use crate::config::Settings;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway backed by the HTTP API
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a client for `base_url` with the given request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> ApiResult<Self> {
        Self::new(&settings.api_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        self.client.request(method, self.url(path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = send(self.request(method, path).json(body)).await?;
        decode(response).await
    }
}

/// Send a request, mapping transport failures and error statuses
async fn send(builder: RequestBuilder) -> ApiResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Body is best-effort: a failure to read it just means no detail
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    warn!(status = status.as_u16(), ?detail, "api request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull the `detail` field out of an error body.
///
/// Strings are returned as-is; any other JSON value (FastAPI validation
/// errors are arrays) is rendered as compact JSON.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_connections(&self) -> ApiResult<Vec<ConnectionProfile>> {
        self.get_json("/connections").await
    }

    async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<ConnectionProfile> {
        self.send_json(Method::POST, "/connections", draft).await
    }

    async fn update_connection(
        &self,
        id: ConnectionId,
        draft: &ConnectionDraft,
    ) -> ApiResult<ConnectionProfile> {
        self.send_json(Method::PUT, &format!("/connections/{id}"), draft)
            .await
    }

    async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()> {
        // 204 No Content: nothing to decode
        send(self.request(Method::DELETE, &format!("/connections/{id}"))).await?;
        Ok(())
    }

    async fn test_connection(&self, connection_string: &str) -> ApiResult<TestOutcome> {
        let body = ConnectionTestRequest {
            connection_string: connection_string.to_string(),
        };
        self.send_json(Method::POST, "/connections/test", &body)
            .await
    }

    async fn run_sql(&self, request: &SqlRequest) -> ApiResult<QueryResult> {
        self.send_json(Method::POST, "/sql/execute", request).await
    }

    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session> {
        self.send_json(Method::POST, "/auth/login", payload).await
    }

    async fn register(&self, payload: &RegisterPayload) -> ApiResult<AuthenticatedUser> {
        self.send_json(Method::POST, "/auth/register", payload).await
    }
}
