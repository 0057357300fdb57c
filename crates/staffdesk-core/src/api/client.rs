use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use super::middleware::{RequestStage, ResponseContext, ResponseStage};
use super::request::{ApiRequest, ApiResponse, decode_body};

/// HTTP client that runs every call through the stage chain.
///
/// Cheap to clone; clones share the connection pool and stages.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    request_stages: Vec<Box<dyn RequestStage>>,
    response_stages: Vec<Box<dyn ResponseStage>>,
}

pub struct ApiClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    request_stages: Vec<Box<dyn RequestStage>>,
    response_stages: Vec<Box<dyn ResponseStage>>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.request_stages.push(Box::new(stage));
        self
    }

    #[must_use]
    pub fn response_stage(mut self, stage: impl ResponseStage + 'static) -> Self {
        self.response_stages.push(Box::new(stage));
        self
    }

    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient> {
        let http = http_client(self.timeout)?;
        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                request_stages: self.request_stages,
                response_stages: self.response_stages,
            }),
        })
    }
}

/// Builds a bare `reqwest::Client` with the shared timeout policy.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Joins a base URL and a relative path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            timeout: None,
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.inner.base_url, path)
    }

    /// Runs a request through request stages, the network, and response stages.
    pub fn dispatch(&self, request: ApiRequest) -> BoxFuture<'_, ApiResult<ApiResponse>> {
        async move {
            let mut request = request;
            for stage in &self.inner.request_stages {
                request = stage.on_request(request)?;
            }

            let mut outcome = self.transmit(&request).await;

            for stage in &self.inner.response_stages {
                let ctx = ResponseContext {
                    request: &request,
                    client: self,
                };
                outcome = stage.on_response(ctx, outcome).await;
            }

            if let Err(err) = &outcome {
                tracing::debug!(request = %request.describe(), kind = %err.kind, "request failed");
            }
            outcome
        }
        .boxed()
    }

    async fn transmit(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let url = self.url(&request.path);
        tracing::debug!(request = %request.describe(), retried = request.retried, "sending");

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = decode_body(&text);

        if (200..300).contains(&status) {
            Ok(ApiResponse { status, body })
        } else {
            Err(ApiError::from_status(status, body))
        }
    }

    /// Dispatches and decodes the JSON body into `T`.
    ///
    /// # Errors
    /// Returns the pipeline error, or a parse error if the body does not match `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let describe = request.describe();
        let response = self.dispatch(request).await?;
        serde_json::from_value(response.body)
            .map_err(|e| ApiError::parse(format!("Unexpected response from {describe}: {e}")))
    }

    /// Dispatches and discards the body.
    ///
    /// # Errors
    /// Returns the pipeline error.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<()> {
        self.dispatch(request).await.map(|_| ())
    }
}
