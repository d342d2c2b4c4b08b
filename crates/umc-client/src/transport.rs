//! Transport seam between the gateway and the network

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiFailure, ApiResult, ClientError};
use crate::request::{ApiRequest, MultipartBody, RequestBody};

/// Sends one fully prepared request. Implementations never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> ApiResult;
}

/// `reqwest`-backed transport rooted at the API base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Fails when the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiFailure> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{}{}{}", self.base_url, separator, path))
            .map_err(|e| ApiFailure::InvalidRequest(format!("bad url for '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn multipart_form(body: &MultipartBody) -> Result<Form, ApiFailure> {
        let mut form = Form::new();
        for (name, value) in &body.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &body.files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime {
                part = part
                    .mime_str(mime)
                    .map_err(|e| ApiFailure::InvalidRequest(format!("bad mime '{}': {}", mime, e)))?;
            }
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> ApiResult {
        let url = self.url_for(&request.path, &request.query)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| ApiFailure::InvalidRequest(e.to_string()))?;
                builder.body(bytes)
            }
            RequestBody::Multipart(body) => builder.multipart(Self::multipart_form(body)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        // Non-JSON bodies are kept as text so error pages still surface.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        if status.is_success() {
            Ok(body)
        } else {
            debug!("{} answered {}", request.path, status);
            Err(ApiFailure::Http { status: status.as_u16(), body })
        }
    }
}
