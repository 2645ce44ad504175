//! reqwest-backed HTTP transport

use async_trait::async_trait;
use reqwest::Method;
use std::time::Instant;
use tracing::debug;

use crate::error::{AdapterError, AdapterResult};
use crate::traits::HttpClient;
use crate::types::{HttpRequest, HttpResponse};

/// Sends each request on a fresh client; connections are never shared between tasks
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestHttpClient;

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self
    }

    fn transport_error(request: &HttpRequest, message: impl ToString) -> AdapterError {
        AdapterError::Transport {
            method: request.method.clone(),
            url: request.url.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Self::transport_error(request, e))?;

        let client = reqwest::Client::new();
        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::transport_error(request, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error(request, e))?;

        debug!(
            method = %request.method,
            url = %request.url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HTTP call finished"
        );

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
