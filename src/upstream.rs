// src/upstream.rs
//
// The system-of-record API, treated as a black box returning JSON arrays of
// loosely-typed records. No retries, no caching; a failed call surfaces as
// service-unavailable to the client.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait CitasBackend: Send + Sync {
    async fn fetch_citas(&self) -> Result<Vec<Value>, UpstreamError>;
    async fn fetch_profesionales(&self) -> Result<Vec<Value>, UpstreamError>;
    async fn fetch_atletas(&self) -> Result<Vec<Value>, UpstreamError>;
    async fn fetch_areas(&self) -> Result<Vec<Value>, UpstreamError>;
    async fn fetch_consultorios(&self) -> Result<Vec<Value>, UpstreamError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    citas_url: String,
    catalogos_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.upstream_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            citas_url: cfg.citas_url(),
            catalogos_url: cfg.catalogos_url(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Vec<Value>, UpstreamError> {
        tracing::info!("consultando {url}");
        let wrap = |source: reqwest::Error| UpstreamError::Request {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(wrap)?
            .error_for_status()
            .map_err(wrap)?;
        response.json().await.map_err(wrap)
    }
}

#[async_trait]
impl CitasBackend for HttpBackend {
    async fn fetch_citas(&self) -> Result<Vec<Value>, UpstreamError> {
        self.get_json(&self.citas_url).await
    }

    async fn fetch_profesionales(&self) -> Result<Vec<Value>, UpstreamError> {
        self.get_json(&format!("{}Profesionales-Salud/", self.catalogos_url))
            .await
    }

    async fn fetch_atletas(&self) -> Result<Vec<Value>, UpstreamError> {
        self.get_json(&format!("{}Atletas/", self.catalogos_url)).await
    }

    async fn fetch_areas(&self) -> Result<Vec<Value>, UpstreamError> {
        self.get_json(&format!("{}Areas/", self.catalogos_url)).await
    }

    async fn fetch_consultorios(&self) -> Result<Vec<Value>, UpstreamError> {
        self.get_json(&format!("{}Consultorios/", self.catalogos_url))
            .await
    }
}
