use super::IngestError;
use super::payload::{LogPayload, SpanPayload};
use crate::domain::RecordBatch;
use crate::port::IngestApi;
use reqwest::{Client, ClientBuilder};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct IngestClientConfig {
    /// Backend base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub auth_token: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
}

impl IngestClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            ..Default::default()
        }
    }
}

impl Default for IngestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_token: String::new(),
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: concat!("observex-seeder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// REST-mode client for `/api/ingest/{kind}`.
#[derive(Debug, Clone)]
pub struct IngestClient {
    client: Client,
    base_url: Url,
    auth_token: String,
}

impl IngestClient {
    pub fn new(config: IngestClientConfig) -> Result<Self, IngestError> {
        let base_url: Url = config.base_url.parse().map_err(|e| {
            IngestError::InvalidConfiguration(format!("Invalid API URL '{}': {e}", config.base_url))
        })?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                IngestError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token,
        })
    }

    /// Absolute URL for an ingestion path, keeping any path prefix of the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, IngestError> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        joined.parse().map_err(|e| {
            IngestError::InvalidConfiguration(format!("Invalid ingestion URL '{joined}': {e}"))
        })
    }

    async fn send(&self, batch: &RecordBatch) -> Result<(), IngestError> {
        let kind = batch.kind();
        let path = kind
            .ingest_path()
            .ok_or(IngestError::UnsupportedKind(kind))?;
        let url = self.endpoint(path)?;

        let request = self.client.post(url).bearer_auth(&self.auth_token);
        let request = match batch {
            RecordBatch::Logs(rows) => {
                request.json(&rows.iter().map(LogPayload::from).collect::<Vec<_>>())
            }
            RecordBatch::Spans(rows) => {
                request.json(&rows.iter().map(SpanPayload::from).collect::<Vec<_>>())
            }
            RecordBatch::Incidents(_) => return Err(IngestError::UnsupportedKind(kind)),
        };

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(
                kind = %kind,
                rows = batch.len(),
                latency_ms = start.elapsed().as_millis() as u64,
                "Ingested batch via REST"
            );
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(IngestError::HttpError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl IngestApi for IngestClient {
    fn post<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>> {
        Box::pin(self.send(batch))
    }
}
