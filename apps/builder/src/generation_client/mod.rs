/// Generation client: the single point of entry for calls to the document
/// generation service.
///
/// One request per submission. There is no retry here: a failed attempt is
/// reported once and the user resubmits from the wizard.
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::ResumeData;
use crate::models::user::SessionContext;

/// Opaque document bytes as returned by the service. Never decoded here.
pub type BinaryArtifact = Bytes;

const ACCEPTED_CONTENT: &str = "application/pdf";
const MAX_DIAGNOSTIC_CHARS: usize = 512;

/// Every way a generation attempt can go wrong collapses into this one error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("resume generation failed: {message}")]
pub struct GenerationFailed {
    /// HTTP status when the service answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl GenerationFailed {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GenerationFailed {
    fn from(e: reqwest::Error) -> Self {
        GenerationFailed::new(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

/// Backend that turns canonical resume data into a document.
///
/// Carried in `AppState` as `Arc<dyn ResumeGenerator>`.
#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(
        &self,
        data: &ResumeData,
        ctx: &SessionContext,
    ) -> Result<BinaryArtifact, GenerationFailed>;
}

#[derive(Clone)]
pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
    min_artifact_bytes: usize,
}

impl HttpGenerationClient {
    /// No request timeout is configured; the transport default applies.
    pub fn new(endpoint: impl Into<String>, min_artifact_bytes: usize) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: endpoint.into(),
            min_artifact_bytes,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResumeGenerator for HttpGenerationClient {
    async fn generate(
        &self,
        data: &ResumeData,
        ctx: &SessionContext,
    ) -> Result<BinaryArtifact, GenerationFailed> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, ACCEPTED_CONTENT)
            .json(data);

        if let Some(credential) = &ctx.credential {
            request = request.header(header::COOKIE, credential);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation service returned {}: {}", status, body);
            let detail = truncate(body.trim(), MAX_DIAGNOSTIC_CHARS);
            let message = if detail.is_empty() {
                format!("service returned {status}")
            } else {
                format!("service returned {status}: {detail}")
            };
            return Err(GenerationFailed::new(Some(status.as_u16()), message));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let artifact = response.bytes().await?;

        if artifact.len() < self.min_artifact_bytes {
            return Err(GenerationFailed::new(
                Some(status.as_u16()),
                format!(
                    "service returned an undersized artifact ({} bytes, expected at least {})",
                    artifact.len(),
                    self.min_artifact_bytes
                ),
            ));
        }

        debug!(
            "Generation succeeded: bytes={}, content_type={}",
            artifact.len(),
            content_type
        );

        Ok(artifact)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
