//! Backend wire contract.
//!
//! The backend owns CSV parsing and LLM summarization; this client consumes
//! it through two multipart endpoints and treats everything behind them as
//! opaque. The [`BackendApi`] seam keeps the orchestrator testable without a
//! live server.

pub mod client;

pub use client::HttpBackend;

use crate::params::ParamSnapshot;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

/// One preview row: column name to cell value, exactly as the backend sent
/// it. Cells may be null (the backend encodes NaN that way) or missing.
pub type PreviewRow = serde_json::Map<String, serde_json::Value>;

/// Successful `/upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub preview: Vec<PreviewRow>,
    pub columns: Vec<String>,
    pub filename: String,
    pub row_count: u64,
}

/// Successful `/summarize` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// A selected file: display name plus raw bytes. `Bytes` keeps the handoff
/// between the two phases a refcount bump rather than a copy.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Uploads the file for parsing; a success carries the preview table.
    async fn upload(
        &self,
        file: &SourceFile,
        params: &ParamSnapshot,
    ) -> Result<UploadResponse, BackendError>;

    /// Requests the summary. The payload is the same form the upload phase
    /// sent; the backend re-reads the file rather than referencing it by id.
    async fn summarize(
        &self,
        file: &SourceFile,
        params: &ParamSnapshot,
    ) -> Result<SummarizeResponse, BackendError>;
}
