//! HTTP backend client.

use super::{BackendApi, BackendError, SourceFile, SummarizeResponse, UploadResponse};
use crate::params::ParamSnapshot;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    // No request timeout: a hung request leaves the session loading until the
    // user supersedes it with a new file selection.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Multipart form shared by both endpoints: the file bytes plus the
    /// frozen parameter snapshot, floats string-encoded.
    fn form(file: &SourceFile, params: &ParamSnapshot) -> Result<Form, BackendError> {
        let mime = mime_guess::from_path(&file.name)
            .first_or(mime::TEXT_CSV)
            .to_string();
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&mime)?;

        Ok(Form::new()
            .part("file", part)
            .text("api_key", params.api_key.clone())
            .text("model", params.model.to_string())
            .text("temperature", params.temperature.to_string())
            .text("top_p", params.top_p.to_string()))
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        file: &SourceFile,
        params: &ParamSnapshot,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, file = %file.name, "sending multipart request");

        let response = self
            .http
            .post(&url)
            .multipart(Self::form(file, params)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn upload(
        &self,
        file: &SourceFile,
        params: &ParamSnapshot,
    ) -> Result<UploadResponse, BackendError> {
        self.post("/upload", file, params).await
    }

    async fn summarize(
        &self,
        file: &SourceFile,
        params: &ParamSnapshot,
    ) -> Result<SummarizeResponse, BackendError> {
        self.post("/summarize", file, params).await
    }
}
