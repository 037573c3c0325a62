use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::{
    config::{BackendConfig, SEARCH_ENDPOINT, UPLOAD_ENDPOINT},
    error::{Result, VidintelError},
    types::{SearchResponse, SearchResult, UploadReceipt, VideoFile},
};

/// The remote video-intelligence service.
#[async_trait]
pub trait VideoBackend: Send + Sync + 'static {
    async fn upload_video(&self, video: &VideoFile) -> Result<UploadReceipt>;
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    async fn post_form(&self, endpoint: &'static str, form: Form) -> Result<reqwest::Response> {
        let url = self.config.endpoint_url(endpoint);
        debug!(%url, "posting form");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VidintelError::BadStatus { endpoint, status });
        }
        Ok(response)
    }

    fn classify(&self, endpoint: &'static str, err: reqwest::Error) -> VidintelError {
        match self.config.request_timeout {
            Some(after) if err.is_timeout() => VidintelError::Timeout { endpoint, after },
            _ => VidintelError::ApiError(err),
        }
    }
}

#[async_trait]
impl VideoBackend for HttpBackend {
    async fn upload_video(&self, video: &VideoFile) -> Result<UploadReceipt> {
        let bytes = tokio::fs::read(video.path())
            .await
            .map_err(|source| VidintelError::VideoUnreadable {
                path: video.path.clone(),
                source,
            })?;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(video.file_name.clone())
            .mime_str(video.mime_type())?;
        let form = Form::new().part("file", part);

        let response = self.post_form(UPLOAD_ENDPOINT, form).await?;

        // Any 2xx is success; the body only feeds the logs.
        let body = response.bytes().await.unwrap_or_default();
        let receipt = serde_json::from_slice::<UploadReceipt>(&body).unwrap_or_default();
        info!(
            file = %video.file_name,
            size,
            frames_indexed = ?receipt.frames_indexed,
            message = ?receipt.message,
            "video accepted by backend"
        );
        Ok(receipt)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let form = Form::new().text("query", query.to_string());
        let response = self.post_form(SEARCH_ENDPOINT, form).await?;
        let body = response.bytes().await.map_err(|e| self.classify(SEARCH_ENDPOINT, e))?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        debug!(count = parsed.results.len(), "search returned");
        Ok(parsed.results)
    }
}
