//! HTTP client for the dars backend

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode, Url};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::ApiError;
use super::models::{ChatRequest, StreamEvent};
use super::streaming;
use crate::curriculum::{Grade, NodeId, PdfDocument};

/// Backend API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,
    /// Base URL of the backend, always ending in `/`
    base_url: Url,
}

impl ApiClient {
    const NAVIGATION_PATH: &'static str = "api/navigation";
    const PDF_PATH: &'static str = "api/pdf";
    const PDF_PROXY_PATH: &'static str = "api/pdf-proxy";
    const CHAT_PATH: &'static str = "api/chat";

    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let normalized =
            if base_url.ends_with('/') { base_url.to_string() } else { format!("{base_url}/") };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Fetch the whole navigation tree
    pub async fn fetch_navigation(&self) -> Result<Vec<Grade>, ApiError> {
        let url = self.endpoint(Self::NAVIGATION_PATH)?;
        tracing::info!("Fetching navigation tree from {}", url);

        let response = check_status(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        let grades: Vec<Grade> = serde_json::from_str(&body)?;

        tracing::info!("Loaded {} grade(s)", grades.len());
        Ok(grades)
    }

    /// Fetch textbook metadata for a subject
    pub async fn fetch_pdf(&self, subject_id: NodeId) -> Result<PdfDocument, ApiError> {
        let mut url = self.endpoint(Self::PDF_PATH)?;
        url.query_pairs_mut().append_pair("subject_id", &subject_id.to_string());
        tracing::debug!("Fetching PDF for subject_id: {}", subject_id);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("textbook for subject {subject_id}")));
        }

        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// URL of the backend proxy that re-serves a remote PDF
    pub fn proxy_url(&self, target: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(Self::PDF_PROXY_PATH)?;
        url.query_pairs_mut().append_pair("url", target);
        Ok(url)
    }

    /// Download a textbook through the proxy into `dest`, returning the byte count
    pub async fn download_pdf(&self, doc: &PdfDocument, dest: &Path) -> Result<u64, ApiError> {
        let url = self.proxy_url(&doc.url)?;
        tracing::info!("Downloading \"{}\" to {:?}", doc.title, dest);

        let response = check_status(self.client.get(url).send().await?).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        file.flush().await?;

        tracing::info!("Downloaded {} bytes", written);
        Ok(written)
    }

    /// Send a chat request and stream the reply through `tx`
    ///
    /// Use the cancellation token to interrupt the request.
    pub async fn send_chat(
        &self,
        request: ChatRequest,
        tx: mpsc::Sender<StreamEvent>,
        cancel_token: CancellationToken,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(Self::CHAT_PATH)?;
        tracing::debug!("Sending {} message(s) to {}", request.messages.len(), url);

        let send = self.client.post(url).json(&request).send();
        let response = tokio::select! {
            _ = cancel_token.cancelled() => return Err(ApiError::Cancelled),
            response = send => response?,
        };

        let response = check_status(response).await?;
        streaming::process_stream(response, tx, cancel_token).await
    }
}

/// Map non-success statuses to [`ApiError::ApiError`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    // The backend reports failures as {"error": "..."}
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or(body);

    tracing::warn!("Backend responded with {}: {}", status, message);
    Err(ApiError::ApiError { status: status.as_u16(), message })
}
