use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, instrument};

use shared_client::ApiClient;
use shared_config::AppConfig;

use crate::models::{AudioExistsResponse, LatestSummaryResponse, RecordingQuery, TranscriptError};

/// Operations the companion needs from the transcript service.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// GET /transcripts/audio/exists
    async fn check_audio_availability(&self, query: &RecordingQuery) -> Result<bool, TranscriptError>;

    /// GET /transcripts/summary/pdf
    async fn download_pdf_summary(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError>;

    /// GET /transcripts/audio
    async fn download_audio_recording(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError>;

    /// GET /transcripts/summary/latest
    async fn get_latest_pdf_url(&self) -> Result<String, TranscriptError>;
}

pub struct TranscriptClient {
    client: ApiClient,
}

impl TranscriptClient {
    pub fn new(config: &AppConfig) -> Result<Self, TranscriptError> {
        if !config.is_transcript_service_configured() {
            return Err(TranscriptError::NotConfigured);
        }

        Ok(Self {
            client: ApiClient::with_base_url(
                &config.transcript_service_url,
                Some(config.api_token.as_str()),
            ),
        })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    async fn download(&self, path: &str, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        let path = format!("{}?{}", path, query.to_query_string());
        let bytes = self.client.request_bytes(Method::GET, &path).await?;

        if bytes.is_empty() {
            return Err(TranscriptError::EmptyFile);
        }

        debug!("Downloaded {} bytes from {}", bytes.len(), path);
        Ok(bytes)
    }
}

#[async_trait]
impl TranscriptService for TranscriptClient {
    #[instrument(skip(self), fields(doctor_id = %query.doctor_id, date = %query.date))]
    async fn check_audio_availability(&self, query: &RecordingQuery) -> Result<bool, TranscriptError> {
        let path = format!("/transcripts/audio/exists?{}", query.to_query_string());
        let response: AudioExistsResponse = self.client.request(Method::GET, &path, None).await?;

        debug!("Audio available: {}", response.exists);
        Ok(response.exists)
    }

    async fn download_pdf_summary(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        info!("Downloading PDF summary for {} on {}", query.doctor_id, query.date);
        self.download("/transcripts/summary/pdf", query).await
    }

    async fn download_audio_recording(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        info!("Downloading audio recording for {} on {}", query.doctor_id, query.date);
        self.download("/transcripts/audio", query).await
    }

    async fn get_latest_pdf_url(&self) -> Result<String, TranscriptError> {
        let response: LatestSummaryResponse = self
            .client
            .request(Method::GET, "/transcripts/summary/latest", None)
            .await?;

        if response.url.is_empty() {
            return Err(TranscriptError::NotFound);
        }
        Ok(response.url)
    }
}

#[async_trait]
impl<T: TranscriptService + ?Sized> TranscriptService for std::sync::Arc<T> {
    async fn check_audio_availability(&self, query: &RecordingQuery) -> Result<bool, TranscriptError> {
        (**self).check_audio_availability(query).await
    }

    async fn download_pdf_summary(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        (**self).download_pdf_summary(query).await
    }

    async fn download_audio_recording(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        (**self).download_audio_recording(query).await
    }

    async fn get_latest_pdf_url(&self) -> Result<String, TranscriptError> {
        (**self).get_latest_pdf_url().await
    }
}

/// An absent service answers every call with [`TranscriptError::NotConfigured`].
#[async_trait]
impl<T: TranscriptService> TranscriptService for Option<T> {
    async fn check_audio_availability(&self, query: &RecordingQuery) -> Result<bool, TranscriptError> {
        match self {
            Some(service) => service.check_audio_availability(query).await,
            None => Err(TranscriptError::NotConfigured),
        }
    }

    async fn download_pdf_summary(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        match self {
            Some(service) => service.download_pdf_summary(query).await,
            None => Err(TranscriptError::NotConfigured),
        }
    }

    async fn download_audio_recording(&self, query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        match self {
            Some(service) => service.download_audio_recording(query).await,
            None => Err(TranscriptError::NotConfigured),
        }
    }

    async fn get_latest_pdf_url(&self) -> Result<String, TranscriptError> {
        match self {
            Some(service) => service.get_latest_pdf_url().await,
            None => Err(TranscriptError::NotConfigured),
        }
    }
}
