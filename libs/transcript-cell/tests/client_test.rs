use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_models::{AppError, EntityId};
use shared_utils::test_utils::{MockApiResponses, TestConfig};
use transcript_cell::{RecordingQuery, TranscriptClient, TranscriptError, TranscriptService};

fn query() -> RecordingQuery {
    RecordingQuery::new(
        EntityId::from("17"),
        EntityId::from("42"),
        NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
    )
}

async fn client_for(mock_server: &MockServer) -> TranscriptClient {
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    TranscriptClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_check_audio_availability_sends_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/audio/exists"))
        .and(query_param("user_id", "17"))
        .and(query_param("doctor_id", "42"))
        .and(query_param("date", "2026-10-05"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::audio_exists(true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(assert_ok!(client.check_audio_availability(&query()).await));
}

#[tokio::test]
async fn test_missing_exists_field_means_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/audio/exists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(!assert_ok!(client.check_audio_availability(&query()).await));
}

#[tokio::test]
async fn test_downloads_return_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/summary/pdf"))
        .and(query_param("doctor_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transcripts/audio"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x49, 0x44, 0x33]))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let pdf = assert_ok!(client.download_pdf_summary(&query()).await);
    assert!(pdf.starts_with(b"%PDF"));

    let audio = assert_ok!(client.download_audio_recording(&query()).await);
    assert_eq!(audio.len(), 3);
}

#[tokio::test]
async fn test_download_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/summary/pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no summary"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transcripts/audio"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    assert_matches!(
        client.download_pdf_summary(&query()).await,
        Err(TranscriptError::NotFound)
    );
    assert_matches!(
        client.download_audio_recording(&query()).await,
        Err(TranscriptError::EmptyFile)
    );
}

#[tokio::test]
async fn test_latest_pdf_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/summary/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://files.example.com/summary-17.pdf"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert_eq!(
        assert_ok!(client.get_latest_pdf_url().await),
        "https://files.example.com/summary-17.pdf"
    );
}

#[tokio::test]
async fn test_server_errors_are_wrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transcripts/summary/latest"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert_matches!(
        client.get_latest_pdf_url().await,
        Err(TranscriptError::Api(AppError::ExternalService { status: 503, .. }))
    );
}

#[test]
fn test_unconfigured_service_is_rejected() {
    let config = AppConfig {
        transcript_service_url: String::new(),
        ..TestConfig::default().to_app_config()
    };
    assert_matches!(TranscriptClient::new(&config).err(), Some(TranscriptError::NotConfigured));
}

#[tokio::test]
async fn test_missing_service_reports_not_configured() {
    let service: Option<TranscriptClient> = None;
    assert_matches!(
        service.check_audio_availability(&query()).await,
        Err(TranscriptError::NotConfigured)
    );
    assert_matches!(service.get_latest_pdf_url().await, Err(TranscriptError::NotConfigured));
}
