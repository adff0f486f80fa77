use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hydration_cell::api::{HttpHydrationApi, HydrationApi, HydrationTracker};
use hydration_cell::{InitSource, WeeklyStatistic};
use shared_config::HydrationSettings;
use shared_models::AppError;
use shared_storage::MemoryStore;
use shared_utils::test_utils::{MockApiResponses, TestConfig, TestUser};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

async fn mount_profile(mock_server: &MockServer, daily_water: Option<&str>, water_today: f64) {
    let user = TestUser::default();

    Mock::given(method("GET"))
        .and(path("/user/me"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::current_user(&user)))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/ai-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::ai_stats(daily_water)))
        .mount(mock_server)
        .await;

    let yesterday = today().pred_opt().unwrap();
    Mock::given(method("POST"))
        .and(path("/user/weekly-statistic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::weekly_statistic(&[
            (yesterday, 2.0),
            (today(), water_today),
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_http_api_reads_profile_and_statistics() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, Some("2.5 литра"), 1.25).await;

    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let api = HttpHydrationApi::new(&config);

    let user = assert_ok!(api.current_user().await);
    assert!(user.email.is_some());

    let stats = assert_ok!(api.ai_stats().await);
    assert_eq!(stats.daily_water_text().as_deref(), Some("2.5 литра"));

    let week = assert_ok!(api.weekly_statistic().await);
    assert_matches!(week, WeeklyStatistic::Days(ref days) if days.len() == 2);
    assert_eq!(week.water_for(today()), Some(1.25));
}

#[tokio::test]
async fn test_http_api_records_liters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/weekly-statistic"))
        .and(body_json(json!({ "water": 0.75 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let api = HttpHydrationApi::new(&config);

    assert_ok!(api.record_water(0.75).await);
}

#[tokio::test]
async fn test_http_api_surfaces_auth_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let api = HttpHydrationApi::new(&config);

    assert_matches!(api.current_user().await, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn test_tracker_initializes_and_syncs_over_http() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, Some("2 литра"), 0.5).await;

    Mock::given(method("POST"))
        .and(path("/user/weekly-statistic"))
        .and(body_json(json!({ "water": 1.0 })))
        .respond_with(ResponseTemplate::new(204))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let settings = HydrationSettings {
        sync_debounce: Duration::from_millis(100),
        saved_indicator: Duration::from_millis(100),
        splash: Duration::from_millis(10),
        ..HydrationSettings::default()
    };
    let tracker = HydrationTracker::new(
        Arc::new(MemoryStore::new()),
        HttpHydrationApi::new(&config),
        settings,
        today(),
    );

    assert_eq!(tracker.initialize().await, InitSource::Server);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.amount_ml, 500);
    assert_eq!(snapshot.goal_ml, 2000);

    tracker.add_water();
    tracker.add_water();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(tracker.snapshot().amount_ml, 1000);
    assert!(!tracker.sync_pending());
}
