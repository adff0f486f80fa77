use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{
    Appointment, AppointmentError, AppointmentsService, HttpAppointmentApi, NewLocalAppointment,
    RemoteState,
};
use shared_models::{AppError, EntityId};
use shared_storage::FileStore;
use shared_utils::test_utils::{MockApiResponses, TestConfig};
use transcript_cell::{RecordingQuery, TranscriptError, TranscriptService};

const USER_ID: &str = "17";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

fn almaty() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600).unwrap()
}

/// Doctor 42 has recordings, doctor 99 makes the service fail.
#[derive(Default)]
struct FakeTranscripts {
    queries: Mutex<Vec<RecordingQuery>>,
}

#[async_trait]
impl TranscriptService for FakeTranscripts {
    async fn check_audio_availability(&self, query: &RecordingQuery) -> Result<bool, TranscriptError> {
        self.queries.lock().unwrap().push(query.clone());
        match query.doctor_id.as_str() {
            "42" => Ok(true),
            "99" => Err(TranscriptError::Api(AppError::Internal("boom".into()))),
            _ => Ok(false),
        }
    }

    async fn download_pdf_summary(&self, _query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        Ok(b"%PDF-1.7".to_vec())
    }

    async fn download_audio_recording(&self, _query: &RecordingQuery) -> Result<Vec<u8>, TranscriptError> {
        Err(TranscriptError::NotFound)
    }

    async fn get_latest_pdf_url(&self) -> Result<String, TranscriptError> {
        Ok("https://files.example.com/latest.pdf".to_string())
    }
}

type Service = AppointmentsService<Arc<FileStore>, HttpAppointmentApi, Arc<FakeTranscripts>>;

struct TestSetup {
    mock_server: MockServer,
    _dir: TempDir,
    store: Arc<FileStore>,
    transcripts: Arc<FakeTranscripts>,
    service: Service,
}

impl TestSetup {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path().join("store.json")).unwrap());
        let transcripts = Arc::new(FakeTranscripts::default());

        let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
        let service = AppointmentsService::new(
            store.clone(),
            HttpAppointmentApi::new(&config),
            transcripts.clone(),
            EntityId::from(USER_ID),
        );

        Self {
            mock_server,
            _dir: dir,
            store,
            transcripts,
            service,
        }
    }

    async fn mount_remote_list(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/appointments/user/{}", USER_ID)))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    fn book(&self, clinic: &str, date: NaiveDate, time: NaiveTime) -> EntityId {
        let request = NewLocalAppointment {
            clinic_name: clinic.to_string(),
            clinic_address: "Abay ave 10".to_string(),
            date,
            time,
            name: "Anna".to_string(),
            phone: "+7 701 000 0000".to_string(),
        };
        self.service.book_local(request, now()).unwrap().id
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

#[tokio::test]
async fn test_view_before_remote_load_shows_local_only() {
    let setup = TestSetup::new().await;
    setup.book("Spark Clinic", date(21), time(10));

    assert!(setup.service.remote_state().is_loading());

    let view = setup.service.view(&almaty(), now());
    assert_eq!(view.upcoming.len(), 1);
    assert!(view.past.is_empty());
}

#[tokio::test]
async fn test_merged_view_is_partitioned() {
    let setup = TestSetup::new().await;
    setup
        .mount_remote_list(json!([
            MockApiResponses::remote_appointment(1, now() - Duration::days(3), 42),
            MockApiResponses::remote_appointment(2, now() + Duration::days(2), 42),
            MockApiResponses::remote_appointment(3, now() - Duration::hours(1), 7),
        ]))
        .await;

    // 15:00 at +05:00 on the 19th is 10:00 UTC, two hours before now.
    setup.book("Morning Clinic", date(19), time(15));
    // 18:00 at +05:00 on the 19th is 13:00 UTC.
    setup.book("Evening Clinic", date(19), time(18));

    assert_matches!(setup.service.refresh().await, RemoteState::Loaded(ref items) if items.len() == 3);

    let view = setup.service.view(&almaty(), now());

    let upcoming: Vec<_> = view.upcoming.iter().map(|item| item.appointment.title()).collect();
    assert_eq!(upcoming, vec!["Evening Clinic".to_string(), "Dr. Aigerim Sadykova".to_string()]);

    let past: Vec<_> = view.past.iter().map(|item| item.appointment.id().to_string()).collect();
    assert_eq!(past.len(), 3);
    assert_eq!(past[0], "3");
    assert_eq!(past[2], "1");
    assert!(view.past[1].appointment.is_local());
}

#[tokio::test]
async fn test_remote_failure_keeps_local_appointments() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path(format!("/appointments/user/{}", USER_ID)))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is down"))
        .mount(&setup.mock_server)
        .await;

    setup.book("Spark Clinic", date(25), time(9));

    assert_matches!(setup.service.refresh().await, RemoteState::Failed(_));
    assert_eq!(setup.service.view(&almaty(), now()).len(), 1);
}

#[tokio::test]
async fn test_wrapped_list_response() {
    let setup = TestSetup::new().await;
    setup
        .mount_remote_list(json!({
            "appointments": [MockApiResponses::remote_appointment(8, now() + Duration::days(1), 42)]
        }))
        .await;

    setup.service.refresh().await;
    assert_eq!(setup.service.view(&Utc, now()).upcoming.len(), 1);
}

#[tokio::test]
async fn test_cancel_remote_refetches() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path(format!("/appointments/user/{}", USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockApiResponses::remote_appointment(5, now() + Duration::days(1), 42)
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/appointments/user/{}", USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/appointments/5/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "cancelled" })))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    setup.service.refresh().await;
    let view = setup.service.view(&Utc, now());
    let target = view.upcoming[0].appointment.clone();
    assert_matches!(target, Appointment::Remote(_));

    setup.service.cancel(&target).await.unwrap();

    assert_eq!(setup.service.remote_state(), RemoteState::Loaded(Vec::new()));
    assert!(setup.service.view(&Utc, now()).is_empty());
}

#[tokio::test]
async fn test_cancel_remote_failure_is_returned() {
    let setup = TestSetup::new().await;
    setup
        .mount_remote_list(json!([MockApiResponses::remote_appointment(5, now() + Duration::days(1), 42)]))
        .await;

    Mock::given(method("PATCH"))
        .and(path("/appointments/5/cancel"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already started"))
        .mount(&setup.mock_server)
        .await;

    setup.service.refresh().await;
    let target = setup.service.view(&Utc, now()).upcoming[0].appointment.clone();

    assert_matches!(
        setup.service.cancel(&target).await,
        Err(AppointmentError::Api(AppError::Conflict(_)))
    );
}

#[tokio::test]
async fn test_cancel_local_rewrites_store() {
    let setup = TestSetup::new().await;
    let keep = setup.book("Keep Clinic", date(22), time(9));
    let dropped = setup.book("Drop Clinic", date(23), time(9));

    let view = setup.service.view(&almaty(), now());
    let target = view
        .upcoming
        .iter()
        .find(|item| item.appointment.id() == &dropped)
        .map(|item| item.appointment.clone())
        .unwrap();

    setup.service.cancel(&target).await.unwrap();
    // A second cancel of the same record is harmless.
    setup.service.cancel(&target).await.unwrap();

    let reopened = FileStore::open(setup.store.path()).unwrap();
    let remaining = appointment_cell::LocalAppointmentRepository::new(reopened).load();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);
}

#[tokio::test]
async fn test_audio_probe_defaults_to_unavailable() {
    let setup = TestSetup::new().await;
    setup
        .mount_remote_list(json!([
            MockApiResponses::remote_appointment(1, now() - Duration::days(1), 42),
            MockApiResponses::remote_appointment(2, now() - Duration::days(2), 99),
            MockApiResponses::remote_appointment(3, now() - Duration::days(3), 7),
        ]))
        .await;
    setup.book("Spark Clinic", date(10), time(9));

    setup.service.refresh().await;
    let view = setup.service.view(&almaty(), now());
    assert_eq!(view.past.len(), 4);

    let available = setup.service.probe_audio(&view.past).await;
    assert_eq!(available, vec![true, false, false, false]);

    let queries = setup.transcripts.queries.lock().unwrap();
    assert_eq!(queries.len(), 3, "local appointments are never probed");
    assert!(queries.iter().all(|query| query.user_id.as_str() == USER_ID));
    assert_eq!(queries[0].date, date(18));
}

#[tokio::test]
async fn test_downloads_need_a_remote_appointment() {
    let setup = TestSetup::new().await;
    setup
        .mount_remote_list(json!([MockApiResponses::remote_appointment(1, now() - Duration::days(1), 42)]))
        .await;
    setup.book("Spark Clinic", date(10), time(9));

    setup.service.refresh().await;
    let view = setup.service.view(&almaty(), now());

    let remote = &view.past[0];
    let local = &view.past[1];

    assert!(setup.service.download_summary(remote).await.unwrap().starts_with(b"%PDF"));
    assert_matches!(
        setup.service.download_recording(remote).await,
        Err(AppointmentError::Transcript(TranscriptError::NotFound))
    );
    assert_matches!(
        setup.service.download_summary(local).await,
        Err(AppointmentError::NoRecording(_))
    );
}
