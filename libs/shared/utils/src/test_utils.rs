use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, HydrationSettings};

pub struct TestConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub transcript_service_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: "test-token".to_string(),
            transcript_service_url: "http://localhost:8001".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both the backend and the transcript service at one mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            api_base_url: uri.to_string(),
            transcript_service_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            api_token: self.api_token.clone(),
            transcript_service_url: self.transcript_service_url.clone(),
            local_store_path: PathBuf::from("target/test-store.json"),
            hydration: HydrationSettings::default(),
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::patient("patient@example.com")
    }
}

impl TestUser {
    pub fn patient(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: "Test Patient".to_string(),
        }
    }
}

pub struct MockApiResponses;

impl MockApiResponses {
    pub fn current_user(user: &TestUser) -> Value {
        json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.name,
        })
    }

    pub fn ai_stats(daily_water: Option<&str>) -> Value {
        match daily_water {
            Some(text) => json!({
                "daily_water": text,
                "daily_sleep": "7-8 часов",
            }),
            None => json!({ "daily_sleep": "7-8 часов" }),
        }
    }

    pub fn weekly_statistic(days: &[(NaiveDate, f64)]) -> Value {
        Value::Array(
            days.iter()
                .map(|(date, water)| {
                    json!({
                        "date": date.format("%Y-%m-%d").to_string(),
                        "water": water,
                        "sleep": 7.5,
                    })
                })
                .collect(),
        )
    }

    pub fn remote_appointment(id: i64, date: DateTime<Utc>, doctor_id: i64) -> Value {
        json!({
            "id": id,
            "date": date.to_rfc3339(),
            "doctor": {
                "id": doctor_id,
                "name": "Dr. Aigerim Sadykova",
                "specialty": "Therapist",
            },
            "location": "Spark Clinic, room 12",
            "description": "Follow-up consultation",
        })
    }

    pub fn audio_exists(exists: bool) -> Value {
        json!({ "exists": exists })
    }
}
