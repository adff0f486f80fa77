use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub transcript_service_url: String,
    pub local_store_path: PathBuf,
    pub hydration: HydrationSettings,
}

/// Tunables for the hydration tracker. Durations are wall-clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationSettings {
    pub default_goal_ml: u32,
    pub step_ml: u32,
    pub sync_debounce: Duration,
    pub saved_indicator: Duration,
    pub splash: Duration,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            default_goal_ml: 2500,
            step_ml: 250,
            sync_debounce: Duration::from_secs(5),
            saved_indicator: Duration::from_secs(3),
            splash: Duration::from_millis(1000),
        }
    }
}

impl HydrationSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_goal_ml: parse_var("HYDRATION_DEFAULT_GOAL_ML")
                .filter(|goal| *goal > 0)
                .unwrap_or(defaults.default_goal_ml),
            step_ml: parse_var("HYDRATION_STEP_ML")
                .filter(|step| *step > 0)
                .unwrap_or(defaults.step_ml),
            sync_debounce: parse_var("HYDRATION_SYNC_DEBOUNCE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.sync_debounce),
            saved_indicator: parse_var("HYDRATION_SAVED_INDICATOR_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.saved_indicator),
            splash: parse_var("HYDRATION_SPLASH_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.splash),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("SPARK_API_URL")
                .unwrap_or_else(|_| {
                    warn!("SPARK_API_URL not set, using empty value");
                    String::new()
                }),
            api_token: env::var("SPARK_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("SPARK_API_TOKEN not set, requests will be unauthenticated");
                    String::new()
                }),
            transcript_service_url: env::var("TRANSCRIPT_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("TRANSCRIPT_SERVICE_URL not set, using empty value");
                    String::new()
                }),
            local_store_path: env::var("SPARK_LOCAL_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".spark-life/store.json")),
            hydration: HydrationSettings::from_env(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty() && !self.api_token.is_empty()
    }

    pub fn is_transcript_service_configured(&self) -> bool {
        !self.transcript_service_url.is_empty()
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} has an invalid value '{}', using default", key, raw);
            None
        }
    }
}
