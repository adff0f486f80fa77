use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_client::ApiClient;
use shared_config::AppConfig;
use shared_models::{AppError, CurrentUser};

use crate::models::{AiStats, WeeklyStatistic};

/// Backend calls the hydration tracker depends on.
#[async_trait]
pub trait HydrationApi: Send + Sync {
    /// `GET /user/me`
    async fn current_user(&self) -> Result<CurrentUser, AppError>;

    /// `GET /user/ai-stats`
    async fn ai_stats(&self) -> Result<AiStats, AppError>;

    /// `POST /user/weekly-statistic` without a body.
    async fn weekly_statistic(&self) -> Result<WeeklyStatistic, AppError>;

    /// `POST /user/weekly-statistic` with `{ "water": liters }`.
    async fn record_water(&self, liters: f64) -> Result<(), AppError>;
}

pub struct HttpHydrationApi {
    client: ApiClient,
}

impl HttpHydrationApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ApiClient::new(config),
        }
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HydrationApi for HttpHydrationApi {
    async fn current_user(&self) -> Result<CurrentUser, AppError> {
        self.client.request(Method::GET, "/user/me", None).await
    }

    async fn ai_stats(&self) -> Result<AiStats, AppError> {
        self.client.request(Method::GET, "/user/ai-stats", None).await
    }

    async fn weekly_statistic(&self) -> Result<WeeklyStatistic, AppError> {
        self.client
            .request(Method::POST, "/user/weekly-statistic", None)
            .await
    }

    async fn record_water(&self, liters: f64) -> Result<(), AppError> {
        debug!("Recording {} l of water", liters);
        self.client
            .request_unit(
                Method::POST,
                "/user/weekly-statistic",
                Some(json!({ "water": liters })),
            )
            .await
    }
}

#[async_trait]
impl<T: HydrationApi + ?Sized> HydrationApi for std::sync::Arc<T> {
    async fn current_user(&self) -> Result<CurrentUser, AppError> {
        (**self).current_user().await
    }

    async fn ai_stats(&self) -> Result<AiStats, AppError> {
        (**self).ai_stats().await
    }

    async fn weekly_statistic(&self) -> Result<WeeklyStatistic, AppError> {
        (**self).weekly_statistic().await
    }

    async fn record_water(&self, liters: f64) -> Result<(), AppError> {
        (**self).record_water(liters).await
    }
}
