use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use shared_client::ApiClient;
use shared_config::AppConfig;
use shared_models::{AppError, EntityId};

use crate::models::{AppointmentList, RemoteAppointment};

/// Server-side appointments for the signed-in patient.
#[async_trait]
pub trait AppointmentApi: Send + Sync {
    /// GET /appointments/user/{user_id}
    async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<RemoteAppointment>, AppError>;

    /// PATCH /appointments/{id}/cancel
    async fn cancel(&self, appointment_id: &EntityId) -> Result<(), AppError>;
}

pub struct HttpAppointmentApi {
    client: ApiClient,
}

impl HttpAppointmentApi {
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
impl AppointmentApi for HttpAppointmentApi {
    async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<RemoteAppointment>, AppError> {
        let path = format!("/appointments/user/{}", urlencoding::encode(user_id.as_str()));
        let list: AppointmentList = self.client.request(Method::GET, &path, None).await?;
        let appointments = list.into_vec();

        debug!("Fetched {} remote appointments", appointments.len());
        Ok(appointments)
    }

    async fn cancel(&self, appointment_id: &EntityId) -> Result<(), AppError> {
        info!("Cancelling remote appointment {}", appointment_id);
        let path = format!(
            "/appointments/{}/cancel",
            urlencoding::encode(appointment_id.as_str())
        );
        self.client.request_unit(Method::PATCH, &path, None).await
    }
}

#[async_trait]
impl<T: AppointmentApi + ?Sized> AppointmentApi for std::sync::Arc<T> {
    async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<RemoteAppointment>, AppError> {
        (**self).list_for_user(user_id).await
    }

    async fn cancel(&self, appointment_id: &EntityId) -> Result<(), AppError> {
        (**self).cancel(appointment_id).await
    }
}
