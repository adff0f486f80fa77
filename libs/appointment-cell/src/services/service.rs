use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, instrument, warn};

use shared_models::EntityId;
use shared_storage::LocalStore;
use transcript_cell::{RecordingQuery, TranscriptService};

use crate::models::{
    Appointment, AppointmentError, AppointmentPartition, LocalAppointment, NewLocalAppointment,
    RemoteState, ScheduledAppointment,
};
use crate::services::audio::{probe_audio, recording_query};
use crate::services::local::LocalAppointmentRepository;
use crate::services::remote::AppointmentApi;
use crate::services::schedule::{merge, partition};

/// The patient's appointment list: server records plus local bookings.
pub struct AppointmentsService<S, A, T> {
    local: LocalAppointmentRepository<S>,
    api: A,
    transcripts: T,
    user_id: EntityId,
    remote: Mutex<RemoteState>,
}

impl<S, A, T> AppointmentsService<S, A, T>
where
    S: LocalStore,
    A: AppointmentApi,
    T: TranscriptService,
{
    pub fn new(store: S, api: A, transcripts: T, user_id: EntityId) -> Self {
        Self {
            local: LocalAppointmentRepository::new(store),
            api,
            transcripts,
            user_id,
            remote: Mutex::new(RemoteState::Loading),
        }
    }

    pub fn user_id(&self) -> &EntityId {
        &self.user_id
    }

    pub fn remote_state(&self) -> RemoteState {
        self.lock_remote().clone()
    }

    pub fn local_appointments(&self) -> Vec<LocalAppointment> {
        self.local.load()
    }

    /// Refetches the remote list. A failure is recorded in the state, not returned.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn refresh(&self) -> RemoteState {
        self.set_remote(RemoteState::Loading);

        let state = match self.api.list_for_user(&self.user_id).await {
            Ok(items) => RemoteState::Loaded(items),
            Err(e) => {
                warn!("Failed to load remote appointments: {}", e);
                RemoteState::Failed(e.user_message().to_string())
            }
        };

        self.set_remote(state.clone());
        state
    }

    /// Merged and partitioned view at `now`. Remote items appear only once loaded.
    pub fn view<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>) -> AppointmentPartition {
        let remote = self.remote_state().appointments().to_vec();
        partition(merge(remote, self.local.load(), tz), now)
    }

    pub fn book_local(
        &self,
        request: NewLocalAppointment,
        now: DateTime<Utc>,
    ) -> Result<LocalAppointment, AppointmentError> {
        self.local.book(request, now)
    }

    /// Local: drop the stored record. Remote: cancel on the server, then refetch.
    pub async fn cancel(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        match appointment {
            Appointment::Local(local) => {
                if !self.local.cancel(&local.id)? {
                    info!("Local appointment {} was already gone", local.id);
                }
                Ok(())
            }
            Appointment::Remote(remote) => {
                self.api.cancel(&remote.id).await?;
                self.refresh().await;
                Ok(())
            }
        }
    }

    pub async fn probe_audio(&self, past: &[ScheduledAppointment]) -> Vec<bool> {
        probe_audio(&self.transcripts, &self.user_id, past).await
    }

    pub async fn download_summary(&self, item: &ScheduledAppointment) -> Result<Vec<u8>, AppointmentError> {
        let query = self.query_for(item)?;
        Ok(self.transcripts.download_pdf_summary(&query).await?)
    }

    pub async fn download_recording(&self, item: &ScheduledAppointment) -> Result<Vec<u8>, AppointmentError> {
        let query = self.query_for(item)?;
        Ok(self.transcripts.download_audio_recording(&query).await?)
    }

    fn query_for(&self, item: &ScheduledAppointment) -> Result<RecordingQuery, AppointmentError> {
        recording_query(&self.user_id, item)
            .ok_or_else(|| AppointmentError::NoRecording(item.appointment.id().to_string()))
    }

    fn set_remote(&self, state: RemoteState) {
        *self.lock_remote() = state;
    }

    fn lock_remote(&self) -> MutexGuard<'_, RemoteState> {
        self.remote.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
