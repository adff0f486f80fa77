use futures::future::join_all;
use tracing::{debug, warn};

use shared_models::EntityId;
use transcript_cell::{RecordingQuery, TranscriptService};

use crate::models::{Appointment, ScheduledAppointment};

/// Builds the transcript lookup for a remote appointment with a known doctor.
pub fn recording_query(user_id: &EntityId, item: &ScheduledAppointment) -> Option<RecordingQuery> {
    match &item.appointment {
        Appointment::Remote(remote) => {
            let doctor = remote.doctor.as_ref()?;
            Some(RecordingQuery::new(
                user_id.clone(),
                doctor.id().clone(),
                remote.date.date_naive(),
            ))
        }
        Appointment::Local(_) => None,
    }
}

/// Asks the transcript service about every appointment at once. The result
/// lines up with `items`; anything that cannot be checked reads as false.
pub async fn probe_audio<T>(transcripts: &T, user_id: &EntityId, items: &[ScheduledAppointment]) -> Vec<bool>
where
    T: TranscriptService + ?Sized,
{
    let checks = items.iter().map(|item| async move {
        let Some(query) = recording_query(user_id, item) else {
            return false;
        };

        match transcripts.check_audio_availability(&query).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Audio check failed for appointment {}: {}", item.appointment.id(), e);
                false
            }
        }
    });

    let results = join_all(checks).await;
    debug!(
        "Audio available for {} of {} past appointments",
        results.iter().filter(|available| **available).count(),
        results.len()
    );
    results
}
