use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use shared_models::ids::{lenient_date, lenient_datetime};
use shared_models::{AppError, EntityId};
use shared_storage::StorageError;
use transcript_cell::TranscriptError;

// ==============================================================================
// REMOTE APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: EntityId,
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
    #[serde(default, alias = "specialization")]
    pub specialty: Option<String>,
}

/// The backend sends the doctor either embedded or as a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DoctorRef {
    Profile(DoctorProfile),
    Id(EntityId),
}

impl DoctorRef {
    pub fn id(&self) -> &EntityId {
        match self {
            DoctorRef::Profile(profile) => &profile.id,
            DoctorRef::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DoctorRef::Profile(profile) => profile.name.as_deref(),
            DoctorRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAppointment {
    pub id: EntityId,
    #[serde(with = "lenient_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub doctor: Option<DoctorRef>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /appointments/user/{id}` answers with a bare array or a wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AppointmentList {
    Plain(Vec<RemoteAppointment>),
    Wrapped { appointments: Vec<RemoteAppointment> },
}

impl AppointmentList {
    pub fn into_vec(self) -> Vec<RemoteAppointment> {
        match self {
            AppointmentList::Plain(items) => items,
            AppointmentList::Wrapped { appointments } => appointments,
        }
    }
}

/// Lifecycle of the remote list query.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteState {
    Loading,
    Loaded(Vec<RemoteAppointment>),
    Failed(String),
}

impl RemoteState {
    /// What the merged view shows: the list when loaded, nothing otherwise.
    pub fn appointments(&self) -> &[RemoteAppointment] {
        match self {
            RemoteState::Loaded(items) => items,
            RemoteState::Loading | RemoteState::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RemoteState::Loading)
    }
}

// ==============================================================================
// LOCAL APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for LocalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalStatus::Pending => write!(f, "pending"),
            LocalStatus::Confirmed => write!(f, "confirmed"),
            LocalStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A clinic visit booked on this device and kept only in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAppointment {
    pub id: EntityId,
    pub clinic_name: String,
    #[serde(default)]
    pub clinic_address: String,
    #[serde(with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: LocalStatus,
    #[serde(with = "lenient_datetime", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl LocalAppointment {
    /// Combines `date` and `time` as wall-clock time in `tz`.
    pub fn datetime_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        let naive = self.date.and_time(self.time);
        match tz.from_local_datetime(&naive).earliest() {
            Some(local) => local.with_timezone(&Utc),
            None => {
                warn!("Local appointment {} falls into a clock gap, reading it as UTC", self.id);
                naive.and_utc()
            }
        }
    }
}

/// Input for booking a local appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocalAppointment {
    pub clinic_name: String,
    pub clinic_address: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    pub name: String,
    pub phone: String,
}

/// `HH:MM` wall-clock times, as the booking form writes them.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| de::Error::custom(format!("invalid time: {}", raw)))
    }
}

// ==============================================================================
// MERGED VIEW
// ==============================================================================

/// Where an appointment came from. Cancellation is routed on this.
#[derive(Debug, Clone, PartialEq)]
pub enum Appointment {
    Remote(RemoteAppointment),
    Local(LocalAppointment),
}

impl Appointment {
    pub fn id(&self) -> &EntityId {
        match self {
            Appointment::Remote(remote) => &remote.id,
            Appointment::Local(local) => &local.id,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Appointment::Local(_))
    }

    /// Local bookings carry no doctor.
    pub fn doctor_id(&self) -> Option<&EntityId> {
        match self {
            Appointment::Remote(remote) => remote.doctor.as_ref().map(DoctorRef::id),
            Appointment::Local(_) => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Appointment::Remote(remote) => remote
                .doctor
                .as_ref()
                .and_then(DoctorRef::name)
                .map(str::to_string)
                .or_else(|| remote.description.clone())
                .unwrap_or_else(|| format!("Appointment {}", remote.id)),
            Appointment::Local(local) => local.clinic_name.clone(),
        }
    }
}

/// An appointment with its resolved point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAppointment {
    pub datetime: DateTime<Utc>,
    pub appointment: Appointment,
}

impl ScheduledAppointment {
    pub fn remote(appointment: RemoteAppointment) -> Self {
        Self {
            datetime: appointment.date,
            appointment: Appointment::Remote(appointment),
        }
    }

    pub fn local<Tz: TimeZone>(appointment: LocalAppointment, tz: &Tz) -> Self {
        Self {
            datetime: appointment.datetime_in(tz),
            appointment: Appointment::Local(appointment),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPartition {
    /// Soonest first.
    pub upcoming: Vec<ScheduledAppointment>,
    /// Most recent first.
    pub past: Vec<ScheduledAppointment>,
}

impl AppointmentPartition {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Appointment has no recording: {0}")]
    NoRecording(String),

    #[error("Local store error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Api(#[from] AppError),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),
}
