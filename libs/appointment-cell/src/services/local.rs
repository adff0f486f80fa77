use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::EntityId;
use shared_storage::{LocalStore, LocalStoreExt, StorageError};

use crate::models::{AppointmentError, LocalAppointment, LocalStatus, NewLocalAppointment};

pub const APPOINTMENTS_KEY: &str = "appointments";

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]{7,20}$").expect("static pattern is valid"))
}

/// Local bookings, stored as one JSON array under [`APPOINTMENTS_KEY`].
pub struct LocalAppointmentRepository<S> {
    store: S,
}

impl<S: LocalStore> LocalAppointmentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Missing or unreadable data yields an empty list. Records that do not
    /// parse are skipped one by one, the rest are still returned.
    pub fn load(&self) -> Vec<LocalAppointment> {
        self.load_raw()
            .into_iter()
            .filter_map(|raw| match LocalAppointment::deserialize(&raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping unreadable local appointment: {}", e);
                    None
                }
            })
            .collect()
    }

    /// The stored array as is, so edits keep records this build cannot read.
    fn load_raw(&self) -> Vec<Value> {
        match self.store.get_json::<Vec<Value>>(APPOINTMENTS_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable local appointments: {}", e);
                Vec::new()
            }
        }
    }

    /// Replaces the whole list.
    pub fn save(&self, items: &[LocalAppointment]) -> Result<(), StorageError> {
        self.store.set_json(APPOINTMENTS_KEY, items)
    }

    pub fn book(
        &self,
        request: NewLocalAppointment,
        now: DateTime<Utc>,
    ) -> Result<LocalAppointment, AppointmentError> {
        validate(&request)?;

        let appointment = LocalAppointment {
            id: EntityId::new(Uuid::new_v4().to_string()),
            clinic_name: request.clinic_name.trim().to_string(),
            clinic_address: request.clinic_address.trim().to_string(),
            date: request.date,
            time: request.time,
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            status: LocalStatus::Pending,
            created_at: now,
        };

        let mut items = self.load_raw();
        items.push(serde_json::to_value(&appointment).map_err(StorageError::from)?);
        self.store.set_json(APPOINTMENTS_KEY, &items)?;

        info!("Booked local appointment {} at {}", appointment.id, appointment.clinic_name);
        Ok(appointment)
    }

    /// Removes the first record with `id`. Returns false, without touching
    /// the store, when there is none.
    pub fn cancel(&self, id: &EntityId) -> Result<bool, StorageError> {
        let mut items = self.load_raw();

        let Some(position) = items.iter().position(|raw| record_id(raw).as_ref() == Some(id)) else {
            debug!("No local appointment {} to cancel", id);
            return Ok(false);
        };

        items.remove(position);
        self.store.set_json(APPOINTMENTS_KEY, &items)?;

        info!("Cancelled local appointment {}", id);
        Ok(true)
    }
}

fn record_id(raw: &Value) -> Option<EntityId> {
    EntityId::deserialize(raw.get("id")?).ok()
}

fn validate(request: &NewLocalAppointment) -> Result<(), AppointmentError> {
    if request.clinic_name.trim().is_empty() {
        return Err(AppointmentError::ValidationError("Clinic name is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppointmentError::ValidationError("Patient name is required".to_string()));
    }
    if !phone_regex().is_match(request.phone.trim()) {
        return Err(AppointmentError::ValidationError(format!(
            "Invalid phone number: {}",
            request.phone
        )));
    }
    Ok(())
}
