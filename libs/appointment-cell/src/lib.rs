//! # Appointment Cell
//!
//! One list of the patient's appointments, merged from two places: the
//! backend (booked through the clinic) and the local store (booked on this
//! device). Provenance is kept as [`Appointment::Remote`] or
//! [`Appointment::Local`] so that cancellation goes to the right place.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                 Appointment Cell                    |
//! +-----------------------------------------------------+
//! |  models.rs      |  Remote, local & merged records   |
//! |  services/      |                                   |
//! |    local.rs     |  "appointments" store key         |
//! |    remote.rs    |  Backend list & cancel            |
//! |    schedule.rs  |  Merge & upcoming/past split      |
//! |    audio.rs     |  Recording availability probe     |
//! |    service.rs   |  AppointmentsService              |
//! +-----------------------------------------------------+
//! ```

pub mod models;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentPartition, DoctorRef, LocalAppointment, LocalStatus,
    NewLocalAppointment, RemoteAppointment, RemoteState, ScheduledAppointment,
};

pub use services::{
    AppointmentApi, AppointmentsService, HttpAppointmentApi, LocalAppointmentRepository,
};
