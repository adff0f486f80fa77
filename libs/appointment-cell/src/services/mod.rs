pub mod audio;
pub mod local;
pub mod remote;
pub mod schedule;
pub mod service;

pub use local::{LocalAppointmentRepository, APPOINTMENTS_KEY};
pub use remote::{AppointmentApi, HttpAppointmentApi};
pub use schedule::{merge, partition};
pub use service::AppointmentsService;
