//! # Transcript Cell
//!
//! Client for the consultation transcript service. Recordings and PDF
//! summaries are looked up by patient, doctor and consultation date.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                  Transcript Cell                    |
//! +-----------------------------------------------------+
//! |  models.rs      |  Query, responses & errors        |
//! |  services/      |                                   |
//! |    client.rs    |  TranscriptService + HTTP client  |
//! +-----------------------------------------------------+
//! ```
//!
//! ## Endpoints
//!
//! - `GET /transcripts/audio/exists` - whether a recording exists
//! - `GET /transcripts/audio` - recording bytes
//! - `GET /transcripts/summary/pdf` - PDF summary bytes
//! - `GET /transcripts/summary/latest` - URL of the newest summary
//!
//! The base URL comes from `TRANSCRIPT_SERVICE_URL`.

pub mod models;
pub mod services;

pub use models::{RecordingQuery, TranscriptError};
pub use services::{TranscriptClient, TranscriptService};
