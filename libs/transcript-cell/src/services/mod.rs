pub mod client;

pub use client::{TranscriptClient, TranscriptService};
