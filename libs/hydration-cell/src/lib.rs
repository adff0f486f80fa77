//! # Hydration Cell
//!
//! Local-first tracking of a single day's water intake.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                  Hydration Cell                     |
//! +-----------------------------------------------------+
//! |  models.rs       |  Records, API payloads, events   |
//! |  services/       |                                  |
//! |    cache.rs      |  Per-day cache in a LocalStore   |
//! |    goal.rs       |  Edge-triggered goal detection   |
//! |    recommendation.rs | AI daily water parsing       |
//! |    api.rs        |  Backend calls (trait + HTTP)    |
//! |    tracker.rs    |  State, debounced server sync    |
//! +-----------------------------------------------------+
//! ```
//!
//! The tracker adopts a same-day cache without touching the network, falls
//! back to the backend otherwise, and writes intake back after a quiet period
//! so that bursts of taps produce a single request.

pub mod models;
pub mod services;

pub use models::{
    AiStats, DailyStatistic, HydrationEvent, HydrationRecord, HydrationSnapshot, InitSource,
    WeeklyStatistic,
};

pub mod api {
    pub use crate::services::api::{HttpHydrationApi, HydrationApi};
    pub use crate::services::cache::HydrationCache;
    pub use crate::services::goal::GoalWatch;
    pub use crate::services::recommendation::parse_daily_water_ml;
    pub use crate::services::tracker::HydrationTracker;
}
