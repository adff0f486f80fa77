use chrono::NaiveDate;
use tracing::{debug, warn};

use shared_storage::{LocalStore, LocalStoreExt, StorageError};

use crate::models::HydrationRecord;

pub const AMOUNT_KEY: &str = "spark-life-hydration";
pub const GOAL_KEY: &str = "spark-life-hydration-goal";
pub const DATE_KEY: &str = "spark-life-hydration-date";

/// Today's hydration record in a [`LocalStore`], guarded by its date key.
pub struct HydrationCache<S> {
    store: S,
}

impl<S: LocalStore> HydrationCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cached record only when it was written for `today` and
    /// every field parses. Anything else counts as no cache.
    pub fn load(&self, today: NaiveDate) -> Option<HydrationRecord> {
        let date = match self.read(DATE_KEY)?.parse::<NaiveDate>() {
            Ok(date) => date,
            Err(e) => {
                warn!("Cached hydration date is malformed: {}", e);
                return None;
            }
        };

        let amount_ml = parse_ml(&self.read(AMOUNT_KEY)?)?;
        let goal_ml = parse_ml(&self.read(GOAL_KEY)?).filter(|goal| *goal > 0)?;
        let record = HydrationRecord {
            amount_ml,
            goal_ml,
            date,
        };

        if !record.is_current(today) {
            debug!("Hydration cache is from {}, discarding", date);
            return None;
        }
        Some(record)
    }

    pub fn save(&self, record: &HydrationRecord) -> Result<(), StorageError> {
        self.store.set_string(AMOUNT_KEY, &record.amount_ml.to_string())?;
        self.store.set_string(GOAL_KEY, &record.goal_ml.to_string())?;
        self.store
            .set_string(DATE_KEY, &record.date.format("%Y-%m-%d").to_string())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get_string(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} from local store: {}", key, e);
                None
            }
        }
    }
}

/// Accepts integer or fractional ml strings, rounding the latter.
fn parse_ml(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        warn!("Cached hydration value '{}' is out of range", raw);
        return None;
    }
    Some(value.round() as u32)
}
