use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::ids::lenient_date_opt;

// ==============================================================================
// LOCAL RECORD
// ==============================================================================

/// One calendar day of intake as kept in the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationRecord {
    pub amount_ml: u32,
    pub goal_ml: u32,
    pub date: NaiveDate,
}

impl HydrationRecord {
    /// A cached record is only usable on the day it was written.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date == today
    }

    pub fn progress(&self) -> f64 {
        progress(self.amount_ml, self.goal_ml)
    }
}

pub(crate) fn progress(amount_ml: u32, goal_ml: u32) -> f64 {
    if goal_ml == 0 {
        return 0.0;
    }
    (amount_ml as f64 / goal_ml as f64).min(1.0)
}

pub fn liters_to_ml(liters: f64) -> Option<u32> {
    if !liters.is_finite() || liters < 0.0 {
        return None;
    }
    let ml = (liters * 1000.0).round();
    if ml > u32::MAX as f64 {
        return None;
    }
    Some(ml as u32)
}

pub fn ml_to_liters(amount_ml: u32) -> f64 {
    amount_ml as f64 / 1000.0
}

// ==============================================================================
// BACKEND PAYLOADS
// ==============================================================================

/// `GET /user/ai-stats`. Only the water recommendation is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiStats {
    #[serde(default)]
    pub daily_water: Option<Value>,
}

impl AiStats {
    /// The recommendation as free text; numbers are rendered as-is.
    pub fn daily_water_text(&self) -> Option<String> {
        match self.daily_water.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistic {
    #[serde(default, with = "lenient_date_opt")]
    pub date: Option<NaiveDate>,
    /// Liters.
    #[serde(default)]
    pub water: Option<f64>,
}

/// `POST /user/weekly-statistic` with no body. The backend answers either
/// with the whole week or with a single day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WeeklyStatistic {
    Days(Vec<DailyStatistic>),
    Single(DailyStatistic),
}

impl WeeklyStatistic {
    /// Liters recorded for `today`, if the response covers it.
    ///
    /// Dated entries are matched by date. An undated seven-entry week is
    /// indexed Monday first.
    pub fn water_for(&self, today: NaiveDate) -> Option<f64> {
        match self {
            WeeklyStatistic::Single(day) => match day.date {
                Some(date) if date != today => None,
                _ => day.water,
            },
            WeeklyStatistic::Days(days) => {
                if days.iter().any(|d| d.date.is_some()) {
                    days.iter()
                        .find(|d| d.date == Some(today))
                        .and_then(|d| d.water)
                } else if days.len() == 7 {
                    let index = today.weekday().num_days_from_monday() as usize;
                    days.get(index).and_then(|d| d.water)
                } else {
                    None
                }
            }
        }
    }
}

// ==============================================================================
// VIEW STATE
// ==============================================================================

/// Where the tracker's starting values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSource {
    Cache,
    Server,
    Defaults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydrationSnapshot {
    pub date: NaiveDate,
    pub amount_ml: u32,
    pub goal_ml: u32,
    pub loading: bool,
    pub celebrating: bool,
    pub splash_active: bool,
    pub saved_visible: bool,
    pub sync_pending: bool,
}

impl HydrationSnapshot {
    pub fn progress(&self) -> f64 {
        progress(self.amount_ml, self.goal_ml)
    }

    pub fn remaining_ml(&self) -> u32 {
        self.goal_ml.saturating_sub(self.amount_ml)
    }

    pub fn goal_reached(&self) -> bool {
        self.amount_ml >= self.goal_ml
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HydrationEvent {
    AmountChanged { amount_ml: u32, goal_ml: u32 },
    GoalReached { amount_ml: u32, goal_ml: u32 },
    SplashStarted,
    SplashEnded,
    Saved { amount_ml: u32 },
    SaveFailed,
    SavedIndicatorCleared,
}
