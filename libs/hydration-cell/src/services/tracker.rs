use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use shared_config::HydrationSettings;
use shared_storage::LocalStore;
use shared_utils::Debouncer;

use crate::models::{
    liters_to_ml, ml_to_liters, HydrationEvent, HydrationRecord, HydrationSnapshot, InitSource,
};
use crate::services::api::HydrationApi;
use crate::services::cache::HydrationCache;
use crate::services::goal::GoalWatch;
use crate::services::recommendation::parse_daily_water_ml;

const EVENT_CAPACITY: usize = 64;

/// Local-first hydration state for one day.
///
/// Every mutation is written to the local cache synchronously. Writes to the
/// backend are debounced: a change arms a single-slot timer and only the
/// amount current at expiry is posted. Cloning yields another handle to the
/// same tracker; timers are cleared by [`shutdown`](Self::shutdown) or when
/// the last handle is dropped.
///
/// Mutating methods spawn timers and must be called inside a tokio runtime.
pub struct HydrationTracker<S, A> {
    inner: Arc<Inner<S, A>>,
}

impl<S, A> Clone for HydrationTracker<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<S, A> {
    cache: HydrationCache<S>,
    api: A,
    settings: HydrationSettings,
    state: Mutex<TrackerState>,
    sync_timer: Debouncer,
    saved_timer: Debouncer,
    splash_timer: Debouncer,
    events: broadcast::Sender<HydrationEvent>,
}

#[derive(Debug)]
struct TrackerState {
    date: NaiveDate,
    amount_ml: u32,
    goal_ml: u32,
    last_sent_ml: Option<u32>,
    goal_watch: GoalWatch,
    celebrating: bool,
    splash_active: bool,
    saved_visible: bool,
    loading: bool,
    // Bumped on every user mutation; lets initialization detect local edits.
    revision: u64,
}

impl TrackerState {
    fn record(&self) -> HydrationRecord {
        HydrationRecord {
            amount_ml: self.amount_ml,
            goal_ml: self.goal_ml,
            date: self.date,
        }
    }
}

struct RemoteSeed {
    goal_ml: Option<u32>,
    amount_ml: Option<u32>,
}

impl<S, A> HydrationTracker<S, A>
where
    S: LocalStore + 'static,
    A: HydrationApi + 'static,
{
    pub fn new(store: S, api: A, settings: HydrationSettings, today: NaiveDate) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = TrackerState {
            date: today,
            amount_ml: 0,
            goal_ml: settings.default_goal_ml,
            last_sent_ml: None,
            goal_watch: GoalWatch::new(),
            celebrating: false,
            splash_active: false,
            saved_visible: false,
            loading: false,
            revision: 0,
        };

        Self {
            inner: Arc::new(Inner {
                cache: HydrationCache::new(store),
                api,
                settings,
                state: Mutex::new(state),
                sync_timer: Debouncer::new("hydration-sync"),
                saved_timer: Debouncer::new("hydration-saved"),
                splash_timer: Debouncer::new("hydration-splash"),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HydrationEvent> {
        self.inner.events.subscribe()
    }

    pub fn settings(&self) -> &HydrationSettings {
        &self.inner.settings
    }

    pub fn snapshot(&self) -> HydrationSnapshot {
        self.inner.snapshot()
    }

    /// Loads today's starting values: the cache when it is from today,
    /// otherwise the backend. Backend failures are logged and leave defaults.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> InitSource {
        let inner = &self.inner;
        let (today, start_revision) = {
            let mut state = inner.lock();
            state.loading = true;
            (state.date, state.revision)
        };

        if let Some(record) = inner.cache.load(today) {
            debug!("Using cached hydration: {} / {} ml", record.amount_ml, record.goal_ml);
            {
                let mut state = inner.lock();
                state.amount_ml = record.amount_ml;
                state.goal_ml = record.goal_ml;
                state.goal_watch.prime(record.amount_ml, record.goal_ml);
                state.loading = false;
            }
            inner.emit(HydrationEvent::AmountChanged {
                amount_ml: record.amount_ml,
                goal_ml: record.goal_ml,
            });
            inner.schedule_sync();
            return InitSource::Cache;
        }

        let Some(seed) = inner.fetch_remote(today).await else {
            inner.lock().loading = false;
            return InitSource::Defaults;
        };

        let (amount_ml, goal_ml) = {
            let mut state = inner.lock();
            let untouched = state.revision == start_revision;

            if let Some(goal_ml) = seed.goal_ml {
                state.goal_ml = goal_ml;
            }
            match seed.amount_ml {
                Some(amount_ml) if untouched => {
                    state.amount_ml = amount_ml;
                    state.last_sent_ml = Some(amount_ml);
                }
                Some(amount_ml) => warn!(
                    "Intake changed locally while loading, keeping {} ml over server {} ml",
                    state.amount_ml, amount_ml
                ),
                None => {}
            }
            // A local amount kept over the server's may exceed the adopted goal.
            state.amount_ml = state.amount_ml.min(state.goal_ml);
            let (amount_ml, goal_ml) = (state.amount_ml, state.goal_ml);
            state.goal_watch.prime(amount_ml, goal_ml);

            state.loading = false;
            inner.persist(&state);
            (state.amount_ml, state.goal_ml)
        };

        info!("Hydration initialized from server: {} / {} ml", amount_ml, goal_ml);
        inner.emit(HydrationEvent::AmountChanged { amount_ml, goal_ml });
        inner.schedule_sync();
        InitSource::Server
    }

    /// Adds one configured step of water.
    pub fn add_water(&self) -> HydrationSnapshot {
        self.add_amount(self.inner.settings.step_ml)
    }

    /// Adds `step_ml`, never exceeding the goal.
    pub fn add_amount(&self, step_ml: u32) -> HydrationSnapshot {
        let inner = &self.inner;
        let (changed, crossed, amount_ml, goal_ml) = {
            let mut state = inner.lock();
            let before = state.amount_ml;
            state.amount_ml = before.saturating_add(step_ml).min(state.goal_ml);

            let (amount_ml, goal_ml) = (state.amount_ml, state.goal_ml);
            let crossed = state.goal_watch.observe(amount_ml, goal_ml);
            if crossed {
                state.celebrating = true;
            }
            state.splash_active = true;

            let changed = amount_ml != before;
            if changed {
                state.revision += 1;
                inner.persist(&state);
            }
            (changed, crossed, amount_ml, goal_ml)
        };

        inner.start_splash();
        if changed {
            inner.emit(HydrationEvent::AmountChanged { amount_ml, goal_ml });
            inner.schedule_sync();
        }
        if crossed {
            info!("Daily hydration goal of {} ml reached", goal_ml);
            inner.emit(HydrationEvent::GoalReached { amount_ml, goal_ml });
        }

        inner.snapshot()
    }

    pub fn reset(&self) -> HydrationSnapshot {
        let inner = &self.inner;
        let goal_ml = {
            let mut state = inner.lock();
            state.amount_ml = 0;
            state.celebrating = false;
            let goal_ml = state.goal_ml;
            state.goal_watch.observe(0, goal_ml);
            state.revision += 1;
            inner.persist(&state);
            goal_ml
        };

        inner.emit(HydrationEvent::AmountChanged { amount_ml: 0, goal_ml });
        inner.schedule_sync();
        inner.snapshot()
    }

    /// Hides the celebration overlay. Does not re-arm goal detection.
    pub fn dismiss_celebration(&self) {
        self.inner.lock().celebrating = false;
    }

    pub fn sync_pending(&self) -> bool {
        self.inner.sync_timer.is_pending()
    }

    /// Clears every pending timer. A request already in flight still completes.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        if inner.sync_timer.cancel() {
            debug!("Dropped pending hydration sync on shutdown");
        }
        inner.saved_timer.cancel();
        inner.splash_timer.cancel();
    }
}

impl<S, A> Inner<S, A>
where
    S: LocalStore + 'static,
    A: HydrationApi + 'static,
{
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: HydrationEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn persist(&self, state: &TrackerState) {
        if let Err(e) = self.cache.save(&state.record()) {
            warn!("Failed to cache hydration record: {}", e);
        }
    }

    fn snapshot(&self) -> HydrationSnapshot {
        let sync_pending = self.sync_timer.is_pending();
        let state = self.lock();
        HydrationSnapshot {
            date: state.date,
            amount_ml: state.amount_ml,
            goal_ml: state.goal_ml,
            loading: state.loading,
            celebrating: state.celebrating,
            splash_active: state.splash_active,
            saved_visible: state.saved_visible,
            sync_pending,
        }
    }

    async fn fetch_remote(&self, today: NaiveDate) -> Option<RemoteSeed> {
        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed to load current user, keeping defaults: {}", e);
                return None;
            }
        };
        debug!("Loading hydration for user {}", user.id);

        let goal_ml = match self.api.ai_stats().await {
            Ok(stats) => stats
                .daily_water_text()
                .and_then(|text| parse_daily_water_ml(&text)),
            Err(e) => {
                warn!("Failed to load AI recommendations: {}", e);
                None
            }
        };

        let amount_ml = match self.api.weekly_statistic().await {
            Ok(week) => week.water_for(today).and_then(liters_to_ml),
            Err(e) => {
                warn!("Failed to load weekly statistics: {}", e);
                None
            }
        };

        Some(RemoteSeed { goal_ml, amount_ml })
    }

    /// Clears any pending sync and re-arms it when the amount still needs
    /// to reach the server.
    fn schedule_sync(self: &Arc<Self>) {
        self.sync_timer.cancel();

        let (amount_ml, last_sent_ml) = {
            let state = self.lock();
            (state.amount_ml, state.last_sent_ml)
        };
        if amount_ml == 0 || last_sent_ml == Some(amount_ml) {
            return;
        }

        debug!("Scheduling hydration sync of {} ml", amount_ml);
        let weak = Arc::downgrade(self);
        self.sync_timer.arm(self.settings.sync_debounce, move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.flush().await;
            }
        });
    }

    async fn flush(self: Arc<Self>) {
        let amount_ml = {
            let state = self.lock();
            if state.amount_ml == 0 || state.last_sent_ml == Some(state.amount_ml) {
                return;
            }
            state.amount_ml
        };

        match self.api.record_water(ml_to_liters(amount_ml)).await {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    state.last_sent_ml = Some(amount_ml);
                    state.saved_visible = true;
                }
                info!("Saved {} ml of water", amount_ml);
                self.emit(HydrationEvent::Saved { amount_ml });
                self.show_saved();
            }
            Err(e) => {
                warn!("Failed to save hydration, will retry on next change: {}", e);
                self.saved_timer.cancel();
                self.lock().saved_visible = false;
                self.emit(HydrationEvent::SaveFailed);
            }
        }
    }

    fn show_saved(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.saved_timer.arm(self.settings.saved_indicator, move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.lock().saved_visible = false;
                inner.emit(HydrationEvent::SavedIndicatorCleared);
            }
        });
    }

    fn start_splash(self: &Arc<Self>) {
        self.emit(HydrationEvent::SplashStarted);
        let weak = Arc::downgrade(self);
        self.splash_timer.arm(self.settings.splash, move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.lock().splash_active = false;
                inner.emit(HydrationEvent::SplashEnded);
            }
        });
    }
}
