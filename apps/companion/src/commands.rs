use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Utc};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use appointment_cell::{
    AppointmentPartition, AppointmentsService, HttpAppointmentApi, LocalAppointmentRepository,
    NewLocalAppointment, RemoteState, ScheduledAppointment,
};
use hydration_cell::api::{HttpHydrationApi, HydrationApi, HydrationTracker};
use hydration_cell::{HydrationEvent, HydrationSnapshot};
use shared_config::AppConfig;
use shared_models::EntityId;
use shared_storage::FileStore;
use transcript_cell::{TranscriptClient, TranscriptService};

type Store = Arc<FileStore>;
type Tracker = HydrationTracker<Store, Arc<HttpHydrationApi>>;
type Appointments = AppointmentsService<Store, HttpAppointmentApi, Option<TranscriptClient>>;

/// Extra time allowed for the save request once the debounce has fired.
const SAVE_GRACE: Duration = Duration::from_secs(15);

fn tracker(config: &AppConfig, store: Store) -> Tracker {
    HydrationTracker::new(
        store,
        Arc::new(HttpHydrationApi::new(config)),
        config.hydration.clone(),
        Local::now().date_naive(),
    )
}

fn transcripts(config: &AppConfig) -> Option<TranscriptClient> {
    match TranscriptClient::new(config) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Recordings are unavailable: {}", e);
            None
        }
    }
}

async fn appointments_service(config: &AppConfig, store: Store) -> Result<Appointments> {
    let user = HttpHydrationApi::new(config)
        .current_user()
        .await
        .context("fetching the signed-in user")?;
    info!("Signed in as {}", user.display_name());

    let service = AppointmentsService::new(
        store,
        HttpAppointmentApi::new(config),
        transcripts(config),
        user.id,
    );
    service.refresh().await;
    Ok(service)
}

/// Local bookings work offline, so a missing user falls back to them alone.
async fn local_or_full_service(config: &AppConfig, store: Store) -> Appointments {
    match appointments_service(config, store.clone()).await {
        Ok(service) => service,
        Err(e) => {
            warn!("Showing local appointments only: {:#}", e);
            AppointmentsService::new(
                store,
                HttpAppointmentApi::new(config),
                transcripts(config),
                EntityId::from("anonymous"),
            )
        }
    }
}

fn print_hydration(snapshot: &HydrationSnapshot) {
    println!(
        "Water {}: {} / {} ml ({:.0}%)",
        snapshot.date,
        snapshot.amount_ml,
        snapshot.goal_ml,
        snapshot.progress() * 100.0
    );
    if snapshot.goal_reached() {
        println!("Daily goal reached!");
    } else {
        println!("{} ml to go", snapshot.remaining_ml());
    }
}

fn print_appointment(item: &ScheduledAppointment, audio: Option<bool>) {
    let when = item.datetime.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let origin = if item.appointment.is_local() { "local" } else { "clinic" };
    let recording = match audio {
        Some(true) => "  [recording]",
        _ => "",
    };
    println!(
        "  {}  {}  ({}, id {}){}",
        when,
        item.appointment.title(),
        origin,
        item.appointment.id(),
        recording
    );
}

fn print_partition(view: &AppointmentPartition, audio: &[bool]) {
    println!("Upcoming ({}):", view.upcoming.len());
    for item in &view.upcoming {
        print_appointment(item, None);
    }

    println!("Past ({}):", view.past.len());
    for (index, item) in view.past.iter().enumerate() {
        print_appointment(item, audio.get(index).copied());
    }
}

fn find(view: AppointmentPartition, id: &str) -> Option<ScheduledAppointment> {
    view.upcoming
        .into_iter()
        .chain(view.past)
        .find(|item| item.appointment.id().as_str() == id)
}

pub async fn status(config: &AppConfig, store: Store) -> Result<()> {
    let tracker = tracker(config, store.clone());
    let source = tracker.initialize().await;
    info!("Hydration loaded from {:?}", source);
    print_hydration(&tracker.snapshot());
    tracker.shutdown();

    let service = local_or_full_service(config, store).await;
    let view = service.view(&Local, Utc::now());
    println!(
        "Appointments: {} upcoming, {} past",
        view.upcoming.len(),
        view.past.len()
    );
    if let Some(next) = view.upcoming.first() {
        print!("Next:");
        print_appointment(next, None);
    }
    Ok(())
}

pub async fn drink(config: &AppConfig, store: Store, ml: Option<u32>) -> Result<()> {
    let tracker = tracker(config, store);
    tracker.initialize().await;

    let mut events = tracker.subscribe();
    let after = match ml {
        Some(ml) => tracker.add_amount(ml),
        None => tracker.add_water(),
    };
    print_hydration(&after);

    if !tracker.sync_pending() {
        tracker.shutdown();
        return Ok(());
    }

    println!("Saving...");
    let wait = tracker.settings().sync_debounce + SAVE_GRACE;
    let outcome = tokio::time::timeout(wait, async {
        loop {
            match events.recv().await {
                Ok(HydrationEvent::GoalReached { .. }) => println!("Daily goal reached!"),
                Ok(HydrationEvent::Saved { amount_ml }) => return Ok(amount_ml),
                Ok(HydrationEvent::SaveFailed) => return Err(anyhow!("the server rejected the update")),
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return Err(anyhow!("tracker stopped")),
            }
        }
    })
    .await;
    tracker.shutdown();

    match outcome {
        Ok(Ok(amount_ml)) => {
            println!("Saved {} ml", amount_ml);
            Ok(())
        }
        Ok(Err(e)) => Err(e.context("saving water intake, it is kept locally")),
        Err(_) => bail!("timed out saving water intake, it is kept locally"),
    }
}

pub async fn reset(config: &AppConfig, store: Store) -> Result<()> {
    let tracker = tracker(config, store);
    tracker.initialize().await;
    print_hydration(&tracker.reset());
    tracker.shutdown();
    Ok(())
}

pub async fn appointments(config: &AppConfig, store: Store, with_audio: bool) -> Result<()> {
    let service = local_or_full_service(config, store).await;
    if let RemoteState::Failed(reason) = service.remote_state() {
        println!("Clinic appointments unavailable: {}", reason);
    }

    let view = service.view(&Local, Utc::now());
    let audio = if with_audio && config.is_transcript_service_configured() {
        service.probe_audio(&view.past).await
    } else {
        Vec::new()
    };

    print_partition(&view, &audio);
    Ok(())
}

pub fn book(store: Store, request: NewLocalAppointment) -> Result<()> {
    let booked = LocalAppointmentRepository::new(store).book(request, Utc::now())?;
    println!(
        "Booked {} on {} at {} (id {})",
        booked.clinic_name,
        booked.date,
        booked.time.format("%H:%M"),
        booked.id
    );
    Ok(())
}

pub async fn cancel(config: &AppConfig, store: Store, id: &str) -> Result<()> {
    let service = local_or_full_service(config, store).await;
    let target = find(service.view(&Local, Utc::now()), id)
        .ok_or_else(|| anyhow!("no appointment with id {}", id))?;

    service.cancel(&target.appointment).await?;
    println!("Cancelled {}", target.appointment.title());
    Ok(())
}

pub async fn summary(config: &AppConfig, store: Store, id: &str, out: &Path) -> Result<()> {
    let service = appointments_service(config, store).await?;
    let target = find(service.view(&Local, Utc::now()), id)
        .ok_or_else(|| anyhow!("no appointment with id {}", id))?;

    let pdf = service.download_summary(&target).await?;
    tokio::fs::write(out, &pdf)
        .await
        .with_context(|| format!("writing {}", out.display()))?;

    println!("Saved {} bytes to {}", pdf.len(), out.display());
    Ok(())
}

pub async fn latest_summary(config: &AppConfig) -> Result<()> {
    let client = TranscriptClient::new(config)?;
    println!("{}", client.get_latest_pdf_url().await?);
    Ok(())
}
