use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::models::{AppointmentPartition, LocalAppointment, RemoteAppointment, ScheduledAppointment};

/// Concatenates both sources into one time-ordered list. Nothing is
/// de-duplicated; an id present on both sides is only reported.
pub fn merge<Tz: TimeZone>(
    remote: Vec<RemoteAppointment>,
    local: Vec<LocalAppointment>,
    tz: &Tz,
) -> Vec<ScheduledAppointment> {
    let remote_ids: HashSet<_> = remote.iter().map(|item| item.id.clone()).collect();
    for item in local.iter().filter(|item| remote_ids.contains(&item.id)) {
        warn!("Local appointment {} shares its id with a remote appointment", item.id);
    }

    let mut merged: Vec<ScheduledAppointment> = remote
        .into_iter()
        .map(ScheduledAppointment::remote)
        .chain(local.into_iter().map(|item| ScheduledAppointment::local(item, tz)))
        .collect();

    merged.sort_by_key(|item| item.datetime);
    merged
}

/// Upcoming means at or after `now`. Every item lands on exactly one side.
pub fn partition(items: Vec<ScheduledAppointment>, now: DateTime<Utc>) -> AppointmentPartition {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|item| item.datetime >= now);

    upcoming.sort_by_key(|item| item.datetime);
    past.sort_by(|a, b| b.datetime.cmp(&a.datetime));

    AppointmentPartition { upcoming, past }
}
