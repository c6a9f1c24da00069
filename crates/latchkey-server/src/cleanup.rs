//! Periodic cleanup task.
//!
//! Runs on a fixed interval from startup: reconciles booking statuses,
//! revokes expired provider codes per configured device, and emits expiry
//! reminders for bookings ending soon. Each pass tolerates individual
//! failures; a fault on one device must not starve the others.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Spawn the cleanup task.
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(state))
}

async fn run(state: AppState) {
    let interval = Duration::from_secs(state.config().system.cleanup_interval_secs);
    let lead = chrono::Duration::hours(state.config().system.reminder_lead_hours);
    let mut ticker = tokio::time::interval(interval);
    let mut reminded: HashSet<Uuid> = HashSet::new();

    info!(interval_secs = interval.as_secs(), "cleanup task started");

    loop {
        ticker.tick().await;
        let now = Utc::now();

        match state.scheduler().reconcile_expired(now).await {
            Ok(updated) if updated > 0 => {
                info!(updated, "cleanup: booking statuses reconciled");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "cleanup: reconciliation failed"),
        }

        for device in &state.config().devices {
            match state.scheduler().purge_expired_codes(&device.id, now).await {
                Ok(revoked) if !revoked.is_empty() => {
                    info!(
                        device_id = %device.id,
                        count = revoked.len(),
                        "cleanup: expired codes revoked"
                    );
                }
                Ok(_) => {}
                Err(err) => warn!(
                    device_id = %device.id,
                    error = %err,
                    "cleanup: code purge failed"
                ),
            }
        }

        match state.scheduler().remind_expiring(now, lead, &reminded).await {
            Ok(ids) => reminded.extend(ids),
            Err(err) => warn!(error = %err, "cleanup: expiry reminders failed"),
        }

        // Bound the reminder memory; long-gone bookings fall out of the
        // lead window anyway.
        if reminded.len() > 10_000 {
            reminded.clear();
        }
    }
}
