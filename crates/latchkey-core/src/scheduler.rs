//! Scheduling orchestration.
//!
//! [`Scheduler`] ties the engine together: it validates requests, checks
//! availability against the provider's existing windows, issues codes,
//! persists bookings, and emits notifications. Scheduling for a given
//! device is serialized through a per-device lock so the
//! check-availability-then-issue sequence is atomic with respect to other
//! attempts on the same device; different devices proceed in parallel.
//! Cancellation and expiry reconciliation of the same booking are likewise
//! mutually exclusive through a per-booking lock.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::availability::{find_conflict, is_available};
use crate::booking::{Booking, User};
use crate::codegen::generate_access_code;
use crate::config::SchedulingConfig;
use crate::grouping::consecutive_groups;
use crate::notify::{Contact, Notice, NotificationSink};
use crate::provider::{AccessCodeProvider, ProviderCode, ProviderError};
use crate::repository::{BookingRepository, RepositoryError};
use crate::validation::{validate_booking_request, BookingRequest, ValidationError};
use crate::window::TimeWindow;

/// A booked period on a device, as exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookedPeriod {
    /// When the period begins.
    pub starts_at: DateTime<Utc>,

    /// When the period ends.
    pub ends_at: DateTime<Utc>,

    /// Label recorded with the code.
    #[schema(example = "Scheduled access for Ada Lovelace")]
    pub label: String,
}

/// Failure of a scheduling operation.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The request failed business validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested window overlaps an existing grant on the device.
    #[error("requested time slot is not available on device '{device_id}'")]
    SlotUnavailable {
        /// The contested device.
        device_id: String,
    },

    /// The booking's window contains the current instant.
    #[error("booking is currently in use and cannot be cancelled until its window ends")]
    CancellationNotAllowed,

    /// No booking exists with the given id.
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    /// The access code provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The booking store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The scheduling and conflict-resolution engine.
pub struct Scheduler {
    provider: Arc<dyn AccessCodeProvider>,
    repository: Arc<dyn BookingRepository>,
    sink: Arc<dyn NotificationSink>,
    limits: SchedulingConfig,
    device_locks: DashMap<String, Arc<Mutex<()>>>,
    booking_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl Scheduler {
    /// Create a scheduler over the given collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AccessCodeProvider>,
        repository: Arc<dyn BookingRepository>,
        sink: Arc<dyn NotificationSink>,
        limits: SchedulingConfig,
    ) -> Self {
        Self {
            provider,
            repository,
            sink,
            limits,
            device_locks: DashMap::new(),
            booking_locks: DashMap::new(),
        }
    }

    fn device_lock(&self, device_id: &str) -> Arc<Mutex<()>> {
        self.device_locks
            .entry(device_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn booking_lock(&self, booking_id: Uuid) -> Arc<Mutex<()>> {
        self.booking_locks
            .entry(booking_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Schedule a new booking.
    ///
    /// Validates the request, then, holding the device's lock, checks the
    /// proposed window against the provider's existing windows and issues
    /// a code. Nothing is issued or persisted on any failure.
    pub async fn schedule(&self, request: BookingRequest) -> Result<Booking, SchedulerError> {
        let now = Utc::now();
        let window = validate_booking_request(&request, now, self.limits.max_duration_hours)?;

        let lock = self.device_lock(&request.device_id);
        let _guard = lock.lock().await;

        let existing: Vec<TimeWindow> = self
            .provider
            .list_codes(&request.device_id)
            .await?
            .into_iter()
            .map(|code| code.window)
            .collect();

        if let Some(conflict) = find_conflict(&window, &existing) {
            info!(
                device_id = %request.device_id,
                starts_at = %window.start(),
                conflict_starts_at = %conflict.start(),
                "rejected booking: slot unavailable"
            );
            return Err(SchedulerError::SlotUnavailable {
                device_id: request.device_id,
            });
        }

        let code = generate_access_code(self.limits.code_length);
        let label = format!("Scheduled access for {}", request.user_name.trim());
        let issued = self
            .provider
            .issue_code(&request.device_id, window, &code, &label)
            .await?;

        let user = self.find_or_create_user(&request).await?;
        let booking = Booking::new(
            request.device_id,
            user.id,
            issued.access_code_id,
            issued.code,
            window,
        );
        self.repository.insert_booking(booking.clone()).await?;

        info!(
            booking_id = %booking.id,
            device_id = %booking.device_id,
            user_id = %booking.user_id,
            starts_at = %window.start(),
            ends_at = %window.end(),
            "booking created"
        );

        let notice = Notice::CodeIssued {
            contact: Contact {
                email: user.email,
                phone: user.phone,
            },
            code: booking.code.clone(),
            window,
        };
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move { sink.deliver(notice).await });

        Ok(booking)
    }

    async fn find_or_create_user(
        &self,
        request: &BookingRequest,
    ) -> Result<User, RepositoryError> {
        if let Some(user) = self.repository.user_by_email(&request.user_email).await? {
            return Ok(user);
        }
        let user = User::new(
            request.user_name.clone(),
            request.user_email.clone(),
            request.user_phone.clone(),
        );
        self.repository.insert_user(user.clone()).await?;
        Ok(user)
    }

    /// Cancel a booking.
    ///
    /// Rejected while the booking's window contains the current instant.
    /// For a future booking the provider code is revoked best-effort: a
    /// revocation failure is logged and the booking is still cancelled
    /// locally, leaving the orphaned remote code to the cleanup pass.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<Booking, SchedulerError> {
        let now = Utc::now();
        let lock = self.booking_lock(booking_id);
        let _guard = lock.lock().await;

        let mut booking = self
            .repository
            .booking(booking_id)
            .await?
            .ok_or(SchedulerError::BookingNotFound(booking_id))?;

        if booking.is_active_at(now) {
            return Err(SchedulerError::CancellationNotAllowed);
        }

        let should_revoke =
            booking.status() == crate::booking::BookingStatus::Active && booking.is_future_at(now);
        if should_revoke {
            if let Err(err) = self.provider.revoke_code(&booking.access_code_id).await {
                warn!(
                    booking_id = %booking.id,
                    access_code_id = %booking.access_code_id,
                    error = %err,
                    "code revocation failed; booking will still be cancelled locally"
                );
            }
        }

        let changed = booking
            .cancel_at(now)
            .map_err(|_| SchedulerError::CancellationNotAllowed)?;
        if changed {
            self.repository.update_booking(booking.clone()).await?;
            info!(booking_id = %booking.id, "booking cancelled");
        }
        Ok(booking)
    }

    /// Whether `window` can be booked on `device_id` right now.
    pub async fn availability(
        &self,
        device_id: &str,
        window: &TimeWindow,
    ) -> Result<bool, SchedulerError> {
        let existing: Vec<TimeWindow> = self
            .provider
            .list_codes(device_id)
            .await?
            .into_iter()
            .map(|code| code.window)
            .collect();
        Ok(is_available(window, &existing))
    }

    /// All booked periods on a device, from the provider's listing.
    pub async fn booked_periods(
        &self,
        device_id: &str,
    ) -> Result<Vec<BookedPeriod>, SchedulerError> {
        let periods = self
            .provider
            .list_codes(device_id)
            .await?
            .into_iter()
            .map(|code| BookedPeriod {
                starts_at: code.window.start(),
                ends_at: code.window.end(),
                label: code.label,
            })
            .collect();
        Ok(periods)
    }

    /// Maximal runs of back-to-back bookings on a device.
    pub async fn consecutive_bookings(
        &self,
        device_id: &str,
    ) -> Result<Vec<Vec<ProviderCode>>, SchedulerError> {
        let codes = self.provider.list_codes(device_id).await?;
        let entries: Vec<(ProviderCode, TimeWindow)> = codes
            .into_iter()
            .map(|code| {
                let window = code.window;
                (code, window)
            })
            .collect();
        Ok(consecutive_groups(
            &entries,
            self.limits.adjacency_threshold_secs,
        ))
    }

    /// Flip stored-`Active` bookings whose windows have elapsed to
    /// `Expired`. Idempotent; returns how many records changed.
    pub async fn reconcile_expired(&self, now: DateTime<Utc>) -> Result<usize, SchedulerError> {
        let mut updated = 0;
        for booking in self.repository.bookings().await? {
            if !booking.is_expired_at(now) {
                continue;
            }
            let lock = self.booking_lock(booking.id);
            let _guard = lock.lock().await;

            // Re-read under the lock; a concurrent cancellation may have won.
            let Some(mut current) = self.repository.booking(booking.id).await? else {
                continue;
            };
            if current.reconcile_at(now) {
                self.repository.update_booking(current).await?;
                updated += 1;
            }
        }
        if updated > 0 {
            info!(updated, "expired bookings reconciled");
        }
        Ok(updated)
    }

    /// Revoke provider codes whose windows have elapsed.
    ///
    /// Best-effort per code: a failed revocation is logged and skipped.
    /// Returns the ids that were revoked.
    pub async fn purge_expired_codes(
        &self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, SchedulerError> {
        let mut revoked = Vec::new();
        for code in self.provider.list_codes(device_id).await? {
            if code.window.end() >= now {
                continue;
            }
            match self.provider.revoke_code(&code.access_code_id).await {
                Ok(()) => revoked.push(code.access_code_id),
                Err(err) => warn!(
                    device_id,
                    access_code_id = %code.access_code_id,
                    error = %err,
                    "failed to revoke expired code"
                ),
            }
        }
        if !revoked.is_empty() {
            info!(device_id, count = revoked.len(), "expired codes revoked");
        }
        Ok(revoked)
    }

    /// Emit expiry reminders for bookings ending within `lead`.
    ///
    /// Bookings in `already_reminded` are skipped; the ids reminded this
    /// pass are returned so the caller can extend that set.
    pub async fn remind_expiring(
        &self,
        now: DateTime<Utc>,
        lead: Duration,
        already_reminded: &HashSet<Uuid>,
    ) -> Result<Vec<Uuid>, SchedulerError> {
        let horizon = now + lead;
        let mut reminded = Vec::new();
        for booking in self.repository.bookings().await? {
            if booking.status() != crate::booking::BookingStatus::Active
                || booking.is_expired_at(now)
                || booking.window.end() > horizon
                || already_reminded.contains(&booking.id)
            {
                continue;
            }
            let Some(user) = self.repository.user(booking.user_id).await? else {
                continue;
            };
            self.sink
                .deliver(Notice::ExpiryReminder {
                    contact: Contact {
                        email: user.email,
                        phone: user.phone,
                    },
                    code: booking.code.clone(),
                    ends_at: booking.window.end(),
                })
                .await;
            reminded.push(booking.id);
        }
        Ok(reminded)
    }
}
