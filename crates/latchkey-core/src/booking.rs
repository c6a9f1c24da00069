//! Booking aggregate, lifecycle state machine, and user records.
//!
//! A [`Booking`] ties a user to a device for one [`TimeWindow`] and carries
//! the access code issued by the provider. The stored [`BookingStatus`] is
//! the durable, externally-set record (`active`/`expired`/`cancelled`);
//! whether access is granted *right now* is a separate, derived question
//! answered by [`Booking::is_active_at`] against an explicit instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::window::TimeWindow;

/// Stored lifecycle status of a booking.
///
/// `Active` is the initial state; `Expired` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Live record; the grant has not been cancelled or reconciled.
    Active,
    /// Reconciled after the window elapsed. Terminal.
    Expired,
    /// Administratively cancelled. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Whether no further transition is possible from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }
}

/// Error applying a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The booking's window contains the current instant; revoking access
    /// mid-use is not permitted.
    #[error("booking is currently in use and cannot be cancelled until its window ends")]
    CancellationNotAllowed,
}

/// A time-bounded access grant on a device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,

    /// Device this grant applies to.
    #[schema(example = "front-door-lock")]
    pub device_id: String,

    /// User holding the grant.
    pub user_id: Uuid,

    /// Identifier of the access code at the provider.
    pub access_code_id: String,

    /// The secret access code itself.
    #[schema(example = "482916")]
    pub code: String,

    /// The granted time window (`starts_at`/`ends_at`).
    #[serde(flatten)]
    pub window: TimeWindow,

    /// When the booking record was created.
    pub created_at: DateTime<Utc>,

    status: BookingStatus,
}

impl Booking {
    /// Construct a new `Active` booking for a successfully issued code.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        user_id: Uuid,
        access_code_id: impl Into<String>,
        code: impl Into<String>,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id: device_id.into(),
            user_id,
            access_code_id: access_code_id.into(),
            code: code.into(),
            window,
            created_at: Utc::now(),
            status: BookingStatus::Active,
        }
    }

    /// The stored lifecycle status.
    #[must_use]
    pub const fn status(&self) -> BookingStatus {
        self.status
    }

    /// Whether access is granted at `now`: stored status is `Active` and
    /// the window contains the instant.
    ///
    /// Distinct from [`Self::status`]: a booking can be stored as `Active`
    /// while temporally outside its window.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Active && self.window.contains(now)
    }

    /// Whether the window has not yet opened, independent of stored status.
    #[must_use]
    pub fn is_future_at(&self, now: DateTime<Utc>) -> bool {
        now < self.window.start()
    }

    /// Whether the window has elapsed, independent of stored status.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.window.end()
    }

    /// Cancel the booking.
    ///
    /// Fails with [`LifecycleError::CancellationNotAllowed`] while the
    /// window contains `now`. On a terminal status this is a no-op;
    /// returns whether the stored status changed.
    pub fn cancel_at(&mut self, now: DateTime<Utc>) -> Result<bool, LifecycleError> {
        if self.is_active_at(now) {
            return Err(LifecycleError::CancellationNotAllowed);
        }
        if self.status.is_terminal() {
            return Ok(false);
        }
        self.status = BookingStatus::Cancelled;
        Ok(true)
    }

    /// Flip `Active` to `Expired` once the window has elapsed.
    ///
    /// Idempotent; returns whether the stored status changed.
    pub fn reconcile_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == BookingStatus::Active && self.is_expired_at(now) {
            self.status = BookingStatus::Expired;
            return true;
        }
        false
    }
}

/// A user known to the booking registry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,

    /// Full name.
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    /// Email address; also the lookup key for find-or-create.
    #[schema(example = "ada@example.com")]
    pub email: String,

    /// Optional phone number.
    #[schema(example = "+14155550123")]
    pub phone: Option<String>,

    /// When the user record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user record with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone,
            created_at: Utc::now(),
        }
    }
}
