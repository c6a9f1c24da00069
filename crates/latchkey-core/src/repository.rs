//! Booking and user repository capability.
//!
//! The core never owns global collections; it operates on a
//! [`BookingRepository`] handed to it. Bookings are never deleted, only
//! updated in place, so the full history stays available for audit.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking::{Booking, User};

/// Failure reading or writing the backing store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No booking exists with the given id.
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    /// The backing file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file held malformed records.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File that failed.
        path: PathBuf,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// Records could not be serialized.
    #[error("failed to serialize records: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Durable storage capability for bookings and users.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Store a new booking.
    async fn insert_booking(&self, booking: Booking) -> Result<(), RepositoryError>;

    /// Fetch a booking by id.
    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError>;

    /// All bookings, including expired and cancelled ones.
    async fn bookings(&self) -> Result<Vec<Booking>, RepositoryError>;

    /// Replace a stored booking with an updated copy.
    ///
    /// Fails with [`RepositoryError::BookingNotFound`] if the id is unknown.
    async fn update_booking(&self, booking: Booking) -> Result<(), RepositoryError>;

    /// Fetch a user by id.
    async fn user(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by email, the find-or-create key.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Store a new user.
    async fn insert_user(&self, user: User) -> Result<(), RepositoryError>;
}

/// In-memory repository for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    bookings: RwLock<Vec<Booking>>,
    users: RwLock<Vec<User>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryRepository {
    async fn insert_booking(&self, booking: Booking) -> Result<(), RepositoryError> {
        self.bookings.write().await.push(booking);
        Ok(())
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }

    async fn bookings(&self) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.bookings.read().await.clone())
    }

    async fn update_booking(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|stored| stored.id == booking.id) {
            Some(stored) => {
                *stored = booking;
                Ok(())
            }
            None => Err(RepositoryError::BookingNotFound(booking.id)),
        }
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: User) -> Result<(), RepositoryError> {
        self.users.write().await.push(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::TimeWindow;
    use chrono::{TimeZone, Utc};

    fn sample_booking() -> Booking {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        Booking::new("device-1", Uuid::new_v4(), "ac-1", "123456", window)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_booking() {
        let repo = MemoryRepository::new();
        let booking = sample_booking();
        let id = booking.id;
        repo.insert_booking(booking).await.unwrap();

        let fetched = repo.booking(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert!(repo.booking(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_booking() {
        let repo = MemoryRepository::new();
        let mut booking = sample_booking();
        repo.insert_booking(booking.clone()).await.unwrap();

        let now = Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap();
        assert!(booking.reconcile_at(now));
        repo.update_booking(booking.clone()).await.unwrap();

        let fetched = repo.booking(booking.id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), booking.status());
    }

    #[tokio::test]
    async fn test_update_unknown_booking_fails() {
        let repo = MemoryRepository::new();
        let booking = sample_booking();
        assert!(matches!(
            repo.update_booking(booking).await,
            Err(RepositoryError::BookingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_user_lookup_by_email() {
        let repo = MemoryRepository::new();
        let user = User::new("Ada Lovelace", "ada@example.com", None);
        let id = user.id;
        repo.insert_user(user).await.unwrap();

        let found = repo.user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(repo.user_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(repo.user(id).await.unwrap().is_some());
    }
}
