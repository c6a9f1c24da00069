//! JSON-file persistence for bookings and users.
//!
//! Records live in `bookings.json` and `users.json` under a data
//! directory. Each mutation rewrites the affected file whole; the record
//! counts here make that cheap, and it keeps the files hand-inspectable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking::{Booking, User};
use crate::repository::{BookingRepository, RepositoryError};

/// The default data location.
///
/// `/var/lib/latchkey` on Linux deployments, the platform data dir
/// elsewhere (for development).
#[must_use]
pub fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/var/lib/latchkey")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "latchkey")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"))
    }
}

/// Repository backed by JSON files under a data directory.
#[derive(Debug)]
pub struct JsonFileRepository {
    data_dir: PathBuf,
    bookings: RwLock<Vec<Booking>>,
    users: RwLock<Vec<User>>,
}

impl JsonFileRepository {
    /// Open the repository, loading any existing records.
    ///
    /// # Errors
    ///
    /// Fails when an existing file cannot be read or parsed. A missing
    /// file is an empty collection, not an error.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let data_dir = data_dir.into();
        let bookings = load_records(&bookings_path(&data_dir))?;
        let users = load_records(&users_path(&data_dir))?;
        Ok(Self {
            data_dir,
            bookings: RwLock::new(bookings),
            users: RwLock::new(users),
        })
    }

    fn persist_bookings(&self, bookings: &[Booking]) -> Result<(), RepositoryError> {
        save_records(&bookings_path(&self.data_dir), bookings)
    }

    fn persist_users(&self, users: &[User]) -> Result<(), RepositoryError> {
        save_records(&users_path(&self.data_dir), users)
    }
}

fn bookings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("bookings.json")
}

fn users_path(data_dir: &Path) -> PathBuf {
    data_dir.join("users.json")
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| RepositoryError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RepositoryError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn save_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RepositoryError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(path, content).map_err(|source| RepositoryError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl BookingRepository for JsonFileRepository {
    async fn insert_booking(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().await;
        bookings.push(booking);
        self.persist_bookings(&bookings)
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
        let Some(stored) = bookings.iter_mut().find(|stored| stored.id == booking.id) else {
            return Err(RepositoryError::BookingNotFound(booking.id));
        };
        *stored = booking;
        self.persist_bookings(&bookings)
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
        let mut users = self.users.write().await;
        users.push(user);
        self.persist_users(&users)
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
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let booking = sample_booking();
        let booking_id = booking.id;
        let user = User::new("Ada Lovelace", "ada@example.com", None);

        {
            let repo = JsonFileRepository::open(dir.path()).unwrap();
            repo.insert_booking(booking).await.unwrap();
            repo.insert_user(user).await.unwrap();
        }

        let repo = JsonFileRepository::open(dir.path()).unwrap();
        assert!(repo.booking(booking_id).await.unwrap().is_some());
        assert!(repo
            .user_by_email("ada@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut booking = sample_booking();
        let booking_id = booking.id;

        let repo = JsonFileRepository::open(dir.path()).unwrap();
        repo.insert_booking(booking.clone()).await.unwrap();

        let now = Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap();
        booking.reconcile_at(now);
        repo.update_booking(booking).await.unwrap();

        let reopened = JsonFileRepository::open(dir.path()).unwrap();
        let fetched = reopened.booking(booking_id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), crate::booking::BookingStatus::Expired);
    }

    #[tokio::test]
    async fn test_missing_files_mean_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("fresh")).unwrap();
        assert!(repo.bookings().await.unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bookings.json"), "not json").unwrap();
        assert!(matches!(
            JsonFileRepository::open(dir.path()),
            Err(RepositoryError::ParseError { .. })
        ));
    }
}
