//! Unified error types for the latchkey core library.
//!
//! Each module has its own specific error type (`WindowError`,
//! `ValidationError`, `ProviderError`, `RepositoryError`, `ConfigError`,
//! `SchedulerError`) for internal use; [`LatchkeyError`] unifies them for
//! callers that want one type at the boundary, with HTTP status and
//! machine-readable code helpers.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::booking::LifecycleError;
use crate::config::ConfigError;
use crate::provider::ProviderError;
use crate::repository::RepositoryError;
use crate::scheduler::SchedulerError;
use crate::validation::ValidationError;
use crate::window::WindowError;

/// The unified error type for all latchkey operations.
#[derive(Debug, Error)]
pub enum LatchkeyError {
    // =========================================================================
    // VALIDATION ERRORS (caller-correctable, surfaced verbatim)
    // =========================================================================
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp did not parse as RFC 3339.
    #[error("invalid timestamp for {field}: '{value}'")]
    MalformedTimestamp {
        /// Which field failed to parse.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The email does not match a `local@domain.tld` shape.
    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    /// The phone is not an optional `+` followed by 10-15 digits.
    #[error("invalid phone number: '{0}'")]
    InvalidPhone(String),

    /// The window's end is not after its start.
    #[error("booking end time must be after its start time")]
    InvalidWindow,

    /// The window starts before the current instant.
    #[error("booking start time cannot be in the past")]
    StartInPast,

    /// The window exceeds the maximum allowed duration.
    #[error("booking duration cannot exceed {max_hours} hours")]
    DurationTooLong {
        /// The enforced ceiling.
        max_hours: i64,
    },

    // =========================================================================
    // SCHEDULING ERRORS
    // =========================================================================
    /// The requested window overlaps an existing grant on the device.
    #[error("requested time slot is not available on device '{0}'")]
    SlotUnavailable(String),

    /// The booking's window contains the current instant.
    #[error("booking is currently in use and cannot be cancelled until its window ends")]
    CancellationNotAllowed,

    /// No booking exists with the given id.
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    // =========================================================================
    // PROVIDER ERRORS
    // =========================================================================
    /// The access code provider failed or refused.
    #[error("access code provider failure: {0}")]
    ProviderFailure(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration could not be read or written.
    #[error("configuration I/O failed for {}: {message}", .path.display())]
    ConfigIo {
        /// File that failed.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The configuration file exists but could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // PERSISTENCE & I/O ERRORS
    // =========================================================================
    /// An error occurred while persisting or reading data.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for latchkey operations.
pub type Result<T> = std::result::Result<T, LatchkeyError>;

impl LatchkeyError {
    /// Returns `true` if this error is caller-correctable input validation.
    #[inline]
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::MalformedTimestamp { .. }
                | Self::InvalidEmail(_)
                | Self::InvalidPhone(_)
                | Self::InvalidWindow
                | Self::StartInPast
                | Self::DurationTooLong { .. }
        )
    }

    /// Returns `true` if this error is a scheduling conflict or
    /// business-rule refusal.
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::SlotUnavailable(_) | Self::CancellationNotAllowed)
    }

    /// Returns `true` if this error came from the access code provider.
    #[inline]
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::ProviderFailure(_))
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::MissingField(_)
            | Self::MalformedTimestamp { .. }
            | Self::InvalidEmail(_)
            | Self::InvalidPhone(_)
            | Self::InvalidWindow
            | Self::StartInPast
            | Self::DurationTooLong { .. } => 400,

            // 404 Not Found
            Self::BookingNotFound(_) => 404,

            // 409 Conflict - understood but refused by current state
            Self::SlotUnavailable(_) | Self::CancellationNotAllowed => 409,

            // 502 Bad Gateway - upstream provider fault
            Self::ProviderFailure(_) => 502,

            // 500 Internal Server Error - server-side issues
            Self::ConfigIo { .. }
            | Self::ConfigParseError(_)
            | Self::ConfigValidationError(_)
            | Self::PersistenceError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MalformedTimestamp { .. } => "MALFORMED_TIMESTAMP",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::InvalidPhone(_) => "INVALID_PHONE",
            Self::InvalidWindow => "INVALID_WINDOW",
            Self::StartInPast => "START_IN_PAST",
            Self::DurationTooLong { .. } => "DURATION_TOO_LONG",
            Self::SlotUnavailable(_) => "SLOT_UNAVAILABLE",
            Self::CancellationNotAllowed => "CANCELLATION_NOT_ALLOWED",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::ProviderFailure(_) => "PROVIDER_FAILURE",
            Self::ConfigIo { .. } => "CONFIG_IO_ERROR",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<WindowError> for LatchkeyError {
    fn from(err: WindowError) -> Self {
        match err {
            WindowError::InvalidWindow { .. } => Self::InvalidWindow,
        }
    }
}

impl From<ValidationError> for LatchkeyError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => Self::MissingField(field),
            ValidationError::MalformedTimestamp { field, value } => {
                Self::MalformedTimestamp { field, value }
            }
            ValidationError::InvalidEmail(email) => Self::InvalidEmail(email),
            ValidationError::InvalidPhone(phone) => Self::InvalidPhone(phone),
            ValidationError::InvalidWindow => Self::InvalidWindow,
            ValidationError::StartInPast => Self::StartInPast,
            ValidationError::DurationTooLong { max_hours } => Self::DurationTooLong { max_hours },
        }
    }
}

impl From<LifecycleError> for LatchkeyError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::CancellationNotAllowed => Self::CancellationNotAllowed,
        }
    }
}

impl From<ProviderError> for LatchkeyError {
    fn from(err: ProviderError) -> Self {
        Self::ProviderFailure(err.to_string())
    }
}

impl From<RepositoryError> for LatchkeyError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::BookingNotFound(id) => Self::BookingNotFound(id),
            other => Self::PersistenceError(other.to_string()),
        }
    }
}

impl From<ConfigError> for LatchkeyError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ReadError { path, source } | ConfigError::WriteError { path, source } => {
                Self::ConfigIo {
                    path,
                    message: source.to_string(),
                }
            }
            ConfigError::ParseError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
        }
    }
}

impl From<SchedulerError> for LatchkeyError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Validation(e) => e.into(),
            SchedulerError::SlotUnavailable { device_id } => Self::SlotUnavailable(device_id),
            SchedulerError::CancellationNotAllowed => Self::CancellationNotAllowed,
            SchedulerError::BookingNotFound(id) => Self::BookingNotFound(id),
            SchedulerError::Provider(e) => e.into(),
            SchedulerError::Repository(e) => e.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_classification() {
        assert!(LatchkeyError::MissingField("device_id").is_validation_error());
        assert!(LatchkeyError::InvalidEmail("x".into()).is_validation_error());
        assert!(LatchkeyError::StartInPast.is_validation_error());

        assert!(!LatchkeyError::SlotUnavailable("d".into()).is_validation_error());
    }

    #[test]
    fn test_conflict_classification() {
        assert!(LatchkeyError::SlotUnavailable("d".into()).is_conflict());
        assert!(LatchkeyError::CancellationNotAllowed.is_conflict());
        assert!(!LatchkeyError::InvalidWindow.is_conflict());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LatchkeyError::InvalidWindow.http_status_code(), 400);
        assert_eq!(
            LatchkeyError::BookingNotFound(Uuid::new_v4()).http_status_code(),
            404
        );
        assert_eq!(
            LatchkeyError::SlotUnavailable("d".into()).http_status_code(),
            409
        );
        assert_eq!(
            LatchkeyError::CancellationNotAllowed.http_status_code(),
            409
        );
        assert_eq!(
            LatchkeyError::ProviderFailure("down".into()).http_status_code(),
            502
        );
        assert_eq!(
            LatchkeyError::PersistenceError("disk full".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LatchkeyError::SlotUnavailable("d".into()).error_code(),
            "SLOT_UNAVAILABLE"
        );
        assert_eq!(
            LatchkeyError::CancellationNotAllowed.error_code(),
            "CANCELLATION_NOT_ALLOWED"
        );
        assert_eq!(
            LatchkeyError::ProviderFailure("x".into()).error_code(),
            "PROVIDER_FAILURE"
        );
    }

    #[test]
    fn test_conversion_from_validation_error() {
        let err: LatchkeyError = ValidationError::DurationTooLong { max_hours: 72 }.into();
        assert!(matches!(
            err,
            LatchkeyError::DurationTooLong { max_hours: 72 }
        ));
    }

    #[test]
    fn test_conversion_from_scheduler_error() {
        let err: LatchkeyError = SchedulerError::SlotUnavailable {
            device_id: "front-door-lock".to_owned(),
        }
        .into();
        assert_eq!(err.error_code(), "SLOT_UNAVAILABLE");

        let err: LatchkeyError =
            SchedulerError::Provider(ProviderError::RequestFailed("down".into())).into();
        assert!(err.is_provider_error());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<LatchkeyError>();
        assert_sync::<LatchkeyError>();
    }
}
