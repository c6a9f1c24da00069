//! Booking request validation.
//!
//! Validates raw booking requests as they arrive at the boundary (string
//! timestamps and contact details), in a fixed order with the first failure
//! reported. Validation is pure: it never touches the provider or any
//! stored state. On success the parsed [`TimeWindow`] is returned so
//! callers never re-parse the timestamps.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::window::TimeWindow;

/// Maximum booking duration in hours.
pub const MAX_DURATION_HOURS: i64 = 72;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("phone regex is valid"));

/// A raw booking request as received from a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Target device.
    pub device_id: String,

    /// Requested window start, RFC 3339.
    pub starts_at: String,

    /// Requested window end, RFC 3339.
    pub ends_at: String,

    /// Requester's full name; used for the code label on the device.
    pub user_name: String,

    /// Requester's email.
    pub user_email: String,

    /// Requester's phone, optional.
    pub user_phone: Option<String>,
}

/// A validation failure. All variants are caller-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp did not parse as RFC 3339.
    #[error("invalid timestamp for {field}: expected RFC 3339, got '{value}'")]
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
}

/// Validate a booking request against business rules at instant `now`.
///
/// Checks run in order and short-circuit on the first failure: required
/// fields, timestamp shape, email, phone, window ordering, start not in
/// the past, duration within `max_hours`.
pub fn validate_booking_request(
    request: &BookingRequest,
    now: DateTime<Utc>,
    max_hours: i64,
) -> Result<TimeWindow, ValidationError> {
    require_field("device_id", &request.device_id)?;
    require_field("starts_at", &request.starts_at)?;
    require_field("ends_at", &request.ends_at)?;
    require_field("user_name", &request.user_name)?;
    require_field("user_email", &request.user_email)?;

    let start = parse_timestamp("starts_at", &request.starts_at)?;
    let end = parse_timestamp("ends_at", &request.ends_at)?;

    if !EMAIL_RE.is_match(&request.user_email) {
        return Err(ValidationError::InvalidEmail(request.user_email.clone()));
    }

    if let Some(phone) = request.user_phone.as_deref() {
        if !phone.is_empty() && !PHONE_RE.is_match(phone) {
            return Err(ValidationError::InvalidPhone(phone.to_owned()));
        }
    }

    if start >= end {
        return Err(ValidationError::InvalidWindow);
    }

    if start < now {
        return Err(ValidationError::StartInPast);
    }

    if end - start > Duration::hours(max_hours) {
        return Err(ValidationError::DurationTooLong { max_hours });
    }

    TimeWindow::new(start, end).map_err(|_| ValidationError::InvalidWindow)
}

fn require_field(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    Ok(())
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::MalformedTimestamp {
            field,
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn valid_request() -> BookingRequest {
        BookingRequest {
            device_id: "front-door-lock".to_owned(),
            starts_at: "2025-06-01T14:00:00Z".to_owned(),
            ends_at: "2025-06-01T16:00:00Z".to_owned(),
            user_name: "Ada Lovelace".to_owned(),
            user_email: "ada@example.com".to_owned(),
            user_phone: Some("+14155550123".to_owned()),
        }
    }

    fn validate(request: &BookingRequest) -> Result<TimeWindow, ValidationError> {
        validate_booking_request(request, now(), MAX_DURATION_HOURS)
    }

    #[test]
    fn test_valid_request_returns_parsed_window() {
        let window = validate(&valid_request()).unwrap();
        assert_eq!(window.duration(), Duration::hours(2));
    }

    #[test]
    fn test_missing_fields_reported_first() {
        let mut request = valid_request();
        request.device_id = String::new();
        // Also malformed, but the missing field must win.
        request.starts_at = "not-a-timestamp".to_owned();
        assert_eq!(
            validate(&request),
            Err(ValidationError::MissingField("device_id"))
        );
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let mut request = valid_request();
        request.user_name = "   ".to_owned();
        assert_eq!(
            validate(&request),
            Err(ValidationError::MissingField("user_name"))
        );
    }

    #[test]
    fn test_malformed_timestamps() {
        let mut request = valid_request();
        request.ends_at = "tomorrow at noon".to_owned();
        assert!(matches!(
            validate(&request),
            Err(ValidationError::MalformedTimestamp { field: "ends_at", .. })
        ));
    }

    #[test]
    fn test_invalid_email() {
        let mut request = valid_request();
        request.user_email = "not-an-email".to_owned();
        assert_eq!(
            validate(&request),
            Err(ValidationError::InvalidEmail("not-an-email".to_owned()))
        );
    }

    #[test]
    fn test_invalid_phone() {
        let mut request = valid_request();
        request.user_phone = Some("555-0123".to_owned());
        assert!(matches!(
            validate(&request),
            Err(ValidationError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_phone_is_optional() {
        let mut request = valid_request();
        request.user_phone = None;
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_phone_length_bounds() {
        let mut request = valid_request();
        request.user_phone = Some("+123456789".to_owned()); // 9 digits
        assert!(matches!(
            validate(&request),
            Err(ValidationError::InvalidPhone(_))
        ));

        request.user_phone = Some("1234567890".to_owned()); // 10 digits, no plus
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_end_before_start() {
        let mut request = valid_request();
        request.starts_at = "2025-06-01T16:00:00Z".to_owned();
        request.ends_at = "2025-06-01T14:00:00Z".to_owned();
        assert_eq!(validate(&request), Err(ValidationError::InvalidWindow));
    }

    #[test]
    fn test_start_in_past() {
        let mut request = valid_request();
        request.starts_at = "2025-06-01T08:00:00Z".to_owned();
        request.ends_at = "2025-06-01T10:00:00Z".to_owned();
        assert_eq!(validate(&request), Err(ValidationError::StartInPast));
    }

    #[test]
    fn test_start_exactly_now_is_allowed() {
        let mut request = valid_request();
        request.starts_at = "2025-06-01T09:00:00Z".to_owned();
        request.ends_at = "2025-06-01T10:00:00Z".to_owned();
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_duration_too_long() {
        let mut request = valid_request();
        request.ends_at = "2025-06-05T14:00:01Z".to_owned(); // 96h + 1s
        assert_eq!(
            validate(&request),
            Err(ValidationError::DurationTooLong { max_hours: 72 })
        );
    }

    #[test]
    fn test_duration_exactly_at_limit_is_allowed() {
        let mut request = valid_request();
        request.ends_at = "2025-06-04T14:00:00Z".to_owned(); // exactly 72h
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_offset_timestamps_normalize_to_utc() {
        let mut request = valid_request();
        request.starts_at = "2025-06-01T16:00:00+02:00".to_owned();
        request.ends_at = "2025-06-01T18:00:00+02:00".to_owned();
        let window = validate(&request).unwrap();
        assert_eq!(
            window.start(),
            Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap()
        );
    }
}
