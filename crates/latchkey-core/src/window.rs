//! Time window value type and interval arithmetic.
//!
//! A [`TimeWindow`] is an immutable `[start, end]` interval in UTC with
//! `start < end` enforced at construction. All scheduling decisions
//! (overlap, adjacency, containment) reduce to the arithmetic here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Error constructing a [`TimeWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// The window's start is not strictly before its end.
    #[error("window start ({start}) must be before its end ({end})")]
    InvalidWindow {
        /// Requested start instant.
        start: DateTime<Utc>,
        /// Requested end instant.
        end: DateTime<Utc>,
    },
}

/// An inclusive-endpoint time interval in UTC.
///
/// Serializes to `starts_at`/`ends_at` RFC 3339 fields, matching the
/// persisted booking record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "WindowBounds")]
pub struct TimeWindow {
    /// When the window opens (UTC).
    #[serde(rename = "starts_at")]
    #[schema(example = "2025-06-01T14:00:00Z")]
    start: DateTime<Utc>,

    /// When the window closes (UTC).
    #[serde(rename = "ends_at")]
    #[schema(example = "2025-06-01T16:00:00Z")]
    end: DateTime<Utc>,
}

/// Raw bounds used to deserialize a [`TimeWindow`] while preserving
/// the `start < end` invariant.
#[derive(Debug, Clone, Deserialize)]
struct WindowBounds {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl TryFrom<WindowBounds> for TimeWindow {
    type Error = WindowError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.starts_at, bounds.ends_at)
    }
}

impl TimeWindow {
    /// Create a window, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window's opening instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// The window's closing instant.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `instant` falls within the window, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whether two windows overlap.
    ///
    /// Strict inequalities: windows that merely touch at a boundary
    /// (`self.end == other.start`) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Signed gap in seconds from this window's end to `other`'s start.
    ///
    /// Negative when `other` starts before this window ends (overlap or
    /// reverse order).
    #[must_use]
    pub fn gap_to(&self, other: &Self) -> i64 {
        (other.start - self.end).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
    }

    fn window(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeWindow {
        TimeWindow::new(at(start_h, start_m), at(end_h, end_m)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = TimeWindow::new(at(12, 0), at(10, 0)).unwrap_err();
        assert!(matches!(err, WindowError::InvalidWindow { .. }));
    }

    #[test]
    fn test_rejects_zero_length() {
        assert!(TimeWindow::new(at(12, 0), at(12, 0)).is_err());
    }

    #[test]
    fn test_duration() {
        let w = window(10, 0, 12, 30);
        assert_eq!(w.duration(), Duration::minutes(150));
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let w = window(10, 0, 11, 0);
        assert!(w.contains(at(10, 0)));
        assert!(w.contains(at(10, 30)));
        assert!(w.contains(at(11, 0)));
        assert!(!w.contains(at(9, 59)));
        assert!(!w.contains(at(11, 1)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = window(10, 0, 11, 0);
        let b = window(10, 30, 11, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = window(12, 0, 13, 0);
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_window_overlaps_itself() {
        let a = window(10, 0, 11, 0);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn test_touching_boundaries_do_not_overlap() {
        let a = window(10, 0, 11, 0);
        let b = window(11, 0, 12, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_containment_counts_as_overlap() {
        let outer = window(9, 0, 13, 0);
        let inner = window(10, 0, 11, 0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_gap_to_signs() {
        let a = window(10, 0, 10, 30);
        let b = window(10, 33, 11, 0);
        assert_eq!(a.gap_to(&b), 180);

        // Touching windows have zero gap.
        let c = window(11, 0, 11, 30);
        assert_eq!(b.gap_to(&c), 0);

        // Reverse order yields a negative gap.
        assert_eq!(b.gap_to(&a), -(60 * 60));
    }

    #[test]
    fn test_serde_round_trip() {
        let w = window(10, 0, 11, 0);
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("starts_at"));
        assert!(json.contains("ends_at"));
        let back: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_deserialize_rejects_inverted_bounds() {
        let json = r#"{"starts_at":"2025-06-01T12:00:00Z","ends_at":"2025-06-01T10:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeWindow>(json).is_err());
    }
}
