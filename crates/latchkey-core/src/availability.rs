//! Overlap detection against a device's existing windows.
//!
//! Pure functions over caller-supplied windows; fetching them from the
//! provider is the orchestrator's job. Linear scan; devices carry dozens
//! of windows, not thousands.

use crate::window::TimeWindow;

/// Whether `proposed` can be scheduled alongside `existing`.
///
/// Returns `false` iff `proposed` overlaps any existing window.
/// An empty existing set is always available.
#[must_use]
pub fn is_available(proposed: &TimeWindow, existing: &[TimeWindow]) -> bool {
    find_conflict(proposed, existing).is_none()
}

/// The first existing window that conflicts with `proposed`, if any.
#[must_use]
pub fn find_conflict<'a>(
    proposed: &TimeWindow,
    existing: &'a [TimeWindow],
) -> Option<&'a TimeWindow> {
    existing.iter().find(|window| proposed.overlaps(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
    }

    fn window(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeWindow {
        TimeWindow::new(at(start_h, start_m), at(end_h, end_m)).unwrap()
    }

    #[test]
    fn test_empty_existing_set_is_available() {
        let proposed = window(9, 0, 10, 0);
        assert!(is_available(&proposed, &[]));
    }

    #[test]
    fn test_overlap_makes_slot_unavailable() {
        let proposed = window(9, 30, 10, 30);
        let existing = vec![window(9, 0, 10, 0)];
        assert!(!is_available(&proposed, &existing));
    }

    #[test]
    fn test_touching_windows_remain_available() {
        let proposed = window(10, 0, 11, 0);
        let existing = vec![window(9, 0, 10, 0), window(11, 0, 12, 0)];
        assert!(is_available(&proposed, &existing));
    }

    #[test]
    fn test_any_single_overlap_rejects() {
        let proposed = window(9, 0, 12, 0);
        let existing = vec![
            window(6, 0, 7, 0),
            window(11, 30, 13, 0),
            window(14, 0, 15, 0),
        ];
        assert!(!is_available(&proposed, &existing));
        assert_eq!(
            find_conflict(&proposed, &existing),
            Some(&existing[1])
        );
    }
}
