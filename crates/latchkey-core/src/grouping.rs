//! Consecutive-booking grouping.
//!
//! Back-to-back grants on a device should be treated as one continuous
//! occupancy for maintenance purposes. [`consecutive_groups`] finds maximal
//! runs of windows whose pairwise gap is below a threshold.

use crate::window::TimeWindow;

/// Default adjacency threshold: windows within five minutes of each other
/// count as consecutive.
pub const DEFAULT_ADJACENCY_THRESHOLD_SECS: i64 = 300;

/// Group entries whose windows run back to back.
///
/// Entries are sorted by window start, then adjacent pairs with
/// `0 <= gap < threshold_secs` accumulate into a group. A window with no
/// neighbor within the threshold appears in no group. Overlapping or
/// out-of-order pairs (negative gap) never group: consecutiveness means
/// one window ends and the next begins.
#[must_use]
pub fn consecutive_groups<T: Clone>(
    entries: &[(T, TimeWindow)],
    threshold_secs: i64,
) -> Vec<Vec<T>> {
    let mut ordered: Vec<&(T, TimeWindow)> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.1.start());

    let mut groups = Vec::new();
    let mut open: Vec<T> = Vec::new();

    for pair in ordered.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let gap = current.1.gap_to(&next.1);
        if (0..threshold_secs).contains(&gap) {
            if open.is_empty() {
                open.push(current.0.clone());
            }
            open.push(next.0.clone());
        } else if !open.is_empty() {
            groups.push(std::mem::take(&mut open));
        }
    }

    if !open.is_empty() {
        groups.push(open);
    }

    groups
}
