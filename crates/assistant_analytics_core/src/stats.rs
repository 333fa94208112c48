//! crates/assistant_analytics_core/src/stats.rs
//!
//! Reduces the grouped feedback rows into a `StatsSummary`.

use crate::domain::{FeedbackCount, StatsSummary};

/// Folds feedback buckets into totals and whole-number percentages.
///
/// Buckets sharing a feedback value are summed. An empty input yields a
/// summary with every field at zero.
pub fn summarize(buckets: &[FeedbackCount]) -> StatsSummary {
    let count_where = |value: Option<bool>| -> u64 {
        buckets
            .iter()
            .filter(|b| b.feedback == value)
            .map(|b| b.count)
            .sum()
    };

    let total: u64 = buckets.iter().map(|b| b.count).sum();
    let success_total = count_where(Some(true));
    let failed_total = count_where(Some(false));

    StatsSummary {
        total,
        success_total,
        failed_total,
        success_percent: rounded_percent(success_total, total),
        failed_percent: rounded_percent(failed_total, total),
    }
}

/// `round(part / total * 100)` with halves rounded up. Returns 0 for an empty total.
fn rounded_percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (u128::from(part), u128::from(total));
    // floor(part * 100 / total + 1/2)
    ((part * 200 + total) / (total * 2)) as u32
}
