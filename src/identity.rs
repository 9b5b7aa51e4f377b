/// Percent-identity filtering and rounding
use crate::blast::AlignmentRecord;

/// Keep records whose identity is strictly above `threshold`
///
/// A threshold of 100 or more leaves nothing, which is a valid empty result.
pub fn filter_by_identity(records: Vec<AlignmentRecord>, threshold: f64) -> Vec<AlignmentRecord> {
    records
        .into_iter()
        .filter(|r| r.percent_identity > threshold)
        .collect()
}

/// Round a percent identity to the nearest whole number, ties to even
///
/// 95.5 rounds to 96 and 94.5 rounds to 94.
pub fn round_identity(percent_identity: f64) -> i64 {
    percent_identity.round_ties_even() as i64
}
