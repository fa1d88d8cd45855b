//! Window eviction rule

use super::Timestamp;

/// Result of one prune pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    pub retained: usize,
    pub removed: usize,
}

/// A timestamp is active while `current - t < threshold`.
///
/// The boundary `current - t == threshold` is expired. The subtraction is
/// widened to i128 so extreme values never overflow.
pub fn is_active(timestamp: Timestamp, current: Timestamp, threshold: i64) -> bool {
    (current as i128) - (timestamp as i128) < threshold as i128
}

/// Drop every expired entry in place, keeping insertion order
pub fn prune_expired(timestamps: &mut Vec<Timestamp>, current: Timestamp, threshold: i64) -> PruneStats {
    let before = timestamps.len();
    timestamps.retain(|&t| is_active(t, current, threshold));

    PruneStats {
        retained: timestamps.len(),
        removed: before - timestamps.len(),
    }
}
