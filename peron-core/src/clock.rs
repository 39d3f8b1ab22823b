//! Fixed-offset wall clock for Yekaterinburg time (UTC+5, no DST).

use chrono::{DateTime, FixedOffset, Utc};

/// Offset of Yekaterinburg time from UTC, in seconds.
const UTC_OFFSET_SECS: i32 = 5 * 3600;

/// The fixed UTC+5 target offset all instants are normalized to.
#[must_use]
pub fn target_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECS).expect("static offset is within bounds")
}

/// Current instant in Yekaterinburg time, independent of the host's
/// timezone and DST rules.
#[must_use]
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&target_offset())
}

#[cfg(test)]
mod tests {
    use super::{now, target_offset};

    #[test]
    fn offset_is_five_hours_east() {
        assert_eq!(target_offset().local_minus_utc(), 5 * 3600);
    }

    #[test]
    fn now_carries_the_target_offset() {
        assert_eq!(*now().offset(), target_offset());
    }
}
