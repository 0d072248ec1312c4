//! Calendar arithmetic for membership billing.
//!
//! Memberships are billed monthly on the day the student originally paid
//! (or joined). When the following month is shorter, the due date is clamped
//! to that month's last day rather than spilling into the month after.

use chrono::{DateTime, Duration, LocalResult, Months, Offset, TimeZone};

use crate::domain::errors::StudentError;

/// Compute the due date one calendar month after `base`.
///
/// The day of month is kept when the target month has it, otherwise it is
/// clamped to the last day of the target month. Time of day is preserved in
/// `base`'s own timezone.
pub fn advance_due_date<Tz: TimeZone>(base: &DateTime<Tz>) -> Result<DateTime<Tz>, StudentError> {
    let target = base
        .naive_local()
        .checked_add_months(Months::new(1))
        .ok_or(StudentError::DateOutOfRange)?;

    let timezone = base.timezone();
    match timezone.from_local_datetime(&target) {
        LocalResult::Single(due) => Ok(due),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // Wall-clock time skipped by a DST jump: reuse the offset of `base`.
        LocalResult::None => {
            let offset = Duration::seconds(i64::from(base.offset().fix().local_minus_utc()));
            let utc = target
                .checked_sub_signed(offset)
                .ok_or(StudentError::DateOutOfRange)?;
            Ok(timezone.from_utc_datetime(&utc))
        }
    }
}
