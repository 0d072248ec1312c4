//! Daily check-in deduplication.

use std::ops::Range;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};

use crate::domain::errors::StudentError;

/// True if any entry of `attendance_log` falls on the same calendar day as
/// `now`, as seen from `now`'s timezone. Both ends of the day (00:00:00 and
/// 23:59:59) count as inside it.
pub fn has_checked_in_today<Tz: TimeZone>(attendance_log: &[DateTime<Utc>], now: &DateTime<Tz>) -> bool {
    let today = now.date_naive();
    let timezone = now.timezone();

    attendance_log
        .iter()
        .any(|entry| entry.with_timezone(&timezone).date_naive() == today)
}

/// Record a check-in at `now`, returning the extended log.
///
/// Fails with [`StudentError::AlreadyCheckedInToday`] when the student has
/// already checked in on `now`'s calendar day; the input log is never
/// modified.
pub fn record_check_in<Tz: TimeZone>(
    attendance_log: &[DateTime<Utc>],
    now: &DateTime<Tz>,
) -> Result<Vec<DateTime<Utc>>, StudentError> {
    if has_checked_in_today(attendance_log, now) {
        return Err(StudentError::AlreadyCheckedInToday);
    }

    let mut updated = Vec::with_capacity(attendance_log.len() + 1);
    updated.extend_from_slice(attendance_log);
    updated.push(now.with_timezone(&Utc));
    Ok(updated)
}

/// The local calendar day containing `now`, as a half-open UTC range.
///
/// An entry is inside the range exactly when [`has_checked_in_today`] would
/// count it, so storage can enforce the same rule on its own.
pub fn local_day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Range<DateTime<Utc>>, StudentError> {
    let today = now.date_naive();
    let tomorrow = today.succ_opt().ok_or(StudentError::DateOutOfRange)?;
    let timezone = now.timezone();

    Ok(start_of_day(&timezone, today)?..start_of_day(&timezone, tomorrow)?)
}

fn start_of_day<Tz: TimeZone>(timezone: &Tz, day: NaiveDate) -> Result<DateTime<Utc>, StudentError> {
    let midnight = day.and_hms_opt(0, 0, 0).ok_or(StudentError::DateOutOfRange)?;

    match timezone.from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => Ok(start.with_timezone(&Utc)),
        // Midnight skipped by a DST jump: the day starts an hour later.
        LocalResult::None => timezone
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|start| start.with_timezone(&Utc))
            .ok_or(StudentError::DateOutOfRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn buenos_aires() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        buenos_aires()
            .with_ymd_and_hms(2024, 3, day, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_first_check_in_is_appended() {
        let now = at(10, 9, 0, 0);
        let log = record_check_in(&[], &now).unwrap();

        assert_eq!(log, vec![now.with_timezone(&Utc)]);
    }

    #[test]
    fn test_second_check_in_same_day_is_rejected() {
        let morning = at(10, 7, 15, 0);
        let evening = at(10, 20, 40, 0);

        let log = record_check_in(&[], &morning).unwrap();
        let result = record_check_in(&log, &evening);

        assert!(matches!(result, Err(StudentError::AlreadyCheckedInToday)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_check_ins_on_different_days_keep_insertion_order() {
        let first = at(10, 23, 0, 0);
        let second = at(11, 6, 30, 0);

        let log = record_check_in(&[], &first).unwrap();
        let log = record_check_in(&log, &second).unwrap();

        assert_eq!(log, vec![first.with_timezone(&Utc), second.with_timezone(&Utc)]);
    }

    #[test]
    fn test_day_bounds_are_inclusive() {
        let midnight = at(10, 0, 0, 0);
        let last_second = at(10, 23, 59, 59);
        let noon = at(10, 12, 0, 0);

        let log = vec![midnight.with_timezone(&Utc)];
        assert!(has_checked_in_today(&log, &noon));

        let log = vec![last_second.with_timezone(&Utc)];
        assert!(has_checked_in_today(&log, &noon));
    }

    #[test]
    fn test_entries_just_outside_the_day_do_not_count() {
        let yesterday_last_second = at(9, 23, 59, 59);
        let tomorrow_midnight = at(11, 0, 0, 0);
        let now = at(10, 12, 0, 0);

        let log = vec![
            yesterday_last_second.with_timezone(&Utc),
            tomorrow_midnight.with_timezone(&Utc),
        ];

        assert!(!has_checked_in_today(&log, &now));
        assert_eq!(record_check_in(&log, &now).unwrap().len(), 3);
    }

    #[test]
    fn test_local_day_bounds_match_calendar_day() {
        let now = at(10, 12, 0, 0);

        let day = local_day_bounds(&now).unwrap();

        assert_eq!(day.start, at(10, 0, 0, 0).with_timezone(&Utc));
        assert_eq!(day.end, at(11, 0, 0, 0).with_timezone(&Utc));
        assert!(day.contains(&at(10, 23, 59, 59).with_timezone(&Utc)));
        assert!(!day.contains(&at(9, 23, 59, 59).with_timezone(&Utc)));
        assert!(!day.contains(&at(11, 0, 0, 0).with_timezone(&Utc)));
    }

    #[test]
    fn test_day_is_judged_in_local_time() {
        // 22:00 in Buenos Aires is already the next day in UTC.
        let late_local = at(10, 22, 0, 0);
        let next_morning_local = at(11, 8, 0, 0);

        let log = record_check_in(&[], &late_local).unwrap();
        assert_eq!(log[0].date_naive(), chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());

        // Same UTC date, different local dates: allowed.
        let log = record_check_in(&log, &next_morning_local).unwrap();
        assert_eq!(log.len(), 2);
    }
}
