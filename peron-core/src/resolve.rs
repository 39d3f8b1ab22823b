//! Day-type inference and the next-departure search.
//!
//! The search is a pure function of the direction's timetables, an explicit
//! "now", and the active policy: expand today's table into concrete
//! instants, keep those at or after now, and take the minimum; if today is
//! exhausted, fall back to the first slot of tomorrow under tomorrow's own
//! day-type (a Friday evening rolls into the weekend table).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Weekday};

use crate::model::{DayType, DayTypePolicy, Departure, DirectionEntry, HourTable, Timetable};

/// Map a calendar date and the active policy to a day-type.
#[must_use]
pub fn resolve_day_type(date: impl Datelike, policy: DayTypePolicy) -> DayType {
    match policy {
        DayTypePolicy::ForcedWeekday => DayType::Weekday,
        DayTypePolicy::ForcedWeekend => DayType::Weekend,
        DayTypePolicy::Auto => match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        },
    }
}

/// Earliest slot of `table` anchored to `date`, restricted to instants at
/// or after `not_before` when given (inclusive boundary: a slot exactly at
/// `not_before` still counts).
fn earliest_slot(
    table: &HourTable,
    date: NaiveDate,
    offset: FixedOffset,
    not_before: Option<DateTime<FixedOffset>>,
) -> Option<DateTime<FixedOffset>> {
    table
        .slots()
        .filter_map(|(hour, minute)| {
            let naive = date.and_hms_opt(u32::from(hour), u32::from(minute), 0)?;
            offset.from_local_datetime(&naive).single()
        })
        .filter(|instant| not_before.map_or(true, |floor| *instant >= floor))
        .min()
}

/// Next departure for one direction, searching today's remaining slots and
/// then tomorrow's first slot.
///
/// Tomorrow is the calendar successor of today's date, so the fallback is
/// exact across month and year boundaries, and its day-type is resolved
/// independently of today's. `None` means no service either day — a normal
/// outcome, not a failure.
#[must_use]
pub fn next_departure(
    entry: &DirectionEntry,
    now: DateTime<FixedOffset>,
    policy: DayTypePolicy,
) -> Option<Departure> {
    let offset = *now.offset();
    let today = now.date_naive();
    let today_type = resolve_day_type(today, policy);

    if let Some(table) = entry.table(today_type)
        && let Some(departure) = earliest_slot(table, today, offset, Some(now))
    {
        return Some(Departure {
            departure,
            day_type: today_type,
            is_tomorrow: false,
        });
    }

    let tomorrow = today.succ_opt()?;
    let tomorrow_type = resolve_day_type(tomorrow, policy);
    let table = entry.table(tomorrow_type)?;
    let departure = earliest_slot(table, tomorrow, offset, None)?;

    Some(Departure {
        departure,
        day_type: tomorrow_type,
        is_tomorrow: true,
    })
}

impl Timetable {
    /// [`next_departure`] for a station/direction pair looked up in this
    /// timetable. Absent pairs resolve to `None` like exhausted tables do.
    #[must_use]
    pub fn next_departure(
        &self,
        station: &str,
        direction: &str,
        now: DateTime<FixedOffset>,
        policy: DayTypePolicy,
    ) -> Option<Departure> {
        let entry = self.lookup(station, direction)?;
        next_departure(entry, now, policy)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone};

    use super::{next_departure, resolve_day_type};
    use crate::clock::target_offset;
    use crate::model::{DayType, DayTypePolicy, DirectionEntry, HourTable, StationEntry, Timetable};

    // 2024-01-08 was a Monday.
    const MONDAY: (i32, u32, u32) = (2024, 1, 8);
    const TUESDAY: (i32, u32, u32) = (2024, 1, 9);
    const FRIDAY: (i32, u32, u32) = (2024, 1, 12);
    const SATURDAY: (i32, u32, u32) = (2024, 1, 13);

    fn at(date: (i32, u32, u32), hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        target_offset()
            .with_ymd_and_hms(date.0, date.1, date.2, hour, minute, second)
            .single()
            .expect("test instant is unambiguous")
    }

    fn table(entries: &[(u8, &[u8])]) -> HourTable {
        HourTable {
            hours: entries
                .iter()
                .map(|(hour, minutes)| (*hour, minutes.to_vec()))
                .collect(),
        }
    }

    fn entry(weekday: Option<HourTable>, weekend: Option<HourTable>) -> DirectionEntry {
        DirectionEntry { weekday, weekend }
    }

    #[test]
    fn auto_policy_follows_the_calendar() {
        let monday = NaiveDate::from_ymd_opt(MONDAY.0, MONDAY.1, MONDAY.2).expect("valid date");
        let saturday =
            NaiveDate::from_ymd_opt(SATURDAY.0, SATURDAY.1, SATURDAY.2).expect("valid date");
        assert_eq!(
            resolve_day_type(monday, DayTypePolicy::Auto),
            DayType::Weekday
        );
        assert_eq!(
            resolve_day_type(saturday, DayTypePolicy::Auto),
            DayType::Weekend
        );
    }

    #[test]
    fn forced_weekend_overrides_an_actual_tuesday() {
        let tuesday = NaiveDate::from_ymd_opt(TUESDAY.0, TUESDAY.1, TUESDAY.2).expect("valid date");
        assert_eq!(
            resolve_day_type(tuesday, DayTypePolicy::ForcedWeekend),
            DayType::Weekend
        );
        assert_eq!(
            resolve_day_type(tuesday, DayTypePolicy::ForcedWeekday),
            DayType::Weekday
        );
    }

    #[test]
    fn finds_the_next_slot_later_today() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), Some(table(&[(9, &[0])])));
        let result = next_departure(&dir, at(MONDAY, 8, 15, 0), DayTypePolicy::Auto)
            .expect("a slot remains today");
        assert_eq!(result.departure, at(MONDAY, 8, 30, 0));
        assert_eq!(result.day_type, DayType::Weekday);
        assert!(!result.is_tomorrow);
    }

    #[test]
    fn slot_exactly_at_now_counts_as_next() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), None);
        let now = at(MONDAY, 8, 30, 0);
        let result = next_departure(&dir, now, DayTypePolicy::Auto).expect("inclusive boundary");
        assert_eq!(result.departure, now);
        assert!(!result.is_tomorrow);
    }

    #[test]
    fn one_second_past_the_last_slot_rolls_to_tomorrow() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), Some(table(&[(9, &[0])])));
        let result = next_departure(&dir, at(MONDAY, 8, 30, 1), DayTypePolicy::Auto)
            .expect("tomorrow has service");
        assert_eq!(result.departure, at(TUESDAY, 8, 0, 0));
        assert_eq!(result.day_type, DayType::Weekday);
        assert!(result.is_tomorrow);
    }

    #[test]
    fn weekend_table_is_used_on_a_saturday() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), Some(table(&[(9, &[0])])));
        let result = next_departure(&dir, at(SATURDAY, 8, 0, 0), DayTypePolicy::Auto)
            .expect("weekend service exists");
        assert_eq!(result.departure, at(SATURDAY, 9, 0, 0));
        assert_eq!(result.day_type, DayType::Weekend);
        assert!(!result.is_tomorrow);
    }

    #[test]
    fn friday_evening_falls_back_to_the_weekend_table() {
        let dir = entry(Some(table(&[(8, &[0])])), Some(table(&[(6, &[15])])));
        let now = at(FRIDAY, 23, 50, 0);
        let result =
            next_departure(&dir, now, DayTypePolicy::Auto).expect("saturday service exists");
        assert_eq!(result.departure, at(SATURDAY, 6, 15, 0));
        assert_eq!(result.day_type, DayType::Weekend, "tomorrow's own day-type");
        assert!(result.is_tomorrow);
        assert!(result.departure > now);
        assert!(result.departure <= now + Duration::hours(24));
    }

    #[test]
    fn tomorrow_fallback_takes_the_earliest_slot() {
        let dir = entry(Some(table(&[(5, &[40]), (4, &[55, 10])])), None);
        let result = next_departure(&dir, at(MONDAY, 23, 0, 0), DayTypePolicy::Auto)
            .expect("tuesday service exists");
        assert_eq!(result.departure, at(TUESDAY, 4, 10, 0));
        assert!(result.is_tomorrow);
    }

    #[test]
    fn year_boundary_rollover_is_exact() {
        // 2024-12-31 was a Tuesday; both days are weekdays.
        let dir = entry(Some(table(&[(7, &[5])])), None);
        let result = next_departure(&dir, at((2024, 12, 31), 23, 59, 0), DayTypePolicy::Auto)
            .expect("new year's day still has service");
        assert_eq!(result.departure, at((2025, 1, 1), 7, 5, 0));
        assert!(result.is_tomorrow);
    }

    #[test]
    fn absent_and_empty_tables_resolve_to_none() {
        let no_service = entry(None, None);
        assert!(next_departure(&no_service, at(MONDAY, 12, 0, 0), DayTypePolicy::Auto).is_none());

        // Present but empty tables are the same outcome, not an error.
        let empty = entry(Some(HourTable::default()), Some(HourTable::default()));
        assert!(next_departure(&empty, at(MONDAY, 12, 0, 0), DayTypePolicy::Auto).is_none());
    }

    #[test]
    fn forced_weekend_pins_both_today_and_tomorrow() {
        let dir = entry(Some(table(&[(8, &[0])])), Some(table(&[(10, &[20])])));
        let result = next_departure(&dir, at(TUESDAY, 9, 0, 0), DayTypePolicy::ForcedWeekend)
            .expect("weekend table has a later slot");
        assert_eq!(result.departure, at(TUESDAY, 10, 20, 0));
        assert_eq!(result.day_type, DayType::Weekend);
        assert!(!result.is_tomorrow);
    }

    #[test]
    fn unsorted_and_duplicate_minutes_collapse_under_minimum() {
        let dir = entry(Some(table(&[(8, &[45, 10, 10])])), None);
        let result = next_departure(&dir, at(MONDAY, 8, 0, 0), DayTypePolicy::Auto)
            .expect("service exists");
        assert_eq!(result.departure, at(MONDAY, 8, 10, 0));
    }

    #[test]
    fn resolution_is_idempotent_for_identical_inputs() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), Some(table(&[(9, &[0])])));
        let now = at(MONDAY, 8, 15, 0);
        let first = next_departure(&dir, now, DayTypePolicy::Auto);
        let second = next_departure(&dir, now, DayTypePolicy::Auto);
        assert_eq!(first, second);
    }

    #[test]
    fn timetable_wrapper_resolves_lookups_and_absence() {
        let dir = entry(Some(table(&[(8, &[0, 30])])), Some(table(&[(9, &[0])])));
        let station = StationEntry {
            directions: BTreeMap::from([("to_south".to_owned(), dir)]),
        };
        let timetable = Timetable::new(BTreeMap::from([("StationA".to_owned(), station)]));

        // Monday 08:15 resolves to the 08:30 weekday slot.
        let hit = timetable
            .next_departure("StationA", "to_south", at(MONDAY, 8, 15, 0), DayTypePolicy::Auto)
            .expect("slot remains");
        assert_eq!(hit.departure, at(MONDAY, 8, 30, 0));
        assert_eq!(hit.day_type, DayType::Weekday);
        assert!(!hit.is_tomorrow);

        // Monday 08:45 exhausts today; Tuesday's weekday 08:00 wins.
        let rolled = timetable
            .next_departure("StationA", "to_south", at(MONDAY, 8, 45, 0), DayTypePolicy::Auto)
            .expect("tomorrow has service");
        assert_eq!(rolled.departure, at(TUESDAY, 8, 0, 0));
        assert!(rolled.is_tomorrow);

        // Unknown pairs are the normal "no service" signal.
        assert!(
            timetable
                .next_departure("StationA", "to_north", at(MONDAY, 8, 15, 0), DayTypePolicy::Auto)
                .is_none()
        );
        assert!(
            timetable
                .next_departure("StationB", "to_south", at(MONDAY, 8, 15, 0), DayTypePolicy::Auto)
                .is_none()
        );
    }
}
