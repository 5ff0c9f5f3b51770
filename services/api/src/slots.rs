use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use mentorhub_common::{hhmm, WeeklySlots};

/// A concrete bookable window: a weekly template entry pinned to a calendar
/// date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSlot {
    pub label: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Translate a mentor's weekly template into the bookable windows of one
/// calendar date.
///
/// Windows marked unavailable are skipped, windows whose start is not
/// strictly in the future relative to `now` are dropped, and the result is
/// sorted by start instant. A date whose weekday has no declared windows
/// resolves to an empty list, not an error. Pure function, no persistence.
pub fn resolve_slots(slots: &WeeklySlots, date: NaiveDate, now: DateTime<Utc>) -> Vec<ResolvedSlot> {
    let mut resolved: Vec<ResolvedSlot> = slots
        .for_weekday(date.weekday())
        .slots
        .iter()
        .filter(|window| window.available)
        .filter_map(|window| {
            let starts_at = date.and_time(window.start).and_utc();
            if starts_at <= now {
                return None;
            }
            Some(ResolvedSlot {
                label: window.label(),
                start: window.start,
                end: window.end,
                starts_at,
                ends_at: date.and_time(window.end).and_utc(),
            })
        })
        .collect();

    resolved.sort_by_key(|slot| slot.starts_at);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use mentorhub_common::SlotWindow;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(start: NaiveTime, end: NaiveTime, available: bool) -> SlotWindow {
        SlotWindow { start, end, available }
    }

    /// Weekly template with a single Monday 09:00-10:00 window.
    fn monday_morning() -> WeeklySlots {
        let mut slots = WeeklySlots::default();
        slots
            .for_weekday_mut(Weekday::Mon)
            .slots
            .push(window(time(9, 0), time(10, 0), true));
        slots
    }

    // 2026-08-10 is a Monday.
    const MONDAY: &str = "2026-08-10";

    #[test]
    fn future_monday_yields_the_window() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let resolved = resolve_slots(&monday_morning(), date, now);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].label, "09:00-10:00");
        assert_eq!(
            resolved[0].starts_at,
            "2026-08-10T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn slot_already_started_today_is_dropped() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let now = "2026-08-10T09:30:00Z".parse::<DateTime<Utc>>().unwrap();

        assert!(resolve_slots(&monday_morning(), date, now).is_empty());
    }

    #[test]
    fn slot_starting_exactly_now_is_not_bookable() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let now = "2026-08-10T09:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert!(resolve_slots(&monday_morning(), date, now).is_empty());
    }

    #[test]
    fn only_remaining_slots_survive_on_the_same_day() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let mut slots = monday_morning();
        slots
            .for_weekday_mut(Weekday::Mon)
            .slots
            .push(window(time(18, 0), time(19, 0), true));

        let now = "2026-08-10T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let resolved = resolve_slots(&slots, date, now);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].label, "18:00-19:00");
    }

    #[test]
    fn unavailable_windows_are_skipped() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let mut slots = WeeklySlots::default();
        slots
            .for_weekday_mut(Weekday::Mon)
            .slots
            .push(window(time(9, 0), time(10, 0), false));

        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(resolve_slots(&slots, date, now).is_empty());
    }

    #[test]
    fn day_without_declared_windows_resolves_empty() {
        // Tuesday has nothing declared in the template.
        let tuesday: NaiveDate = "2026-08-11".parse().unwrap();
        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert!(resolve_slots(&monday_morning(), tuesday, now).is_empty());
    }

    #[test]
    fn results_are_sorted_by_start_instant() {
        let date: NaiveDate = MONDAY.parse().unwrap();
        let mut slots = WeeklySlots::default();
        let day = slots.for_weekday_mut(Weekday::Mon);
        day.slots.push(window(time(18, 0), time(19, 0), true));
        day.slots.push(window(time(9, 0), time(10, 0), true));
        day.slots.push(window(time(14, 0), time(15, 0), true));

        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let labels: Vec<String> = resolve_slots(&slots, date, now)
            .into_iter()
            .map(|slot| slot.label)
            .collect();

        assert_eq!(labels, ["09:00-10:00", "14:00-15:00", "18:00-19:00"]);
    }
}
