//! Resolves a period kind and a reference instant into a calendar window.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use xpense_domain::{PeriodKind, PeriodWindow, WeekStart};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodResolver {
    week_start: WeekStart,
}

impl PeriodResolver {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Returns the first and last instant (to the second) of the calendar
    /// unit that contains `reference`.
    pub fn resolve(&self, period: PeriodKind, reference: NaiveDateTime) -> PeriodWindow {
        let date = reference.date();
        let (first, next) = match period {
            PeriodKind::Monthly => {
                let first = date - Duration::days(i64::from(date.day0()));
                (first, first.checked_add_months(Months::new(1)))
            }
            PeriodKind::Weekly => {
                let offset = match self.week_start {
                    WeekStart::Sunday => date.weekday().num_days_from_sunday(),
                    WeekStart::Monday => date.weekday().num_days_from_monday(),
                };
                let first = date - Duration::days(i64::from(offset));
                (first, first.checked_add_signed(Duration::days(7)))
            }
            PeriodKind::Yearly => {
                let first = date - Duration::days(i64::from(date.ordinal0()));
                (first, NaiveDate::from_ymd_opt(date.year() + 1, 1, 1))
            }
        };
        PeriodWindow {
            start: start_of_day(first),
            end: next
                .map(|day| start_of_day(day) - Duration::seconds(1))
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// Window of the calendar month containing `reference`.
    pub fn month_of(&self, reference: NaiveDateTime) -> PeriodWindow {
        self.resolve(PeriodKind::Monthly, reference)
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn monthly_window_covers_leap_february() {
        let window = PeriodResolver::default().resolve(PeriodKind::Monthly, at(2024, 2, 15, 10, 30, 0));
        assert_eq!(window.start, at(2024, 2, 1, 0, 0, 0));
        assert_eq!(window.end, at(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn monthly_window_handles_december() {
        let window = PeriodResolver::default().resolve(PeriodKind::Monthly, at(2023, 12, 31, 23, 59, 59));
        assert_eq!(window.start, at(2023, 12, 1, 0, 0, 0));
        assert_eq!(window.end, at(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn weekly_window_starts_on_sunday_by_default() {
        // 2024-03-13 is a Wednesday.
        let window = PeriodResolver::default().resolve(PeriodKind::Weekly, at(2024, 3, 13, 8, 0, 0));
        assert_eq!(window.start, at(2024, 3, 10, 0, 0, 0));
        assert_eq!(window.end, at(2024, 3, 16, 23, 59, 59));
    }

    #[test]
    fn weekly_window_respects_monday_start() {
        let resolver = PeriodResolver::new(WeekStart::Monday);
        let window = resolver.resolve(PeriodKind::Weekly, at(2024, 3, 10, 8, 0, 0));
        assert_eq!(window.start, at(2024, 3, 4, 0, 0, 0));
        assert_eq!(window.end, at(2024, 3, 10, 23, 59, 59));
    }

    #[test]
    fn weekly_window_on_first_day_starts_same_day() {
        let window = PeriodResolver::default().resolve(PeriodKind::Weekly, at(2024, 3, 10, 0, 0, 0));
        assert_eq!(window.start, at(2024, 3, 10, 0, 0, 0));
    }

    #[test]
    fn yearly_window_spans_calendar_year() {
        let window = PeriodResolver::default().resolve(PeriodKind::Yearly, at(2024, 7, 4, 12, 0, 0));
        assert_eq!(window.start, at(2024, 1, 1, 0, 0, 0));
        assert_eq!(window.end, at(2024, 12, 31, 23, 59, 59));
    }

    #[test]
    fn every_window_contains_its_reference() {
        let resolver = PeriodResolver::default();
        let mut day = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        while day <= last {
            let reference = day.and_hms_opt(13, 45, 0).unwrap();
            for period in [PeriodKind::Monthly, PeriodKind::Weekly, PeriodKind::Yearly] {
                let window = resolver.resolve(period, reference);
                assert!(window.start <= window.end);
                assert!(window.contains(reference), "{period} {reference}");
                assert_eq!(window.start.time(), NaiveTime::MIN);
                assert_eq!(window.end.time(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
            }
            day = day.succ_opt().unwrap();
        }
    }
}
