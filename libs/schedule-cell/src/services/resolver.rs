// libs/schedule-cell/src/services/resolver.rs
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{
    DayAvailability, OverlapReport, ScheduleError, ScheduleRange, WeeklyTemplate,
};

/// Source label reported when no override range governs a date.
pub const DEFAULT_SOURCE: &str = "Standard Hours";

/// Pick the override governing `date`, if any.
///
/// Highest priority wins. Ties fall to the most recently created range,
/// then the lexicographically largest name, then the largest id, so the
/// outcome is total and never depends on input order.
pub fn select_range(date: NaiveDate, ranges: &[ScheduleRange]) -> Option<&ScheduleRange> {
    ranges
        .iter()
        .filter(|range| range.contains(date))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Resolve the clinic's availability for a single calendar date.
///
/// Pure function: no IO, no shared state, identical inputs always yield
/// identical output.
pub fn resolve(
    date: NaiveDate,
    ranges: &[ScheduleRange],
    default_template: &WeeklyTemplate,
) -> DayAvailability {
    let (entry, source) = match select_range(date, ranges) {
        Some(range) => (range.template.day(date.weekday()), range.name.as_str()),
        None => (default_template.day(date.weekday()), DEFAULT_SOURCE),
    };

    if entry.active {
        DayAvailability {
            date,
            is_open: true,
            open: Some(entry.open),
            close: Some(entry.close),
            source: source.to_string(),
        }
    } else {
        DayAvailability {
            date,
            is_open: false,
            open: None,
            close: None,
            source: source.to_string(),
        }
    }
}

/// Resolve a run of consecutive dates starting at `start`.
pub fn resolve_span(
    start: NaiveDate,
    days: u32,
    ranges: &[ScheduleRange],
    default_template: &WeeklyTemplate,
) -> Vec<DayAvailability> {
    (0..days)
        .map(|offset| resolve(start + Duration::days(offset as i64), ranges, default_template))
        .collect()
}

/// Validate a range before it is written. Rejections happen here, before
/// any document is persisted.
pub fn validate_range(
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    template: &WeeklyTemplate,
    priority: i32,
) -> Result<(), ScheduleError> {
    if name.trim().is_empty() {
        return Err(ScheduleError::EmptyName);
    }

    if end_date < start_date {
        return Err(ScheduleError::InvalidDateRange);
    }

    if priority < 0 {
        return Err(ScheduleError::NegativePriority);
    }

    for (day, hours) in template.entries() {
        if hours.active && hours.open >= hours.close {
            return Err(ScheduleError::InvalidHours { day: day.to_string() });
        }
    }

    Ok(())
}

/// Report every pair of ranges whose date spans intersect. Equal-priority
/// pairs are flagged since their resolution falls to the tie-break.
pub fn find_overlaps(ranges: &[ScheduleRange]) -> Vec<OverlapReport> {
    let mut reports = Vec::new();

    for (i, first) in ranges.iter().enumerate() {
        for second in &ranges[i + 1..] {
            if first.start_date <= second.end_date && second.start_date <= first.end_date {
                reports.push(OverlapReport {
                    first_id: first.id.clone(),
                    first_name: first.name.clone(),
                    second_id: second.id.clone(),
                    second_name: second.name.clone(),
                    overlap_start: first.start_date.max(second.start_date),
                    overlap_end: first.end_date.min(second.end_date),
                    same_priority: first.priority == second.priority,
                });
            }
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayHours;
    use chrono::{DateTime, NaiveTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn created(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn range(
        id: &str,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        template: WeeklyTemplate,
        priority: i32,
        created_at: &str,
    ) -> ScheduleRange {
        ScheduleRange {
            id: id.to_string(),
            name: name.to_string(),
            start_date: start,
            end_date: end,
            template,
            priority,
            created_at: created(created_at),
        }
    }

    fn sunday_open_template() -> WeeklyTemplate {
        let mut template = WeeklyTemplate::clinic_default();
        template.sunday = DayHours::open_between(time(10, 0), time(14, 0));
        template
    }

    #[test]
    fn falls_back_to_default_template_for_every_weekday() {
        let default = WeeklyTemplate::clinic_default();

        // 2025-06-02 is a Monday; walk the whole week.
        for offset in 0..7 {
            let day = date(2025, 6, 2) + Duration::days(offset);
            let resolved = resolve(day, &[], &default);

            assert_eq!(resolved.source, DEFAULT_SOURCE);
            assert_eq!(resolved.is_open, default.day(day.weekday()).active);
        }

        let sunday = resolve(date(2025, 6, 8), &[], &default);
        assert!(!sunday.is_open);
        assert_eq!(sunday.open, None);
        assert_eq!(sunday.close, None);
    }

    #[test]
    fn single_matching_range_wins_over_default() {
        let default = WeeklyTemplate::clinic_default();
        let summer = range(
            "sch-1",
            "Summer Hours",
            date(2025, 7, 1),
            date(2025, 8, 31),
            sunday_open_template(),
            0,
            "2025-05-01T00:00:00Z",
        );

        // Sunday inside the span comes from the override even at priority 0.
        let inside = resolve(date(2025, 7, 6), &[summer.clone()], &default);
        assert!(inside.is_open);
        assert_eq!(inside.source, "Summer Hours");

        // A date outside the span still falls back.
        let outside = resolve(date(2025, 9, 7), &[summer], &default);
        assert!(!outside.is_open);
        assert_eq!(outside.source, DEFAULT_SOURCE);
    }

    #[test]
    fn higher_priority_wins_regardless_of_input_order() {
        let default = WeeklyTemplate::clinic_default();
        let low = range(
            "sch-1",
            "Renovation",
            date(2025, 12, 20),
            date(2026, 1, 5),
            WeeklyTemplate::all_closed(),
            1,
            "2025-11-01T00:00:00Z",
        );
        let high = range(
            "sch-2",
            "Holiday Week",
            date(2025, 12, 24),
            date(2026, 1, 1),
            sunday_open_template(),
            10,
            "2025-10-01T00:00:00Z",
        );

        let day = date(2025, 12, 28);
        let forward = resolve(day, &[low.clone(), high.clone()], &default);
        let reversed = resolve(day, &[high, low], &default);

        assert_eq!(forward, reversed);
        assert_eq!(forward.source, "Holiday Week");
    }

    #[test]
    fn priority_tie_falls_to_most_recently_created_then_name() {
        let default = WeeklyTemplate::clinic_default();
        let older = range(
            "sch-1",
            "Alpha",
            date(2025, 3, 1),
            date(2025, 3, 31),
            WeeklyTemplate::all_closed(),
            5,
            "2025-01-01T00:00:00Z",
        );
        let newer = range(
            "sch-2",
            "Beta",
            date(2025, 3, 1),
            date(2025, 3, 31),
            sunday_open_template(),
            5,
            "2025-02-01T00:00:00Z",
        );

        let day = date(2025, 3, 10);
        let candidates = [older.clone(), newer.clone()];
        let winner = select_range(day, &candidates).unwrap();
        assert_eq!(winner.id, "sch-2");

        // Same creation instant: the larger name wins.
        let twin_a = range(
            "sch-3",
            "Aardvark Week",
            date(2025, 4, 1),
            date(2025, 4, 7),
            WeeklyTemplate::all_closed(),
            5,
            "2025-02-01T00:00:00Z",
        );
        let twin_b = range(
            "sch-4",
            "Zebra Week",
            date(2025, 4, 1),
            date(2025, 4, 7),
            sunday_open_template(),
            5,
            "2025-02-01T00:00:00Z",
        );

        let tie_day = date(2025, 4, 3);
        let forward = select_range(tie_day, &[twin_a.clone(), twin_b.clone()]).unwrap().id.clone();
        let reversed = select_range(tie_day, &[twin_b, twin_a]).unwrap().id.clone();
        assert_eq!(forward, "sch-4");
        assert_eq!(forward, reversed);
    }

    #[test]
    fn resolve_is_pure() {
        let default = WeeklyTemplate::clinic_default();
        let ranges = vec![range(
            "sch-1",
            "Holiday Week",
            date(2025, 12, 24),
            date(2026, 1, 1),
            sunday_open_template(),
            10,
            "2025-10-01T00:00:00Z",
        )];

        let day = date(2025, 12, 28);
        assert_eq!(
            resolve(day, &ranges, &default),
            resolve(day, &ranges, &default)
        );
    }

    #[test]
    fn fully_closed_range_is_valid_and_yields_closed_days() {
        let default = WeeklyTemplate::clinic_default();
        let closed = WeeklyTemplate::all_closed();

        assert!(validate_range("Renovation", date(2025, 5, 1), date(2025, 5, 14), &closed, 10).is_ok());

        let ranges = vec![range(
            "sch-1",
            "Renovation",
            date(2025, 5, 1),
            date(2025, 5, 14),
            closed,
            10,
            "2025-04-01T00:00:00Z",
        )];

        // A weekday the default would keep open.
        let resolved = resolve(date(2025, 5, 6), &ranges, &default);
        assert!(!resolved.is_open);
        assert_eq!(resolved.source, "Renovation");
    }

    #[test]
    fn holiday_week_scenario() {
        // Default keeps Sunday closed; "Holiday Week" opens it 10:00-14:00.
        let default = WeeklyTemplate::clinic_default();
        let ranges = vec![range(
            "sch-1",
            "Holiday Week",
            date(2025, 12, 24),
            date(2026, 1, 1),
            sunday_open_template(),
            10,
            "2025-10-01T00:00:00Z",
        )];

        // Dec 28 2025 is a Sunday inside the range.
        let inside = resolve(date(2025, 12, 28), &ranges, &default);
        assert_eq!(
            inside,
            DayAvailability {
                date: date(2025, 12, 28),
                is_open: true,
                open: Some(time(10, 0)),
                close: Some(time(14, 0)),
                source: "Holiday Week".to_string(),
            }
        );

        // Jan 18 2026 is a Sunday outside the range: closed from default.
        let outside = resolve(date(2026, 1, 18), &ranges, &default);
        assert!(!outside.is_open);
        assert_eq!(outside.source, DEFAULT_SOURCE);
    }

    #[test]
    fn resolve_span_covers_consecutive_dates() {
        let default = WeeklyTemplate::clinic_default();
        let week = resolve_span(date(2025, 6, 2), 7, &[], &default);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2025, 6, 2));
        assert_eq!(week[6].date, date(2025, 6, 8));
        assert!(week[0].is_open);
        assert!(!week[6].is_open);
    }

    #[test]
    fn validation_rejects_malformed_ranges() {
        let template = WeeklyTemplate::clinic_default();

        assert!(matches!(
            validate_range("Backwards", date(2025, 5, 10), date(2025, 5, 1), &template, 10),
            Err(ScheduleError::InvalidDateRange)
        ));

        assert!(matches!(
            validate_range("", date(2025, 5, 1), date(2025, 5, 10), &template, 10),
            Err(ScheduleError::EmptyName)
        ));

        assert!(matches!(
            validate_range("Negative", date(2025, 5, 1), date(2025, 5, 10), &template, -1),
            Err(ScheduleError::NegativePriority)
        ));

        let mut inverted = WeeklyTemplate::clinic_default();
        inverted.tuesday = DayHours::open_between(time(17, 0), time(9, 0));
        assert!(matches!(
            validate_range("Inverted", date(2025, 5, 1), date(2025, 5, 10), &inverted, 10),
            Err(ScheduleError::InvalidHours { .. })
        ));

        // Equal open/close on an active day is rejected too.
        let mut flat = WeeklyTemplate::clinic_default();
        flat.friday = DayHours::open_between(time(9, 0), time(9, 0));
        assert!(matches!(
            validate_range("Flat", date(2025, 5, 1), date(2025, 5, 10), &flat, 10),
            Err(ScheduleError::InvalidHours { .. })
        ));
    }

    #[test]
    fn overlap_report_flags_intersecting_spans() {
        let a = range(
            "sch-1",
            "Summer Hours",
            date(2025, 7, 1),
            date(2025, 8, 31),
            WeeklyTemplate::clinic_default(),
            10,
            "2025-05-01T00:00:00Z",
        );
        let b = range(
            "sch-2",
            "August Closure",
            date(2025, 8, 15),
            date(2025, 9, 15),
            WeeklyTemplate::all_closed(),
            10,
            "2025-06-01T00:00:00Z",
        );
        let c = range(
            "sch-3",
            "Winter Hours",
            date(2025, 12, 1),
            date(2025, 12, 31),
            WeeklyTemplate::clinic_default(),
            5,
            "2025-07-01T00:00:00Z",
        );

        let reports = find_overlaps(&[a, b, c]);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.first_id, "sch-1");
        assert_eq!(report.second_id, "sch-2");
        assert_eq!(report.overlap_start, date(2025, 8, 15));
        assert_eq!(report.overlap_end, date(2025, 8, 31));
        assert!(report.same_priority);
    }
}
