//! Turns a reporting granularity and a reference date into a concrete date range and the ordered
//! buckets that transactions are grouped into.

use crate::format::month_name;
use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Reporting granularity.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The reference day in six four-hour bands.
    Daily,
    /// The ISO week of the reference day, Monday to Sunday.
    Weekly,
    /// The reference month, one bucket per day.
    #[default]
    Monthly,
    /// The reference year, one bucket per month.
    Yearly,
}

serde_plain::derive_display_from_serialize!(Period);
serde_plain::derive_fromstr_from_deserialize!(Period);

const WEEKDAYS: [&str; 7] = ["Sen", "Sel", "Rab", "Kam", "Jum", "Sab", "Min"];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// A calendar date range. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the ends if they are given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The first instant of the range.
    pub fn start_time(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// The first instant after the range.
    pub fn end_exclusive(&self) -> NaiveDateTime {
        after_day(self.end)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start_time() && at < self.end_exclusive()
    }

    /// The smallest range covering both `self` and `other`.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// One bucket of a resolved period: a label and the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BucketSpec {
    fn new(label: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

/// An ISO-8601 year and week number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsoWeekId {
    pub year: i32,
    pub week: u32,
}

/// A period pinned to a concrete date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    period: Period,
    reference: NaiveDate,
    range: DateRange,
    buckets: Vec<BucketSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iso_week: Option<IsoWeekId>,
}

impl Resolved {
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Buckets in chronological order. They tile the range without gaps or overlaps.
    pub fn buckets(&self) -> &[BucketSpec] {
        &self.buckets
    }

    /// Set for weekly periods only.
    pub fn iso_week(&self) -> Option<IsoWeekId> {
        self.iso_week
    }

    /// The equivalent period immediately before this one. At the lower edge of the calendar the
    /// period itself is returned.
    pub fn previous(&self) -> Resolved {
        let start = self.range.start;
        let prior = match self.period {
            Period::Daily => start.pred_opt(),
            Period::Weekly => start.checked_sub_days(Days::new(7)),
            Period::Monthly | Period::Yearly => start.pred_opt(),
        };
        match prior {
            Some(reference) => resolve(self.period, reference),
            None => self.clone(),
        }
    }

    /// A human readable name for the period, e.g. `Januari 2024` or `Minggu 1, 2024`.
    pub fn title(&self) -> String {
        let r = self.reference;
        match (self.period, self.iso_week) {
            (Period::Daily, _) => format!("{} {} {}", r.day(), month_name(r.month()), r.year()),
            (Period::Weekly, Some(w)) => format!("Minggu {}, {}", w.week, w.year),
            (Period::Weekly, None) => String::new(),
            (Period::Monthly, _) => format!("{} {}", month_name(r.month()), r.year()),
            (Period::Yearly, _) => r.year().to_string(),
        }
    }
}

/// Resolves `period` around `reference`.
pub fn resolve(period: Period, reference: NaiveDate) -> Resolved {
    match period {
        Period::Daily => daily(reference),
        Period::Weekly => weekly(reference),
        Period::Monthly => monthly(reference),
        Period::Yearly => yearly(reference),
    }
}

fn daily(reference: NaiveDate) -> Resolved {
    let day_start = reference.and_time(NaiveTime::MIN);
    let day_end = after_day(reference);
    let buckets = (0..6)
        .map(|i| {
            let start = shift(day_start, Duration::hours(4 * i));
            let end = if i == 5 {
                day_end
            } else {
                shift(day_start, Duration::hours(4 * (i + 1)))
            };
            BucketSpec::new(format!("{:02}:00", 4 * i), start, end)
        })
        .collect();
    Resolved {
        period: Period::Daily,
        reference,
        range: DateRange::new(reference, reference),
        buckets,
        iso_week: None,
    }
}

fn weekly(reference: NaiveDate) -> Resolved {
    let offset = u64::from(reference.weekday().num_days_from_monday());
    let monday = reference.checked_sub_days(Days::new(offset)).unwrap_or(reference);
    let mut buckets = Vec::with_capacity(7);
    let mut day = monday;
    for label in WEEKDAYS {
        buckets.push(BucketSpec::new(
            label,
            day.and_time(NaiveTime::MIN),
            after_day(day),
        ));
        match day.succ_opt() {
            Some(next) if label != "Min" => day = next,
            _ => break,
        }
    }
    let iso = reference.iso_week();
    Resolved {
        period: Period::Weekly,
        reference,
        range: DateRange::new(monday, day),
        buckets,
        iso_week: Some(IsoWeekId {
            year: iso.year(),
            week: iso.week(),
        }),
    }
}

fn monthly(reference: NaiveDate) -> Resolved {
    let (first, last) = month_bounds(reference);
    let buckets = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| BucketSpec::new(d.day().to_string(), d.and_time(NaiveTime::MIN), after_day(d)))
        .collect();
    Resolved {
        period: Period::Monthly,
        reference,
        range: DateRange::new(first, last),
        buckets,
        iso_week: None,
    }
}

fn yearly(reference: NaiveDate) -> Resolved {
    let mut buckets = Vec::with_capacity(12);
    let mut first = reference;
    let mut last = reference;
    for (i, label) in MONTHS_SHORT.iter().enumerate() {
        let Some(month_start) = NaiveDate::from_ymd_opt(reference.year(), i as u32 + 1, 1) else {
            continue;
        };
        let (start, end) = month_bounds(month_start);
        if i == 0 {
            first = start;
        }
        last = end;
        buckets.push(BucketSpec::new(
            *label,
            start.and_time(NaiveTime::MIN),
            after_day(end),
        ));
    }
    Resolved {
        period: Period::Yearly,
        reference,
        range: DateRange::new(first, last),
        buckets,
        iso_week: None,
    }
}

/// First and last day of the month containing `date`.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last.max(first))
}

/// Midnight after `day`, saturating at the end of the calendar.
fn after_day(day: NaiveDate) -> NaiveDateTime {
    day.succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX)
}

fn shift(at: NaiveDateTime, by: Duration) -> NaiveDateTime {
    at.checked_add_signed(by).unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn labels(r: &Resolved) -> Vec<&str> {
        r.buckets().iter().map(|b| b.label.as_str()).collect()
    }

    fn assert_tiles(r: &Resolved) {
        let b = r.buckets();
        assert_eq!(b.first().unwrap().start, r.range().start_time());
        assert_eq!(b.last().unwrap().end, r.range().end_exclusive());
        for pair in b.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!(Period::from_str("weekly").unwrap(), Period::Weekly);
        assert_eq!(Period::Yearly.to_string(), "yearly");
        assert!(Period::from_str("hourly").is_err());
    }

    #[test]
    fn test_daily() {
        let r = resolve(Period::Daily, date(2024, 3, 15));
        assert_eq!(
            labels(&r),
            vec!["00:00", "04:00", "08:00", "12:00", "16:00", "20:00"]
        );
        assert_eq!(r.range().start(), date(2024, 3, 15));
        assert_eq!(r.range().end(), date(2024, 3, 15));
        assert_tiles(&r);
        assert_eq!(r.previous().range().start(), date(2024, 3, 14));
    }

    #[test]
    fn test_weekly_iso_week_one() {
        let r = resolve(Period::Weekly, date(2024, 1, 1));
        assert_eq!(r.iso_week(), Some(IsoWeekId { year: 2024, week: 1 }));
        assert_eq!(r.range().start(), date(2024, 1, 1));
        assert_eq!(r.range().end(), date(2024, 1, 7));
        assert_eq!(
            labels(&r),
            vec!["Sen", "Sel", "Rab", "Kam", "Jum", "Sab", "Min"]
        );
        assert_tiles(&r);
    }

    #[test]
    fn test_weekly_crosses_year() {
        // Sunday 2023-01-01 belongs to ISO week 52 of 2022.
        let r = resolve(Period::Weekly, date(2023, 1, 1));
        assert_eq!(r.iso_week(), Some(IsoWeekId { year: 2022, week: 52 }));
        assert_eq!(r.range().start(), date(2022, 12, 26));
        assert_eq!(r.title(), "Minggu 52, 2022");

        let prev = resolve(Period::Weekly, date(2024, 1, 3)).previous();
        assert_eq!(prev.iso_week(), Some(IsoWeekId { year: 2023, week: 52 }));
        assert_eq!(prev.range().start(), date(2023, 12, 25));
    }

    #[test]
    fn test_monthly() {
        let r = resolve(Period::Monthly, date(2024, 2, 10));
        assert_eq!(r.buckets().len(), 29);
        assert_eq!(r.buckets()[0].label, "1");
        assert_eq!(r.buckets()[28].label, "29");
        assert_eq!(r.range().end(), date(2024, 2, 29));
        assert_tiles(&r);
        assert_eq!(r.title(), "Februari 2024");

        let prev = resolve(Period::Monthly, date(2024, 1, 31)).previous();
        assert_eq!(prev.range().start(), date(2023, 12, 1));
        assert_eq!(prev.range().end(), date(2023, 12, 31));
    }

    #[test]
    fn test_yearly() {
        let r = resolve(Period::Yearly, date(2024, 7, 4));
        assert_eq!(r.buckets().len(), 12);
        assert_eq!(r.buckets()[4].label, "Mei");
        assert_eq!(r.range().start(), date(2024, 1, 1));
        assert_eq!(r.range().end(), date(2024, 12, 31));
        assert_tiles(&r);
        assert_eq!(r.previous().range().start(), date(2023, 1, 1));
    }

    #[test]
    fn test_extreme_dates_do_not_panic() {
        for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly] {
            let r = resolve(period, NaiveDate::MAX);
            assert!(!r.buckets().is_empty());
            let r = resolve(period, NaiveDate::MIN);
            let _ = r.previous();
        }
    }

    #[test]
    fn test_date_range() {
        let r = DateRange::new(date(2024, 1, 31), date(2024, 1, 1));
        assert_eq!(r.start(), date(2024, 1, 1));
        assert!(r.contains(date(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!r.contains(date(2024, 2, 1).and_time(NaiveTime::MIN)));
        let u = r.union(&DateRange::new(date(2023, 12, 1), date(2023, 12, 31)));
        assert_eq!(u.start(), date(2023, 12, 1));
        assert_eq!(u.end(), date(2024, 1, 31));
    }
}
