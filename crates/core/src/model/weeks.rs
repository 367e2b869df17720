use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::life::{Event, LifeProfile, Span};
use crate::error::ModelError;

pub const WEEKS_PER_YEAR: usize = 52;
const DAYS_PER_WEEK: i64 = 7;

/// One week of a life, `[start, end)` with `end = start + 7 days`.
///
/// "Now" is taken to be a moment inside `today`, so a week whose end date
/// is `today` or earlier is past, and exactly one of past/current/future
/// holds for every interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekInterval {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_past: bool,
    pub is_current: bool,
    pub events: Vec<Event>,
    /// Ids of spans whose bounds cover this week, in profile order.
    pub span_ids: Vec<String>,
}

impl WeekInterval {
    pub fn year_index(&self) -> usize {
        self.index / WEEKS_PER_YEAR
    }

    pub fn week_in_year(&self) -> usize {
        self.index % WEEKS_PER_YEAR
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// A span with its start/end resolved to week indices of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanBounds {
    pub span: Span,
    pub start_week_index: usize,
    /// Always `>= start_week_index`.
    pub end_week_index: usize,
    pub open_ended: bool,
}

impl SpanBounds {
    pub fn covers(&self, week_index: usize) -> bool {
        (self.start_week_index..=self.end_week_index).contains(&week_index)
    }
}

/// Output of the temporal model, consumed by the cell field and lane layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalSnapshot {
    pub weeks: Vec<WeekInterval>,
    pub spans: Vec<SpanBounds>,
}

impl TemporalSnapshot {
    pub fn build(profile: &LifeProfile, today: NaiveDate) -> Result<Self, ModelError> {
        profile.validate()?;
        Ok(Self {
            weeks: generate_weeks(profile, today),
            spans: spans_with_bounds(profile, today),
        })
    }

    pub fn total_weeks(&self) -> usize {
        self.weeks.len()
    }

    pub fn current_week(&self) -> Option<&WeekInterval> {
        self.weeks.iter().find(|w| w.is_current)
    }

    /// Fraction of the grid already lived, in `[0, 1]`.
    pub fn lived_fraction(&self) -> f64 {
        if self.weeks.is_empty() {
            return 0.0;
        }
        let past = self.weeks.iter().filter(|w| w.is_past).count();
        past as f64 / self.weeks.len() as f64
    }
}

pub fn total_weeks(profile: &LifeProfile) -> usize {
    profile.life_expectancy_years as usize * WEEKS_PER_YEAR
}

/// Unclamped week offset of `date` from birth; negative before birth.
fn week_offset(birth: NaiveDate, date: NaiveDate) -> i64 {
    (date - birth).num_days().div_euclid(DAYS_PER_WEEK)
}

fn clamp_week(offset: i64, total: usize) -> usize {
    let last = total.saturating_sub(1) as i64;
    offset.clamp(0, last) as usize
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Lay out every week of the profile's life expectancy.
pub fn generate_weeks(profile: &LifeProfile, today: NaiveDate) -> Vec<WeekInterval> {
    let total = total_weeks(profile);
    let bounds = spans_with_bounds(profile, today);
    let mut weeks: Vec<WeekInterval> = (0..total)
        .map(|index| {
            let start = add_days(profile.birth_date, index as u64 * DAYS_PER_WEEK as u64);
            let end = add_days(start, DAYS_PER_WEEK as u64);
            WeekInterval {
                index,
                start,
                end,
                is_past: end <= today,
                is_current: start <= today && today < end,
                events: Vec::new(),
                span_ids: bounds
                    .iter()
                    .filter(|b| b.covers(index))
                    .map(|b| b.span.id.clone())
                    .collect(),
            }
        })
        .collect();

    let mut events: Vec<&Event> = profile.events.iter().collect();
    events.sort_by_key(|e| e.date);
    for event in events {
        let offset = week_offset(profile.birth_date, event.date);
        if offset < 0 {
            continue;
        }
        if let Some(week) = weeks.get_mut(offset as usize) {
            week.events.push(event.clone());
        }
    }
    weeks
}

/// Resolve every span of the profile to clamped week indices.
pub fn spans_with_bounds(profile: &LifeProfile, today: NaiveDate) -> Vec<SpanBounds> {
    let total = total_weeks(profile);
    let current = clamp_week(week_offset(profile.birth_date, today), total);

    profile
        .spans
        .iter()
        .map(|span| {
            let start_week_index = clamp_week(week_offset(profile.birth_date, span.start), total);
            let end = match span.end {
                Some(end) => clamp_week(week_offset(profile.birth_date, end), total),
                None => current,
            };
            SpanBounds {
                span: span.clone(),
                start_week_index,
                end_week_index: end.max(start_week_index),
                open_ended: span.end.is_none(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_protocol::Color;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn span(id: &str, start: NaiveDate, end: Option<NaiveDate>) -> Span {
        Span {
            id: id.into(),
            title: id.to_uppercase(),
            start,
            end,
            color: Color::rgb(200, 40, 40),
        }
    }

    #[test]
    fn one_year_has_52_weeks_from_birth() {
        let profile = LifeProfile::new(date(2000, 1, 1), 1);
        let weeks = generate_weeks(&profile, date(2000, 3, 1));
        assert_eq!(weeks.len(), 52);
        assert_eq!(weeks[0].start, date(2000, 1, 1));
        assert_eq!(weeks[0].end, date(2000, 1, 8));
        assert_eq!(weeks[51].week_in_year(), 51);
        assert_eq!(weeks[51].year_index(), 0);
    }

    #[test]
    fn one_month_span_covers_weeks_0_to_4() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile
            .spans
            .push(span("jan", date(2000, 1, 1), Some(date(2000, 2, 1))));
        let bounds = spans_with_bounds(&profile, date(2000, 6, 1));
        assert_eq!(bounds[0].start_week_index, 0);
        assert_eq!(bounds[0].end_week_index, 4);
        assert!(!bounds[0].open_ended);
    }

    #[test]
    fn open_ended_span_ends_at_current_week() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 2);
        profile.spans.push(span("now", date(2000, 1, 15), None));
        let today = date(2000, 3, 4);
        let bounds = spans_with_bounds(&profile, today);
        assert_eq!(bounds[0].end_week_index, 9);
        assert!(bounds[0].open_ended);

        let weeks = generate_weeks(&profile, today);
        let current: Vec<_> = weeks.iter().filter(|w| w.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].index, 9);
        assert!(weeks[8].is_past);
        assert!(!weeks[9].is_past);
    }

    #[test]
    fn inverted_span_is_corrected() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile
            .spans
            .push(span("bad", date(2000, 5, 1), Some(date(2000, 2, 1))));
        let bounds = spans_with_bounds(&profile, date(2000, 1, 1));
        assert_eq!(bounds[0].end_week_index, bounds[0].start_week_index);
    }

    #[test]
    fn spans_outside_life_are_clamped() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile
            .spans
            .push(span("wide", date(1990, 1, 1), Some(date(2050, 1, 1))));
        let bounds = spans_with_bounds(&profile, date(2000, 1, 1));
        assert_eq!(bounds[0].start_week_index, 0);
        assert_eq!(bounds[0].end_week_index, 51);
    }

    #[test]
    fn events_attach_to_containing_week() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile.events.push(Event {
            id: "e".into(),
            title: "Event".into(),
            date: date(2000, 1, 9),
        });
        profile.events.push(Event {
            id: "before".into(),
            title: "Before birth".into(),
            date: date(1999, 12, 1),
        });
        let weeks = generate_weeks(&profile, date(2000, 1, 1));
        assert!(weeks[1].has_events());
        assert_eq!(weeks.iter().filter(|w| w.has_events()).count(), 1);
    }

    #[test]
    fn weeks_carry_overlapping_span_ids() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile
            .spans
            .push(span("a", date(2000, 1, 1), Some(date(2000, 1, 20))));
        profile
            .spans
            .push(span("b", date(2000, 1, 15), Some(date(2000, 2, 20))));
        let weeks = generate_weeks(&profile, date(2000, 1, 1));
        assert_eq!(weeks[0].span_ids, vec!["a".to_string()]);
        assert_eq!(weeks[2].span_ids, vec!["a".to_string(), "b".to_string()]);
        assert!(weeks[10].span_ids.is_empty());
    }

    #[test]
    fn snapshot_rejects_invalid_profile() {
        let profile = LifeProfile::new(date(2000, 1, 1), 0);
        assert!(TemporalSnapshot::build(&profile, date(2000, 1, 1)).is_err());
    }

    #[test]
    fn lived_fraction_counts_past_weeks() {
        let profile = LifeProfile::new(date(2000, 1, 1), 1);
        let snapshot = TemporalSnapshot::build(&profile, date(2000, 1, 15));
        let snapshot = snapshot.unwrap_or_default();
        assert!((snapshot.lived_fraction() - 2.0 / 52.0).abs() < 1e-9);
        assert_eq!(snapshot.current_week().map(|w| w.index), Some(2));
    }

    proptest! {
        #[test]
        fn weeks_are_contiguous(
            days in 0i64..40_000,
            years in 1u32..100,
        ) {
            let birth = add_days(date(1900, 1, 1), days as u64);
            let profile = LifeProfile::new(birth, years);
            let weeks = generate_weeks(&profile, date(2024, 1, 1));
            prop_assert_eq!(weeks.len(), years as usize * 52);
            for (i, pair) in weeks.windows(2).enumerate() {
                prop_assert_eq!(pair[0].end, pair[1].start);
                prop_assert_eq!(pair[0].index, i);
                prop_assert_eq!(pair[0].year_index(), i / 52);
                prop_assert_eq!(pair[0].week_in_year(), i % 52);
            }
        }

        #[test]
        fn bounds_never_invert(
            start_days in -2_000i64..6_000,
            end_days in proptest::option::of(-2_000i64..6_000),
            today_days in -2_000i64..6_000,
        ) {
            let birth = date(2000, 1, 1);
            let shift = |d: i64| birth + chrono::Duration::days(d);
            let mut profile = LifeProfile::new(birth, 10);
            profile.spans.push(span("s", shift(start_days), end_days.map(shift)));
            let today = shift(today_days);
            let bounds = &spans_with_bounds(&profile, today)[0];
            prop_assert!(bounds.end_week_index >= bounds.start_week_index);
            prop_assert!(bounds.end_week_index < 520);
            if end_days.is_none() {
                let current = clamp_week(week_offset(birth, today), 520);
                prop_assert_eq!(bounds.end_week_index, current.max(bounds.start_week_index));
            }
        }
    }
}
