//! Per-column accumulator for date/time values.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::analyzers::{track_extreme, Extreme};
use crate::data::InputRow;
use crate::stats::DescriptiveStatistics;
use crate::storage::{RowAnnotation, RowAnnotationFactory};

/// Days between the Unix epoch and `date`.
pub(crate) fn epoch_days(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}

/// The date `days` after the Unix epoch, rounded to the nearest day.
pub(crate) fn date_from_epoch_days(days: f64) -> Option<NaiveDate> {
    let days = days.round();
    if !days.is_finite() || days.abs() > i64::MAX as f64 {
        return None;
    }
    let days = days as i64;
    let epoch = NaiveDate::default();
    if days >= 0 {
        epoch.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

pub(crate) fn instant_millis(instant: NaiveDateTime) -> i64 {
    instant.and_utc().timestamp_millis()
}

/// Mean of `count` instants whose epoch milliseconds add up to `millis_sum`.
pub(crate) fn mean_instant(millis_sum: i128, count: u64) -> Option<NaiveDateTime> {
    if count == 0 {
        return None;
    }
    let millis = i64::try_from(millis_sum.div_euclid(i128::from(count))).ok()?;
    DateTime::from_timestamp_millis(millis).map(|instant| instant.naive_utc())
}

/// Evidence annotations kept by a [`DateTimeColumnDelegate`].
#[derive(Debug, Clone)]
pub(crate) struct DateTimeAnnotations {
    pub(crate) null: RowAnnotation,
    pub(crate) max_date: RowAnnotation,
    pub(crate) min_date: RowAnnotation,
    pub(crate) max_time: RowAnnotation,
    pub(crate) min_time: RowAnnotation,
}

impl DateTimeAnnotations {
    fn new(factory: &dyn RowAnnotationFactory) -> Self {
        Self {
            null: factory.create_annotation(),
            max_date: factory.create_annotation(),
            min_date: factory.create_annotation(),
            max_time: factory.create_annotation(),
            min_time: factory.create_annotation(),
        }
    }
}

#[derive(Debug, Default)]
struct DateTimeState {
    row_count: u64,
    value_count: u64,
    millis_sum: i128,
    max_date: Option<NaiveDate>,
    min_date: Option<NaiveDate>,
    max_time: Option<NaiveTime>,
    min_time: Option<NaiveTime>,
    descriptive: Option<DescriptiveStatistics>,
}

/// Point-in-time copy of a [`DateTimeColumnDelegate`]'s state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateTimeStatistics {
    pub row_count: u64,
    pub null_count: u64,
    pub max_date: Option<NaiveDate>,
    pub min_date: Option<NaiveDate>,
    pub max_time: Option<NaiveTime>,
    pub min_time: Option<NaiveTime>,
    pub mean: Option<NaiveDateTime>,
}

/// Accumulates the temporal measures of one column.
///
/// The date and the time-of-day component of each value are tracked as
/// separate extremes. Order statistics are taken over the date axis, in days
/// since the Unix epoch.
#[derive(Debug)]
pub struct DateTimeColumnDelegate {
    factory: Arc<dyn RowAnnotationFactory>,
    state: Mutex<DateTimeState>,
    annotations: DateTimeAnnotations,
}

impl DateTimeColumnDelegate {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>, descriptive_statistics: bool) -> Self {
        let state = DateTimeState {
            descriptive: descriptive_statistics.then(DescriptiveStatistics::new),
            ..DateTimeState::default()
        };
        Self {
            annotations: DateTimeAnnotations::new(factory.as_ref()),
            state: Mutex::new(state),
            factory,
        }
    }

    /// Processes one value; `None` counts as null.
    pub fn run(&self, row: &dyn InputRow, value: Option<NaiveDateTime>, distinct_count: u64) {
        let factory = self.factory.as_ref();
        let a = &self.annotations;
        let w = distinct_count;

        let mut state = self.state.lock();
        state.row_count += w;
        let Some(value) = value else {
            factory.annotate(row, w, &a.null);
            return;
        };

        let (date, time) = (value.date(), value.time());
        track_extreme(Extreme::Max, &mut state.max_date, date, factory, &a.max_date, row, w);
        track_extreme(Extreme::Min, &mut state.min_date, date, factory, &a.min_date, row, w);
        track_extreme(Extreme::Max, &mut state.max_time, time, factory, &a.max_time, row, w);
        track_extreme(Extreme::Min, &mut state.min_time, time, factory, &a.min_time, row, w);

        state.value_count += w;
        state.millis_sum += i128::from(instant_millis(value)) * i128::from(w);
        if let Some(descriptive) = state.descriptive.as_mut() {
            descriptive.add(epoch_days(date) as f64, w);
        }
    }

    pub fn statistics(&self) -> DateTimeStatistics {
        let state = self.state.lock();
        DateTimeStatistics {
            row_count: state.row_count,
            null_count: self.annotations.null.row_count(),
            max_date: state.max_date,
            min_date: state.min_date,
            max_time: state.max_time,
            min_time: state.min_time,
            mean: mean_instant(state.millis_sum, state.value_count),
        }
    }

    /// Snapshot of the retained epoch days, when enabled.
    pub fn descriptive_statistics(&self) -> Option<DescriptiveStatistics> {
        self.state.lock().descriptive.clone()
    }

    pub(crate) fn annotations(&self) -> &DateTimeAnnotations {
        &self.annotations
    }

    pub fn null_annotation(&self) -> &RowAnnotation {
        &self.annotations.null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_day_conversions() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(epoch_days(date), 10);
        assert_eq!(date_from_epoch_days(9.6), Some(date));
        assert_eq!(
            date_from_epoch_days(-1.0),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
        assert_eq!(date_from_epoch_days(f64::NAN), None);
    }

    #[test]
    fn test_mean_instant_floors_to_milliseconds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = start + chrono::TimeDelta::milliseconds(3);
        let sum = i128::from(instant_millis(start)) + i128::from(instant_millis(end));
        assert_eq!(
            mean_instant(sum, 2),
            Some(start + chrono::TimeDelta::milliseconds(1))
        );
        assert_eq!(mean_instant(0, 0), None);
    }
}
