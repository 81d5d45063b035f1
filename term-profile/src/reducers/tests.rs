//! Tests for the result reducers.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Arc;

use super::*;
use crate::analyzers::{
    Analyzer, BooleanAnalyzer, BooleanResult, DateTimeAnalyzer, DateTimeResult, NumberAnalyzer,
    NumberResult, ProfileAnalyzer, StringAnalyzer, StringResult,
};
use crate::analyzers::string::{MEASURE_MAX_CHARS, MEASURE_MIN_CHARS, MEASURE_NULL_COUNT};
use crate::data::MemoryRow;
use crate::storage::InMemoryRowAnnotationFactory;

fn factory() -> Arc<dyn RowAnnotationFactory> {
    Arc::new(InMemoryRowAnnotationFactory::new())
}

fn ids(rows: &AnnotatedRows) -> Vec<u64> {
    rows.sample_rows().iter().map(|r| r.id).collect()
}

fn number_partial(descriptive: bool, rows: &[(u64, Option<f64>)]) -> NumberResult {
    let analyzer = NumberAnalyzer::builder()
        .column(InputColumn::number("v"))
        .descriptive_statistics(descriptive)
        .build()
        .unwrap();
    for (id, value) in rows {
        analyzer
            .run(&MemoryRow::new(*id).with("v", *value), 1)
            .unwrap();
    }
    analyzer.result().unwrap()
}

fn string_partial(rows: &[(u64, Option<&str>)]) -> StringResult {
    let analyzer = StringAnalyzer::builder()
        .column(InputColumn::text("s"))
        .build()
        .unwrap();
    for (id, value) in rows {
        analyzer
            .run(&MemoryRow::new(*id).with("s", *value), 1)
            .unwrap();
    }
    analyzer.result().unwrap()
}

fn boolean_partial(rows: &[(u64, Option<bool>, Option<bool>)]) -> BooleanResult {
    let analyzer = BooleanAnalyzer::builder()
        .columns([InputColumn::boolean("a"), InputColumn::boolean("b")])
        .build()
        .unwrap();
    for (id, a, b) in rows {
        analyzer
            .run(&MemoryRow::new(*id).with("a", *a).with("b", *b), 1)
            .unwrap();
    }
    analyzer.result().unwrap()
}

fn date_time_partial(descriptive: bool, rows: &[(u64, Option<NaiveDateTime>)]) -> DateTimeResult {
    let analyzer = DateTimeAnalyzer::builder()
        .column(InputColumn::date_time("ts"))
        .descriptive_statistics(descriptive)
        .build()
        .unwrap();
    for (id, value) in rows {
        analyzer
            .run(&MemoryRow::new(*id).with("ts", *value), 1)
            .unwrap();
    }
    analyzer.result().unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn test_empty_input_yields_none() {
    assert!(NumberResultReducer::default().reduce(&[]).unwrap().is_none());
    assert!(StringResultReducer::default().reduce(&[]).unwrap().is_none());
    assert!(BooleanResultReducer::default().reduce(&[]).unwrap().is_none());
    assert!(DateTimeResultReducer::default().reduce(&[]).unwrap().is_none());
    assert!(ProfileResultReducer::default().reduce(&[]).unwrap().is_none());
}

#[test]
fn test_extreme_evidence_comes_from_attaining_partials() {
    let column = InputColumn::number("v");
    let first = number_partial(false, &[(0, Some(5.0)), (1, Some(3.0))]);
    let second = number_partial(false, &[(2, Some(5.0)), (3, Some(1.0))]);

    let merged = NumberResultReducer::new(factory())
        .reduce(&[first, second])
        .unwrap()
        .unwrap();

    assert_eq!(merged.row_count(&column), Some(4));
    assert_eq!(merged.highest_value(&column), Some(5.0));
    assert_eq!(merged.lowest_value(&column), Some(1.0));
    assert_eq!(merged.mean(&column), Some(3.5));

    let highest = merged.highest_value_rows(&column).unwrap();
    assert_eq!(highest.row_count(), 2);
    assert_eq!(ids(highest), vec![0, 2]);

    let lowest = merged.lowest_value_rows(&column).unwrap();
    assert_eq!(lowest.row_count(), 1);
    assert_eq!(ids(lowest), vec![3]);
}

#[test]
fn test_moments_match_single_pass() {
    let column = InputColumn::number("v");
    let values = [1.5, 2.25, -4.0, 10.0, 3.125, 7.5, 0.0, 2.0];
    let all: Vec<(u64, Option<f64>)> = values
        .iter()
        .enumerate()
        .map(|(id, v)| (id as u64, Some(*v)))
        .collect();

    let single = number_partial(false, &all);
    let partials = vec![
        number_partial(false, &all[..3]),
        number_partial(false, &all[3..4]),
        number_partial(false, &all[4..]),
    ];
    let merged = NumberResultReducer::default()
        .reduce(&partials)
        .unwrap()
        .unwrap();

    let close = |a: Option<f64>, b: Option<f64>| (a.unwrap() - b.unwrap()).abs() < 1e-9;
    assert_eq!(merged.row_count(&column), single.row_count(&column));
    assert!(close(merged.sum(&column), single.sum(&column)));
    assert!(close(merged.mean(&column), single.mean(&column)));
    assert!(close(merged.variance(&column), single.variance(&column)));
    assert!(close(
        merged.standard_deviation(&column),
        single.standard_deviation(&column)
    ));
    assert!(close(
        merged.sum_of_squares(&column),
        single.sum_of_squares(&column)
    ));
    assert!(close(
        merged.second_moment(&column),
        single.second_moment(&column)
    ));
}

#[test]
fn test_reduction_is_order_independent() {
    let column = InputColumn::number("v");
    let a = number_partial(false, &[(0, Some(0.1)), (1, Some(0.7))]);
    let b = number_partial(false, &[(2, Some(1e-3)), (3, None)]);
    let c = number_partial(false, &[(4, Some(3.3)), (5, Some(-2.2)), (6, Some(0.3))]);

    let reducer = NumberResultReducer::default();
    let forward = reducer
        .reduce(&[a.clone(), b.clone(), c.clone()])
        .unwrap()
        .unwrap();
    let backward = reducer.reduce(&[c, a, b]).unwrap().unwrap();

    for measure in crate::analyzers::number::measures(false) {
        let lhs = forward.measure(&column, measure).and_then(|v| v.as_f64());
        let rhs = backward.measure(&column, measure).and_then(|v| v.as_f64());
        assert_eq!(lhs.map(f64::to_bits), rhs.map(f64::to_bits), "{measure}");
    }
    assert_eq!(
        ids(forward.null_rows(&column).unwrap()),
        ids(backward.null_rows(&column).unwrap())
    );
}

#[test]
fn test_order_statistics_are_not_recombined() {
    let column = InputColumn::number("v");
    let first = number_partial(true, &[(0, Some(1.0)), (1, Some(2.0)), (2, Some(3.0))]);
    let second = number_partial(true, &[(3, Some(10.0)), (4, Some(20.0))]);
    assert_eq!(first.median(&column), Some(2.0));
    assert_eq!(second.median(&column), Some(15.0));

    let merged = NumberResultReducer::default()
        .reduce(&[first, second])
        .unwrap()
        .unwrap();
    assert!(merged.descriptive_statistics());
    assert_eq!(merged.median(&column), None);
    assert_eq!(merged.percentile_25(&column), None);
    assert_eq!(merged.skewness(&column), None);
    assert_eq!(merged.row_count(&column), Some(5));
}

#[test]
fn test_order_statistics_survive_single_contributor() {
    let column = InputColumn::number("v");
    let values = number_partial(true, &[(0, Some(1.0)), (1, Some(2.0)), (2, Some(3.0))]);
    let nulls = number_partial(true, &[(3, None), (4, None)]);

    let merged = NumberResultReducer::default()
        .reduce(&[nulls, values])
        .unwrap()
        .unwrap();
    assert_eq!(merged.median(&column), Some(2.0));
    assert_eq!(merged.null_count(&column), Some(2));
    assert_eq!(ids(merged.null_rows(&column).unwrap()), vec![3, 4]);
}

#[test]
fn test_missing_columns_are_no_contribution() {
    let (x, y) = (InputColumn::number("x"), InputColumn::number("y"));
    let only_x = {
        let analyzer = NumberAnalyzer::builder().column(x.clone()).build().unwrap();
        analyzer.run(&MemoryRow::new(0).with("x", 1.0), 1).unwrap();
        analyzer.result().unwrap()
    };
    let both = {
        let analyzer = NumberAnalyzer::builder()
            .columns([y.clone(), x.clone()])
            .build()
            .unwrap();
        analyzer
            .run(&MemoryRow::new(1).with("x", 3.0).with("y", 7.0), 1)
            .unwrap();
        analyzer.result().unwrap()
    };

    let merged = NumberResultReducer::default()
        .reduce(&[both, only_x])
        .unwrap()
        .unwrap();
    assert_eq!(merged.columns(), &[x.clone(), y.clone()]);
    assert_eq!(merged.row_count(&x), Some(2));
    assert_eq!(merged.mean(&x), Some(2.0));
    assert_eq!(merged.row_count(&y), Some(1));
    assert_eq!(merged.highest_value(&y), Some(7.0));
}

#[test]
fn test_string_reduction() {
    let column = InputColumn::text("s");
    let first = string_partial(&[(0, Some("hello world")), (1, None), (2, Some(""))]);
    let second = string_partial(&[(3, Some("abc")), (4, Some("hello there"))]);

    let merged = StringResultReducer::default()
        .reduce(&[first, second])
        .unwrap()
        .unwrap();

    assert_eq!(merged.row_count(&column), Some(5));
    assert_eq!(merged.null_count(&column), Some(1));
    assert_eq!(merged.blank_count(&column), Some(1));
    assert_eq!(merged.max_chars(&column), Some(11));
    assert_eq!(merged.min_chars(&column), Some(0));
    assert_eq!(merged.max_words(&column), Some(2));
    // (11 + 0 + 3 + 11) / 4
    assert_eq!(merged.avg_chars(&column), Some(6.25));

    let longest = merged.evidence(&column, MEASURE_MAX_CHARS).unwrap();
    assert_eq!(ids(longest), vec![0, 4]);
    let shortest = merged.evidence(&column, MEASURE_MIN_CHARS).unwrap();
    assert_eq!(ids(shortest), vec![2]);
    let nulls = merged.evidence(&column, MEASURE_NULL_COUNT).unwrap();
    assert_eq!(ids(nulls), vec![1]);
}

#[test]
fn test_boolean_combinations_are_summed() {
    let (a, b) = (InputColumn::boolean("a"), InputColumn::boolean("b"));
    let first = boolean_partial(&[
        (0, Some(true), Some(false)),
        (1, Some(true), Some(false)),
        (2, Some(true), Some(true)),
    ]);
    let second = boolean_partial(&[
        (3, Some(true), Some(true)),
        (4, Some(true), Some(true)),
        (5, None, Some(false)),
    ]);

    let merged = BooleanResultReducer::default()
        .reduce(&[first, second])
        .unwrap()
        .unwrap();

    assert_eq!(merged.row_count(&a), Some(6));
    assert_eq!(merged.true_count(&a), Some(5));
    assert_eq!(merged.null_count(&a), Some(1));
    assert_eq!(merged.false_count(&b), Some(3));

    let combinations = merged.value_combinations();
    assert_eq!(combinations.len(), 3);
    assert_eq!(combinations[0].label, "Most frequent");
    assert_eq!(combinations[0].values, vec![Some(true), Some(true)]);
    assert_eq!(combinations[0].frequency, 3);
    assert_eq!(ids(combinations[0].evidence.as_ref().unwrap()), vec![2, 3, 4]);
    assert_eq!(combinations[1].values, vec![Some(true), Some(false)]);
    assert_eq!(combinations[1].frequency, 2);
    assert_eq!(combinations[2].label, "Least frequent");
    assert_eq!(combinations[2].values, vec![None, Some(false)]);
}

#[test]
fn test_date_time_reduction() {
    let column = InputColumn::date_time("ts");
    let first = date_time_partial(true, &[(0, Some(at(1, 8))), (1, Some(at(5, 6)))]);
    let second = date_time_partial(true, &[(2, Some(at(5, 23))), (3, None)]);

    let merged = DateTimeResultReducer::default()
        .reduce(&[second, first])
        .unwrap()
        .unwrap();

    assert_eq!(merged.row_count(&column), Some(4));
    assert_eq!(merged.null_count(&column), Some(1));
    assert_eq!(merged.highest_date(&column), NaiveDate::from_ymd_opt(2024, 3, 5));
    assert_eq!(merged.lowest_date(&column), NaiveDate::from_ymd_opt(2024, 3, 1));
    assert_eq!(ids(merged.evidence(&column, "Highest date").unwrap()), vec![1, 2]);
    assert_eq!(ids(merged.evidence(&column, "Highest time").unwrap()), vec![2]);
    assert_eq!(ids(merged.evidence(&column, "Lowest time").unwrap()), vec![1]);
    // Mar 1 08:00, Mar 5 06:00 and Mar 5 23:00 average to Mar 4 04:20.
    assert_eq!(
        merged.mean(&column),
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(4, 20, 0)
    );
    assert_eq!(merged.median(&column), None);
}

#[test]
fn test_date_time_mean_is_within_a_millisecond_of_single_pass() {
    let column = InputColumn::date_time("ts");
    let ms = |n: i64| at(1, 0) + TimeDelta::milliseconds(n);
    let first = date_time_partial(false, &[(0, Some(ms(0))), (1, Some(ms(1)))]);
    let second = date_time_partial(false, &[(2, Some(ms(1))), (3, Some(ms(2)))]);
    let single = date_time_partial(
        false,
        &[(0, Some(ms(0))), (1, Some(ms(1))), (2, Some(ms(1))), (3, Some(ms(2)))],
    );

    // Each partial mean is floored before recombination.
    assert_eq!(first.mean(&column), Some(ms(0)));
    assert_eq!(second.mean(&column), Some(ms(1)));
    let merged = DateTimeResultReducer::default()
        .reduce(&[first, second])
        .unwrap()
        .unwrap();
    assert_eq!(single.mean(&column), Some(ms(1)));
    assert_eq!(merged.mean(&column), Some(ms(0)));
}

#[test]
fn test_profile_reduction() {
    let amount = InputColumn::number("amount");
    let name = InputColumn::text("name");
    let active = InputColumn::boolean("active");
    let partial = |rows: &[(u64, f64, &str, bool)]| {
        let analyzer = ProfileAnalyzer::builder()
            .columns([amount.clone(), name.clone(), active.clone()])
            .build()
            .unwrap();
        for (id, a, n, b) in rows {
            let row = MemoryRow::new(*id)
                .with("amount", *a)
                .with("name", *n)
                .with("active", *b);
            analyzer.run(&row, 1).unwrap();
        }
        analyzer.result().unwrap()
    };

    let merged = ProfileResultReducer::default()
        .reduce(&[
            partial(&[(0, 10.0, "ann", true)]),
            partial(&[(1, 30.0, "bob", false), (2, 20.0, "", true)]),
        ])
        .unwrap()
        .unwrap();

    assert_eq!(merged.row_count(&amount), Some(3));
    assert_eq!(merged.number().unwrap().mean(&amount), Some(20.0));
    assert_eq!(merged.string().unwrap().blank_count(&name), Some(1));
    assert_eq!(merged.boolean().unwrap().true_count(&active), Some(2));
    assert!(merged.boolean().unwrap().value_combinations().is_empty());
    assert!(merged.date_time().is_none());
    assert_eq!(merged.row_count(&InputColumn::number("missing")), None);
}
