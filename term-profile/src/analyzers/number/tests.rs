//! Tests for the number analyzer.

use super::*;
use crate::data::{MemoryRow, Value};
use crate::error::ProfileError;
use crate::test_fixtures::number_rows;
use crate::types::MetricValue;

fn analyzer(column: &InputColumn) -> NumberAnalyzer {
    NumberAnalyzer::builder()
        .column(column.clone())
        .build()
        .unwrap()
}

#[test]
fn test_extremum_evidence_keeps_all_tied_rows() {
    let column = InputColumn::number("v");
    let analyzer = analyzer(&column);
    for (id, value) in [5.0, 3.0, 5.0, 1.0].into_iter().enumerate() {
        analyzer
            .run(&MemoryRow::new(id as u64).with("v", value), 1)
            .unwrap();
    }

    let result = analyzer.result().unwrap();
    assert_eq!(result.highest_value(&column), Some(5.0));
    assert_eq!(result.lowest_value(&column), Some(1.0));

    let highest = result.highest_value_rows(&column).unwrap();
    assert_eq!(highest.row_count(), 2);
    let ids: Vec<u64> = highest.sample_rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 2]);

    let lowest = result.lowest_value_rows(&column).unwrap();
    assert_eq!(lowest.row_count(), 1);
    assert_eq!(lowest.sample_rows()[0].id, 3);
}

#[test]
fn test_weights_multiply_every_measure() {
    let column = InputColumn::number("v");
    let weighted = analyzer(&column);
    weighted.run(&MemoryRow::new(0).with("v", 2.0), 3).unwrap();
    weighted.run(&MemoryRow::new(1).with("v", 4.0), 1).unwrap();
    weighted.run(&MemoryRow::new(2).with("v", Value::Null), 2).unwrap();

    let expanded = analyzer(&column);
    for (id, value) in [
        Value::from(2.0),
        Value::from(2.0),
        Value::from(2.0),
        Value::from(4.0),
        Value::Null,
        Value::Null,
    ]
    .into_iter()
    .enumerate()
    {
        expanded
            .run(&MemoryRow::new(id as u64).with("v", value), 1)
            .unwrap();
    }

    let weighted = weighted.result().unwrap();
    let expanded = expanded.result().unwrap();
    assert_eq!(weighted.row_count(&column), Some(6));
    assert_eq!(weighted.null_count(&column), Some(2));
    for measure in measures(false) {
        let a = weighted.measure(&column, measure).and_then(MetricValue::as_f64);
        let b = expanded.measure(&column, measure).and_then(MetricValue::as_f64);
        match (a, b) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{measure}: {a} != {b}"),
            (a, b) => assert_eq!(a, b, "{measure}"),
        }
    }
}

#[test]
fn test_basic_measures() {
    let column = InputColumn::number("v");
    let analyzer = analyzer(&column);
    for row in number_rows("v", &[Some(1.0), Some(2.0), Some(4.0), None]) {
        analyzer.run(&row, 1).unwrap();
    }

    let result = analyzer.result().unwrap();
    assert_eq!(result.sum(&column), Some(7.0));
    assert!((result.mean(&column).unwrap() - 7.0 / 3.0).abs() < 1e-12);
    assert!((result.geometric_mean(&column).unwrap() - 2.0).abs() < 1e-12);
    assert_eq!(result.sum_of_squares(&column), Some(21.0));
    assert!(result.null_rows(&column).is_some());
    assert_eq!(result.median(&column), None);
}

#[test]
fn test_all_null_column_leaves_value_cells_empty() {
    let column = InputColumn::number("v");
    let analyzer = analyzer(&column);
    analyzer
        .run(&MemoryRow::new(0).with("v", Value::Null), 1)
        .unwrap();
    // wrong-family values count as null
    analyzer.run(&MemoryRow::new(1).with("v", "seven"), 1).unwrap();

    let result = analyzer.result().unwrap();
    assert_eq!(result.row_count(&column), Some(2));
    assert_eq!(result.null_count(&column), Some(2));
    assert_eq!(result.highest_value(&column), None);
    assert_eq!(result.mean(&column), None);
    assert!(result
        .crosstab()
        .view()
        .at(crate::crosstab::DIMENSION_COLUMN, "v")
        .unwrap()
        .at(DIMENSION_MEASURE, MEASURE_MEAN)
        .unwrap()
        .get()
        .is_err());
}

#[test]
fn test_descriptive_statistics() {
    let column = InputColumn::number("v");
    let analyzer = NumberAnalyzer::builder()
        .column(column.clone())
        .descriptive_statistics(true)
        .build()
        .unwrap();
    for row in number_rows("v", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]) {
        analyzer.run(&row, 1).unwrap();
    }

    let result = analyzer.result().unwrap();
    assert!(result.descriptive_statistics());
    assert_eq!(result.median(&column), Some(2.5));
    assert_eq!(result.percentile_25(&column), Some(1.25));
    assert_eq!(result.percentile_75(&column), Some(3.75));
    assert!(result.skewness(&column).is_some());
    assert!(result.kurtosis(&column).is_some());
}

#[test]
fn test_lifecycle_errors() {
    let column = InputColumn::number("v");
    let mut analyzer = NumberAnalyzer::new(
        vec![column.clone()],
        Arc::new(InMemoryRowAnnotationFactory::new()),
    );
    let row = MemoryRow::new(0).with("v", 1.0);

    assert!(matches!(analyzer.run(&row, 1), Err(ProfileError::InvalidState(_))));
    analyzer.initialize().unwrap();
    assert_eq!(analyzer.lifecycle(), LifecycleState::Initialized);
    assert!(matches!(analyzer.run(&row, 0), Err(ProfileError::InvalidData(_))));
    analyzer.run(&row, 1).unwrap();
    assert_eq!(analyzer.lifecycle(), LifecycleState::Running);

    let first = analyzer.result().unwrap();
    let second = analyzer.result().unwrap();
    assert_eq!(first.row_count(&column), second.row_count(&column));
    assert!(matches!(analyzer.run(&row, 1), Err(ProfileError::InvalidState(_))));
}

#[test]
fn test_configuration_errors() {
    let err = NumberAnalyzer::builder().build().unwrap_err();
    assert!(err.is_configuration_error());

    let err = NumberAnalyzer::builder()
        .column(InputColumn::text("name"))
        .build()
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_concurrent_run_matches_sequential() {
    let a = InputColumn::number("a");
    let b = InputColumn::number("b");
    let rows: Vec<MemoryRow> = (0..4000u64)
        .map(|i| {
            MemoryRow::new(i)
                .with("a", (i % 97) as f64)
                .with("b", if i % 5 == 0 { Value::Null } else { Value::from(i as f64) })
        })
        .collect();

    let concurrent = NumberAnalyzer::builder()
        .columns([a.clone(), b.clone()])
        .build()
        .unwrap();
    std::thread::scope(|scope| {
        for chunk in rows.chunks(500) {
            let analyzer = &concurrent;
            scope.spawn(move || {
                for row in chunk {
                    analyzer.run(row, 1).unwrap();
                }
            });
        }
    });

    let sequential = NumberAnalyzer::builder()
        .columns([a.clone(), b.clone()])
        .build()
        .unwrap();
    for row in &rows {
        sequential.run(row, 1).unwrap();
    }

    let concurrent = concurrent.result().unwrap();
    let sequential = sequential.result().unwrap();
    for column in [&a, &b] {
        assert_eq!(concurrent.row_count(column), sequential.row_count(column));
        assert_eq!(concurrent.null_count(column), sequential.null_count(column));
        assert_eq!(concurrent.highest_value(column), sequential.highest_value(column));
        assert_eq!(concurrent.lowest_value(column), sequential.lowest_value(column));
        assert_eq!(concurrent.sum(column), sequential.sum(column));
        assert_eq!(
            concurrent.highest_value_rows(column).map(|r| r.row_count()),
            sequential.highest_value_rows(column).map(|r| r.row_count())
        );
    }
}

#[test]
fn test_result_serde_roundtrip_with_negative_values() {
    let column = InputColumn::number("v");
    let analyzer = analyzer(&column);
    analyzer.run(&MemoryRow::new(0).with("v", -1.0), 1).unwrap();
    analyzer.run(&MemoryRow::new(1).with("v", 4.0), 2).unwrap();
    analyzer.run(&MemoryRow::new(2).with("v", Value::Null), 1).unwrap();
    let result = analyzer.result().unwrap();
    assert!(result.geometric_mean(&column).unwrap().is_nan());

    let json = serde_json::to_string(&result).unwrap();
    let restored: NumberResult = serde_json::from_str(&json).unwrap();
    assert!(restored.geometric_mean(&column).unwrap().is_nan());
    assert_eq!(restored.row_count(&column), Some(4));
    assert_eq!(restored.null_count(&column), Some(1));
    assert_eq!(restored.lowest_value(&column), Some(-1.0));
    assert_eq!(restored.highest_value(&column), Some(4.0));
    assert_eq!(restored.sum(&column), Some(7.0));
    let (a, b) = (restored.variance(&column).unwrap(), result.variance(&column).unwrap());
    assert!((a - b).abs() < 1e-9);
    assert_eq!(
        restored.highest_value_rows(&column).map(|r| r.row_count()),
        Some(2)
    );
}

#[test]
fn test_result_serde_roundtrip_with_infinite_values() {
    let column = InputColumn::number("v");
    let analyzer = analyzer(&column);
    analyzer
        .run(&MemoryRow::new(0).with("v", f64::NEG_INFINITY), 1)
        .unwrap();
    analyzer.run(&MemoryRow::new(1).with("v", 2.0), 1).unwrap();
    let result = analyzer.result().unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: NumberResult = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.lowest_value(&column), Some(f64::NEG_INFINITY));
    assert_eq!(restored.sum(&column), Some(f64::NEG_INFINITY));
    let sample = &restored.lowest_value_rows(&column).unwrap().sample_rows()[0];
    assert_eq!(sample.value("v"), Some(&Value::Number(f64::NEG_INFINITY)));
}
