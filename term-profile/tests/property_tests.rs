//! Property-based tests for partitioned profiling.
//!
//! Splitting the rows into any number of partitions, or collapsing identical
//! rows into weighted rows, must not change counts, extremes or the moments
//! of the result beyond floating point rounding.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use proptest::prelude::*;
use std::sync::Arc;
use term_profile::prelude::*;
use term_profile::sources::MemorySource;

fn batch(numbers: &[Option<i32>], texts: &[Option<String>], flags: &[Option<bool>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("n", DataType::Float64, true),
        Field::new("s", DataType::Utf8, true),
        Field::new("b", DataType::Boolean, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(
            numbers.iter().map(|v| v.map(f64::from)).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(texts.to_vec())),
        Arc::new(BooleanArray::from(flags.to_vec())),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

type Columns = (Vec<Option<i32>>, Vec<Option<String>>, Vec<Option<bool>>);

fn rows_strategy() -> impl Strategy<Value = Columns> {
    (1usize..40).prop_flat_map(|len| {
        (
            prop::collection::vec(prop::option::weighted(0.8, -50i32..50), len),
            prop::collection::vec(prop::option::weighted(0.8, "[a-zA-Z ]{0,8}"), len),
            prop::collection::vec(prop::option::weighted(0.8, any::<bool>()), len),
        )
    })
}

fn profile(source: &MemorySource, config: ProfileConfig) -> ProfileResult {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(ProfileRunner::profile(config).run(source))
        .unwrap()
}

fn close(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= 1e-9 * a.abs().max(1.0),
        (None, None) => true,
        _ => false,
    }
}

fn assert_equivalent(a: &ProfileResult, b: &ProfileResult) -> std::result::Result<(), TestCaseError> {
    let n = InputColumn::number("n");
    let (x, y) = (a.number().unwrap(), b.number().unwrap());
    prop_assert_eq!(x.row_count(&n), y.row_count(&n));
    prop_assert_eq!(x.null_count(&n), y.null_count(&n));
    prop_assert_eq!(x.highest_value(&n), y.highest_value(&n));
    prop_assert_eq!(x.lowest_value(&n), y.lowest_value(&n));
    prop_assert_eq!(
        x.highest_value_rows(&n).map(|r| r.row_count()),
        y.highest_value_rows(&n).map(|r| r.row_count())
    );
    prop_assert!(close(x.sum(&n), y.sum(&n)));
    prop_assert!(close(x.mean(&n), y.mean(&n)));
    prop_assert!(close(x.variance(&n), y.variance(&n)));

    let s = InputColumn::text("s");
    let (x, y) = (a.string().unwrap(), b.string().unwrap());
    prop_assert_eq!(x.null_count(&s), y.null_count(&s));
    prop_assert_eq!(x.blank_count(&s), y.blank_count(&s));
    prop_assert_eq!(x.total_char_count(&s), y.total_char_count(&s));
    prop_assert_eq!(x.max_chars(&s), y.max_chars(&s));
    prop_assert_eq!(x.min_words(&s), y.min_words(&s));
    prop_assert!(close(x.avg_chars(&s), y.avg_chars(&s)));

    let b_col = InputColumn::boolean("b");
    let (x, y) = (a.boolean().unwrap(), b.boolean().unwrap());
    prop_assert_eq!(x.true_count(&b_col), y.true_count(&b_col));
    prop_assert_eq!(x.false_count(&b_col), y.false_count(&b_col));
    prop_assert_eq!(x.null_count(&b_col), y.null_count(&b_col));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_partitioning_is_invisible(
        (numbers, texts, flags) in rows_strategy(),
        partitions in 2usize..8,
    ) {
        let source = MemorySource::from_batch(batch(&numbers, &texts, &flags));
        let single = profile(&source, ProfileConfig::default().with_partitions(1));
        let split = profile(&source, ProfileConfig::default().with_partitions(partitions));
        assert_equivalent(&single, &split)?;

        // Sampled evidence ids do not depend on the split either.
        let n = InputColumn::number("n");
        let ids = |result: &ProfileResult| {
            result
                .number()
                .unwrap()
                .lowest_value_rows(&n)
                .map(|rows| rows.sample_rows().iter().map(|r| r.id).collect::<Vec<_>>())
        };
        prop_assert_eq!(ids(&single), ids(&split));
    }

    #[test]
    fn test_grouping_preserves_weights(
        (numbers, texts, flags) in rows_strategy(),
        partitions in 1usize..4,
    ) {
        // Few distinct values so that many rows collapse.
        let numbers: Vec<Option<i32>> = numbers.iter().map(|v| v.map(|v| v % 3)).collect();
        let texts: Vec<Option<String>> = texts
            .iter()
            .map(|t| t.as_ref().map(|t| t.chars().take(1).collect()))
            .collect();
        let source = MemorySource::from_batch(batch(&numbers, &texts, &flags));

        let plain = profile(&source, ProfileConfig::default().with_partitions(partitions));
        let grouped = profile(
            &source,
            ProfileConfig::default()
                .with_partitions(partitions)
                .with_group_identical_rows(true),
        );
        assert_equivalent(&plain, &grouped)?;

        let n = InputColumn::number("n");
        prop_assert_eq!(grouped.row_count(&n), Some(numbers.len() as u64));
    }
}
