//! Tests for the annotation store.

use super::*;
use crate::data::{InputColumn, MemoryRow};
use std::sync::Arc;

fn row(id: u64) -> MemoryRow {
    MemoryRow::new(id).with("value", id as f64)
}

#[test]
fn test_annotate_counts_weights() {
    let factory = InMemoryRowAnnotationFactory::new();
    let annotation = factory.create_annotation();
    assert!(annotation.is_empty());

    factory.annotate(&row(1), 1, &annotation);
    factory.annotate(&row(2), 4, &annotation);

    assert_eq!(annotation.row_count(), 5);
    let samples = factory.sample_rows(&annotation);
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].id, 1);
    assert_eq!(samples[1].id, 2);
}

#[test]
fn test_sample_cap_keeps_count_exact() {
    let factory = InMemoryRowAnnotationFactory::with_max_sample_rows(3);
    let annotation = factory.create_annotation();

    for id in 0..10 {
        factory.annotate(&row(id), 2, &annotation);
    }

    assert_eq!(annotation.row_count(), 20);
    assert_eq!(factory.sample_rows(&annotation).len(), 3);
}

#[test]
fn test_counts_only_factory() {
    let factory = InMemoryRowAnnotationFactory::with_max_sample_rows(0);
    let annotation = factory.create_annotation();
    factory.annotate(&row(1), 1, &annotation);

    assert_eq!(annotation.row_count(), 1);
    assert!(!factory.has_sample_rows(&annotation));
    let column = InputColumn::number("value");
    assert!(
        AnnotatedRows::create_if_sample_rows_available(&annotation, &factory, [&column]).is_none()
    );
}

#[test]
fn test_reset_annotation() {
    let factory = InMemoryRowAnnotationFactory::new();
    let annotation = factory.create_annotation();
    factory.annotate(&row(1), 3, &annotation);

    factory.reset_annotation(&annotation);

    assert_eq!(annotation.row_count(), 0);
    assert!(!factory.has_sample_rows(&annotation));
}

#[test]
fn test_transfer_unions_samples_in_row_order() {
    let factory = InMemoryRowAnnotationFactory::with_max_sample_rows(3);
    let a = factory.create_annotation();
    let b = factory.create_annotation();
    factory.annotate(&row(5), 1, &a);
    factory.annotate(&row(1), 1, &a);
    factory.annotate(&row(3), 2, &b);
    factory.annotate(&row(4), 1, &b);

    let ab = factory.create_annotation();
    factory.transfer_annotations(&a, &ab);
    factory.transfer_annotations(&b, &ab);

    let ba = factory.create_annotation();
    factory.transfer_annotations(&b, &ba);
    factory.transfer_annotations(&a, &ba);

    assert_eq!(ab.row_count(), 5);
    assert_eq!(ab.snapshot(), ba.snapshot());
    let ids: Vec<u64> = ab.snapshot().sample_rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);

    // source annotations are left untouched
    assert_eq!(a.row_count(), 2);
}

#[test]
fn test_transfer_to_self_is_noop() {
    let factory = InMemoryRowAnnotationFactory::new();
    let annotation = factory.create_annotation();
    factory.annotate(&row(1), 1, &annotation);

    factory.transfer_annotations(&annotation, &annotation.clone());

    assert_eq!(annotation.row_count(), 1);
}

#[test]
fn test_concurrent_annotation_of_same_annotation() {
    let factory = Arc::new(InMemoryRowAnnotationFactory::with_max_sample_rows(10));
    let annotation = factory.create_annotation();

    std::thread::scope(|scope| {
        for t in 0..8u64 {
            let factory = factory.clone();
            let annotation = annotation.clone();
            scope.spawn(move || {
                for i in 0..1000u64 {
                    factory.annotate(&row(t * 1000 + i), 1, &annotation);
                }
            });
        }
    });

    assert_eq!(annotation.row_count(), 8000);
    assert_eq!(factory.sample_rows(&annotation).len(), 10);
}

#[test]
fn test_annotation_serde_roundtrip() {
    let factory = InMemoryRowAnnotationFactory::new();
    let annotation = factory.create_annotation();
    factory.annotate(&row(9), 2, &annotation);

    let json = serde_json::to_string(&annotation).unwrap();
    let restored: RowAnnotation = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.snapshot(), annotation.snapshot());
    assert!(!restored.ptr_eq(&annotation));
}
