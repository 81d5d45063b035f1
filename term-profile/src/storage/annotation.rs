//! The row annotation handle.

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::data::SampleRow;

/// Mutable state behind a [`RowAnnotation`].
#[derive(Debug, Default)]
pub(crate) struct AnnotationState {
    pub(crate) row_count: u64,
    pub(crate) sample_rows: Vec<SampleRow>,
}

/// Handle to the set of logical rows satisfying some predicate.
///
/// Cloning the handle is cheap and yields a handle to the same annotation.
/// The count is the sum of the distinct-count weights of every annotated row.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "AnnotationSnapshot", from = "AnnotationSnapshot")]
pub struct RowAnnotation {
    state: Arc<Mutex<AnnotationState>>,
}

impl RowAnnotation {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AnnotationState::default())),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AnnotationState> {
        self.state.lock()
    }

    /// Returns the number of logical rows in the annotation.
    pub fn row_count(&self) -> u64 {
        self.lock().row_count
    }

    /// Returns true if no rows have been annotated.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns true if both handles refer to the same annotation.
    pub fn ptr_eq(&self, other: &RowAnnotation) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Takes a consistent copy of the count and the sample.
    pub fn snapshot(&self) -> AnnotationSnapshot {
        let state = self.lock();
        AnnotationSnapshot {
            row_count: state.row_count,
            sample_rows: state.sample_rows.clone(),
        }
    }
}

impl fmt::Debug for RowAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RowAnnotation")
            .field("row_count", &state.row_count)
            .field("sample_rows", &state.sample_rows.len())
            .finish()
    }
}

/// Serializable, point-in-time copy of an annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    /// Sum of weights of the annotated rows.
    pub row_count: u64,
    /// Retained evidence rows.
    pub sample_rows: Vec<SampleRow>,
}

impl From<RowAnnotation> for AnnotationSnapshot {
    fn from(annotation: RowAnnotation) -> Self {
        annotation.snapshot()
    }
}

impl From<AnnotationSnapshot> for RowAnnotation {
    fn from(snapshot: AnnotationSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(AnnotationState {
                row_count: snapshot.row_count,
                sample_rows: snapshot.sample_rows,
            })),
        }
    }
}
