//! Per-column accumulator for text values.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::analyzers::{track_extreme, Extreme};
use crate::data::InputRow;
use crate::stats::AverageBuilder;
use crate::storage::{RowAnnotation, RowAnnotationFactory};

/// Character tallies of a single value, unweighted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CharProfile {
    pub(crate) chars: u64,
    pub(crate) words: u64,
    pub(crate) whitespace: u64,
    pub(crate) letters: u64,
    pub(crate) uppercase: u64,
    pub(crate) uppercase_excl_first_letters: u64,
    pub(crate) lowercase: u64,
    pub(crate) digits: u64,
    pub(crate) diacritics: u64,
    pub(crate) non_letters: u64,
}

impl CharProfile {
    pub(crate) fn of(value: &str) -> Self {
        let mut profile = CharProfile {
            words: value.split_whitespace().count() as u64,
            ..CharProfile::default()
        };
        let mut first_letter = true;
        for c in value.chars() {
            profile.chars += 1;
            if c.is_alphabetic() {
                profile.letters += 1;
                if c.is_uppercase() {
                    profile.uppercase += 1;
                    if !first_letter {
                        profile.uppercase_excl_first_letters += 1;
                    }
                } else {
                    profile.lowercase += 1;
                }
                if is_diacritic(c) {
                    profile.diacritics += 1;
                }
                first_letter = false;
            } else {
                profile.non_letters += 1;
                if c.is_numeric() {
                    profile.digits += 1;
                }
                if c.is_whitespace() {
                    profile.whitespace += 1;
                }
                if c == '.' {
                    first_letter = true;
                }
            }
        }
        profile
    }
}

/// Latin letters carrying an accent or other diacritical mark.
pub(crate) fn is_diacritic(c: char) -> bool {
    matches!(
        c,
        'À'..='Å' | 'Ç'..='Ï' | 'Ñ'..='Ö' | 'Ù'..='Ý'
            | 'à'..='å' | 'ç'..='ï' | 'ñ'..='ö' | 'ù'..='ý' | 'ÿ'
            | '\u{0100}'..='\u{0137}' | '\u{0139}'..='\u{0148}' | '\u{014C}'..='\u{0151}'
            | '\u{0154}'..='\u{017E}' | '\u{01CD}'..='\u{01DC}' | '\u{1E00}'..='\u{1EFF}'
    )
}

#[derive(Debug, Default)]
struct StringState {
    row_count: u64,
    entirely_uppercase: u64,
    entirely_lowercase: u64,
    total_chars: u64,
    total_words: u64,
    uppercase: u64,
    uppercase_excl_first_letters: u64,
    lowercase: u64,
    digits: u64,
    diacritics: u64,
    non_letters: u64,
    max_chars: Option<u64>,
    min_chars: Option<u64>,
    max_words: Option<u64>,
    min_words: Option<u64>,
    max_whitespace: Option<u64>,
    min_whitespace: Option<u64>,
    char_average: AverageBuilder,
    word_average: AverageBuilder,
    whitespace_average: AverageBuilder,
}

/// Point-in-time copy of a [`StringColumnDelegate`]'s tallies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringStatistics {
    pub row_count: u64,
    pub null_count: u64,
    pub blank_count: u64,
    pub entirely_uppercase: u64,
    pub entirely_lowercase: u64,
    pub total_chars: u64,
    pub total_words: u64,
    pub uppercase: u64,
    pub uppercase_excl_first_letters: u64,
    pub lowercase: u64,
    pub digits: u64,
    pub diacritics: u64,
    pub non_letters: u64,
    pub max_chars: Option<u64>,
    pub min_chars: Option<u64>,
    pub max_words: Option<u64>,
    pub min_words: Option<u64>,
    pub max_whitespace: Option<u64>,
    pub min_whitespace: Option<u64>,
    pub avg_chars: Option<f64>,
    pub avg_words: Option<f64>,
    pub avg_whitespace: Option<f64>,
}

/// Evidence annotations kept by a [`StringColumnDelegate`].
#[derive(Debug, Clone)]
pub(crate) struct StringAnnotations {
    pub(crate) null: RowAnnotation,
    pub(crate) blank: RowAnnotation,
    pub(crate) entirely_uppercase: RowAnnotation,
    pub(crate) entirely_lowercase: RowAnnotation,
    pub(crate) max_chars: RowAnnotation,
    pub(crate) min_chars: RowAnnotation,
    pub(crate) max_words: RowAnnotation,
    pub(crate) min_words: RowAnnotation,
    pub(crate) max_whitespace: RowAnnotation,
    pub(crate) min_whitespace: RowAnnotation,
    pub(crate) uppercase_excl_first_letters: RowAnnotation,
    pub(crate) digits: RowAnnotation,
    pub(crate) diacritics: RowAnnotation,
}

impl StringAnnotations {
    pub(crate) fn new(factory: &dyn RowAnnotationFactory) -> Self {
        Self {
            null: factory.create_annotation(),
            blank: factory.create_annotation(),
            entirely_uppercase: factory.create_annotation(),
            entirely_lowercase: factory.create_annotation(),
            max_chars: factory.create_annotation(),
            min_chars: factory.create_annotation(),
            max_words: factory.create_annotation(),
            min_words: factory.create_annotation(),
            max_whitespace: factory.create_annotation(),
            min_whitespace: factory.create_annotation(),
            uppercase_excl_first_letters: factory.create_annotation(),
            digits: factory.create_annotation(),
            diacritics: factory.create_annotation(),
        }
    }
}

/// Accumulates the text measures of one column in a single pass.
#[derive(Debug)]
pub struct StringColumnDelegate {
    factory: Arc<dyn RowAnnotationFactory>,
    state: Mutex<StringState>,
    annotations: StringAnnotations,
}

impl StringColumnDelegate {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            annotations: StringAnnotations::new(factory.as_ref()),
            state: Mutex::new(StringState::default()),
            factory,
        }
    }

    /// Processes one value; `None` counts as null.
    pub fn run(&self, row: &dyn InputRow, value: Option<&str>, distinct_count: u64) {
        let factory = self.factory.as_ref();
        let a = &self.annotations;
        let w = distinct_count;

        let mut state = self.state.lock();
        state.row_count += w;

        let Some(value) = value else {
            factory.annotate(row, w, &a.null);
            return;
        };
        if value.is_empty() {
            factory.annotate(row, w, &a.blank);
        }

        let p = CharProfile::of(value);
        state.total_chars += p.chars * w;
        state.total_words += p.words * w;
        state.uppercase += p.uppercase * w;
        state.lowercase += p.lowercase * w;
        state.non_letters += p.non_letters * w;
        if p.uppercase_excl_first_letters > 0 {
            state.uppercase_excl_first_letters += p.uppercase_excl_first_letters * w;
            factory.annotate(row, w, &a.uppercase_excl_first_letters);
        }
        if p.diacritics > 0 {
            state.diacritics += p.diacritics * w;
            factory.annotate(row, w, &a.diacritics);
        }
        if p.digits > 0 {
            state.digits += p.digits * w;
            factory.annotate(row, w, &a.digits);
        }

        track_extreme(
            Extreme::Max,
            &mut state.max_chars,
            p.chars,
            factory,
            &a.max_chars,
            row,
            w,
        );
        track_extreme(
            Extreme::Min,
            &mut state.min_chars,
            p.chars,
            factory,
            &a.min_chars,
            row,
            w,
        );
        track_extreme(
            Extreme::Max,
            &mut state.max_words,
            p.words,
            factory,
            &a.max_words,
            row,
            w,
        );
        track_extreme(
            Extreme::Min,
            &mut state.min_words,
            p.words,
            factory,
            &a.min_words,
            row,
            w,
        );
        track_extreme(
            Extreme::Max,
            &mut state.max_whitespace,
            p.whitespace,
            factory,
            &a.max_whitespace,
            row,
            w,
        );
        track_extreme(
            Extreme::Min,
            &mut state.min_whitespace,
            p.whitespace,
            factory,
            &a.min_whitespace,
            row,
            w,
        );

        if p.letters > 0 {
            if value == value.to_uppercase() {
                state.entirely_uppercase += w;
                factory.annotate(row, w, &a.entirely_uppercase);
            }
            if value == value.to_lowercase() {
                state.entirely_lowercase += w;
                factory.annotate(row, w, &a.entirely_lowercase);
            }
        }

        state.char_average.add(p.chars as f64, w);
        state.word_average.add(p.words as f64, w);
        state.whitespace_average.add(p.whitespace as f64, w);
    }

    /// Snapshot of the tallies.
    pub fn statistics(&self) -> StringStatistics {
        let state = self.state.lock();
        StringStatistics {
            row_count: state.row_count,
            null_count: self.annotations.null.row_count(),
            blank_count: self.annotations.blank.row_count(),
            entirely_uppercase: state.entirely_uppercase,
            entirely_lowercase: state.entirely_lowercase,
            total_chars: state.total_chars,
            total_words: state.total_words,
            uppercase: state.uppercase,
            uppercase_excl_first_letters: state.uppercase_excl_first_letters,
            lowercase: state.lowercase,
            digits: state.digits,
            diacritics: state.diacritics,
            non_letters: state.non_letters,
            max_chars: state.max_chars,
            min_chars: state.min_chars,
            max_words: state.max_words,
            min_words: state.min_words,
            max_whitespace: state.max_whitespace,
            min_whitespace: state.min_whitespace,
            avg_chars: state.char_average.average(),
            avg_words: state.word_average.average(),
            avg_whitespace: state.whitespace_average.average(),
        }
    }

    pub(crate) fn annotations(&self) -> &StringAnnotations {
        &self.annotations
    }

    /// Rows that were null.
    pub fn null_annotation(&self) -> &RowAnnotation {
        &self.annotations.null
    }

    /// Rows that were the empty string.
    pub fn blank_annotation(&self) -> &RowAnnotation {
        &self.annotations.blank
    }
}
