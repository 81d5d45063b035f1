use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    merge_columns, BooleanResultReducer, DateTimeResultReducer, NumberResultReducer,
    ResultReducer, StringResultReducer,
};
use crate::analyzers::ProfileResult;
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};

/// Reduces [`ProfileResult`]s family by family.
#[derive(Debug, Clone)]
pub struct ProfileResultReducer {
    number: NumberResultReducer,
    string: StringResultReducer,
    boolean: BooleanResultReducer,
    date_time: DateTimeResultReducer,
}

impl ProfileResultReducer {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            number: NumberResultReducer::new(factory.clone()),
            string: StringResultReducer::new(factory.clone()),
            boolean: BooleanResultReducer::new(factory.clone()),
            date_time: DateTimeResultReducer::new(factory),
        }
    }
}

impl Default for ProfileResultReducer {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryRowAnnotationFactory::new()))
    }
}

impl ResultReducer for ProfileResultReducer {
    type Result = ProfileResult;

    #[instrument(skip(self, partials), fields(reducer = "profile", partials = partials.len()))]
    fn reduce(&self, partials: &[ProfileResult]) -> Result<Option<ProfileResult>> {
        if partials.is_empty() {
            return Ok(None);
        }
        let number: Vec<_> = partials.iter().filter_map(ProfileResult::number).collect();
        let string: Vec<_> = partials.iter().filter_map(ProfileResult::string).collect();
        let boolean: Vec<_> = partials.iter().filter_map(ProfileResult::boolean).collect();
        let date_time: Vec<_> = partials.iter().filter_map(ProfileResult::date_time).collect();

        let result = ProfileResult::new(
            merge_columns(partials),
            self.number.reduce_refs(&number)?,
            self.string.reduce_refs(&string)?,
            self.boolean.reduce_refs(&boolean)?,
            self.date_time.reduce_refs(&date_time)?,
        );
        info!(partials = partials.len(), "Reduced profile results");
        Ok(Some(result))
    }
}
