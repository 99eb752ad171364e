use std::collections::{BTreeMap, BTreeSet};

use crate::context::TranslationContext;
use crate::domain::{EntityKind, ObjectId};
use crate::error::FetchGraphError;
use crate::fetch::DataSetTypeFetchOptions;
use crate::model::DataSetType;
use crate::translator::EntityTranslator;

#[derive(Debug, Clone, Copy, Default)]
pub struct DataSetTypeTranslator;

impl EntityTranslator for DataSetTypeTranslator {
    type Output = DataSetType;
    type FetchOptions = DataSetTypeFetchOptions;

    const KIND: EntityKind = EntityKind::DataSetType;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, DataSetType>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_data_set_types(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    DataSetType {
                        id: record.id,
                        code: record.code,
                        description: record.description,
                        modification_date: record.modification_date,
                    },
                )
            })
            .collect())
    }
}
