use std::collections::{BTreeMap, BTreeSet};

use crate::context::TranslationContext;
use crate::domain::{EntityKind, ObjectId};
use crate::error::FetchGraphError;
use crate::fetch::TagFetchOptions;
use crate::model::Tag;
use crate::translator::EntityTranslator;

/// Tags are private to their owner, so they pass the gate like data sets do.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagTranslator;

impl EntityTranslator for TagTranslator {
    type Output = Tag;
    type FetchOptions = TagFetchOptions;

    const KIND: EntityKind = EntityKind::Tag;
    const SECURED: bool = true;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, Tag>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_tags(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    Tag {
                        id: record.id,
                        code: record.code,
                        description: record.description,
                        owner: record.owner,
                    },
                )
            })
            .collect())
    }
}
