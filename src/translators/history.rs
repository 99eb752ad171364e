use std::collections::{BTreeMap, BTreeSet};

use crate::context::TranslationContext;
use crate::domain::{EntityKind, HistoryRelationType, ObjectId};
use crate::error::FetchGraphError;
use crate::fetch::{Fetched, HistoryEntryFetchOptions};
use crate::loader::HistoryEntryRecord;
use crate::model::HistoryEntry;
use crate::relation::{Link, Relation, ToOneRelation, fold_one};
use crate::translator::EntityTranslator;
use crate::translators::data_set::DataSetTranslator;

/// Relationship history of data sets. The related data set of an entry is
/// often the owner's own parent or child, so expanding it walks back into
/// data sets that are already being translated.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryEntryTranslator;

impl EntityTranslator for HistoryEntryTranslator {
    type Output = HistoryEntry;
    type FetchOptions = HistoryEntryFetchOptions;

    const KIND: EntityKind = EntityKind::HistoryEntry;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, HistoryEntry>, FetchGraphError> {
        let mut shells = BTreeMap::new();
        for record in ctx.loader().load_history_entries(ids)? {
            shells.insert(record.id, history_shell(record)?);
        }
        Ok(shells)
    }

    fn fill_relations(
        &self,
        ctx: &mut TranslationContext<'_>,
        shells: &mut BTreeMap<ObjectId, HistoryEntry>,
        fetch: &HistoryEntryFetchOptions,
    ) -> Result<(), FetchGraphError> {
        if let Some(options) = fetch.related_data_set_options() {
            let ids = shells.keys().copied().collect::<BTreeSet<_>>();
            let related = RelatedDataSetRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.related_data_set);
        }
        Ok(())
    }
}

fn history_shell(record: HistoryEntryRecord) -> Result<HistoryEntry, FetchGraphError> {
    let relation_type: HistoryRelationType = record.relation_type.parse()?;
    Ok(HistoryEntry {
        id: record.id,
        relation_type,
        related_object_id: record.related_id,
        valid_from: record.valid_from,
        valid_to: record.valid_to,
        author: record.author,
        related_data_set: Fetched::NotFetched,
    })
}

struct RelatedDataSetRelation;

impl Relation for RelatedDataSetRelation {
    type Target = DataSetTranslator;

    fn name(&self) -> &'static str {
        "related_data_set"
    }

    fn target(&self) -> &DataSetTranslator {
        &DataSetTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_history_data_set_links(owners)?)
    }
}

impl ToOneRelation for RelatedDataSetRelation {}
