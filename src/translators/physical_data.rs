use std::collections::{BTreeMap, BTreeSet};

use crate::context::TranslationContext;
use crate::domain::{EntityKind, ObjectId};
use crate::error::FetchGraphError;
use crate::fetch::{Fetched, FileFormatTypeFetchOptions, PhysicalDataFetchOptions};
use crate::model::{FileFormatType, PhysicalData};
use crate::relation::{Link, Relation, ToOneRelation, fold_one};
use crate::translator::EntityTranslator;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalDataTranslator;

impl EntityTranslator for PhysicalDataTranslator {
    type Output = PhysicalData;
    type FetchOptions = PhysicalDataFetchOptions;

    const KIND: EntityKind = EntityKind::PhysicalData;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, PhysicalData>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_physical_data(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    PhysicalData {
                        id: record.id,
                        share_id: record.share_id,
                        location: record.location,
                        size: record.size,
                        status: record.status,
                        speed_hint: record.speed_hint,
                        file_format_type: Fetched::NotFetched,
                    },
                )
            })
            .collect())
    }

    fn fill_relations(
        &self,
        ctx: &mut TranslationContext<'_>,
        shells: &mut BTreeMap<ObjectId, PhysicalData>,
        fetch: &PhysicalDataFetchOptions,
    ) -> Result<(), FetchGraphError> {
        if let Some(options) = fetch.file_format_type_options() {
            let ids = shells.keys().copied().collect::<BTreeSet<_>>();
            let related = FileFormatTypeRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.file_format_type);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileFormatTypeTranslator;

impl EntityTranslator for FileFormatTypeTranslator {
    type Output = FileFormatType;
    type FetchOptions = FileFormatTypeFetchOptions;

    const KIND: EntityKind = EntityKind::FileFormatType;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, FileFormatType>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_file_format_types(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    FileFormatType {
                        id: record.id,
                        code: record.code,
                        description: record.description,
                    },
                )
            })
            .collect())
    }
}

struct FileFormatTypeRelation;

impl Relation for FileFormatTypeRelation {
    type Target = FileFormatTypeTranslator;

    fn name(&self) -> &'static str {
        "file_format_type"
    }

    fn target(&self) -> &FileFormatTypeTranslator {
        &FileFormatTypeTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_file_format_type_links(owners)?)
    }
}

impl ToOneRelation for FileFormatTypeRelation {}
