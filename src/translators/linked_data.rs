use std::collections::{BTreeMap, BTreeSet};

use crate::context::TranslationContext;
use crate::domain::{EntityKind, ObjectId};
use crate::error::FetchGraphError;
use crate::fetch::{ExternalDmsFetchOptions, Fetched, LinkedDataFetchOptions};
use crate::model::{ExternalDms, LinkedData};
use crate::relation::{Link, Relation, ToOneRelation, fold_one};
use crate::translator::EntityTranslator;

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedDataTranslator;

impl EntityTranslator for LinkedDataTranslator {
    type Output = LinkedData;
    type FetchOptions = LinkedDataFetchOptions;

    const KIND: EntityKind = EntityKind::LinkedData;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, LinkedData>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_linked_data(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    LinkedData {
                        id: record.id,
                        external_code: record.external_code,
                        external_dms: Fetched::NotFetched,
                    },
                )
            })
            .collect())
    }

    fn fill_relations(
        &self,
        ctx: &mut TranslationContext<'_>,
        shells: &mut BTreeMap<ObjectId, LinkedData>,
        fetch: &LinkedDataFetchOptions,
    ) -> Result<(), FetchGraphError> {
        if let Some(options) = fetch.external_dms_options() {
            let ids = shells.keys().copied().collect::<BTreeSet<_>>();
            let related = ExternalDmsRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.external_dms);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalDmsTranslator;

impl EntityTranslator for ExternalDmsTranslator {
    type Output = ExternalDms;
    type FetchOptions = ExternalDmsFetchOptions;

    const KIND: EntityKind = EntityKind::ExternalDms;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, ExternalDms>, FetchGraphError> {
        Ok(ctx
            .loader()
            .load_external_dms(ids)?
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    ExternalDms {
                        id: record.id,
                        code: record.code,
                        label: record.label,
                        address: record.address,
                        address_type: record.address_type,
                    },
                )
            })
            .collect())
    }
}

struct ExternalDmsRelation;

impl Relation for ExternalDmsRelation {
    type Target = ExternalDmsTranslator;

    fn name(&self) -> &'static str {
        "external_dms"
    }

    fn target(&self) -> &ExternalDmsTranslator {
        &ExternalDmsTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_external_dms_links(owners)?)
    }
}

impl ToOneRelation for ExternalDmsRelation {}
