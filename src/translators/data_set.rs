use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::context::TranslationContext;
use crate::domain::{DataSetKind, Direction, EntityKind, ObjectId, RelationshipType};
use crate::error::FetchGraphError;
use crate::fetch::{DataSetFetchOptions, Fetched};
use crate::loader::DataSetRecord;
use crate::model::DataSet;
use crate::relation::{
    Link, Relation, RelationOrder, ToManyRelation, ToOneRelation, fold_many, fold_one,
};
use crate::translator::EntityTranslator;
use crate::translators::data_set_type::DataSetTypeTranslator;
use crate::translators::history::HistoryEntryTranslator;
use crate::translators::linked_data::LinkedDataTranslator;
use crate::translators::physical_data::PhysicalDataTranslator;
use crate::translators::tag::TagTranslator;

#[derive(Debug, Clone, Copy, Default)]
pub struct DataSetTranslator;

impl EntityTranslator for DataSetTranslator {
    type Output = DataSet;
    type FetchOptions = DataSetFetchOptions;

    const KIND: EntityKind = EntityKind::DataSet;
    const SECURED: bool = true;

    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, DataSet>, FetchGraphError> {
        let mut shells = BTreeMap::new();
        for record in ctx.loader().load_data_sets(ids)? {
            shells.insert(record.id, data_set_shell(record)?);
        }
        Ok(shells)
    }

    fn fill_relations(
        &self,
        ctx: &mut TranslationContext<'_>,
        shells: &mut BTreeMap<ObjectId, DataSet>,
        fetch: &DataSetFetchOptions,
    ) -> Result<(), FetchGraphError> {
        let ids = shells.keys().copied().collect::<BTreeSet<_>>();

        if let Some(options) = fetch.type_options() {
            let related = DataSetTypeRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.data_set_type);
        }
        if fetch.has_properties() {
            let mut properties = load_properties(ctx, &ids)?;
            for (id, shell) in shells.iter_mut() {
                shell.properties = Fetched::Fetched(properties.remove(id).unwrap_or_default());
            }
        }
        if let Some(options) = fetch.parents_options() {
            let related = RelationshipRelation::PARENTS.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.parents);
        }
        if let Some(options) = fetch.children_options() {
            let related = RelationshipRelation::CHILDREN.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.children);
        }
        if let Some(options) = fetch.containers_options() {
            let related = RelationshipRelation::CONTAINERS.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.containers);
        }
        if let Some(options) = fetch.components_options() {
            let related = RelationshipRelation::COMPONENTS.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.components);
        }
        if let Some(options) = fetch.physical_data_options() {
            let related = PhysicalDataRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.physical_data);
        }
        if let Some(options) = fetch.linked_data_options() {
            let related = LinkedDataRelation.translate(ctx, &ids, options)?;
            fold_one(shells, related, |shell| &mut shell.linked_data);
        }
        if let Some(options) = fetch.tags_options() {
            let related = TagRelation.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.tags);
        }
        if let Some(options) = fetch.history_options() {
            let related = HistoryRelation.translate(ctx, &ids, options)?;
            fold_many(shells, related, |shell| &mut shell.history);
        }
        Ok(())
    }
}

fn data_set_shell(record: DataSetRecord) -> Result<DataSet, FetchGraphError> {
    let kind: DataSetKind = record.kind.parse()?;
    Ok(DataSet {
        id: record.id,
        code: record.code,
        kind,
        frozen: record.frozen,
        registration_date: record.registration_date,
        modification_date: record.modification_date,
        data_set_type: Fetched::NotFetched,
        properties: Fetched::NotFetched,
        parents: Fetched::NotFetched,
        children: Fetched::NotFetched,
        containers: Fetched::NotFetched,
        components: Fetched::NotFetched,
        physical_data: Fetched::NotFetched,
        linked_data: Fetched::NotFetched,
        tags: Fetched::NotFetched,
        history: Fetched::NotFetched,
    })
}

fn load_properties(
    ctx: &TranslationContext<'_>,
    ids: &BTreeSet<ObjectId>,
) -> Result<BTreeMap<ObjectId, BTreeMap<String, String>>, FetchGraphError> {
    let records = ctx.loader().load_data_set_properties(ids)?;
    trace!(rows = records.len(), "data set properties loaded");
    let mut properties = BTreeMap::<ObjectId, BTreeMap<String, String>>::new();
    for record in records {
        properties
            .entry(record.data_set_id)
            .or_default()
            .insert(record.code, record.value);
    }
    Ok(properties)
}

struct DataSetTypeRelation;

impl Relation for DataSetTypeRelation {
    type Target = DataSetTypeTranslator;

    fn name(&self) -> &'static str {
        "type"
    }

    fn target(&self) -> &DataSetTypeTranslator {
        &DataSetTypeTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_data_set_type_links(owners)?)
    }
}

impl ToOneRelation for DataSetTypeRelation {}

/// Parent/child and container/component relations read from the same
/// relationship table, filtered by type code and side.
struct RelationshipRelation {
    name: &'static str,
    relationship: RelationshipType,
    direction: Direction,
}

impl RelationshipRelation {
    const PARENTS: Self = Self {
        name: "parents",
        relationship: RelationshipType::ParentChild,
        direction: Direction::Upstream,
    };
    const CHILDREN: Self = Self {
        name: "children",
        relationship: RelationshipType::ParentChild,
        direction: Direction::Downstream,
    };
    const CONTAINERS: Self = Self {
        name: "containers",
        relationship: RelationshipType::ContainerComponent,
        direction: Direction::Upstream,
    };
    const COMPONENTS: Self = Self {
        name: "components",
        relationship: RelationshipType::ContainerComponent,
        direction: Direction::Downstream,
    };
}

impl Relation for RelationshipRelation {
    type Target = DataSetTranslator;

    fn name(&self) -> &'static str {
        self.name
    }

    fn target(&self) -> &DataSetTranslator {
        &DataSetTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        let records = ctx
            .loader()
            .load_data_set_relationships(owners, self.direction)?;
        let mut links = Vec::with_capacity(records.len());
        for record in records {
            let relationship: RelationshipType = record.relationship_type.parse()?;
            if relationship != self.relationship {
                continue;
            }
            let (owner, related) = match self.direction {
                Direction::Upstream => (record.child_id, record.parent_id),
                Direction::Downstream => (record.parent_id, record.child_id),
            };
            links.push(Link::ordered(owner, related, record.ordinal));
        }
        Ok(links)
    }
}

impl ToManyRelation for RelationshipRelation {
    fn order(&self) -> RelationOrder {
        RelationOrder::Ordinal
    }
}

struct PhysicalDataRelation;

impl Relation for PhysicalDataRelation {
    type Target = PhysicalDataTranslator;

    fn name(&self) -> &'static str {
        "physical_data"
    }

    fn target(&self) -> &PhysicalDataTranslator {
        &PhysicalDataTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_physical_data_links(owners)?)
    }
}

impl ToOneRelation for PhysicalDataRelation {}

struct LinkedDataRelation;

impl Relation for LinkedDataRelation {
    type Target = LinkedDataTranslator;

    fn name(&self) -> &'static str {
        "linked_data"
    }

    fn target(&self) -> &LinkedDataTranslator {
        &LinkedDataTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_linked_data_links(owners)?)
    }
}

impl ToOneRelation for LinkedDataRelation {}

struct TagRelation;

impl Relation for TagRelation {
    type Target = TagTranslator;

    fn name(&self) -> &'static str {
        "tags"
    }

    fn target(&self) -> &TagTranslator {
        &TagTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_data_set_tag_links(owners)?)
    }
}

impl ToManyRelation for TagRelation {
    fn order(&self) -> RelationOrder {
        RelationOrder::Unordered
    }
}

struct HistoryRelation;

impl Relation for HistoryRelation {
    type Target = HistoryEntryTranslator;

    fn name(&self) -> &'static str {
        "history"
    }

    fn target(&self) -> &HistoryEntryTranslator {
        &HistoryEntryTranslator
    }

    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError> {
        Ok(ctx.loader().load_data_set_history_links(owners)?)
    }
}

impl ToManyRelation for HistoryRelation {
    fn order(&self) -> RelationOrder {
        RelationOrder::Unordered
    }
}
