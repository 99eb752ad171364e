use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::context::TranslationContext;
use crate::domain::ObjectId;
use crate::error::FetchGraphError;
use crate::fetch::Fetched;
use crate::model::{
    DataSet, DataSetType, Entity, ExternalDms, FileFormatType, HistoryEntry, LinkedData,
    PhysicalData, Ref, Tag,
};

/// Everything reachable from the root data sets of one request, grouped by
/// kind. Shared objects appear once; relation fields refer to them by id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectGraph {
    pub roots: Vec<ObjectId>,
    pub data_sets: BTreeMap<ObjectId, Arc<DataSet>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data_set_types: BTreeMap<ObjectId, Arc<DataSetType>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub physical_data: BTreeMap<ObjectId, Arc<PhysicalData>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub file_format_types: BTreeMap<ObjectId, Arc<FileFormatType>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub linked_data: BTreeMap<ObjectId, Arc<LinkedData>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub external_dms: BTreeMap<ObjectId, Arc<ExternalDms>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<ObjectId, Arc<Tag>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub history: BTreeMap<ObjectId, Arc<HistoryEntry>>,
}

impl ObjectGraph {
    /// Walks every reference reachable from `roots` through the cache of `ctx`.
    pub fn collect(
        ctx: &TranslationContext<'_>,
        roots: &BTreeMap<ObjectId, Arc<DataSet>>,
    ) -> Result<Self, FetchGraphError> {
        let mut graph = ObjectGraph {
            roots: roots.keys().copied().collect(),
            ..ObjectGraph::default()
        };
        let mut pending = roots.values().cloned().collect::<Vec<_>>();
        let mut seen = roots.keys().copied().collect::<BTreeSet<_>>();

        while let Some(data_set) = pending.pop() {
            for reference in data_set_neighbours(&data_set) {
                if seen.insert(reference.id()) {
                    pending.push(ctx.resolve(reference)?);
                }
            }
            if let Some(Some(reference)) = data_set.data_set_type.get() {
                insert(ctx, &mut graph.data_set_types, *reference)?;
            }
            if let Some(Some(reference)) = data_set.physical_data.get() {
                let physical = insert(ctx, &mut graph.physical_data, *reference)?;
                if let Some(Some(format)) = physical.file_format_type.get() {
                    insert(ctx, &mut graph.file_format_types, *format)?;
                }
            }
            if let Some(Some(reference)) = data_set.linked_data.get() {
                let linked = insert(ctx, &mut graph.linked_data, *reference)?;
                if let Some(Some(dms)) = linked.external_dms.get() {
                    insert(ctx, &mut graph.external_dms, *dms)?;
                }
            }
            for reference in fetched_many(&data_set.tags) {
                insert(ctx, &mut graph.tags, *reference)?;
            }
            for reference in fetched_many(&data_set.history) {
                let entry = insert(ctx, &mut graph.history, *reference)?;
                if let Some(Some(related)) = entry.related_data_set.get() {
                    if seen.insert(related.id()) {
                        pending.push(ctx.resolve(*related)?);
                    }
                }
            }
            graph.data_sets.insert(data_set.id, data_set);
        }
        Ok(graph)
    }

    pub fn data_set(&self, reference: Ref<DataSet>) -> Option<&Arc<DataSet>> {
        self.data_sets.get(&reference.id())
    }

    pub fn object_count(&self) -> usize {
        self.data_sets.len()
            + self.data_set_types.len()
            + self.physical_data.len()
            + self.file_format_types.len()
            + self.linked_data.len()
            + self.external_dms.len()
            + self.tags.len()
            + self.history.len()
    }
}

fn data_set_neighbours(data_set: &DataSet) -> Vec<Ref<DataSet>> {
    [
        &data_set.parents,
        &data_set.children,
        &data_set.containers,
        &data_set.components,
    ]
    .into_iter()
    .flat_map(fetched_many)
    .copied()
    .collect()
}

fn fetched_many<T>(field: &Fetched<Vec<Ref<T>>>) -> &[Ref<T>] {
    field.get().map(Vec::as_slice).unwrap_or_default()
}

fn insert<T: Entity>(
    ctx: &TranslationContext<'_>,
    target: &mut BTreeMap<ObjectId, Arc<T>>,
    reference: Ref<T>,
) -> Result<Arc<T>, FetchGraphError> {
    if let Some(existing) = target.get(&reference.id()) {
        return Ok(Arc::clone(existing));
    }
    let value = ctx.resolve(reference)?;
    target.insert(reference.id(), Arc::clone(&value));
    Ok(value)
}
