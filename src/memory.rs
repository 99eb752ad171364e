//! In-memory record loader backed by a JSON snapshot.
//!
//! The snapshot holds raw rows exactly as a persistence layer would return
//! them, plus the grant table used by the CLI. Every call is recorded so the
//! number of round trips per relation can be checked.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::sync::Mutex;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::auth::GrantTable;
use crate::domain::{Direction, ObjectId};
use crate::error::{FetchGraphError, LoaderError};
use crate::loader::{
    DataSetRecord, DataSetTypeRecord, ExternalDmsRecord, FileFormatTypeRecord, HistoryEntryRecord,
    LinkedDataRecord, PhysicalDataRecord, PropertyRecord, RecordLoader, RelationshipRecord,
    TagAssignmentRecord, TagRecord,
};
use crate::relation::Link;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub data_sets: Vec<DataSetRecord>,
    pub data_set_types: Vec<DataSetTypeRecord>,
    pub physical_data: Vec<PhysicalDataRecord>,
    pub file_format_types: Vec<FileFormatTypeRecord>,
    pub linked_data: Vec<LinkedDataRecord>,
    pub external_dms: Vec<ExternalDmsRecord>,
    pub tags: Vec<TagRecord>,
    pub tag_assignments: Vec<TagAssignmentRecord>,
    pub history: Vec<HistoryEntryRecord>,
    pub properties: Vec<PropertyRecord>,
    pub relationships: Vec<RelationshipRecord>,
    pub grants: GrantTable,
}

impl Snapshot {
    pub fn from_path(path: &Utf8Path) -> Result<Self, FetchGraphError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| FetchGraphError::SnapshotRead(path.as_std_path().to_path_buf()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, FetchGraphError> {
        serde_json::from_str(content).map_err(|err| FetchGraphError::SnapshotParse(err.to_string()))
    }
}

/// One recorded loader round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderCall {
    pub operation: &'static str,
    pub ids: usize,
}

pub struct MemoryLoader {
    data_sets: BTreeMap<ObjectId, DataSetRecord>,
    data_set_types: BTreeMap<ObjectId, DataSetTypeRecord>,
    physical_data: BTreeMap<ObjectId, PhysicalDataRecord>,
    file_format_types: BTreeMap<ObjectId, FileFormatTypeRecord>,
    linked_data: BTreeMap<ObjectId, LinkedDataRecord>,
    external_dms: BTreeMap<ObjectId, ExternalDmsRecord>,
    tags: BTreeMap<ObjectId, TagRecord>,
    history: BTreeMap<ObjectId, HistoryEntryRecord>,
    tag_assignments: Vec<TagAssignmentRecord>,
    properties: Vec<PropertyRecord>,
    relationships: Vec<RelationshipRecord>,
    failure: Option<LoaderError>,
    calls: Mutex<Vec<LoaderCall>>,
}

impl MemoryLoader {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            data_sets: index(snapshot.data_sets, |record| record.id),
            data_set_types: index(snapshot.data_set_types, |record| record.id),
            physical_data: index(snapshot.physical_data, |record| record.id),
            file_format_types: index(snapshot.file_format_types, |record| record.id),
            linked_data: index(snapshot.linked_data, |record| record.id),
            external_dms: index(snapshot.external_dms, |record| record.id),
            tags: index(snapshot.tags, |record| record.id),
            history: index(snapshot.history, |record| record.id),
            tag_assignments: snapshot.tag_assignments,
            properties: snapshot.properties,
            relationships: snapshot.relationships,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes every call to `operation` fail with `message`.
    pub fn fail_on(mut self, operation: &'static str, message: impl Into<String>) -> Self {
        self.failure = Some(LoaderError::new(operation, message));
        self
    }

    pub fn calls(&self) -> Vec<LoaderCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn reset_calls(&self) {
        self.lock_calls().clear();
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<LoaderCall>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, operation: &'static str, ids: &BTreeSet<ObjectId>) -> Result<(), LoaderError> {
        self.lock_calls().push(LoaderCall {
            operation,
            ids: ids.len(),
        });
        match &self.failure {
            Some(failure) if failure.operation == operation => Err(failure.clone()),
            _ => Ok(()),
        }
    }
}

fn index<R>(records: Vec<R>, key: impl Fn(&R) -> ObjectId) -> BTreeMap<ObjectId, R> {
    records
        .into_iter()
        .map(|record| (key(&record), record))
        .collect()
}

fn select<R: Clone>(table: &BTreeMap<ObjectId, R>, ids: &BTreeSet<ObjectId>) -> Vec<R> {
    ids.iter().filter_map(|id| table.get(id)).cloned().collect()
}

fn optional_links<R>(
    table: &BTreeMap<ObjectId, R>,
    ids: &BTreeSet<ObjectId>,
    related: impl Fn(&R) -> Option<ObjectId>,
) -> Vec<Link> {
    ids.iter()
        .filter_map(|id| {
            let record = table.get(id)?;
            related(record).map(|related| Link::new(*id, related))
        })
        .collect()
}

impl RecordLoader for MemoryLoader {
    fn load_data_sets(&self, ids: &BTreeSet<ObjectId>) -> Result<Vec<DataSetRecord>, LoaderError> {
        self.record("load_data_sets", ids)?;
        Ok(select(&self.data_sets, ids))
    }

    fn load_data_set_types(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<DataSetTypeRecord>, LoaderError> {
        self.record("load_data_set_types", ids)?;
        Ok(select(&self.data_set_types, ids))
    }

    fn load_physical_data(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<PhysicalDataRecord>, LoaderError> {
        self.record("load_physical_data", ids)?;
        Ok(select(&self.physical_data, ids))
    }

    fn load_file_format_types(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<FileFormatTypeRecord>, LoaderError> {
        self.record("load_file_format_types", ids)?;
        Ok(select(&self.file_format_types, ids))
    }

    fn load_linked_data(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<LinkedDataRecord>, LoaderError> {
        self.record("load_linked_data", ids)?;
        Ok(select(&self.linked_data, ids))
    }

    fn load_external_dms(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<ExternalDmsRecord>, LoaderError> {
        self.record("load_external_dms", ids)?;
        Ok(select(&self.external_dms, ids))
    }

    fn load_tags(&self, ids: &BTreeSet<ObjectId>) -> Result<Vec<TagRecord>, LoaderError> {
        self.record("load_tags", ids)?;
        Ok(select(&self.tags, ids))
    }

    fn load_history_entries(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<HistoryEntryRecord>, LoaderError> {
        self.record("load_history_entries", ids)?;
        Ok(select(&self.history, ids))
    }

    fn load_data_set_type_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_data_set_type_links", data_set_ids)?;
        Ok(optional_links(&self.data_sets, data_set_ids, |record| {
            record.type_id
        }))
    }

    fn load_data_set_properties(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<PropertyRecord>, LoaderError> {
        self.record("load_data_set_properties", data_set_ids)?;
        Ok(self
            .properties
            .iter()
            .filter(|record| data_set_ids.contains(&record.data_set_id))
            .cloned()
            .collect())
    }

    fn load_data_set_relationships(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
        direction: Direction,
    ) -> Result<Vec<RelationshipRecord>, LoaderError> {
        self.record("load_data_set_relationships", data_set_ids)?;
        Ok(self
            .relationships
            .iter()
            .filter(|record| match direction {
                Direction::Upstream => data_set_ids.contains(&record.child_id),
                Direction::Downstream => data_set_ids.contains(&record.parent_id),
            })
            .cloned()
            .collect())
    }

    fn load_physical_data_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_physical_data_links", data_set_ids)?;
        Ok(optional_links(&self.physical_data, data_set_ids, |record| {
            Some(record.id)
        }))
    }

    fn load_linked_data_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_linked_data_links", data_set_ids)?;
        Ok(optional_links(&self.linked_data, data_set_ids, |record| {
            Some(record.id)
        }))
    }

    fn load_data_set_tag_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_data_set_tag_links", data_set_ids)?;
        Ok(self
            .tag_assignments
            .iter()
            .filter(|record| data_set_ids.contains(&record.data_set_id))
            .map(|record| Link::new(record.data_set_id, record.tag_id))
            .collect())
    }

    fn load_data_set_history_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_data_set_history_links", data_set_ids)?;
        Ok(self
            .history
            .values()
            .filter(|record| data_set_ids.contains(&record.data_set_id))
            .map(|record| Link::new(record.data_set_id, record.id))
            .collect())
    }

    fn load_file_format_type_links(
        &self,
        physical_data_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_file_format_type_links", physical_data_ids)?;
        Ok(optional_links(
            &self.physical_data,
            physical_data_ids,
            |record| record.file_format_type_id,
        ))
    }

    fn load_external_dms_links(
        &self,
        linked_data_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_external_dms_links", linked_data_ids)?;
        Ok(optional_links(&self.linked_data, linked_data_ids, |record| {
            record.external_dms_id
        }))
    }

    fn load_history_data_set_links(
        &self,
        history_entry_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError> {
        self.record("load_history_data_set_links", history_entry_ids)?;
        Ok(optional_links(&self.history, history_entry_ids, |record| {
            Some(record.related_id)
        }))
    }
}
