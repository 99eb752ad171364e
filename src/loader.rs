use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Direction, ObjectId};
use crate::error::LoaderError;
use crate::relation::Link;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetRecord {
    pub id: ObjectId,
    pub code: String,
    pub kind: String,
    #[serde(default)]
    pub type_id: Option<ObjectId>,
    #[serde(default)]
    pub frozen: bool,
    pub registration_date: DateTime<Utc>,
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetTypeRecord {
    pub id: ObjectId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,
}

/// Storage row of a physical data set; `id` is the data set id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalDataRecord {
    pub id: ObjectId,
    #[serde(default)]
    pub share_id: Option<String>,
    pub location: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub speed_hint: i32,
    #[serde(default)]
    pub file_format_type_id: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFormatTypeRecord {
    pub id: ObjectId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Content copy row of a link data set; `id` is the data set id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDataRecord {
    pub id: ObjectId,
    #[serde(default)]
    pub external_code: Option<String>,
    #[serde(default)]
    pub external_dms_id: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDmsRecord {
    pub id: ObjectId,
    pub code: String,
    #[serde(default)]
    pub label: Option<String>,
    pub address: String,
    pub address_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: ObjectId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssignmentRecord {
    pub data_set_id: ObjectId,
    pub tag_id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryRecord {
    pub id: ObjectId,
    pub data_set_id: ObjectId,
    pub relation_type: String,
    pub related_id: ObjectId,
    pub valid_from: DateTime<Utc>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub data_set_id: ObjectId,
    pub code: String,
    pub value: String,
}

/// One row of the data set relationship table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub parent_id: ObjectId,
    pub child_id: ObjectId,
    pub relationship_type: String,
    #[serde(default)]
    pub ordinal: Option<i64>,
}

/// Batch data access used by the translators.
///
/// Every method receives the complete id set of one translation step and is
/// expected to answer it with a single round trip. Link loaders return one
/// row per `(owner, related)` pair; owners without related objects simply
/// have no rows.
pub trait RecordLoader: Send + Sync {
    fn load_data_sets(&self, ids: &BTreeSet<ObjectId>) -> Result<Vec<DataSetRecord>, LoaderError>;
    fn load_data_set_types(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<DataSetTypeRecord>, LoaderError>;
    fn load_physical_data(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<PhysicalDataRecord>, LoaderError>;
    fn load_file_format_types(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<FileFormatTypeRecord>, LoaderError>;
    fn load_linked_data(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<LinkedDataRecord>, LoaderError>;
    fn load_external_dms(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<ExternalDmsRecord>, LoaderError>;
    fn load_tags(&self, ids: &BTreeSet<ObjectId>) -> Result<Vec<TagRecord>, LoaderError>;
    fn load_history_entries(
        &self,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<HistoryEntryRecord>, LoaderError>;

    fn load_data_set_type_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_data_set_properties(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<PropertyRecord>, LoaderError>;
    /// Relationship rows touching the owners on the given side.
    fn load_data_set_relationships(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
        direction: Direction,
    ) -> Result<Vec<RelationshipRecord>, LoaderError>;
    fn load_physical_data_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_linked_data_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_data_set_tag_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_data_set_history_links(
        &self,
        data_set_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_file_format_type_links(
        &self,
        physical_data_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_external_dms_links(
        &self,
        linked_data_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
    fn load_history_data_set_links(
        &self,
        history_entry_ids: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, LoaderError>;
}
