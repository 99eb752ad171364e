//! Translated outputs.
//!
//! Relation fields hold [`Ref`] handles rather than nested objects. The
//! translation cache is the arena the handles point into, which keeps cyclic
//! graphs (parent/child, container/component, history) representable without
//! reference cycles. Two handles are the same object exactly when their ids
//! are equal.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::context::TranslatorId;
use crate::domain::{DataSetKind, HistoryRelationType, ObjectId};
use crate::fetch::Fetched;

/// A translated output type and the translator that produces it.
pub trait Entity: Send + Sync + 'static {
    const TRANSLATOR: TranslatorId;

    fn id(&self) -> ObjectId;
}

/// Typed handle to another translated object.
pub struct Ref<T> {
    id: ObjectId,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            _entity: PhantomData,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> PartialOrd for Ref<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ref<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.id)
    }
}

impl<T> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSet {
    pub id: ObjectId,
    pub code: String,
    pub kind: DataSetKind,
    pub frozen: bool,
    pub registration_date: DateTime<Utc>,
    pub modification_date: Option<DateTime<Utc>>,
    #[serde(rename = "type", skip_serializing_if = "Fetched::is_not_fetched")]
    pub data_set_type: Fetched<Option<Ref<DataSetType>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub properties: Fetched<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub parents: Fetched<Vec<Ref<DataSet>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub children: Fetched<Vec<Ref<DataSet>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub containers: Fetched<Vec<Ref<DataSet>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub components: Fetched<Vec<Ref<DataSet>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub physical_data: Fetched<Option<Ref<PhysicalData>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub linked_data: Fetched<Option<Ref<LinkedData>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub tags: Fetched<Vec<Ref<Tag>>>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub history: Fetched<Vec<Ref<HistoryEntry>>>,
}

impl Entity for DataSet {
    const TRANSLATOR: TranslatorId = TranslatorId::new("data_set");

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSetType {
    pub id: ObjectId,
    pub code: String,
    pub description: Option<String>,
    pub modification_date: Option<DateTime<Utc>>,
}

impl Entity for DataSetType {
    const TRANSLATOR: TranslatorId = TranslatorId::new("data_set_type");

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Storage details of a physical data set; shares the id of its data set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalData {
    pub id: ObjectId,
    pub share_id: Option<String>,
    pub location: String,
    pub size: Option<u64>,
    pub status: String,
    pub speed_hint: i32,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub file_format_type: Fetched<Option<Ref<FileFormatType>>>,
}

impl Entity for PhysicalData {
    const TRANSLATOR: TranslatorId = TranslatorId::new("physical_data");

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFormatType {
    pub id: ObjectId,
    pub code: String,
    pub description: Option<String>,
}

impl Entity for FileFormatType {
    const TRANSLATOR: TranslatorId = TranslatorId::new("file_format_type");

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Link to a copy held by an external data management system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedData {
    pub id: ObjectId,
    pub external_code: Option<String>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub external_dms: Fetched<Option<Ref<ExternalDms>>>,
}

impl Entity for LinkedData {
    const TRANSLATOR: TranslatorId = TranslatorId::new("linked_data");

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalDms {
    pub id: ObjectId,
    pub code: String,
    pub label: Option<String>,
    pub address: String,
    pub address_type: String,
}

impl Entity for ExternalDms {
    const TRANSLATOR: TranslatorId = TranslatorId::new("external_dms");

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: ObjectId,
    pub code: String,
    pub description: Option<String>,
    pub owner: String,
}

impl Entity for Tag {
    const TRANSLATOR: TranslatorId = TranslatorId::new("tag");

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: ObjectId,
    pub relation_type: HistoryRelationType,
    pub related_object_id: ObjectId,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Fetched::is_not_fetched")]
    pub related_data_set: Fetched<Option<Ref<DataSet>>>,
}

impl Entity for HistoryEntry {
    const TRANSLATOR: TranslatorId = TranslatorId::new("history_entry");

    fn id(&self) -> ObjectId {
        self.id
    }
}
