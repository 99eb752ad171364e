#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use biodata_fetchgraph::auth::AuthorizationGate;
use biodata_fetchgraph::domain::{EntityKind, ObjectId, Principal};
use biodata_fetchgraph::error::GateError;
use biodata_fetchgraph::loader::{
    DataSetRecord, DataSetTypeRecord, ExternalDmsRecord, FileFormatTypeRecord, HistoryEntryRecord,
    LinkedDataRecord, PhysicalDataRecord, PropertyRecord, RelationshipRecord,
    TagAssignmentRecord, TagRecord,
};
use biodata_fetchgraph::memory::Snapshot;

pub fn ids(values: &[u64]) -> BTreeSet<ObjectId> {
    values.iter().copied().map(ObjectId::new).collect()
}

pub fn id(value: u64) -> ObjectId {
    ObjectId::new(value)
}

pub fn date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

pub fn data_set(id: u64) -> DataSetRecord {
    data_set_of_kind(id, "PHYSICAL")
}

pub fn data_set_of_kind(id: u64, kind: &str) -> DataSetRecord {
    DataSetRecord {
        id: ObjectId::new(id),
        code: format!("20240301-{id}"),
        kind: kind.to_string(),
        type_id: Some(ObjectId::new(100)),
        frozen: false,
        registration_date: date(1),
        modification_date: None,
    }
}

pub fn parent_child(parent: u64, child: u64) -> RelationshipRecord {
    RelationshipRecord {
        parent_id: ObjectId::new(parent),
        child_id: ObjectId::new(child),
        relationship_type: "PARENT_CHILD".to_string(),
        ordinal: None,
    }
}

pub fn container_component(container: u64, component: u64, ordinal: i64) -> RelationshipRecord {
    RelationshipRecord {
        parent_id: ObjectId::new(container),
        child_id: ObjectId::new(component),
        relationship_type: "CONTAINER_COMPONENT".to_string(),
        ordinal: Some(ordinal),
    }
}

pub fn history(id: u64, data_set: u64, relation: &str, related: u64) -> HistoryEntryRecord {
    HistoryEntryRecord {
        id: ObjectId::new(id),
        data_set_id: ObjectId::new(data_set),
        relation_type: relation.to_string(),
        related_id: ObjectId::new(related),
        valid_from: date(2),
        valid_to: None,
        author: Some("alice".to_string()),
    }
}

pub fn data_set_type(id: u64, code: &str) -> DataSetTypeRecord {
    DataSetTypeRecord {
        id: ObjectId::new(id),
        code: code.to_string(),
        description: None,
        modification_date: None,
    }
}

/// Data sets only, with the given relationship rows.
pub fn snapshot_with(data_sets: &[u64], relationships: Vec<RelationshipRecord>) -> Snapshot {
    Snapshot {
        data_sets: data_sets.iter().copied().map(data_set).collect(),
        data_set_types: vec![data_set_type(100, "RAW_DATA")],
        relationships,
        ..Snapshot::default()
    }
}

/// A small lab: a raw data set (1) analysed into 2 and 3, a container (4)
/// holding 5 and 6, a link data set (7), tags, properties and history.
pub fn lab_snapshot() -> Snapshot {
    let mut link = data_set_of_kind(7, "LINK");
    link.type_id = Some(ObjectId::new(101));
    let mut container = data_set_of_kind(4, "CONTAINER");
    container.type_id = None;

    Snapshot {
        data_sets: vec![
            data_set(1),
            data_set(2),
            data_set(3),
            container,
            data_set(5),
            data_set(6),
            link,
        ],
        data_set_types: vec![data_set_type(100, "RAW_DATA"), data_set_type(101, "EXTERNAL")],
        physical_data: vec![
            PhysicalDataRecord {
                id: ObjectId::new(1),
                share_id: Some("1".to_string()),
                location: "A/B/20240301-1".to_string(),
                size: Some(4096),
                status: "AVAILABLE".to_string(),
                speed_hint: -50,
                file_format_type_id: Some(ObjectId::new(200)),
            },
            PhysicalDataRecord {
                id: ObjectId::new(5),
                share_id: None,
                location: "A/B/20240301-5".to_string(),
                size: None,
                status: "ARCHIVED".to_string(),
                speed_hint: -50,
                file_format_type_id: None,
            },
        ],
        file_format_types: vec![FileFormatTypeRecord {
            id: ObjectId::new(200),
            code: "PROPRIETARY".to_string(),
            description: Some("Vendor format".to_string()),
        }],
        linked_data: vec![LinkedDataRecord {
            id: ObjectId::new(7),
            external_code: Some("ext-7".to_string()),
            external_dms_id: Some(ObjectId::new(300)),
        }],
        external_dms: vec![ExternalDmsRecord {
            id: ObjectId::new(300),
            code: "GIT".to_string(),
            label: Some("lab git".to_string()),
            address: "git.example.org".to_string(),
            address_type: "FILE_SYSTEM".to_string(),
        }],
        tags: vec![
            TagRecord {
                id: ObjectId::new(400),
                code: "FAVOURITE".to_string(),
                description: None,
                owner: "alice".to_string(),
            },
            TagRecord {
                id: ObjectId::new(401),
                code: "REVIEW".to_string(),
                description: None,
                owner: "bob".to_string(),
            },
        ],
        tag_assignments: vec![
            TagAssignmentRecord {
                data_set_id: ObjectId::new(1),
                tag_id: ObjectId::new(401),
            },
            TagAssignmentRecord {
                data_set_id: ObjectId::new(1),
                tag_id: ObjectId::new(400),
            },
            TagAssignmentRecord {
                data_set_id: ObjectId::new(2),
                tag_id: ObjectId::new(400),
            },
        ],
        history: vec![
            history(500, 2, "PARENT", 1),
            history(501, 1, "CHILD", 2),
        ],
        properties: vec![
            PropertyRecord {
                data_set_id: ObjectId::new(1),
                code: "NAME".to_string(),
                value: "raw run".to_string(),
            },
            PropertyRecord {
                data_set_id: ObjectId::new(1),
                code: "INSTRUMENT".to_string(),
                value: "HiSeq".to_string(),
            },
        ],
        relationships: vec![
            parent_child(1, 2),
            parent_child(2, 3),
            container_component(4, 5, 2),
            container_component(4, 6, 1),
        ],
        grants: Default::default(),
    }
}

/// Gate that allows everything except the denied ids and records each call.
#[derive(Default)]
pub struct CountingGate {
    denied: BTreeMap<EntityKind, BTreeSet<ObjectId>>,
    calls: Mutex<Vec<(EntityKind, BTreeSet<ObjectId>)>>,
}

impl CountingGate {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn denying(mut self, kind: EntityKind, values: &[u64]) -> Self {
        self.denied.entry(kind).or_default().extend(ids(values));
        self
    }

    pub fn calls(&self) -> Vec<(EntityKind, BTreeSet<ObjectId>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, kind: EntityKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| *called == kind)
            .count()
    }
}

impl AuthorizationGate for CountingGate {
    fn filter_allowed(
        &self,
        _principal: &Principal,
        kind: EntityKind,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError> {
        self.calls.lock().unwrap().push((kind, ids.clone()));
        let denied = self.denied.get(&kind).cloned().unwrap_or_default();
        Ok(ids.difference(&denied).copied().collect())
    }
}

pub struct FailingGate;

impl AuthorizationGate for FailingGate {
    fn filter_allowed(
        &self,
        _principal: &Principal,
        _kind: EntityKind,
        _ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError> {
        Err(GateError("session expired".to_string()))
    }
}

/// Gate that answers with more ids than it was asked about.
pub struct GenerousGate;

impl AuthorizationGate for GenerousGate {
    fn filter_allowed(
        &self,
        _principal: &Principal,
        _kind: EntityKind,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError> {
        let mut allowed = ids.clone();
        allowed.insert(ObjectId::new(999));
        Ok(allowed)
    }
}

pub fn alice() -> Principal {
    Principal::new("alice")
}
