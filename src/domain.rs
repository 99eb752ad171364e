use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchGraphError;

/// Identifier of one object inside the namespace of its entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = FetchGraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| FetchGraphError::InvalidObjectId(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    DataSet,
    DataSetType,
    PhysicalData,
    FileFormatType,
    LinkedData,
    ExternalDms,
    Tag,
    HistoryEntry,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::DataSet => "data_set",
            EntityKind::DataSetType => "data_set_type",
            EntityKind::PhysicalData => "physical_data",
            EntityKind::FileFormatType => "file_format_type",
            EntityKind::LinkedData => "linked_data",
            EntityKind::ExternalDms => "external_dms",
            EntityKind::Tag => "tag",
            EntityKind::HistoryEntry => "history_entry",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller on whose behalf a request is translated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn user_id(&self) -> &str {
        &self.0
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self("system".to_string())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSetKind {
    Physical,
    Container,
    Link,
}

impl fmt::Display for DataSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSetKind::Physical => write!(f, "PHYSICAL"),
            DataSetKind::Container => write!(f, "CONTAINER"),
            DataSetKind::Link => write!(f, "LINK"),
        }
    }
}

impl FromStr for DataSetKind {
    type Err = FetchGraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PHYSICAL" => Ok(DataSetKind::Physical),
            "CONTAINER" => Ok(DataSetKind::Container),
            "LINK" => Ok(DataSetKind::Link),
            _ => Err(FetchGraphError::mapping("data set kind", value)),
        }
    }
}

/// Type code carried by a data set relationship row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    ParentChild,
    ContainerComponent,
}

impl RelationshipType {
    pub fn code(&self) -> &'static str {
        match self {
            RelationshipType::ParentChild => "PARENT_CHILD",
            RelationshipType::ContainerComponent => "CONTAINER_COMPONENT",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RelationshipType {
    type Err = FetchGraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PARENT_CHILD" => Ok(RelationshipType::ParentChild),
            "CONTAINER_COMPONENT" => Ok(RelationshipType::ContainerComponent),
            _ => Err(FetchGraphError::mapping("data set relationship type", value)),
        }
    }
}

/// Which side of a relationship row the owning data set sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Owner is the child/component; related ids are parents/containers.
    Upstream,
    /// Owner is the parent/container; related ids are children/components.
    Downstream,
}

/// What a history entry records about the owning data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryRelationType {
    Parent,
    Child,
    Container,
    Component,
}

impl FromStr for HistoryRelationType {
    type Err = FetchGraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PARENT" => Ok(HistoryRelationType::Parent),
            "CHILD" => Ok(HistoryRelationType::Child),
            "CONTAINER" | "CONTAINED" => Ok(HistoryRelationType::Container),
            "COMPONENT" => Ok(HistoryRelationType::Component),
            _ => Err(FetchGraphError::mapping("history relation type", value)),
        }
    }
}
