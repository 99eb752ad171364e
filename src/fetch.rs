//! Fetch options trees.
//!
//! Each entity kind lists its optional relations explicitly. A relation is
//! requested by setting its nested options; there is no way to request a
//! relation without saying how far to expand the related kind. Scalar
//! attributes are not listed here because they are always translated.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FetchGraphError;

/// Whether a relation field was requested, and its value when it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    NotFetched,
    Fetched(T),
}

impl<T> Fetched<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Fetched::Fetched(_))
    }

    pub fn is_not_fetched(&self) -> bool {
        !self.is_fetched()
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Fetched::Fetched(value) => Some(value),
            Fetched::NotFetched => None,
        }
    }
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Fetched::NotFetched
    }
}

impl<T: Serialize> Serialize for Fetched<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fetched::Fetched(value) => value.serialize(serializer),
            Fetched::NotFetched => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSetTypeFetchOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyFetchOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileFormatTypeFetchOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalDmsFetchOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagFetchOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicalDataFetchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    file_format_type: Option<FileFormatTypeFetchOptions>,
}

impl PhysicalDataFetchOptions {
    pub fn has_file_format_type(&self) -> bool {
        self.file_format_type.is_some()
    }

    pub fn with_file_format_type(&mut self) -> &mut FileFormatTypeFetchOptions {
        self.file_format_type.get_or_insert_with(Default::default)
    }

    pub fn file_format_type_options(&self) -> Option<&FileFormatTypeFetchOptions> {
        self.file_format_type.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkedDataFetchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    external_dms: Option<ExternalDmsFetchOptions>,
}

impl LinkedDataFetchOptions {
    pub fn has_external_dms(&self) -> bool {
        self.external_dms.is_some()
    }

    pub fn with_external_dms(&mut self) -> &mut ExternalDmsFetchOptions {
        self.external_dms.get_or_insert_with(Default::default)
    }

    pub fn external_dms_options(&self) -> Option<&ExternalDmsFetchOptions> {
        self.external_dms.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryEntryFetchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    related_data_set: Option<Box<DataSetFetchOptions>>,
}

impl HistoryEntryFetchOptions {
    pub fn has_related_data_set(&self) -> bool {
        self.related_data_set.is_some()
    }

    pub fn with_related_data_set(&mut self) -> &mut DataSetFetchOptions {
        self.related_data_set.get_or_insert_with(Box::default)
    }

    pub fn related_data_set_options(&self) -> Option<&DataSetFetchOptions> {
        self.related_data_set.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSetFetchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    r#type: Option<DataSetTypeFetchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<PropertyFetchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<Box<DataSetFetchOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Box<DataSetFetchOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    containers: Option<Box<DataSetFetchOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Box<DataSetFetchOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_data: Option<PhysicalDataFetchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linked_data: Option<LinkedDataFetchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<TagFetchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<HistoryEntryFetchOptions>,
}

impl DataSetFetchOptions {
    /// One level of expansion for each named relation.
    pub fn with_relations(relations: &[DataSetRelation]) -> Self {
        let mut options = Self::default();
        for relation in relations {
            match relation {
                DataSetRelation::Type => {
                    options.with_type();
                }
                DataSetRelation::Properties => {
                    options.with_properties();
                }
                DataSetRelation::Parents => {
                    options.with_parents();
                }
                DataSetRelation::Children => {
                    options.with_children();
                }
                DataSetRelation::Containers => {
                    options.with_containers();
                }
                DataSetRelation::Components => {
                    options.with_components();
                }
                DataSetRelation::PhysicalData => {
                    options.with_physical_data();
                }
                DataSetRelation::LinkedData => {
                    options.with_linked_data();
                }
                DataSetRelation::Tags => {
                    options.with_tags();
                }
                DataSetRelation::History => {
                    options.with_history();
                }
            }
        }
        options
    }

    /// Relations requested at this level, in declaration order.
    pub fn requested(&self) -> Vec<DataSetRelation> {
        DataSetRelation::ALL
            .into_iter()
            .filter(|relation| self.has(*relation))
            .collect()
    }

    pub fn has(&self, relation: DataSetRelation) -> bool {
        match relation {
            DataSetRelation::Type => self.has_type(),
            DataSetRelation::Properties => self.has_properties(),
            DataSetRelation::Parents => self.has_parents(),
            DataSetRelation::Children => self.has_children(),
            DataSetRelation::Containers => self.has_containers(),
            DataSetRelation::Components => self.has_components(),
            DataSetRelation::PhysicalData => self.has_physical_data(),
            DataSetRelation::LinkedData => self.has_linked_data(),
            DataSetRelation::Tags => self.has_tags(),
            DataSetRelation::History => self.has_history(),
        }
    }

    pub fn has_type(&self) -> bool {
        self.r#type.is_some()
    }

    pub fn with_type(&mut self) -> &mut DataSetTypeFetchOptions {
        self.r#type.get_or_insert_with(Default::default)
    }

    pub fn type_options(&self) -> Option<&DataSetTypeFetchOptions> {
        self.r#type.as_ref()
    }

    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    pub fn with_properties(&mut self) -> &mut PropertyFetchOptions {
        self.properties.get_or_insert_with(Default::default)
    }

    pub fn properties_options(&self) -> Option<&PropertyFetchOptions> {
        self.properties.as_ref()
    }

    pub fn has_parents(&self) -> bool {
        self.parents.is_some()
    }

    pub fn with_parents(&mut self) -> &mut DataSetFetchOptions {
        self.parents.get_or_insert_with(Box::default)
    }

    pub fn parents_options(&self) -> Option<&DataSetFetchOptions> {
        self.parents.as_deref()
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn with_children(&mut self) -> &mut DataSetFetchOptions {
        self.children.get_or_insert_with(Box::default)
    }

    pub fn children_options(&self) -> Option<&DataSetFetchOptions> {
        self.children.as_deref()
    }

    pub fn has_containers(&self) -> bool {
        self.containers.is_some()
    }

    pub fn with_containers(&mut self) -> &mut DataSetFetchOptions {
        self.containers.get_or_insert_with(Box::default)
    }

    pub fn containers_options(&self) -> Option<&DataSetFetchOptions> {
        self.containers.as_deref()
    }

    pub fn has_components(&self) -> bool {
        self.components.is_some()
    }

    pub fn with_components(&mut self) -> &mut DataSetFetchOptions {
        self.components.get_or_insert_with(Box::default)
    }

    pub fn components_options(&self) -> Option<&DataSetFetchOptions> {
        self.components.as_deref()
    }

    pub fn has_physical_data(&self) -> bool {
        self.physical_data.is_some()
    }

    pub fn with_physical_data(&mut self) -> &mut PhysicalDataFetchOptions {
        self.physical_data.get_or_insert_with(Default::default)
    }

    pub fn physical_data_options(&self) -> Option<&PhysicalDataFetchOptions> {
        self.physical_data.as_ref()
    }

    pub fn has_linked_data(&self) -> bool {
        self.linked_data.is_some()
    }

    pub fn with_linked_data(&mut self) -> &mut LinkedDataFetchOptions {
        self.linked_data.get_or_insert_with(Default::default)
    }

    pub fn linked_data_options(&self) -> Option<&LinkedDataFetchOptions> {
        self.linked_data.as_ref()
    }

    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }

    pub fn with_tags(&mut self) -> &mut TagFetchOptions {
        self.tags.get_or_insert_with(Default::default)
    }

    pub fn tags_options(&self) -> Option<&TagFetchOptions> {
        self.tags.as_ref()
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn with_history(&mut self) -> &mut HistoryEntryFetchOptions {
        self.history.get_or_insert_with(Default::default)
    }

    pub fn history_options(&self) -> Option<&HistoryEntryFetchOptions> {
        self.history.as_ref()
    }
}

/// Closed set of data set relation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum DataSetRelation {
    Type,
    Properties,
    Parents,
    Children,
    Containers,
    Components,
    PhysicalData,
    LinkedData,
    Tags,
    History,
}

impl DataSetRelation {
    pub const ALL: [DataSetRelation; 10] = [
        DataSetRelation::Type,
        DataSetRelation::Properties,
        DataSetRelation::Parents,
        DataSetRelation::Children,
        DataSetRelation::Containers,
        DataSetRelation::Components,
        DataSetRelation::PhysicalData,
        DataSetRelation::LinkedData,
        DataSetRelation::Tags,
        DataSetRelation::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSetRelation::Type => "type",
            DataSetRelation::Properties => "properties",
            DataSetRelation::Parents => "parents",
            DataSetRelation::Children => "children",
            DataSetRelation::Containers => "containers",
            DataSetRelation::Components => "components",
            DataSetRelation::PhysicalData => "physical_data",
            DataSetRelation::LinkedData => "linked_data",
            DataSetRelation::Tags => "tags",
            DataSetRelation::History => "history",
        }
    }
}

impl fmt::Display for DataSetRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSetRelation {
    type Err = FetchGraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        DataSetRelation::ALL
            .into_iter()
            .find(|relation| relation.as_str() == normalized)
            .ok_or_else(|| FetchGraphError::InvalidRelation(value.to_string()))
    }
}
