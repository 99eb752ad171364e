pub mod data_set;
pub mod data_set_type;
pub mod history;
pub mod linked_data;
pub mod physical_data;
pub mod tag;

pub use data_set::DataSetTranslator;
pub use data_set_type::DataSetTypeTranslator;
pub use history::HistoryEntryTranslator;
pub use linked_data::{ExternalDmsTranslator, LinkedDataTranslator};
pub use physical_data::{FileFormatTypeTranslator, PhysicalDataTranslator};
pub use tag::TagTranslator;
