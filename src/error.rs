use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::context::TranslatorId;
use crate::domain::ObjectId;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchGraphError {
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid relation name: {0}")]
    InvalidRelation(String),

    #[error("no {mapping} mapping defined for value {value:?}")]
    Mapping { mapping: &'static str, value: String },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("translation cache already holds {translator} #{id}")]
    DuplicateShell { translator: TranslatorId, id: ObjectId },

    #[error("no shell registered for {translator} #{id}")]
    MissingShell { translator: TranslatorId, id: ObjectId },

    #[error("{translator} #{id} was referenced before its translation completed")]
    UnfinishedShell { translator: TranslatorId, id: ObjectId },

    #[error("cached value for {translator} #{id} has an unexpected type")]
    CacheType { translator: TranslatorId, id: ObjectId },

    #[error("missing config file fetchgraph.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("unsupported config schema version: {0}")]
    UnsupportedSchema(u32),

    #[error("failed to read snapshot at {0}")]
    SnapshotRead(PathBuf),

    #[error("failed to parse snapshot: {0}")]
    SnapshotParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl FetchGraphError {
    pub fn mapping(mapping: &'static str, value: impl Into<String>) -> Self {
        FetchGraphError::Mapping {
            mapping,
            value: value.into(),
        }
    }

    /// Errors that come from the collaborators rather than from the engine or its input.
    pub fn is_external(&self) -> bool {
        matches!(self, FetchGraphError::Loader(_) | FetchGraphError::Gate(_))
    }
}

/// Failure reported by a record loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record loader failed in {operation}: {message}")]
pub struct LoaderError {
    pub operation: &'static str,
    pub message: String,
}

impl LoaderError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failure reported by an authorization gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authorization gate failed: {0}")]
pub struct GateError(pub String);
