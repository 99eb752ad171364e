//! Batched, caching fetch-graph materialization for data set APIs.
//!
//! A request translates a set of object ids into typed outputs whose relations
//! are expanded according to a fetch options tree. Base records and every
//! requested relation are loaded with one [`loader::RecordLoader`] call per
//! translation step, results are memoized per request in the
//! [`context::TranslationContext`], and objects the caller may not see are
//! dropped by the [`auth::AuthorizationGate`] at every depth.

pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod loader;
pub mod memory;
pub mod model;
pub mod output;
pub mod relation;
pub mod translator;
pub mod translators;
