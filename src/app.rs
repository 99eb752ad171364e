use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::info;

use crate::auth::AuthorizationGate;
use crate::context::TranslationContext;
use crate::domain::{ObjectId, Principal};
use crate::error::FetchGraphError;
use crate::fetch::DataSetFetchOptions;
use crate::graph::ObjectGraph;
use crate::loader::RecordLoader;
use crate::model::DataSet;
use crate::translator::EntityTranslator;
use crate::translators::DataSetTranslator;

/// Request facade: owns the collaborators and opens one translation context
/// per request.
#[derive(Clone)]
pub struct App<L: RecordLoader, G: AuthorizationGate> {
    loader: L,
    gate: G,
}

impl<L: RecordLoader, G: AuthorizationGate> App<L, G> {
    pub fn new(loader: L, gate: G) -> Self {
        Self { loader, gate }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn context(&self, principal: Principal) -> TranslationContext<'_> {
        TranslationContext::new(principal, &self.loader, &self.gate)
    }

    /// Translates data sets in a fresh context and returns the roots only.
    pub fn data_sets(
        &self,
        principal: Principal,
        ids: &BTreeSet<ObjectId>,
        fetch: &DataSetFetchOptions,
    ) -> Result<BTreeMap<ObjectId, Arc<DataSet>>, FetchGraphError> {
        let mut ctx = self.context(principal);
        DataSetTranslator.translate(&mut ctx, ids, fetch)
    }

    /// Translates data sets in a fresh context and assembles everything
    /// reachable from them.
    pub fn data_set_graph(
        &self,
        principal: Principal,
        ids: &BTreeSet<ObjectId>,
        fetch: &DataSetFetchOptions,
    ) -> Result<ObjectGraph, FetchGraphError> {
        let mut ctx = self.context(principal);
        let roots = DataSetTranslator.translate(&mut ctx, ids, fetch)?;
        let graph = ObjectGraph::collect(&ctx, &roots)?;
        info!(
            principal = %ctx.principal(),
            requested = ids.len(),
            roots = graph.roots.len(),
            objects = graph.object_count(),
            "data set graph assembled"
        );
        Ok(graph)
    }
}
