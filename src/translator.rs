//! The generic translation engine.
//!
//! One invocation translates a whole id set for one entity kind:
//!
//! 1. empty input returns immediately;
//! 2. ids already in the cache are taken as they are;
//! 3. the remaining ids go through the authorization gate (secured kinds only)
//!    and rejected ids are dropped from the result;
//! 4. base records are loaded in one batch and a shell is registered in the
//!    cache for every surviving id;
//! 5. each requested relation is resolved with one loader call and folded
//!    into the shells;
//! 6. the shells are filled into the cache.
//!
//! Registering shells before step 5 is what makes cyclic and diamond shaped
//! relations terminate: a recursive request for an id that is currently being
//! translated finds its shell and stops there.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::context::TranslationContext;
use crate::domain::{EntityKind, ObjectId};
use crate::error::FetchGraphError;
use crate::model::Entity;

pub trait EntityTranslator {
    type Output: Entity;
    type FetchOptions;

    const KIND: EntityKind;
    /// Whether pending ids are passed through the authorization gate.
    const SECURED: bool = false;

    /// Builds shells carrying the scalar attributes. Ids without a base
    /// record are left out.
    fn load_shells(
        &self,
        ctx: &TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeMap<ObjectId, Self::Output>, FetchGraphError>;

    /// Resolves the relations requested by `fetch` into the shells.
    fn fill_relations(
        &self,
        _ctx: &mut TranslationContext<'_>,
        _shells: &mut BTreeMap<ObjectId, Self::Output>,
        _fetch: &Self::FetchOptions,
    ) -> Result<(), FetchGraphError> {
        Ok(())
    }

    /// Ids from `ids` that are visible and translated in `ctx` after the call.
    fn resolve(
        &self,
        ctx: &mut TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
        fetch: &Self::FetchOptions,
    ) -> Result<BTreeSet<ObjectId>, FetchGraphError>
    where
        Self: Sized,
    {
        resolve_batch(self, ctx, ids, fetch)
    }

    /// Entry point for callers: translated outputs by id. Ids that failed
    /// authorization or have no record get no entry.
    fn translate(
        &self,
        ctx: &mut TranslationContext<'_>,
        ids: &BTreeSet<ObjectId>,
        fetch: &Self::FetchOptions,
    ) -> Result<BTreeMap<ObjectId, Arc<Self::Output>>, FetchGraphError>
    where
        Self: Sized,
    {
        translate_batch(self, ctx, ids, fetch)
    }
}

pub fn resolve_batch<T: EntityTranslator>(
    translator: &T,
    ctx: &mut TranslationContext<'_>,
    ids: &BTreeSet<ObjectId>,
    fetch: &T::FetchOptions,
) -> Result<BTreeSet<ObjectId>, FetchGraphError> {
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let identity = <T::Output as Entity>::TRANSLATOR;
    let (mut resolved, pending): (BTreeSet<ObjectId>, BTreeSet<ObjectId>) = ids
        .iter()
        .partition(|id| ctx.cache().contains(identity, **id));

    if pending.is_empty() {
        debug!(translator = %identity, cached = resolved.len(), "all ids cached");
        return Ok(resolved);
    }

    let allowed = if T::SECURED {
        let granted = ctx
            .gate()
            .filter_allowed(ctx.principal(), T::KIND, &pending)?;
        pending
            .intersection(&granted)
            .copied()
            .collect::<BTreeSet<_>>()
    } else {
        pending.clone()
    };

    debug!(
        translator = %identity,
        requested = ids.len(),
        cached = resolved.len(),
        pending = pending.len(),
        allowed = allowed.len(),
        "translate"
    );

    if allowed.is_empty() {
        return Ok(resolved);
    }

    let mut shells = translator.load_shells(ctx, &allowed)?;
    shells.retain(|id, _| allowed.contains(id));
    for id in shells.keys() {
        ctx.cache_mut().register_shell(identity, *id)?;
    }

    translator.fill_relations(ctx, &mut shells, fetch)?;

    for (id, output) in shells {
        ctx.cache_mut().fill(id, Arc::new(output))?;
        resolved.insert(id);
    }
    Ok(resolved)
}

pub fn translate_batch<T: EntityTranslator>(
    translator: &T,
    ctx: &mut TranslationContext<'_>,
    ids: &BTreeSet<ObjectId>,
    fetch: &T::FetchOptions,
) -> Result<BTreeMap<ObjectId, Arc<T::Output>>, FetchGraphError> {
    let resolved = resolve_batch(translator, ctx, ids, fetch)?;
    let mut outputs = BTreeMap::new();
    for id in resolved {
        let output = ctx
            .cache()
            .get::<T::Output>(id)?
            .ok_or(FetchGraphError::MissingShell {
                translator: <T::Output as Entity>::TRANSLATOR,
                id,
            })?;
        outputs.insert(id, output);
    }
    Ok(outputs)
}
