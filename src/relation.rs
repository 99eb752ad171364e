//! To-one and to-many compositions over [`EntityTranslator`].
//!
//! A relation loads the links of all owners in one call, resolves the
//! distinct related ids through the target translator, and hands back, per
//! owner, handles to the related objects that survived authorization.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::context::TranslationContext;
use crate::domain::ObjectId;
use crate::error::FetchGraphError;
use crate::fetch::Fetched;
use crate::model::Ref;
use crate::translator::EntityTranslator;

/// One `(owner, related)` row, with the ordinal when the source carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub owner: ObjectId,
    pub related: ObjectId,
    pub ordinal: Option<i64>,
}

impl Link {
    pub fn new(owner: ObjectId, related: ObjectId) -> Self {
        Self {
            owner,
            related,
            ordinal: None,
        }
    }

    pub fn ordered(owner: ObjectId, related: ObjectId, ordinal: Option<i64>) -> Self {
        Self {
            owner,
            related,
            ordinal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOrder {
    /// Sorted by ordinal; rows without one follow in load order.
    Ordinal,
    /// Set semantics; sorted by id.
    Unordered,
}

pub type Target<R> = <R as Relation>::Target;
pub type TargetOutput<R> = <Target<R> as EntityTranslator>::Output;
pub type TargetFetch<R> = <Target<R> as EntityTranslator>::FetchOptions;

pub trait Relation {
    type Target: EntityTranslator;

    fn name(&self) -> &'static str;

    fn target(&self) -> &Self::Target;

    /// Loads the links of all `owners` in a single call.
    fn load(
        &self,
        ctx: &TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
    ) -> Result<Vec<Link>, FetchGraphError>;
}

pub trait ToOneRelation: Relation {
    /// Related handle per owner; owners with no link, or whose related object
    /// was not visible, have no entry.
    fn translate(
        &self,
        ctx: &mut TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
        fetch: &TargetFetch<Self>,
    ) -> Result<BTreeMap<ObjectId, Ref<TargetOutput<Self>>>, FetchGraphError>
    where
        Self: Sized,
    {
        if owners.is_empty() {
            return Ok(BTreeMap::new());
        }
        let links = self.load(ctx, owners)?;
        trace!(relation = self.name(), links = links.len(), "to-one links loaded");

        let mut related_by_owner = BTreeMap::new();
        for link in links.into_iter().filter(|link| owners.contains(&link.owner)) {
            related_by_owner.entry(link.owner).or_insert(link.related);
        }
        let related = related_by_owner.values().copied().collect::<BTreeSet<_>>();
        let visible = self.target().resolve(ctx, &related, fetch)?;

        Ok(related_by_owner
            .into_iter()
            .filter(|(_, related)| visible.contains(related))
            .map(|(owner, related)| (owner, Ref::new(related)))
            .collect())
    }
}

pub trait ToManyRelation: Relation {
    fn order(&self) -> RelationOrder;

    /// Related handles per owner; owners with no visible related object have
    /// no entry.
    fn translate(
        &self,
        ctx: &mut TranslationContext<'_>,
        owners: &BTreeSet<ObjectId>,
        fetch: &TargetFetch<Self>,
    ) -> Result<BTreeMap<ObjectId, Vec<Ref<TargetOutput<Self>>>>, FetchGraphError>
    where
        Self: Sized,
    {
        if owners.is_empty() {
            return Ok(BTreeMap::new());
        }
        let links = self.load(ctx, owners)?;
        trace!(relation = self.name(), links = links.len(), "to-many links loaded");

        let mut grouped = BTreeMap::<ObjectId, Vec<Link>>::new();
        for link in links.into_iter().filter(|link| owners.contains(&link.owner)) {
            grouped.entry(link.owner).or_default().push(link);
        }
        let related = grouped
            .values()
            .flatten()
            .map(|link| link.related)
            .collect::<BTreeSet<_>>();
        let visible = self.target().resolve(ctx, &related, fetch)?;

        let order = self.order();
        let mut result = BTreeMap::new();
        for (owner, mut links) in grouped {
            links.retain(|link| visible.contains(&link.related));
            arrange(&mut links, order);
            if !links.is_empty() {
                result.insert(
                    owner,
                    links.into_iter().map(|link| Ref::new(link.related)).collect(),
                );
            }
        }
        Ok(result)
    }
}

fn arrange(links: &mut Vec<Link>, order: RelationOrder) {
    match order {
        RelationOrder::Ordinal => {
            links.sort_by_key(|link| (link.ordinal.is_none(), link.ordinal));
            let mut seen = BTreeSet::new();
            links.retain(|link| seen.insert(link.related));
        }
        RelationOrder::Unordered => {
            links.sort_by_key(|link| link.related);
            links.dedup_by_key(|link| link.related);
        }
    }
}

/// Folds to-one results into every shell; owners without a result get an
/// explicit "fetched, absent" value.
pub fn fold_one<O, T>(
    shells: &mut BTreeMap<ObjectId, O>,
    mut related: BTreeMap<ObjectId, Ref<T>>,
    field: impl Fn(&mut O) -> &mut Fetched<Option<Ref<T>>>,
) {
    for (id, shell) in shells.iter_mut() {
        *field(shell) = Fetched::Fetched(related.remove(id));
    }
}

/// Folds to-many results into every shell; owners without a result get an
/// empty collection.
pub fn fold_many<O, T>(
    shells: &mut BTreeMap<ObjectId, O>,
    mut related: BTreeMap<ObjectId, Vec<Ref<T>>>,
    field: impl Fn(&mut O) -> &mut Fetched<Vec<Ref<T>>>,
) {
    for (id, shell) in shells.iter_mut() {
        *field(shell) = Fetched::Fetched(related.remove(id).unwrap_or_default());
    }
}
