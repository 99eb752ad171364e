use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{EntityKind, ObjectId, Principal};
use crate::error::GateError;

/// Filters candidate ids down to those the principal may see.
///
/// The engine asks once per translator invocation for the ids it has not
/// translated yet in the current request; it never asks twice for an id that
/// is already cached.
pub trait AuthorizationGate: Send + Sync {
    fn filter_allowed(
        &self,
        principal: &Principal,
        kind: EntityKind,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthorizationGate for AllowAll {
    fn filter_allowed(
        &self,
        _principal: &Principal,
        _kind: EntityKind,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError> {
        Ok(ids.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub user: String,
    pub kind: EntityKind,
    pub ids: BTreeSet<ObjectId>,
}

/// Static grants: instance admins see everything, other users see the ids
/// granted to them per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantTable {
    pub instance_admins: BTreeSet<String>,
    pub grants: Vec<Grant>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, user: impl Into<String>) -> Self {
        self.instance_admins.insert(user.into());
        self
    }

    pub fn grant(
        mut self,
        user: impl Into<String>,
        kind: EntityKind,
        ids: impl IntoIterator<Item = ObjectId>,
    ) -> Self {
        self.grants.push(Grant {
            user: user.into(),
            kind,
            ids: ids.into_iter().collect(),
        });
        self
    }

    fn visible(&self, user: &str) -> BTreeMap<EntityKind, BTreeSet<ObjectId>> {
        let mut visible = BTreeMap::<EntityKind, BTreeSet<ObjectId>>::new();
        for grant in self.grants.iter().filter(|grant| grant.user == user) {
            visible
                .entry(grant.kind)
                .or_default()
                .extend(grant.ids.iter().copied());
        }
        visible
    }
}

impl AuthorizationGate for GrantTable {
    fn filter_allowed(
        &self,
        principal: &Principal,
        kind: EntityKind,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<BTreeSet<ObjectId>, GateError> {
        if self.instance_admins.contains(principal.user_id()) {
            return Ok(ids.clone());
        }
        let visible = self.visible(principal.user_id());
        let Some(granted) = visible.get(&kind) else {
            return Ok(BTreeSet::new());
        };
        Ok(ids.intersection(granted).copied().collect())
    }
}
