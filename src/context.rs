use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::auth::AuthorizationGate;
use crate::domain::{ObjectId, Principal};
use crate::error::FetchGraphError;
use crate::loader::RecordLoader;
use crate::model::{Entity, Ref};

/// Identity of a translator; the first half of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranslatorId(&'static str);

impl TranslatorId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TranslatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    translator: TranslatorId,
    id: ObjectId,
}

enum Slot {
    Shell,
    Filled(Arc<dyn Any + Send + Sync>),
}

/// Request-scoped memo table keyed by `(translator, id)`.
///
/// Fetch options are not part of the key: the first translation of an id
/// within a context wins, and later requests with a wider selection receive
/// the same narrower object.
///
/// Entries go through two states. A shell is registered before the relations
/// of the object are resolved so that cyclic references find it, then the
/// shell is filled exactly once with the finished output.
#[derive(Default)]
pub struct TranslationCache {
    slots: HashMap<CacheKey, Slot>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, translator: TranslatorId, id: ObjectId) -> bool {
        self.slots.contains_key(&CacheKey { translator, id })
    }

    pub fn is_filled(&self, translator: TranslatorId, id: ObjectId) -> bool {
        matches!(
            self.slots.get(&CacheKey { translator, id }),
            Some(Slot::Filled(_))
        )
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn shell_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Shell))
            .count()
    }

    pub(crate) fn register_shell(
        &mut self,
        translator: TranslatorId,
        id: ObjectId,
    ) -> Result<(), FetchGraphError> {
        let key = CacheKey { translator, id };
        if self.slots.contains_key(&key) {
            return Err(FetchGraphError::DuplicateShell { translator, id });
        }
        self.slots.insert(key, Slot::Shell);
        Ok(())
    }

    pub(crate) fn fill<T: Entity>(
        &mut self,
        id: ObjectId,
        value: Arc<T>,
    ) -> Result<(), FetchGraphError> {
        let translator = T::TRANSLATOR;
        match self.slots.get_mut(&CacheKey { translator, id }) {
            None => Err(FetchGraphError::MissingShell { translator, id }),
            Some(Slot::Filled(_)) => Err(FetchGraphError::DuplicateShell { translator, id }),
            Some(slot) => {
                *slot = Slot::Filled(value);
                Ok(())
            }
        }
    }

    /// Finished output for `id`, `None` when it was never translated.
    pub fn get<T: Entity>(&self, id: ObjectId) -> Result<Option<Arc<T>>, FetchGraphError> {
        let translator = T::TRANSLATOR;
        match self.slots.get(&CacheKey { translator, id }) {
            None => Ok(None),
            Some(Slot::Shell) => Err(FetchGraphError::UnfinishedShell { translator, id }),
            Some(Slot::Filled(value)) => Arc::clone(value)
                .downcast::<T>()
                .map(Some)
                .map_err(|_| FetchGraphError::CacheType { translator, id }),
        }
    }
}

impl fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCache")
            .field("entries", &self.slots.len())
            .field("shells", &self.shell_count())
            .finish()
    }
}

/// State of one top-level request: the caller, its collaborators and the cache.
///
/// A context that returned an error may still hold unfilled shells and must be
/// dropped rather than reused.
pub struct TranslationContext<'a> {
    principal: Principal,
    loader: &'a dyn RecordLoader,
    gate: &'a dyn AuthorizationGate,
    cache: TranslationCache,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        principal: Principal,
        loader: &'a dyn RecordLoader,
        gate: &'a dyn AuthorizationGate,
    ) -> Self {
        Self {
            principal,
            loader,
            gate,
            cache: TranslationCache::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn loader(&self) -> &'a dyn RecordLoader {
        self.loader
    }

    pub fn gate(&self) -> &'a dyn AuthorizationGate {
        self.gate
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut TranslationCache {
        &mut self.cache
    }

    /// Follows a relation handle to the shared output it points at.
    pub fn resolve<T: Entity>(&self, reference: Ref<T>) -> Result<Arc<T>, FetchGraphError> {
        self.cache
            .get::<T>(reference.id())?
            .ok_or(FetchGraphError::MissingShell {
                translator: T::TRANSLATOR,
                id: reference.id(),
            })
    }
}

impl fmt::Debug for TranslationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationContext")
            .field("principal", &self.principal)
            .field("cache", &self.cache)
            .finish()
    }
}
