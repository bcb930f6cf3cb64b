use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::{any::Any, mem};

use crate::{binding::BindingId, finalizer::BoxedCloneFinalizer, resolution::Resolved};

#[derive(Default)]
pub(crate) struct Cache {
    pub(crate) map: BTreeMap<BindingId, Resolved>,
    pub(crate) activated: ActivatedSet,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn insert(&mut self, binding: BindingId, resolved: Resolved) -> Option<Resolved> {
        self.map.insert(binding, resolved)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, binding: &BindingId) -> Option<Resolved> {
        self.map.get(binding).cloned()
    }

    #[inline]
    pub(crate) fn push_activated(&mut self, activated: Activated) {
        self.activated.push(activated);
    }

    #[inline]
    #[must_use]
    pub(crate) fn take_activated_set(&mut self) -> ActivatedSet {
        mem::take(&mut self.activated)
    }

    #[inline]
    #[must_use]
    pub(crate) fn take_map(&mut self) -> BTreeMap<BindingId, Resolved> {
        mem::take(&mut self.map)
    }
}

/// Instance with a finalizer, waiting for deactivation
pub(crate) struct Activated {
    pub(crate) binding: BindingId,
    pub(crate) instance: Arc<dyn Any + Send + Sync>,
    pub(crate) finalizer: BoxedCloneFinalizer,
}

#[derive(Default)]
pub(crate) struct ActivatedSet(pub(crate) Vec<Activated>);

impl ActivatedSet {
    #[inline]
    pub(crate) fn push(&mut self, activated: Activated) {
        self.0.push(activated);
    }

    /// Most recently activated first
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Activated> {
        self.0.pop()
    }
}
