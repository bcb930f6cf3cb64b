use alloc::{collections::BTreeMap, sync::Arc};
use core::any::{Any, TypeId};

/// Values passed along with one request, one per type.
/// Instantiators of the requested service and of everything it depends on can take them by [`crate::InjectParameter`].
#[derive(Clone, Default)]
pub struct Parameters {
    map: BTreeMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Parameters {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<Arc<T>> {
        self.insert_rc(Arc::new(value))
    }

    #[inline]
    pub fn insert_rc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) -> Option<Arc<T>> {
        self.map.insert(TypeId::of::<T>(), value).and_then(|boxed| boxed.downcast().ok())
    }

    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map.get(&TypeId::of::<T>()).and_then(|boxed| boxed.clone().downcast().ok())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
