use alloc::{sync::Arc, vec::Vec};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    any::TypeInfo,
    errors::InstantiateErrorKind,
    instantiator::Provided,
    mock::MockCreated,
    mock_registry::MockFactory,
};

/// Callback a mock provider notifies about every mock it creates
pub type Listener = Arc<dyn Fn(&MockCreated) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Provides mocks for one service, notifying its listeners about each created mock
/// before the instance is returned to the container.
pub struct MockProvider {
    service: TypeInfo,
    factory: Option<MockFactory>,
    listeners: Mutex<Listeners>,
}

#[derive(Default)]
struct Listeners {
    entries: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl MockProvider {
    /// Creates provider for the service.
    /// Without a factory the service is unmockable and every [`Self::create`] call fails.
    #[inline]
    #[must_use]
    pub(crate) fn new(service: TypeInfo, factory: Option<MockFactory>) -> Self {
        Self {
            service,
            factory,
            listeners: Mutex::new(Listeners::default()),
        }
    }

    #[inline]
    #[must_use]
    pub fn service(&self) -> TypeInfo {
        self.service
    }

    #[inline]
    #[must_use]
    pub fn is_mockable(&self) -> bool {
        self.factory.is_some()
    }

    pub fn add_listener(&self, listener: impl Fn(&MockCreated) + Send + Sync + 'static) -> ListenerId {
        let mut listeners = self.listeners.lock();

        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        debug!(service = self.service.name, ?id, "Listener added");
        id
    }

    /// Returns `false` if there is no listener with the id
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();

        let len = listeners.entries.len();
        listeners.entries.retain(|(listener_id, _)| *listener_id != id);

        let removed = listeners.entries.len() != len;
        if removed {
            debug!(service = self.service.name, ?id, "Listener removed");
        }
        removed
    }

    #[inline]
    #[must_use]
    pub fn listeners_len(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    /// Creates a mock and the service instance backed by it, then notifies every listener with the mock
    pub(crate) fn create(&self) -> Result<Provided, InstantiateErrorKind> {
        let Some(factory) = &self.factory else {
            let err = InstantiateErrorKind::Unmockable(self.service);
            error!("{}", err);
            return Err(err);
        };

        let (instance, mock) = factory();
        debug!(service = self.service.name, mock = mock.mock_type().name, "Mock created");

        let event = MockCreated::new(mock.clone());
        // Listeners are called without the lock, so they can add or remove listeners
        let listeners: Vec<Listener> = self.listeners.lock().entries.iter().map(|(_, listener)| listener.clone()).collect();
        for listener in listeners {
            listener(&event);
        }

        Ok(Provided {
            instance,
            mock: Some(mock),
        })
    }
}
