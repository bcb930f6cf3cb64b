use alloc::{boxed::Box, collections::BTreeMap, sync::Arc, vec::Vec};
use core::{any::Any, mem, ops::Deref};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    any::TypeInfo,
    config::Config,
    container::Container,
    context::ResolutionContext,
    errors::{InstantiatorErrorKind, ResolveErrorKind, VerifyErrorKind},
    fallback::MissingBindingHandler,
    instantiator::BoxedCloneInstantiator,
    mock::{MockCreated, MockHandle},
    mock_provider::{ListenerId, MockProvider},
    mock_registry::MockRegistry,
    provider::{provider_fn, BoxCloneProvider},
    registry::Registry,
    resolution::{Request, ResolutionRoot, Resolved},
};

/// Container that mocks every service it has no bindings for.
///
/// When a service without bindings is requested, the container adds an implicit unscoped binding for it,
/// backed by a [`MockProvider`], so each resolution of the service activates a new mock.
/// Every created mock is tracked until [`Self::reset`], and [`Self::verify_all`] verifies all of them.
///
/// Services registered in the [`Registry`] are resolved as usual.
/// Services missing from the [`MockRegistry`] can't be mocked and fail to resolve with
/// [`crate::InstantiateErrorKind::Unmockable`].
#[derive(Clone)]
pub struct MockingContainer {
    container: Container,
    state: Arc<MockingState>,
}

impl MockingContainer {
    #[inline]
    #[must_use]
    pub fn new(registry: Registry, mocks: MockRegistry) -> Self {
        let state = Arc::new(MockingState::new(mocks));
        let container = Container::with_fallback(registry, MockFallback { state: state.clone() });

        Self { container, state }
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Closes the container, deactivating all activated instances regardless of their config,
    /// and forgets every tracked mock and mock provider.
    /// Bindings, including implicit ones, aren't removed: mocks created after the reset are tracked again.
    pub fn reset(&self) {
        self.container.close();
        self.state.reset();
    }

    /// Verifies every tracked mock, in no particular order.
    ///
    /// # Errors
    /// Returns [`VerifyErrorKind::Unsatisfied`] for the first mock with unmet expectations.
    /// The rest of the mocks aren't verified.
    pub fn verify_all(&self) -> Result<(), VerifyErrorKind> {
        let mocks = self.state.mocks.lock().handles();
        debug!(count = mocks.len(), "Verifying mocks");

        for mock in mocks {
            if let Err(err) = mock.verify_all() {
                error!("{}", err);
                return Err(err);
            }
        }

        debug!("All mocks verified");
        Ok(())
    }

    /// Mocks created since the last reset
    #[inline]
    #[must_use]
    pub fn mocks(&self) -> Vec<MockHandle> {
        self.state.mocks.lock().handles()
    }

    /// Mock providers created since the last reset, in order of creation
    #[inline]
    #[must_use]
    pub fn providers(&self) -> Vec<Arc<MockProvider>> {
        self.state
            .providers
            .lock()
            .iter()
            .map(|registered| registered.provider.clone())
            .collect()
    }
}

impl Deref for MockingContainer {
    type Target = Container;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

impl ResolutionRoot for MockingContainer {
    #[inline]
    fn resolve(&self, request: &Request<'_>) -> Result<Resolved, ResolveErrorKind> {
        self.container.resolve(request)
    }

    #[inline]
    fn resolve_transient(&self, request: &Request<'_>) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.container.resolve_transient(request)
    }
}

struct RegisteredProvider {
    provider: Arc<MockProvider>,
    listener: ListenerId,
}

/// Mocks keyed by identity
#[derive(Default)]
struct MockSet(BTreeMap<usize, MockHandle>);

impl MockSet {
    /// Returns `false` if the mock is already tracked
    fn insert(&mut self, mock: MockHandle) -> bool {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        match self.0.entry(mock.as_ptr() as usize) {
            Vacant(entry) => {
                entry.insert(mock);
                true
            }
            Occupied(_) => false,
        }
    }

    fn handles(&self) -> Vec<MockHandle> {
        self.0.values().cloned().collect()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

pub(crate) struct MockingState {
    factories: MockRegistry,
    mocks: Arc<Mutex<MockSet>>,
    providers: Mutex<Vec<RegisteredProvider>>,
}

impl MockingState {
    fn new(factories: MockRegistry) -> Self {
        Self {
            factories,
            mocks: Arc::new(Mutex::new(MockSet::default())),
            providers: Mutex::new(Vec::new()),
        }
    }

    /// Returns the provider of the service, registering and subscribing to a new one
    /// if there is none since the last reset
    fn provider_for(&self, service: TypeInfo) -> Arc<MockProvider> {
        let mut providers = self.providers.lock();
        if let Some(registered) = providers.iter().find(|registered| registered.provider.service() == service) {
            return registered.provider.clone();
        }

        let provider = Arc::new(MockProvider::new(service, self.factories.factory(&service.id)));
        let listener = provider.add_listener({
            let mocks = self.mocks.clone();
            move |event: &MockCreated| {
                if mocks.lock().insert(event.mock().clone()) {
                    debug!(mock = event.mock().mock_type().name, "Mock tracked");
                }
            }
        });
        providers.push(RegisteredProvider {
            provider: provider.clone(),
            listener,
        });

        debug!(service = service.name, mockable = provider.is_mockable(), "Mock provider registered");
        provider
    }

    fn reset(&self) {
        let providers = mem::take(&mut *self.providers.lock());
        for RegisteredProvider { provider, listener } in providers {
            provider.remove_listener(listener);
        }

        self.mocks.lock().clear();

        debug!("Mocks and mock providers forgotten");
    }
}

struct MockFallback {
    state: Arc<MockingState>,
}

impl MissingBindingHandler for MockFallback {
    fn handle_missing_binding(&self, service: TypeInfo, registry: &mut Registry) -> bool {
        self.state.provider_for(service);

        let state = self.state.clone();
        let instantiator: BoxedCloneInstantiator = BoxCloneProvider(Box::new(provider_fn(move |_: ResolutionContext| {
            state.provider_for(service).create().map_err(InstantiatorErrorKind::Factory)
        })));

        let id = registry.add_binding(service, instantiator, None, Config::unscoped(), true);
        debug!(service = service.name, ?id, "Implicit binding added");

        true
    }
}
