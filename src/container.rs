use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::any::Any;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    binding::{Binding, BindingMetadata},
    cache::{Activated, Cache},
    context::ResolutionContext,
    errors::ResolveErrorKind,
    fallback::MissingBindingHandler,
    instantiator::{BoxedCloneInstantiator, Provided},
    parameters::Parameters,
    provider::Provider as _,
    registry::Registry,
    resolution::{Request, ResolutionRoot, Resolved, WithParameters},
};

#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Creates container that fails to resolve services it has no bindings for
    #[inline]
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::new_inner(registry, None)
    }

    /// Creates container that asks the handler for a binding when a service without bindings is requested
    #[inline]
    #[must_use]
    pub fn with_fallback(registry: Registry, fallback: impl MissingBindingHandler) -> Self {
        Self::new_inner(registry, Some(Box::new(fallback)))
    }

    /// Passes the parameters to every request made through the returned resolution root,
    /// including requests for dependencies of the requested services
    #[inline]
    #[must_use]
    pub fn with_parameters(&self, parameters: Parameters) -> WithParameters<'_> {
        WithParameters {
            container: self,
            parameters: Arc::new(parameters),
        }
    }

    /// Gets a dependency by the first binding of its type
    ///
    /// # Notes
    /// The instance is shared if the binding is cached, see [`crate::Config`]
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        ResolutionRoot::get(self)
    }

    /// Gets a dependency by the first binding whose metadata satisfies the constraint
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_with<Dep: Send + Sync + 'static>(&self, constraint: impl Fn(&BindingMetadata) -> bool) -> Result<Arc<Dep>, ResolveErrorKind> {
        ResolutionRoot::get_with(self, constraint)
    }

    /// Gets a dependency by the first binding with the name
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_named<Dep: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<Dep>, ResolveErrorKind> {
        ResolutionRoot::get_named(self, name)
    }

    /// Gets a new instance of the dependency each time it's called
    ///
    /// # Notes
    /// The instance isn't cached and its finalizer isn't called
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_transient<Dep: Send + Sync + 'static>(&self) -> Result<Dep, ResolveErrorKind> {
        ResolutionRoot::get_transient(self)
    }

    /// Gets a dependency known only at runtime by the first binding of its type
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_of(&self, service: TypeInfo) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        ResolutionRoot::get_of(self, service)
    }

    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_of_with(
        &self,
        service: TypeInfo,
        constraint: impl Fn(&BindingMetadata) -> bool,
    ) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        ResolutionRoot::get_of_with(self, service, constraint)
    }

    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_of_named(&self, service: TypeInfo, name: &str) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        ResolutionRoot::get_of_named(self, service, name)
    }

    /// Bindings of the service, including implicit ones added by the fallback
    #[inline]
    #[must_use]
    pub fn bindings_of(&self, service: TypeInfo) -> Vec<BindingMetadata> {
        self.inner.registry.lock().bindings_of(service)
    }

    /// Closes the container: calls finalizers of activated instances in LIFO order
    /// and clears the cache, so every instance is activated again on the next request regardless of its config.
    /// Bindings aren't removed.
    ///
    /// # Warning
    /// This method can be called multiple times, but it will only call finalizers for instances activated since the last call
    pub fn close(&self) {
        self.inner.close();
    }
}

impl Container {
    #[must_use]
    fn new_inner(registry: Registry, fallback: Option<Box<dyn MissingBindingHandler>>) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: Mutex::new(registry),
                cache: Mutex::new(Cache::new()),
                fallback,
                empty_parameters: Arc::new(Parameters::new()),
            }),
        }
    }

    #[cfg(test)]
    #[inline]
    #[must_use]
    pub(crate) fn context(&self) -> ResolutionContext {
        ResolutionContext::new(self.clone(), self.inner.empty_parameters.clone())
    }

    #[cfg(test)]
    #[inline]
    #[must_use]
    pub(crate) fn context_with(&self, parameters: Parameters) -> ResolutionContext {
        ResolutionContext::new(self.clone(), Arc::new(parameters))
    }

    pub(crate) fn resolve_with_parameters(&self, request: &Request<'_>, parameters: &Arc<Parameters>) -> Result<Resolved, ResolveErrorKind> {
        let span = info_span!("resolve", dependency = request.service.name);
        let _guard = span.enter();

        let Binding {
            metadata,
            mut instantiator,
            finalizer,
        } = self.find_binding(request)?;

        if metadata.config.cache_provides {
            if let Some(resolved) = self.inner.cache.lock().get(&metadata.id) {
                debug!("Found in cache");
                return Ok(resolved);
            }
            debug!("Not found in cache");
        }

        let Provided { instance, mock } = self.provide(&mut instantiator, parameters)?;
        let resolved = Resolved {
            instance: Arc::from(instance),
            mock,
        };

        let mut guard = self.inner.cache.lock();
        if metadata.config.cache_provides {
            guard.insert(metadata.id, resolved.clone());
            debug!("Cached");
        }
        if let Some(finalizer) = finalizer {
            guard.push_activated(Activated {
                binding: metadata.id,
                instance: resolved.instance.clone(),
                finalizer,
            });
            debug!("Pushed to activated set");
        }

        Ok(resolved)
    }

    pub(crate) fn resolve_transient_with_parameters(
        &self,
        request: &Request<'_>,
        parameters: &Arc<Parameters>,
    ) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind> {
        let span = info_span!("resolve_transient", dependency = request.service.name);
        let _guard = span.enter();

        let Binding { mut instantiator, .. } = self.find_binding(request)?;

        self.provide(&mut instantiator, parameters).map(|provided| provided.instance)
    }

    fn find_binding(&self, request: &Request<'_>) -> Result<Binding, ResolveErrorKind> {
        let mut registry = self.inner.registry.lock();

        if !registry.has_bindings(&request.service.id) {
            if let Some(fallback) = &self.inner.fallback {
                if fallback.handle_missing_binding(request.service, &mut registry) {
                    debug!("Missing binding handled by fallback");
                } else {
                    debug!("Missing binding not handled by fallback");
                }
            }
        }

        match registry.find(&request.service.id, &request.constraint) {
            Some(binding) => Ok(binding),
            None => {
                let err = ResolveErrorKind::NoBinding { service: request.service };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn provide(
        &self,
        instantiator: &mut BoxedCloneInstantiator,
        parameters: &Arc<Parameters>,
    ) -> Result<Provided, ResolveErrorKind> {
        match instantiator.provide(ResolutionContext::new(self.clone(), parameters.clone())) {
            Ok(provided) => Ok(provided),
            Err(err) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(err))
            }
        }
    }
}

impl ResolutionRoot for Container {
    #[inline]
    fn resolve(&self, request: &Request<'_>) -> Result<Resolved, ResolveErrorKind> {
        self.resolve_with_parameters(request, &self.inner.empty_parameters)
    }

    #[inline]
    fn resolve_transient(&self, request: &Request<'_>) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.resolve_transient_with_parameters(request, &self.inner.empty_parameters)
    }
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) cache: Mutex<Cache>,
    pub(crate) fallback: Option<Box<dyn MissingBindingHandler>>,
    pub(crate) empty_parameters: Arc<Parameters>,
}

impl ContainerInner {
    fn close(&self) {
        let mut activated_set = self.cache.lock().take_activated_set();
        while let Some(Activated {
            binding,
            instance,
            mut finalizer,
        }) = activated_set.pop()
        {
            let _ = finalizer.provide(instance);
            debug!(?binding, "Finalizer called");
        }

        // Dropped outside of the lock
        let map = self.cache.lock().take_map();
        drop(map);
        debug!("Cache cleared");
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.close();
        debug!("Container closed on drop");
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Container;
    use crate::{
        any::TypeInfo,
        binding::BindingMetadata,
        config::Config,
        errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
        fallback::MissingBindingHandler,
        inject::{Inject, InjectParameter, InjectTransient},
        parameters::Parameters,
        registry::Registry,
        resolution::{MockResolutionExt as _, ResolutionRoot as _},
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec,
        vec::Vec,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    struct Pool(u8);
    struct Repo(Arc<Pool>);
    struct Service(Arc<Repo>, Arc<Pool>);

    #[test]
    #[traced_test]
    fn test_cached_get() {
        let container = Container::new(
            Registry::new()
                .provide(|| Ok(Pool(1)))
                .provide(|Inject(pool): Inject<Pool>| Ok(Repo(pool)))
                .provide(|Inject(repo): Inject<Repo>, Inject(pool): Inject<Pool>| Ok(Service(repo, pool))),
        );

        let service = container.get::<Service>().unwrap();
        assert!(Arc::ptr_eq(&service, &container.get::<Service>().unwrap()));
        assert!(Arc::ptr_eq(&service.0 .0, &service.1));
        assert_eq!(service.1 .0, 1);
        assert!(logs_contain("Found in cache"));
    }

    #[test]
    fn test_unscoped_get() {
        let instantiations = Arc::new(AtomicU8::new(0));
        let container = Container::new(Registry::new().provide_with_config(
            {
                let instantiations = instantiations.clone();
                move || Ok(Pool(instantiations.fetch_add(1, Ordering::SeqCst)))
            },
            Config::unscoped(),
        ));

        let first = container.get::<Pool>().unwrap();
        let second = container.get::<Pool>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!((first.0, second.0), (0, 1));
    }

    #[test]
    fn test_transient_get() {
        let container = Container::new(
            Registry::new()
                .provide(|| Ok(Pool(1)))
                .provide(|InjectTransient(pool): InjectTransient<Pool>| Ok(Repo(Arc::new(pool)))),
        );

        let cached = container.get::<Pool>().unwrap();
        let repo = container.get::<Repo>().unwrap();

        assert!(!Arc::ptr_eq(&cached, &repo.0));
        assert_eq!(container.get_transient::<Pool>().unwrap().0, 1);
    }

    #[test]
    fn test_constrained_get() {
        let container = Container::new(
            Registry::new()
                .provide(|| Ok(Pool(1)))
                .provide_named("replica", || Ok(Pool(2)))
                .provide_named_with_config("analytics", || Ok(Pool(3)), Config::unscoped()),
        );

        assert_eq!(container.get::<Pool>().unwrap().0, 1);
        assert_eq!(container.get_named::<Pool>("replica").unwrap().0, 2);
        assert_eq!(
            container
                .get_with::<Pool>(|metadata: &BindingMetadata| !metadata.config.cache_provides)
                .unwrap()
                .0,
            3
        );
        assert!(matches!(
            container.get_named::<Pool>("archive"),
            Err(ResolveErrorKind::NoBinding { service }) if service == TypeInfo::of::<Pool>()
        ));
    }

    #[test]
    #[traced_test]
    fn test_no_binding() {
        let container = Container::new(Registry::new());

        assert!(matches!(container.get::<Pool>(), Err(ResolveErrorKind::NoBinding { .. })));
        assert!(matches!(container.get_transient::<Pool>(), Err(ResolveErrorKind::NoBinding { .. })));
        assert!(logs_contain("No binding"));
    }

    #[test]
    fn test_dependency_error() {
        let container = Container::new(Registry::new().provide(|Inject(pool): Inject<Pool>| Ok(Repo(pool))));

        let Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(err))) = container.get::<Repo>() else {
            panic!("expected dependency error");
        };
        assert!(matches!(*err, ResolveErrorKind::NoBinding { service } if service == TypeInfo::of::<Pool>()));
    }

    #[test]
    fn test_factory_error() {
        let container = Container::new(Registry::new().provide(|| -> Result<Pool, InstantiateErrorKind> {
            Err(anyhow::anyhow!("connection refused").into())
        }));

        assert!(matches!(
            container.get::<Pool>(),
            Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(InstantiateErrorKind::Custom(_))))
        ));
    }

    #[test]
    fn test_get_of() {
        let container = Container::new(Registry::new().provide(|| Ok(Pool(1))).provide_named("replica", || Ok(Pool(2))));
        let service = TypeInfo::of::<Pool>();

        let pool = container.get_of(service).unwrap();
        assert!(Arc::ptr_eq(&pool.clone().downcast::<Pool>().unwrap(), &container.get::<Pool>().unwrap()));
        assert_eq!(
            container.get_of_named(service, "replica").unwrap().downcast::<Pool>().unwrap().0,
            2
        );
        assert!(container.get_of_with(service, |metadata| metadata.name.is_none()).is_ok());
        assert!(container.get_mock_of(service).unwrap().is_none());
    }

    #[test]
    fn test_parameters() {
        struct TenantId(u8);
        struct Tenant(Arc<TenantId>);
        struct Billing(Arc<Tenant>);

        let container = Container::new(
            Registry::new()
                .provide_with_config(|InjectParameter(id): InjectParameter<TenantId>| Ok(Tenant(id)), Config::unscoped())
                .provide_with_config(|Inject(tenant): Inject<Tenant>| Ok(Billing(tenant)), Config::unscoped()),
        );

        let billing = container.with_parameters(Parameters::new().with(TenantId(7))).get::<Billing>().unwrap();
        assert_eq!(billing.0 .0 .0, 7);

        let Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(err))) = container.get::<Tenant>() else {
            panic!("expected missing parameter");
        };
        assert!(matches!(*err, ResolveErrorKind::NoParameter { parameter } if parameter == TypeInfo::of::<TenantId>()));
    }

    #[test]
    #[traced_test]
    fn test_close_finalizes_in_lifo_order() {
        let finalized = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new(
            Registry::new()
                .provide(|| Ok(Pool(1)))
                .provide(|Inject(pool): Inject<Pool>| Ok(Repo(pool)))
                .provide_with_config(|| Ok(1u8), Config::unscoped())
                .add_finalizer({
                    let finalized = finalized.clone();
                    move |_: Arc<Pool>| finalized.lock().push("pool")
                })
                .add_finalizer({
                    let finalized = finalized.clone();
                    move |_: Arc<Repo>| finalized.lock().push("repo")
                })
                .add_finalizer({
                    let finalized = finalized.clone();
                    move |_: Arc<u8>| finalized.lock().push("u8")
                }),
        );

        let repo = container.get::<Repo>().unwrap();
        let _ = container.get::<u8>().unwrap();
        let _ = container.get_transient::<u8>().unwrap();

        container.close();
        assert_eq!(*finalized.lock(), vec!["u8", "repo", "pool"]);
        assert!(!Arc::ptr_eq(&repo, &container.get::<Repo>().unwrap()));
        assert!(logs_contain("Finalizer called"));

        container.close();
        assert_eq!(finalized.lock().len(), 5);
    }

    #[test]
    fn test_drop_finalizes() {
        let finalized = Arc::new(AtomicU8::new(0));
        let container = Container::new(Registry::new().provide(|| Ok(Pool(1))).add_finalizer({
            let finalized = finalized.clone();
            move |_: Arc<Pool>| {
                finalized.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let _ = container.get::<Pool>().unwrap();
        drop(container);

        assert_eq!(finalized.load(Ordering::SeqCst), 1);
    }

    struct DefaultPool {
        calls: Arc<AtomicU8>,
    }

    impl MissingBindingHandler for DefaultPool {
        fn handle_missing_binding(&self, service: TypeInfo, registry: &mut Registry) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if service != TypeInfo::of::<Pool>() {
                return false;
            }
            registry.add_implicit(|| Ok(Pool(0)), Config::default());
            true
        }
    }

    #[test]
    #[traced_test]
    fn test_fallback() {
        let calls = Arc::new(AtomicU8::new(0));
        let container = Container::with_fallback(
            Registry::new().provide(|Inject(pool): Inject<Pool>| Ok(Repo(pool))),
            DefaultPool { calls: calls.clone() },
        );

        let repo = container.get::<Repo>().unwrap();
        assert_eq!(repo.0 .0, 0);
        assert!(Arc::ptr_eq(&repo.0, &container.get::<Pool>().unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let bindings = container.bindings_of(TypeInfo::of::<Pool>());
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].is_implicit);
        assert!(logs_contain("Missing binding handled by fallback"));
    }

    #[test]
    fn test_fallback_declined() {
        let calls = Arc::new(AtomicU8::new(0));
        let container = Container::with_fallback(Registry::new(), DefaultPool { calls: calls.clone() });

        assert!(matches!(container.get::<Repo>(), Err(ResolveErrorKind::NoBinding { .. })));
        assert!(matches!(container.get::<Repo>(), Err(ResolveErrorKind::NoBinding { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(container.bindings_of(TypeInfo::of::<Repo>()).is_empty());
    }
}
