use alloc::{collections::BTreeMap, vec::Vec};
use core::any::TypeId;

use crate::{
    any::TypeInfo,
    binding::{Binding, BindingId, BindingMetadata},
    config::Config,
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    finalizer::{boxed_finalizer, BoxedCloneFinalizer, Finalizer},
    instantiator::{boxed_instantiator, BoxedCloneInstantiator, Instantiator},
    resolution::Constraint,
};

/// Bindings of a container: how to provide each service, under which name and with which config.
/// A service may have several bindings, they are matched in registration order.
#[derive(Default, Clone)]
pub struct Registry {
    bindings: BTreeMap<TypeId, Vec<Binding>>,
    finalizers: BTreeMap<TypeId, BoxedCloneFinalizer>,
    next_id: u64,
}

impl Registry {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
            finalizers: BTreeMap::new(),
            next_id: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn provide<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver<Error = ResolveErrorKind> + 'static,
    {
        self.provide_with_config(instantiator, Config::default())
    }

    #[inline]
    #[must_use]
    pub fn provide_with_config<Inst, Deps>(mut self, instantiator: Inst, config: Config) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver<Error = ResolveErrorKind> + 'static,
    {
        self.add_binding(TypeInfo::of::<Inst::Provides>(), boxed_instantiator(instantiator), None, config, false);
        self
    }

    #[inline]
    #[must_use]
    pub fn provide_named<Inst, Deps>(self, name: &'static str, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver<Error = ResolveErrorKind> + 'static,
    {
        self.provide_named_with_config(name, instantiator, Config::default())
    }

    #[inline]
    #[must_use]
    pub fn provide_named_with_config<Inst, Deps>(mut self, name: &'static str, instantiator: Inst, config: Config) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver<Error = ResolveErrorKind> + 'static,
    {
        self.add_binding(
            TypeInfo::of::<Inst::Provides>(),
            boxed_instantiator(instantiator),
            Some(name),
            config,
            false,
        );
        self
    }

    /// Adds a finalizer for every binding of the given dependency type.
    /// The finalizer will be called when the container is closed,
    /// in LIFO order of activation (not the order of registration).
    ///
    /// # Warning
    /// The finalizer isn't called for instances resolved by [`crate::Container::get_transient`],
    /// because they aren't tracked by the container.
    #[inline]
    #[must_use]
    pub fn add_finalizer<Dep>(mut self, finalizer: impl Finalizer<Dep> + Send + Sync) -> Self
    where
        Dep: Send + Sync + 'static,
    {
        self.finalizers.insert(TypeId::of::<Dep>(), boxed_finalizer(finalizer));
        self
    }

    /// Bindings registered for the service, in registration order
    #[must_use]
    pub fn bindings_of(&self, service: TypeInfo) -> Vec<BindingMetadata> {
        self.bindings
            .get(&service.id)
            .map(|bindings| bindings.iter().map(|binding| binding.metadata).collect())
            .unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Adds a binding the container wasn't configured with, marked as implicit.
    /// Intended for [`crate::MissingBindingHandler`] implementations.
    pub fn add_implicit<Inst, Deps>(&mut self, instantiator: Inst, config: Config) -> BindingId
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver<Error = ResolveErrorKind> + 'static,
    {
        self.add_binding(TypeInfo::of::<Inst::Provides>(), boxed_instantiator(instantiator), None, config, true)
    }
}

impl Registry {
    pub(crate) fn add_binding(
        &mut self,
        service: TypeInfo,
        instantiator: BoxedCloneInstantiator,
        name: Option<&'static str>,
        config: Config,
        is_implicit: bool,
    ) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;

        self.bindings.entry(service.id).or_default().push(Binding {
            metadata: BindingMetadata {
                id,
                service,
                name,
                config,
                is_implicit,
            },
            instantiator,
            finalizer: None,
        });

        id
    }

    #[inline]
    #[must_use]
    pub(crate) fn has_bindings(&self, service: &TypeId) -> bool {
        self.bindings.contains_key(service)
    }

    /// First binding of the service satisfying the constraint, with the service finalizer attached
    #[must_use]
    pub(crate) fn find(&self, service: &TypeId, constraint: &Constraint<'_>) -> Option<Binding> {
        let binding = self
            .bindings
            .get(service)?
            .iter()
            .find(|binding| constraint.is_satisfied_by(&binding.metadata))?;

        Some(Binding {
            metadata: binding.metadata,
            instantiator: binding.instantiator.clone(),
            finalizer: self.finalizers.get(service).cloned(),
        })
    }
}
