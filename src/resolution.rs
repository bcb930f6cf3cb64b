use alloc::{boxed::Box, sync::Arc};
use core::any::Any;
use tracing::{debug, error};

use crate::{
    any::TypeInfo, binding::BindingMetadata, container::Container, errors::ResolveErrorKind, mock::MockHandle, parameters::Parameters,
};

/// Which of the service bindings a request accepts
#[derive(Clone, Copy)]
pub enum Constraint<'a> {
    /// The first binding of the service
    Any,
    /// The first binding with the name
    Named(&'a str),
    /// The first binding whose metadata satisfies the predicate
    Matches(&'a dyn Fn(&BindingMetadata) -> bool),
}

impl Constraint<'_> {
    #[inline]
    #[must_use]
    pub fn is_satisfied_by(&self, metadata: &BindingMetadata) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Named(name) => metadata.has_name(name),
            Constraint::Matches(predicate) => predicate(metadata),
        }
    }
}

#[derive(Clone, Copy)]
pub struct Request<'a> {
    pub service: TypeInfo,
    pub constraint: Constraint<'a>,
}

impl<'a> Request<'a> {
    #[inline]
    #[must_use]
    pub const fn new(service: TypeInfo) -> Self {
        Self {
            service,
            constraint: Constraint::Any,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_constraint(service: TypeInfo, constraint: Constraint<'a>) -> Self {
        Self { service, constraint }
    }
}

/// Instance the container resolved, with the mock backing it if the instance was produced by a mock provider
#[derive(Clone)]
pub struct Resolved {
    pub(crate) instance: Arc<dyn Any + Send + Sync>,
    pub(crate) mock: Option<MockHandle>,
}

impl Resolved {
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.instance
    }

    #[inline]
    #[must_use]
    pub fn mock(&self) -> Option<&MockHandle> {
        self.mock.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn into_mock(self) -> Option<MockHandle> {
        self.mock
    }

    #[inline]
    #[must_use]
    pub fn is_mocked(&self) -> bool {
        self.mock.is_some()
    }

    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if the instance isn't a `Dep`
    pub fn downcast<Dep: Send + Sync + 'static>(self) -> Result<Arc<Dep>, ResolveErrorKind> {
        match self.instance.downcast::<Dep>() {
            Ok(instance) => Ok(instance),
            Err(incorrect_type) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: TypeInfo::of::<Dep>(),
                    actual: (*incorrect_type).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Like [`Self::downcast`], but keeps the mock
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if the instance isn't a `Dep`
    pub fn downcast_with_mock<Dep: Send + Sync + 'static>(self) -> Result<(Arc<Dep>, Option<MockHandle>), ResolveErrorKind> {
        let mock = self.mock.clone();
        self.downcast().map(|instance| (instance, mock))
    }
}

/// Something services can be requested from: a container, a container with request parameters,
/// or the context of an in-flight request.
pub trait ResolutionRoot {
    /// Resolves the first binding of the requested service that satisfies the request constraint
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoBinding`] if no binding satisfies the request
    /// - Returns [`ResolveErrorKind::Instantiator`] if the binding failed to provide the instance
    fn resolve(&self, request: &Request<'_>) -> Result<Resolved, ResolveErrorKind>;

    /// Activates a new instance of the requested service, bypassing the container's cache
    ///
    /// # Errors
    /// See [`Self::resolve`]
    fn resolve_transient(&self, request: &Request<'_>) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind>;

    /// Gets a dependency by the first binding of its type
    #[allow(clippy::missing_errors_doc)]
    fn get<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.resolve(&Request::new(TypeInfo::of::<Dep>()))?.downcast()
    }

    /// Gets a dependency by the first binding whose metadata satisfies the constraint
    #[allow(clippy::missing_errors_doc)]
    fn get_with<Dep: Send + Sync + 'static>(&self, constraint: impl Fn(&BindingMetadata) -> bool) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(TypeInfo::of::<Dep>(), Constraint::Matches(&constraint)))?
            .downcast()
    }

    /// Gets a dependency by the first binding with the name
    #[allow(clippy::missing_errors_doc)]
    fn get_named<Dep: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(TypeInfo::of::<Dep>(), Constraint::Named(name)))?
            .downcast()
    }

    /// Gets a new instance of the dependency each time it's called.
    /// The instance isn't cached and its finalizer isn't called.
    #[allow(clippy::missing_errors_doc)]
    fn get_transient<Dep: Send + Sync + 'static>(&self) -> Result<Dep, ResolveErrorKind> {
        let type_info = TypeInfo::of::<Dep>();
        match self.resolve_transient(&Request::new(type_info))?.downcast::<Dep>() {
            Ok(instance) => Ok(*instance),
            Err(incorrect_type) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: type_info,
                    actual: (*incorrect_type).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Gets a dependency known only at runtime by the first binding of its type
    #[allow(clippy::missing_errors_doc)]
    fn get_of(&self, service: TypeInfo) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.resolve(&Request::new(service)).map(|resolved| resolved.instance)
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_of_with(
        &self,
        service: TypeInfo,
        constraint: impl Fn(&BindingMetadata) -> bool,
    ) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(service, Constraint::Matches(&constraint)))
            .map(|resolved| resolved.instance)
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_of_named(&self, service: TypeInfo, name: &str) -> Result<Arc<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(service, Constraint::Named(name)))
            .map(|resolved| resolved.instance)
    }
}

/// Access to the mocks behind resolved instances.
///
/// Each method resolves the service as the matching `get` method does,
/// then returns the mock backing the instance, or `None` if the instance came from a regular binding.
/// Resolution errors are returned as is.
pub trait MockResolutionExt: ResolutionRoot {
    #[allow(clippy::missing_errors_doc)]
    fn get_mock<Dep: Send + Sync + 'static>(&self) -> Result<Option<MockHandle>, ResolveErrorKind> {
        let (_, mock) = self.resolve(&Request::new(TypeInfo::of::<Dep>()))?.downcast_with_mock::<Dep>()?;
        Ok(log_mock(mock))
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_mock_with<Dep: Send + Sync + 'static>(
        &self,
        constraint: impl Fn(&BindingMetadata) -> bool,
    ) -> Result<Option<MockHandle>, ResolveErrorKind> {
        let (_, mock) = self
            .resolve(&Request::with_constraint(TypeInfo::of::<Dep>(), Constraint::Matches(&constraint)))?
            .downcast_with_mock::<Dep>()?;
        Ok(log_mock(mock))
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_mock_named<Dep: Send + Sync + 'static>(&self, name: &str) -> Result<Option<MockHandle>, ResolveErrorKind> {
        let (_, mock) = self
            .resolve(&Request::with_constraint(TypeInfo::of::<Dep>(), Constraint::Named(name)))?
            .downcast_with_mock::<Dep>()?;
        Ok(log_mock(mock))
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_mock_of(&self, service: TypeInfo) -> Result<Option<MockHandle>, ResolveErrorKind> {
        self.resolve(&Request::new(service)).map(|resolved| log_mock(resolved.mock))
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_mock_of_with(
        &self,
        service: TypeInfo,
        constraint: impl Fn(&BindingMetadata) -> bool,
    ) -> Result<Option<MockHandle>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(service, Constraint::Matches(&constraint)))
            .map(|resolved| log_mock(resolved.mock))
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_mock_of_named(&self, service: TypeInfo, name: &str) -> Result<Option<MockHandle>, ResolveErrorKind> {
        self.resolve(&Request::with_constraint(service, Constraint::Named(name)))
            .map(|resolved| log_mock(resolved.mock))
    }

    /// Gets a dependency together with the mock backing it, from one activation.
    /// Use it to configure the same mock the caller is going to use when the binding is unscoped.
    #[allow(clippy::missing_errors_doc)]
    fn resolve_mocked<Dep: Send + Sync + 'static>(&self) -> Result<(Arc<Dep>, Option<MockHandle>), ResolveErrorKind> {
        self.resolve(&Request::new(TypeInfo::of::<Dep>()))?.downcast_with_mock()
    }
}

impl<T: ResolutionRoot + ?Sized> MockResolutionExt for T {}

#[inline]
fn log_mock(mock: Option<MockHandle>) -> Option<MockHandle> {
    if mock.is_none() {
        debug!("Resolved instance isn't backed by a mock");
    }
    mock
}

/// Container with parameters passed to every request made through it
pub struct WithParameters<'a> {
    pub(crate) container: &'a Container,
    pub(crate) parameters: Arc<Parameters>,
}

impl ResolutionRoot for WithParameters<'_> {
    #[inline]
    fn resolve(&self, request: &Request<'_>) -> Result<Resolved, ResolveErrorKind> {
        self.container.resolve_with_parameters(request, &self.parameters)
    }

    #[inline]
    fn resolve_transient(&self, request: &Request<'_>) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.container.resolve_transient_with_parameters(request, &self.parameters)
    }
}

impl ResolutionRoot for crate::context::ResolutionContext {
    #[inline]
    fn resolve(&self, request: &Request<'_>) -> Result<Resolved, ResolveErrorKind> {
        self.container.resolve_with_parameters(request, &self.parameters)
    }

    #[inline]
    fn resolve_transient(&self, request: &Request<'_>) -> Result<Box<dyn Any + Send + Sync>, ResolveErrorKind> {
        self.container.resolve_transient_with_parameters(request, &self.parameters)
    }
}
