use alloc::sync::Arc;

use crate::{
    any::TypeInfo, context::ResolutionContext, dependency_resolver::DependencyResolver, resolution::ResolutionRoot as _,
    ResolveErrorKind,
};

/// Resolves the dependency through the container, sharing the instance if its binding is cached
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        context.get().map(Self)
    }
}

/// Activates a new instance of the dependency, bypassing the container's cache
pub struct InjectTransient<Dep>(pub Dep);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectTransient<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        context.get_transient().map(Self)
    }
}

/// Takes a value passed to the request by [`crate::Parameters`]
pub struct InjectParameter<Param>(pub Arc<Param>);

impl<Param: Send + Sync + 'static> DependencyResolver for InjectParameter<Param> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        match context.parameters().get() {
            Some(parameter) => Ok(Self(parameter)),
            None => Err(ResolveErrorKind::NoParameter {
                parameter: TypeInfo::of::<Param>(),
            }),
        }
    }
}
