use alloc::boxed::Box;
use core::any::Any;
use tracing::debug;

use crate::{
    context::ResolutionContext,
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    mock::MockHandle,
    provider::{provider_fn, BoxCloneProvider},
};

pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: Send + Sync + 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// An activated instance, type-erased, and the mock backing it if a mock provider produced it
pub(crate) struct Provided {
    pub(crate) instance: Box<dyn Any + Send + Sync>,
    pub(crate) mock: Option<MockHandle>,
}

impl Provided {
    #[inline]
    #[must_use]
    pub(crate) fn new<T: Send + Sync + 'static>(instance: T) -> Self {
        Self {
            instance: Box::new(instance),
            mock: None,
        }
    }
}

pub(crate) type BoxedCloneInstantiator =
    BoxCloneProvider<ResolutionContext, Provided, InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>>;

#[must_use]
pub(crate) fn boxed_instantiator<Inst, Deps>(mut instantiator: Inst) -> BoxedCloneInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Deps: DependencyResolver + 'static,
{
    BoxCloneProvider(Box::new(provider_fn(move |context: ResolutionContext| {
        let dependencies = match Deps::resolve(&context) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(InstantiatorErrorKind::Deps(Box::new(err.into()))),
        };
        let instance = match instantiator.instantiate(dependencies) {
            Ok(instance) => instance,
            Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
        };

        debug!("Instantiated");

        Ok(Provided::new(instance))
    })))
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: Send + Sync + 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver + Send, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Wrapper to create an instantiator that just returns passed value.
/// It can be used when the value was created outside the container.
#[inline]
#[must_use]
pub fn instance<T: Clone + Send + Sync + 'static>(val: T) -> impl Instantiator<(), Provides = T, Error = InstantiateErrorKind> {
    move || Ok(val.clone())
}
