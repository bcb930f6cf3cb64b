use super::errors::ResolveErrorKind;
use crate::context::ResolutionContext;

pub trait DependencyResolver: Sized {
    type Error: Into<ResolveErrorKind>;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver + Send, )*
        {
            type Error = ResolveErrorKind;

            #[inline]
            #[allow(unused_variables)]
            fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
                Ok(($($ty::resolve(context).map_err(Into::into)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);

#[cfg(test)]
mod tests {
    extern crate std;

    use super::DependencyResolver;
    use crate::{
        errors::InstantiateErrorKind,
        inject::{Inject, InjectParameter, InjectTransient},
        instance, Container, Parameters, Registry, ResolveErrorKind,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing::debug;
    use tracing_test::traced_test;

    struct Request;

    #[derive(Clone)]
    struct Instance;

    struct Tenant(&'static str);

    #[test]
    #[allow(dead_code)]
    fn test_dependency_resolver_impls() {
        fn resolver<T: DependencyResolver>() {}
        fn resolver_with_dep<Dep: Send + Sync + 'static>() {
            resolver::<Inject<Dep>>();
            resolver::<InjectTransient<Dep>>();
            resolver::<InjectParameter<Dep>>();
            resolver::<(Inject<Dep>, InjectTransient<Dep>, InjectParameter<Dep>)>();
        }
    }

    #[test]
    #[traced_test]
    fn test_cached_resolve() {
        let request_call_count = Arc::new(AtomicU8::new(0));

        let container = Container::new(
            Registry::new()
                .provide({
                    let request_call_count = request_call_count.clone();
                    move || {
                        request_call_count.fetch_add(1, Ordering::SeqCst);

                        debug!("Call instantiator request");
                        Ok::<_, InstantiateErrorKind>(Request)
                    }
                })
                .provide(instance(Instance)),
        );

        let request_1 = Inject::<Request>::resolve(&container.context()).unwrap();
        let request_2 = Inject::<Request>::resolve(&container.context()).unwrap();
        let _ = Inject::<Instance>::resolve(&container.context()).unwrap();

        assert!(Arc::ptr_eq(&request_1.0, &request_2.0));
        assert_eq!(request_call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_transient_resolve() {
        let request_call_count = Arc::new(AtomicU8::new(0));

        let container = Container::new(Registry::new().provide({
            let request_call_count = request_call_count.clone();
            move || {
                request_call_count.fetch_add(1, Ordering::SeqCst);

                debug!("Call instantiator request");
                Ok::<_, InstantiateErrorKind>(Request)
            }
        }));

        let _ = InjectTransient::<Request>::resolve(&container.context()).unwrap();
        InjectTransient::<Request>::resolve(&container.context()).unwrap();

        assert_eq!(request_call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_parameter_resolve() {
        let container = Container::new(Registry::new());

        let context = container.context_with(Parameters::new().with(Tenant("acme")));
        let InjectParameter(tenant) = InjectParameter::<Tenant>::resolve(&context).unwrap();
        assert_eq!(tenant.0, "acme");

        let err = InjectParameter::<Tenant>::resolve(&container.context()).err().unwrap();
        assert!(matches!(err, ResolveErrorKind::NoParameter { .. }));
    }
}
