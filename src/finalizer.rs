use alloc::{boxed::Box, sync::Arc};
use core::any::{type_name, Any};
use tracing::error;

use crate::provider::{provider_fn, BoxCloneProvider};

/// Deactivation callback of a cached or tracked instance.
/// Called when the container is closed or dropped.
pub trait Finalizer<Dep>: Clone + 'static {
    fn finalize(&mut self, dependency: Arc<Dep>);
}

impl<F, Dep> Finalizer<Dep> for F
where
    F: FnMut(Arc<Dep>) + Clone + 'static,
{
    #[inline]
    fn finalize(&mut self, dependency: Arc<Dep>) {
        self(dependency);
    }
}

pub(crate) type BoxedCloneFinalizer = BoxCloneProvider<Arc<dyn Any + Send + Sync>, (), ()>;

#[must_use]
pub(crate) fn boxed_finalizer<Dep, Fin>(mut finalizer: Fin) -> BoxedCloneFinalizer
where
    Dep: Send + Sync + 'static,
    Fin: Finalizer<Dep> + Send + Sync,
{
    BoxCloneProvider(Box::new(provider_fn(move |dependency: Arc<dyn Any + Send + Sync>| {
        match dependency.downcast::<Dep>() {
            Ok(dependency) => {
                finalizer.finalize(dependency);
                Ok(())
            }
            Err(_) => {
                error!(dependency = type_name::<Dep>(), "Finalizer got an instance of another type");
                Err(())
            }
        }
    })))
}
