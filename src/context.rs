use alloc::sync::Arc;

use crate::{container::Container, parameters::Parameters};

/// State of one in-flight request: the container satisfying it and the parameters passed to it.
/// Dependencies of the requested service are resolved through the same context, so they see the same parameters.
#[derive(Clone)]
pub struct ResolutionContext {
    pub(crate) container: Container,
    pub(crate) parameters: Arc<Parameters>,
}

impl ResolutionContext {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, parameters: Arc<Parameters>) -> Self {
        Self { container, parameters }
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}
