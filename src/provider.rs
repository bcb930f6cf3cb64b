use alloc::boxed::Box;

/// Something that produces one response for a request: an instance for a resolution context,
/// or nothing for a finalized instance.
pub(crate) trait Provider<Request> {
    type Response;
    type Error;

    fn provide(&mut self, request: Request) -> Result<Self::Response, Self::Error>;
}

pub(crate) trait CloneProvider<Request>: Provider<Request> {
    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneProvider<Request, Response = Self::Response, Error = Self::Error> + Send + Sync>;
}

impl<Request, T> CloneProvider<Request> for T
where
    T: Provider<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn CloneProvider<Request, Response = T::Response, Error = T::Error> + Send + Sync> {
        Box::new(self.clone())
    }
}

pub(crate) struct BoxCloneProvider<Request, Response, Error>(
    pub(crate) Box<dyn CloneProvider<Request, Response = Response, Error = Error> + Send + Sync>,
);

impl<Request, Response, Error> Clone for BoxCloneProvider<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl<Request, Response, Error> Provider<Request> for BoxCloneProvider<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn provide(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        self.0.provide(request)
    }
}

#[inline]
#[must_use]
pub(crate) const fn provider_fn<F>(f: F) -> ProviderFn<F> {
    ProviderFn { f }
}

#[derive(Clone)]
pub(crate) struct ProviderFn<F> {
    f: F,
}

impl<F, Request, Response, Error> Provider<Request> for ProviderFn<F>
where
    F: FnMut(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn provide(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.f)(request)
    }
}
