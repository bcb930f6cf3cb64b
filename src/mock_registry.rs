use alloc::{boxed::Box, collections::BTreeMap, sync::Arc};
use core::any::{Any, TypeId};

use crate::{
    any::TypeInfo,
    mock::{Mock, MockHandle},
};

/// Creates a mock and the service instance backed by it
pub(crate) type MockFactory = Arc<dyn Fn() -> (Box<dyn Any + Send + Sync>, MockHandle) + Send + Sync>;

/// Which services can be mocked and how.
///
/// A service is mocked by creating a mock and turning it into the service,
/// for example by coercing `Arc<MockUserRepo>` into `Arc<dyn UserRepo + Send + Sync>`,
/// so the instance shares state with the mock handle the container tracks.
#[derive(Default, Clone)]
pub struct MockRegistry {
    factories: BTreeMap<TypeId, MockFactory>,
}

impl MockRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a mock for the service, created by [`Default`]
    ///
    /// # Examples
    /// ```rust
    /// use froodi_mock::{Mock, MockRegistry};
    /// use std::sync::Arc;
    ///
    /// trait UserRepo {}
    ///
    /// #[derive(Default)]
    /// struct MockUserRepo;
    ///
    /// impl UserRepo for MockUserRepo {}
    ///
    /// impl Mock for MockUserRepo {
    ///     fn verify_all(&self) -> Result<(), anyhow::Error> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let mocks = MockRegistry::new().mock::<Arc<dyn UserRepo + Send + Sync>, MockUserRepo>(|mock| mock as _);
    /// ```
    #[inline]
    #[must_use]
    pub fn mock<Dep, M>(self, into_service: fn(Arc<M>) -> Dep) -> Self
    where
        Dep: Send + Sync + 'static,
        M: Mock + Default,
    {
        self.mock_with(M::default, into_service)
    }

    /// Registers a mock for the service, created by `create`
    #[must_use]
    pub fn mock_with<Dep, M>(
        mut self,
        create: impl Fn() -> M + Send + Sync + 'static,
        into_service: impl Fn(Arc<M>) -> Dep + Send + Sync + 'static,
    ) -> Self
    where
        Dep: Send + Sync + 'static,
        M: Mock,
    {
        let service = TypeInfo::of::<Dep>();
        let factory: MockFactory = Arc::new(move || {
            let mock = Arc::new(create());
            let handle = MockHandle::new(service, mock.clone());
            (Box::new(into_service(mock)) as Box<dyn Any + Send + Sync>, handle)
        });

        self.factories.insert(service.id, factory);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_mockable(&self, service: TypeInfo) -> bool {
        self.factories.contains_key(&service.id)
    }

    #[inline]
    #[must_use]
    pub(crate) fn factory(&self, service: &TypeId) -> Option<MockFactory> {
        self.factories.get(service).cloned()
    }
}
