use alloc::sync::Arc;
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
    ptr,
};

use crate::{any::TypeInfo, errors::VerifyErrorKind};

/// A test double the container can stand in for a service with.
///
/// Recording calls and configuring expectations is up to the implementation,
/// the container only asks it to verify them.
/// Expectations are usually configured through a shared reference, so implementations use interior mutability.
pub trait Mock: Send + Sync + 'static {
    /// Checks that every expectation configured on the mock was met
    ///
    /// # Errors
    /// Returns the first unmet expectation
    fn verify_all(&self) -> Result<(), anyhow::Error>;
}

/// Shared handle to a mock created for a service.
/// Handles are compared by identity of the mock, not by its state.
#[derive(Clone)]
pub struct MockHandle {
    service: TypeInfo,
    mock_type: TypeInfo,
    mock: Arc<dyn Mock>,
    any: Arc<dyn Any + Send + Sync>,
}

impl MockHandle {
    #[inline]
    #[must_use]
    pub fn new<M: Mock>(service: TypeInfo, mock: Arc<M>) -> Self {
        Self {
            service,
            mock_type: TypeInfo::of::<M>(),
            mock: mock.clone(),
            any: mock,
        }
    }

    /// Service the mock stands in for
    #[inline]
    #[must_use]
    pub fn service(&self) -> TypeInfo {
        self.service
    }

    #[inline]
    #[must_use]
    pub fn mock_type(&self) -> TypeInfo {
        self.mock_type
    }

    /// Returns the mock as its concrete type to configure or inspect it,
    /// or `None` if the mock is of another type
    #[inline]
    #[must_use]
    pub fn downcast<M: Mock>(&self) -> Option<Arc<M>> {
        self.any.clone().downcast().ok()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// # Errors
    /// Returns [`VerifyErrorKind::Unsatisfied`] with this handle if the mock has unmet expectations
    pub fn verify_all(&self) -> Result<(), VerifyErrorKind> {
        self.mock.verify_all().map_err(|source| VerifyErrorKind::Unsatisfied {
            mock: self.clone(),
            source,
        })
    }

    #[inline]
    #[must_use]
    pub(crate) fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.any).cast()
    }
}

impl Debug for MockHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHandle")
            .field("service", &self.service.name)
            .field("mock_type", &self.mock_type.name)
            .field("ptr", &self.as_ptr())
            .finish()
    }
}

/// Notification that a mock provider created a mock
#[derive(Debug, Clone)]
pub struct MockCreated {
    mock: MockHandle,
}

impl MockCreated {
    #[inline]
    #[must_use]
    pub(crate) fn new(mock: MockHandle) -> Self {
        Self { mock }
    }

    #[inline]
    #[must_use]
    pub fn mock(&self) -> &MockHandle {
        &self.mock
    }
}
