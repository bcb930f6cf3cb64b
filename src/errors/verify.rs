use crate::mock::MockHandle;

#[derive(thiserror::Error, Debug)]
pub enum VerifyErrorKind {
    #[error("Mock {} of {} has unmet expectations: {source}", .mock.mock_type(), .mock.service())]
    Unsatisfied {
        mock: MockHandle,
        #[source]
        source: anyhow::Error,
    },
}

impl VerifyErrorKind {
    /// The mock whose expectations weren't met
    #[inline]
    #[must_use]
    pub fn mock(&self) -> &MockHandle {
        match self {
            Self::Unsatisfied { mock, .. } => mock,
        }
    }
}
