use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    /// No mock factory is registered for the service, so the container can't stand in for the missing binding.
    /// Register an explicit binding for it, or add it to the [`crate::MockRegistry`].
    #[error("Service {0} can't be mocked: no mock registered for it")]
    Unmockable(TypeInfo),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
