use crate::{any::TypeInfo, registry::Registry};

/// Resolution fallback of a container.
///
/// The container calls it when a service is requested that has no bindings at all,
/// before failing with [`crate::ResolveErrorKind::NoBinding`].
/// If the handler returns `true`, the container looks the binding up again.
///
/// # Notes
/// The registry is locked while the handler runs, so the handler must not resolve anything from the container.
pub trait MissingBindingHandler: Send + Sync + 'static {
    /// Returns `true` if a binding for the service was added to the registry
    fn handle_missing_binding(&self, service: TypeInfo, registry: &mut Registry) -> bool;
}
