use crate::{
    any::TypeInfo,
    config::Config,
    finalizer::BoxedCloneFinalizer,
    instantiator::BoxedCloneInstantiator,
};

/// Registration order of a binding inside one registry. Also the key its cached instance is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(pub(crate) u64);

/// What requests can be matched against: everything about a binding except the way it provides instances.
#[derive(Debug, Clone, Copy)]
pub struct BindingMetadata {
    pub id: BindingId,
    pub service: TypeInfo,
    pub name: Option<&'static str>,
    pub config: Config,
    /// `true` for bindings the container added by itself to handle a missing binding
    pub is_implicit: bool,
}

impl BindingMetadata {
    #[inline]
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name == Some(name)
    }
}

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) metadata: BindingMetadata,
    pub(crate) instantiator: BoxedCloneInstantiator,
    pub(crate) finalizer: Option<BoxedCloneFinalizer>,
}
