mod dependency_resolver;
mod instantiate;
mod instantiator;
mod verify;

pub use dependency_resolver::ResolveErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use verify::VerifyErrorKind;
