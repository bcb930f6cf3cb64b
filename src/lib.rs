#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod fallback;
pub(crate) mod finalizer;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod mock;
pub(crate) mod mock_provider;
pub(crate) mod mock_registry;
pub(crate) mod mocking_container;
pub(crate) mod parameters;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod resolution;

pub use any::TypeInfo;
pub use binding::{BindingId, BindingMetadata};
pub use config::Config;
pub use container::Container;
pub use context::ResolutionContext;
pub use dependency_resolver::DependencyResolver;
pub use errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind, VerifyErrorKind};
pub use fallback::MissingBindingHandler;
pub use finalizer::Finalizer;
pub use inject::{Inject, InjectParameter, InjectTransient};
pub use instantiator::{instance, Instantiator};
pub use mock::{Mock, MockCreated, MockHandle};
pub use mock_provider::{ListenerId, MockProvider};
pub use mock_registry::MockRegistry;
pub use mocking_container::MockingContainer;
pub use parameters::Parameters;
pub use registry::Registry;
pub use resolution::{Constraint, MockResolutionExt, Request, ResolutionRoot, Resolved, WithParameters};
