/// Config for a binding
/// ## Fields
/// - `cache_provides`:
///   If `true`, the instance provided by the binding will be cached by the container and reused until the container is closed.
///   If `false`, the binding is unscoped: every resolution activates a new instance.
///
///   This does **not** affect the dependencies of the instance.
///   Only the final result is cached if caching is applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { cache_provides: true }
    }
}

impl Config {
    /// Config of the bindings the container adds by itself for missing services
    #[inline]
    #[must_use]
    pub const fn unscoped() -> Self {
        Self { cache_provides: false }
    }
}
