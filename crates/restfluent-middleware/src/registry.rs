//! Typed middleware references and the registry that resolves them.
//!
//! Routes declare their middleware either as instances or by name. Named
//! references are looked up in a [`MiddlewareRegistry`] once, when the
//! route's pipeline is built; a name with no registered factory degrades to a
//! passthrough stage instead of failing the route.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = MiddlewareRegistry::new();
//! registry.register("rate-limit", move || RateLimitPolicy::new(store.clone()));
//!
//! let pipeline = Pipeline::resolve(&[MiddlewareRef::named("rate-limit")], &registry);
//! ```

use crate::middleware::{Middleware, Stage};
use restfluent_core::{RouteError, RouteResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A factory producing a middleware instance.
pub type MiddlewareFactory = Arc<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// A middleware entry in a route's chain.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A ready-to-use instance, shared across requests.
    Instance(Arc<dyn Middleware>),
    /// A name resolved through a [`MiddlewareRegistry`].
    Named(String),
}

impl MiddlewareRef {
    /// Wraps a middleware instance.
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }

    /// Creates a reference by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns the instance name or the referenced name.
    pub fn label(&self) -> &str {
        match self {
            Self::Instance(m) => m.name(),
            Self::Named(name) => name,
        }
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(m) => f.debug_tuple("Instance").field(&m.name()).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareRef {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        Self::Instance(middleware)
    }
}

/// Maps middleware names to factories.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, MiddlewareFactory>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under a name, replacing any previous one.
    pub fn register<M, F>(&mut self, name: impl Into<String>, factory: F)
    where
        M: Middleware,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let factory: MiddlewareFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Middleware>);
        self.factories.insert(name.into(), factory);
    }

    /// Registers a single instance shared by every route that names it.
    pub fn register_instance<M: Middleware>(&mut self, name: impl Into<String>, middleware: M) {
        let shared: Arc<dyn Middleware> = Arc::new(middleware);
        self.factories
            .insert(name.into(), Arc::new(move || Arc::clone(&shared)));
    }

    /// Returns true if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns an iterator over the registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolves one reference to an instance.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnresolvableMiddleware`] if a named reference
    /// has no registered factory.
    pub fn resolve(&self, reference: &MiddlewareRef) -> RouteResult<Arc<dyn Middleware>> {
        match reference {
            MiddlewareRef::Instance(m) => Ok(Arc::clone(m)),
            MiddlewareRef::Named(name) => self
                .factories
                .get(name)
                .map(|factory| factory())
                .ok_or_else(|| RouteError::unresolvable_middleware(name.clone())),
        }
    }

    /// Resolves a whole chain, keeping declaration order.
    ///
    /// Unresolvable references are logged and become passthrough stages.
    pub fn resolve_chain(&self, references: &[MiddlewareRef]) -> Vec<Stage> {
        references
            .iter()
            .map(|reference| match self.resolve(reference) {
                Ok(middleware) => Stage::Active(middleware),
                Err(e) => {
                    warn!(middleware = reference.label(), error = %e, "middleware skipped");
                    Stage::Passthrough(reference.label().to_string())
                }
            })
            .collect()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("MiddlewareRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{BoxFuture, Next};
    use restfluent_core::{Reply, RestRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop;

    impl Middleware for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn handle<'a>(&'a self, request: RestRequest, next: Next<'a>) -> BoxFuture<'a, Reply> {
            next.run(request)
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = MiddlewareRegistry::new();
        assert!(registry.is_empty());

        registry.register("noop", || Noop);
        assert!(registry.contains("noop"));
        assert_eq!(registry.len(), 1);

        let resolved = registry.resolve(&MiddlewareRef::named("noop")).unwrap();
        assert_eq!(resolved.name(), "noop");
    }

    #[test]
    fn test_unknown_name_is_typed_error() {
        let registry = MiddlewareRegistry::new();
        let err = registry.resolve(&"ghost".into()).err().unwrap();
        assert!(matches!(err, RouteError::UnresolvableMiddleware { ref reference } if reference == "ghost"));
    }

    #[test]
    fn test_instance_needs_no_registry() {
        let registry = MiddlewareRegistry::new();
        let reference = MiddlewareRef::instance(Noop);
        assert_eq!(reference.label(), "noop");
        assert!(registry.resolve(&reference).is_ok());
    }

    #[test]
    fn test_factory_runs_per_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = MiddlewareRegistry::new();
        registry.register("noop", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Noop
        });

        let chain = registry.resolve_chain(&["noop".into(), "noop".into()]);
        assert_eq!(chain.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolve_chain_degrades_to_passthrough() {
        let mut registry = MiddlewareRegistry::new();
        registry.register_instance("noop", Noop);

        let chain = registry.resolve_chain(&["noop".into(), "ghost".into()]);
        assert!(!chain[0].is_passthrough());
        assert!(chain[1].is_passthrough());
        assert_eq!(chain[1].name(), "ghost");
    }
}
