//! Scoped route defaults.
//!
//! A group applies a prefix, a permission predicate and a middleware chain to
//! every route declared inside it. Groups nest: each level overrides only the
//! keys it sets and inherits the rest from the level around it.

use restfluent_core::{permission_fn, Permission, RestRequest};
use restfluent_middleware::MiddlewareRef;
use std::fmt;

/// The keys a group may override. Unset keys are inherited.
#[derive(Clone, Default)]
pub struct GroupOverrides {
    prefix: Option<String>,
    permission: Option<Permission>,
    middleware: Option<Vec<MiddlewareRef>>,
}

impl GroupOverrides {
    /// Creates overrides that change nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Overrides the permission predicate.
    #[must_use]
    pub fn permissions<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RestRequest) -> bool + Send + Sync + 'static,
    {
        self.permission = Some(permission_fn(predicate));
        self
    }

    /// Overrides the middleware chain.
    #[must_use]
    pub fn middleware<I, M>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.middleware = Some(middleware.into_iter().map(Into::into).collect());
        self
    }
}

impl fmt::Debug for GroupOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupOverrides")
            .field("prefix", &self.prefix)
            .field("permission", &self.permission.is_some())
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// The defaults in effect for newly declared routes.
#[derive(Clone, Default)]
pub struct GroupDefaults {
    /// Namespace applied when non-empty.
    pub prefix: Option<String>,
    /// Permission predicate applied when set.
    pub permission: Option<Permission>,
    /// Middleware chain new routes start with.
    pub middleware: Vec<MiddlewareRef>,
}

impl GroupDefaults {
    fn merged(&self, overrides: GroupOverrides) -> Self {
        Self {
            prefix: overrides.prefix.or_else(|| self.prefix.clone()),
            permission: overrides.permission.or_else(|| self.permission.clone()),
            middleware: overrides
                .middleware
                .unwrap_or_else(|| self.middleware.clone()),
        }
    }

    /// Returns the prefix if it is set and non-empty.
    pub fn effective_prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }
}

impl fmt::Debug for GroupDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDefaults")
            .field("prefix", &self.prefix)
            .field("permission", &self.permission.is_some())
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// Save/restore stack of group defaults.
///
/// The bottom level is the empty defaults and is never popped.
#[derive(Debug, Clone)]
pub struct GroupStack {
    levels: Vec<GroupDefaults>,
}

impl Default for GroupStack {
    fn default() -> Self {
        Self {
            levels: vec![GroupDefaults::default()],
        }
    }
}

impl GroupStack {
    /// Creates a stack holding only the empty defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the defaults in effect.
    pub fn current(&self) -> &GroupDefaults {
        // The bottom level is never removed.
        &self.levels[self.levels.len() - 1]
    }

    /// Returns the nesting depth; 0 outside any group.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Enters a group, merging `overrides` over the current defaults.
    pub fn push(&mut self, overrides: GroupOverrides) {
        let next = self.current().merged(overrides);
        self.levels.push(next);
    }

    /// Leaves the innermost group. Does nothing at depth 0.
    pub fn pop(&mut self) {
        if self.depth() > 0 {
            self.levels.pop();
        }
    }

    /// Restores the stack to a depth previously returned by [`depth`](Self::depth).
    pub fn restore(&mut self, depth: usize) {
        self.levels.truncate(depth + 1);
    }
}
