//! Route declaration for restfluent.
//!
//! This crate turns human-friendly path templates into anchored, named-group
//! patterns and keeps the ordered table of declared routes.
//!
//! # Features
//!
//! - **Path compilation**: `{id:int}`, `{name:alpha}`, `{slug}` and optional
//!   `{slug?}` placeholders become named capture groups
//! - **Fluent builder**: every verb entry point returns the stored route for
//!   chained configuration
//! - **Groups**: scoped prefix/permission/middleware defaults that nest and
//!   always restore
//!
//! # Example
//!
//! ```rust
//! use restfluent_router::{compile_path, GroupOverrides, RouteRegistry};
//!
//! assert_eq!(compile_path("/user/{name:alpha}"), "/user/(?P<name>[a-zA-Z]+)");
//!
//! let mut routes = RouteRegistry::new();
//! routes
//!     .get("/product/{id:int}")
//!     .handler(|req| async move { format!("product {}", req.param("id").unwrap_or_default()) })
//!     .formatter(true);
//!
//! routes.group(GroupOverrides::new().prefix("admin").middleware(["auth"]), |routes| {
//!     routes.delete("/product/{id:int}");
//! });
//!
//! assert_eq!(routes.len(), 2);
//! assert_eq!(routes.routes()[1].route_prefix(), "admin");
//! ```
//!
//! # Matching
//!
//! The host owns request matching. [`CompiledPath::matcher`] builds the
//! anchored expression `^/<prefix><pattern>$` for hosts (and the test host)
//! that match with the `regex` crate:
//!
//! ```text
//! template  /category/{slug?}
//! pattern   /category(?:/(?P<slug>[a-zA-Z0-9-+_]+))?
//! matcher   ^/v1/category(?:/(?P<slug>[a-zA-Z0-9-+_]+))?$
//! ```

mod group;
mod path;
mod registry;
mod route;

pub use group::{GroupDefaults, GroupOverrides, GroupStack};
pub use path::{compile_path, type_class, CompiledPath, ALPHA_CLASS, DEFAULT_CLASS, INT_CLASS};
pub use registry::{RouteDefaults, RouteRegistry, RouteSummary};
pub use route::{ResponseKeyMap, RouteDefinition, DEFAULT_CONTENT_TYPE, DEFAULT_PREFIX};
