//! # Restfluent
//!
//! A fluent route layer for a host REST framework.
//!
//! - Declare routes with a chained builder and `{name:type}` path templates
//! - Share prefix, permission and middleware across routes with groups
//! - Wrap handlers in named or inline middleware chains
//! - Return plain values from handlers and let the layer pick body, status
//!   and headers, optionally inside a `{data, status, success}` envelope
//!
//! The host keeps ownership of matching, permission checks and serialization.
//! This crate hands it one permission callback and one dispatch callback per
//! route.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restfluent::prelude::*;
//! use std::sync::Arc;
//!
//! let mut middleware = MiddlewareRegistry::new();
//! middleware.register_instance(
//!     "rate-limit",
//!     RateLimitPolicy::new(Arc::new(InMemoryCounterStore::new())),
//! );
//!
//! let mut routes = RouteRegistry::new();
//! routes.group(GroupOverrides::new().prefix("shop/v1").middleware(["rate-limit"]), |routes| {
//!     routes
//!         .get("/product/{id:int}")
//!         .handler(|req: RestRequest| async move {
//!             serde_json::json!({ "data": { "id": req.param("id") }, "status": 200 })
//!         })
//!         .status();
//! });
//!
//! register_routes(&routes, &middleware, &mut host)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! declare ─► RouteRegistry ─► register_routes ─► host router
//!                                                    │
//! request ─► host match ─► permission ─► Dispatcher ─┴─► middleware ─► handler
//!                                                              ▼
//! reply   ◄──────────── envelope ◄── content type ◄── normalize
//! ```

#![doc(html_root_url = "https://docs.rs/restfluent/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use restfluent_config as config;
pub use restfluent_core as core;
pub use restfluent_dispatch as dispatch;
pub use restfluent_middleware as middleware;
pub use restfluent_router as router;
pub use restfluent_telemetry as telemetry;

/// Common imports for declaring and registering routes.
///
/// ```rust,ignore
/// use restfluent::prelude::*;
/// ```
pub mod prelude {
    pub use restfluent_core::{
        handler_fn, permission_fn, BoxFuture, CallerIdentity, HandlerOutput, HostError,
        HttpMethod, IdentityProvider, Reply, RestRequest, RestResponse, RouteError, RouteResult,
    };

    pub use restfluent_router::{compile_path, GroupOverrides, RouteDefaults, RouteRegistry};

    pub use restfluent_middleware::{
        CounterStore, FnMiddleware, InMemoryCounterStore, Middleware, MiddlewareRef,
        MiddlewareRegistry, Next, RateLimitPolicy,
    };

    pub use restfluent_dispatch::{register_routes, HostRegistrar, RouteOptions};

    pub use restfluent_config::{ConfigLoader, RestfluentConfig};
}
