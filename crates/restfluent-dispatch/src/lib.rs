//! # Restfluent Dispatch
//!
//! Request-time half of the restfluent route layer.
//!
//! - [`normalize`] extracts body, status and headers from a handler's result
//! - [`envelope`] defaults `Content-Type` and applies the `{data, status, success}` envelope
//! - [`Dispatcher`] runs one route's middleware chain around its handler
//! - [`register_routes`] hands every declared route to a [`HostRegistrar`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use restfluent_dispatch::register_routes;
//!
//! let mut routes = RouteRegistry::new();
//! routes.get("/product/{id:int}").handler(show_product);
//!
//! // Once, on the host's initialization hook:
//! register_routes(&routes, &middleware, &mut host)?;
//! ```

#![doc(html_root_url = "https://docs.rs/restfluent-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod envelope;
pub mod normalize;
pub mod registration;

pub use dispatcher::{finalize, DispatchCallback, Dispatcher};
pub use envelope::wrap_envelope;
pub use normalize::{normalize, NormalizedResult};
pub use registration::{register_routes, HostRegistrar, RouteOptions};
