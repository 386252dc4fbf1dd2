//! # Restfluent Core
//!
//! Core types shared by every restfluent crate.
//!
//! This crate provides the values that flow between route declarations, the
//! middleware chain and the host:
//!
//! - [`RestRequest`] - The inbound request with server metadata, path params and attributes
//! - [`RestResponse`] / [`HostError`] - Host-native final response and error values
//! - [`Reply`] - What a dispatch run produces (response or error)
//! - [`HandlerOutput`] - Tagged union over the shapes a handler may return
//! - [`HttpMethod`] - The verbs a route may be declared with
//! - [`RouteError`] - Error taxonomy for the route layer
//! - [`IdentityProvider`] - Seam for the embedder's identity/session lookup

#![doc(html_root_url = "https://docs.rs/restfluent-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod identity;
mod method;
mod output;
mod request;
mod response;

pub use error::{ErrorCategory, RouteError, RouteResult};
pub use handler::{handler_fn, permission_fn, BoxFuture, Handler, Permission};
pub use identity::{AnonymousProvider, CallerIdentity, IdentityProvider, RequestIdentityProvider};
pub use method::{HttpMethod, ParseMethodError};
pub use output::HandlerOutput;
pub use request::{HttpRequest, RestRequest};
pub use response::{Headers, HostError, HttpResponse, Reply, RestResponse};
