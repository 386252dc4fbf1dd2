//! # Restfluent Middleware
//!
//! The middleware half of the restfluent dispatch pipeline.
//!
//! Each route carries an ordered list of middleware. At registration time the
//! list is resolved into a [`Pipeline`] of [`Stage`]s; at request time [`Next`]
//! walks the stages in declaration order and finally calls the route's
//! terminal [`Endpoint`].
//!
//! ```text
//! Request → first → second → ... → Endpoint (handler + normalization)
//!                                        ↓
//! Reply   ← first ← second ← ... ←───────┘
//! ```
//!
//! ## Key Features
//!
//! - **Declaration order**: the first middleware added runs first and wraps
//!   everything after it
//! - **Short-circuit**: a middleware may answer without calling `next`
//! - **Typed resolution**: named references resolve through a
//!   [`MiddlewareRegistry`]; unknown names degrade to passthrough
//! - **Async**: all middleware and the counter store are async
//!
//! ## Example
//!
//! ```
//! use restfluent_middleware::{MiddlewareRef, MiddlewareRegistry, Pipeline};
//!
//! let registry = MiddlewareRegistry::new();
//! let pipeline = Pipeline::resolve(&[MiddlewareRef::named("audit")], &registry);
//!
//! assert_eq!(pipeline.stage_count(), 1);
//! assert!(pipeline.stages()[0].is_passthrough());
//! ```

#![doc(html_root_url = "https://docs.rs/restfluent-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod pipeline;
pub mod registry;
pub mod stages;
pub mod store;

// Re-export main types at crate root
pub use middleware::{BoxFuture, Endpoint, FnMiddleware, Middleware, Next, Stage};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use registry::{MiddlewareFactory, MiddlewareRef, MiddlewareRegistry};
pub use stages::{RateLimitBuilder, RateLimitPolicy};
pub use store::{CounterStore, InMemoryCounterStore, DEFAULT_SWEEP_THRESHOLD};
