//! # Restfluent Test
//!
//! In-memory host for exercising declared routes end to end without a
//! server. [`MockHost`] implements the host registrar, so the real
//! registration pass runs against it; requests then go through matching,
//! the permission callback, the middleware chain and the handler.
//!
//! ## Example
//!
//! ```ignore
//! use restfluent_test::{MockHost, TestRequest};
//!
//! #[tokio::test]
//! async fn test_show_product() {
//!     let mut host = MockHost::new();
//!     register_routes(&routes, &middleware, &mut host).unwrap();
//!
//!     let response = host
//!         .send(TestRequest::get("/v1/product/42").user("7"))
//!         .await
//!         .unwrap();
//!
//!     response.assert_status(StatusCode::OK);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/restfluent-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod host;
mod request;
mod response;

pub use error::TestError;
pub use host::{HostRoute, MockHost};
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
