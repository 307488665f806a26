//! # oxide-mux
//!
//! A small request router that sits between a transport and application
//! handlers.
//!
//! This crate provides:
//! - Segment-by-segment path matching with named and regex-constrained
//!   parameters and wildcard tails
//! - Method matching with automatic HEAD, automatic OPTIONS and
//!   405 responses carrying an `Allow` header
//! - Onion-ordered middleware that also wraps the fallback handlers
//! - Scoped route groups with their own middleware
//!
//! ## Quick Start
//!
//! ```
//! use oxide_mux::{Mux, Request, Response};
//!
//! fn hello(res: &mut Response, _req: &Request) {
//!     *res = Response::text("Hello, World!");
//! }
//!
//! fn user(res: &mut Response, req: &Request) {
//!     let id = req.params.require("id").unwrap();
//!     *res = Response::json(&serde_json::json!({ "id": id }));
//! }
//!
//! let mut mux = Mux::new();
//! mux.get("/", hello)
//!     .get("/users/:id|[0-9]+", user)
//!     .route("/users", &["POST"], hello);
//!
//! let res = mux.handle(Request::get("/users/123"));
//! assert_eq!(res.status, 200);
//! assert_eq!(mux.handle(Request::get("/users/abc")).status, 404);
//! ```
//!
//! ## Pattern Syntax
//!
//! | pattern              | matches                         | binds         |
//! |----------------------|---------------------------------|---------------|
//! | `/about`             | `/about` only                   | nothing       |
//! | `/users/:id`         | `/users/42`, `/users/bob`       | `id`          |
//! | `/users/:id\|[0-9]+` | `/users/42`, not `/users/bob`   | `id`          |
//! | `/static/...`        | `/static/`, `/static/css/a.css` | nothing       |
//!
//! A constraint must match the whole segment.
//!
//! ## Middleware
//!
//! ```
//! use oxide_mux::{middleware, Mux};
//!
//! let mut mux = Mux::new();
//! mux.middleware(middleware::trace_requests())
//!     .middleware(middleware::set_header("X-Frame-Options", "DENY"));
//! ```
//!
//! The first middleware added runs outermost. Not-found, method-not-allowed
//! and options responses pass through the chain too.

mod config;
mod error;
pub mod middleware;
mod path;
mod request;
mod response;
mod router;

pub use config::MuxConfig;
pub use error::{MuxError, Result};
pub use middleware::{handler_fn, middleware_fn, wrap, Handler, Middleware};
pub use path::{split_path, Pattern, Segment, CONSTRAINT_DELIMITER, PARAM_SIGIL, WILDCARD};
pub use request::{Method, Params, Request};
pub use response::Response;
pub use router::{AllowSet, Mux, Outcome, Route, ALLOW_HEADER};
