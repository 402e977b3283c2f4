//! # Waypoint
//!
//! A URL routing engine: declarative route patterns are compiled into
//! matchable structures, incoming method/path pairs are recognized
//! against them, and named routes are reversed back into literal paths
//! — the inverse operation, including "recall" of parameters from the
//! current request.
//!
//! Patterns combine static segments, named dynamic segments, optional
//! groups and a tail glob:
//!
//! - `/posts/new` — static, matched exactly
//! - `/posts/:id` — `:id` binds one path segment
//! - `/posts/:id(.:format)` — optional format suffix, elided from
//!   generated paths while it equals the route's default
//! - `/files/*path` — `*path` greedily captures the remainder,
//!   separators included
//!
//! Routes match in declaration order — first declared, first matched —
//! and per-segment requirements (regexes or literal values) are
//! enforced identically during matching and generation.
//!
//! # Examples
//!
//! ## Recognition
//!
//! ```
//! use std::sync::Arc;
//! use waypoint::{RouteDefinition, RouteSet, RouteSetBuilder};
//! # use async_trait::async_trait;
//! # use waypoint::endpoint::{Endpoint, EndpointResponse, RouteRequest};
//! # struct Stub;
//! # #[async_trait]
//! # impl Endpoint for Stub {
//! #     async fn call(&self, _request: RouteRequest) -> EndpointResponse {
//! #         EndpointResponse::ok()
//! #     }
//! # }
//!
//! let table = RouteSetBuilder::new()
//!     .route(RouteDefinition::new("/posts/new", Arc::new(Stub)).with_name("new_post"))
//!     .route(RouteDefinition::new("/posts/:id", Arc::new(Stub)).with_name("post"))
//!     .build()
//!     .unwrap();
//! let routes = RouteSet::new(table);
//!
//! // Declaration order wins: /posts/new never binds id="new".
//! let matched = routes.recognize_path("GET", "/posts/new").unwrap();
//! assert_eq!(matched.route_name.as_deref(), Some("new_post"));
//! ```
//!
//! ## Generation
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use waypoint::{RouteDefinition, RouteSet, RouteSetBuilder};
//! # use async_trait::async_trait;
//! # use waypoint::endpoint::{Endpoint, EndpointResponse, RouteRequest};
//! # struct Stub;
//! # #[async_trait]
//! # impl Endpoint for Stub {
//! #     async fn call(&self, _request: RouteRequest) -> EndpointResponse {
//! #         EndpointResponse::ok()
//! #     }
//! # }
//!
//! let table = RouteSetBuilder::new()
//!     .route(
//!         RouteDefinition::new("/posts/:id(.:format)", Arc::new(Stub))
//!             .with_name("post")
//!             .with_default("format", "html"),
//!     )
//!     .build()
//!     .unwrap();
//! let routes = RouteSet::new(table);
//!
//! let mut params = HashMap::new();
//! params.insert("id".to_string(), "5".to_string());
//! assert_eq!(
//!     routes.path_for(Some("post"), &params, &HashMap::new()).unwrap(),
//!     "/posts/5"
//! );
//!
//! params.insert("format".to_string(), "json".to_string());
//! assert_eq!(
//!     routes.path_for(Some("post"), &params, &HashMap::new()).unwrap(),
//!     "/posts/5.json"
//! );
//! ```
//!
//! Tables are built once and shared read-only; a configuration reload
//! builds a fresh table and publishes it atomically through
//! [`RouteSet::install`].

pub mod ast;
pub mod compiler;
pub mod endpoint;
pub mod errors;
pub mod format;
pub mod generator;
pub mod parser;
pub mod recognizer;
pub mod route;
pub mod route_set;
pub mod table;

pub use ast::PatternNode;
pub use compiler::{CompiledPattern, Requirement};
pub use endpoint::{Endpoint, EndpointResponse, RouteRequest};
pub use errors::{Result, RoutingError};
pub use format::{FormatRegistry, KnownFormat};
pub use generator::{GeneratedPath, generate};
pub use parser::parse;
pub use recognizer::{MatchResult, recognize};
pub use route::{Route, RouteDefinition, VerbConstraint};
pub use route_set::{MountPosition, RouteSet, RouteSetBuilder};
pub use table::RouteTable;
