//! The external-facing registry: declare routes, build a table, match
//! and generate through it, and reload it atomically.
//!
//! A [`RouteSetBuilder`] accumulates definitions in declaration order
//! (mounting batches under prefixes, append or prepend) and builds one
//! immutable [`RouteTable`]. The [`RouteSet`] holds the current table
//! behind `RwLock<Arc<..>>`: readers grab a cheap snapshot, and a
//! configuration reload builds a whole new table and publishes it in
//! one swap — in-flight calls keep the table they started with and
//! never observe a half-rebuilt one.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use http::Method;
//! use waypoint::endpoint::{Endpoint, EndpointResponse, RouteRequest};
//! use waypoint::route::RouteDefinition;
//! use waypoint::route_set::{RouteSet, RouteSetBuilder};
//!
//! # use async_trait::async_trait;
//! # struct Stub;
//! # #[async_trait]
//! # impl Endpoint for Stub {
//! #     async fn call(&self, _request: RouteRequest) -> EndpointResponse {
//! #         EndpointResponse::ok()
//! #     }
//! # }
//! let table = RouteSetBuilder::new()
//!     .route(RouteDefinition::new("/posts/new", Arc::new(Stub)).with_name("new_post"))
//!     .route(
//!         RouteDefinition::new("/posts/:id", Arc::new(Stub))
//!             .with_name("post")
//!             .with_verb(Method::GET),
//!     )
//!     .build()
//!     .unwrap();
//! let routes = RouteSet::new(table);
//!
//! let matched = routes.recognize_path("GET", "/posts/new").unwrap();
//! assert_eq!(matched.route_name.as_deref(), Some("new_post"));
//!
//! let mut params = HashMap::new();
//! params.insert("id".to_string(), "42".to_string());
//! let path = routes.path_for(Some("post"), &params, &HashMap::new()).unwrap();
//! assert_eq!(path, "/posts/42");
//! ```

use crate::endpoint::{EndpointResponse, RouteRequest};
use crate::errors::Result;
use crate::format::FormatRegistry;
use crate::generator::{GeneratedPath, generate};
use crate::recognizer::{MatchResult, recognize};
use crate::route::RouteDefinition;
use crate::table::RouteTable;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Where a mounted batch lands relative to already-declared routes.
/// Relative order between sources is a configuration concern; the
/// builder preserves it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPosition {
	/// After everything declared so far (the common case).
	Append,
	/// Before everything declared so far, keeping the batch's own
	/// internal order.
	Prepend,
}

/// Ordered accumulation of route definitions.
#[derive(Default)]
pub struct RouteSetBuilder {
	definitions: Vec<RouteDefinition>,
	format_registry: Option<FormatRegistry>,
}

impl RouteSetBuilder {
	/// An empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare one route. Declaration order is precedence order.
	pub fn route(mut self, definition: RouteDefinition) -> Self {
		self.definitions.push(definition);
		self
	}

	/// Mount a batch of definitions under `prefix`.
	pub fn mount(
		mut self,
		prefix: &str,
		definitions: Vec<RouteDefinition>,
		position: MountPosition,
	) -> Self {
		let prefixed: Vec<RouteDefinition> = definitions
			.into_iter()
			.map(|definition| definition.prefixed(prefix))
			.collect();
		match position {
			MountPosition::Append => self.definitions.extend(prefixed),
			MountPosition::Prepend => {
				let mut combined = prefixed;
				combined.append(&mut self.definitions);
				self.definitions = combined;
			}
		}
		self
	}

	/// Install the injected format lookup used for `:format` segments.
	pub fn with_format_registry(mut self, registry: FormatRegistry) -> Self {
		self.format_registry = Some(registry);
		self
	}

	/// Compile everything into an immutable table. Fails fast on the
	/// first bad route; nothing is skipped silently.
	pub fn build(self) -> Result<RouteTable> {
		let table = RouteTable::build(self.definitions, self.format_registry)?;
		debug!(routes = table.len(), "route table built");
		Ok(table)
	}
}

/// The shared, reloadable façade over the current route table.
pub struct RouteSet {
	table: RwLock<Arc<RouteTable>>,
}

impl RouteSet {
	/// Wrap a freshly built table.
	pub fn new(table: RouteTable) -> Self {
		Self {
			table: RwLock::new(Arc::new(table)),
		}
	}

	/// A snapshot of the current table. Callers doing several related
	/// operations should take one snapshot and use it throughout.
	pub fn table(&self) -> Arc<RouteTable> {
		self.table.read().clone()
	}

	/// Atomically publish a rebuilt table. This is the reload path:
	/// build the new table first (it can fail without any impact on the
	/// live one), then swap.
	pub fn install(&self, table: RouteTable) {
		let table = Arc::new(table);
		let routes = table.len();
		*self.table.write() = table;
		debug!(routes, "route table swapped");
	}

	/// Recognize a request path. See [`recognize`].
	pub fn recognize_path(&self, method: &str, path: &str) -> Result<MatchResult> {
		recognize(&self.table(), method, path)
	}

	/// Generate a path (with any leftover params as a query string).
	pub fn path_for(
		&self,
		name: Option<&str>,
		params: &HashMap<String, String>,
		recall: &HashMap<String, String>,
	) -> Result<String> {
		Ok(self.generate(name, params, recall)?.into_path_and_query())
	}

	/// Generate a full URL by prefixing `base` (scheme/host/port come
	/// from the URL-construction collaborator; no defaulting here).
	pub fn url_for(
		&self,
		base: &str,
		name: Option<&str>,
		params: &HashMap<String, String>,
		recall: &HashMap<String, String>,
	) -> Result<String> {
		let path = self.path_for(name, params, recall)?;
		Ok(format!("{}{}", base.trim_end_matches('/'), path))
	}

	/// Generate without rendering the query string, for callers that
	/// want to inspect the leftovers.
	pub fn generate(
		&self,
		name: Option<&str>,
		params: &HashMap<String, String>,
		recall: &HashMap<String, String>,
	) -> Result<GeneratedPath> {
		generate(&self.table(), name, params, recall)
	}

	/// Recognize and invoke the matched endpoint, returning its
	/// status/headers/body triple untouched.
	pub async fn dispatch(&self, method: &str, path: &str) -> Result<EndpointResponse> {
		let parsed = crate::recognizer::parse_method_token(method)?;
		let matched = self.recognize_path(method, path)?;
		let request = RouteRequest {
			method: parsed,
			path: path.to_string(),
			params: matched.params,
		};
		Ok(matched.endpoint.call(request).await)
	}
}
