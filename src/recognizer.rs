//! Request recognition: method + path → bound parameters + endpoint.
//!
//! Routes are tried in declaration order and the first structural match
//! wins; applications declare most-specific routes first and rely on
//! that. Matching never mutates the table, so recognition is idempotent
//! and safe to run concurrently against a shared table.

use crate::endpoint::Endpoint;
use crate::errors::{Result, RoutingError};
use crate::route::Route;
use crate::table::RouteTable;
use http::Method;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// The outcome of a successful recognition. Ephemeral — produced per
/// request and handed straight to dispatch.
#[derive(Clone)]
pub struct MatchResult {
	/// Bound segment values (percent-decoded) merged with the route's
	/// defaults; defaults never override a bound value.
	pub params: HashMap<String, String>,
	/// The matched route's endpoint.
	pub endpoint: Arc<dyn Endpoint>,
	/// Name of the matched route, when it has one.
	pub route_name: Option<String>,
	/// Pattern source of the matched route.
	pub route_pattern: String,
}

impl std::fmt::Debug for MatchResult {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MatchResult")
			.field("params", &self.params)
			.field("route_name", &self.route_name)
			.field("route_pattern", &self.route_pattern)
			.finish_non_exhaustive()
	}
}

/// Recognize `method` + `path` against `table`.
///
/// # Errors
///
/// - [`RoutingError::UnknownHttpMethod`] when `method` is not an
///   uppercase HTTP verb token (a client error, not a routing bug).
/// - [`RoutingError::NoRouteMatched`] when every candidate fails; the
///   caller decides between a 404 and cascading onwards.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use waypoint::endpoint::{Endpoint, EndpointResponse, RouteRequest};
/// use waypoint::recognizer::recognize;
/// use waypoint::route::RouteDefinition;
/// use waypoint::table::RouteTable;
///
/// # use async_trait::async_trait;
/// # struct Stub;
/// # #[async_trait]
/// # impl Endpoint for Stub {
/// #     async fn call(&self, _request: RouteRequest) -> EndpointResponse {
/// #         EndpointResponse::ok()
/// #     }
/// # }
/// let table = RouteTable::build(
///     vec![RouteDefinition::new("/posts/:id", Arc::new(Stub)).with_name("post")],
///     None,
/// )
/// .unwrap();
///
/// let result = recognize(&table, "GET", "/posts/42").unwrap();
/// assert_eq!(result.params.get("id").map(String::as_str), Some("42"));
/// assert_eq!(result.route_name.as_deref(), Some("post"));
/// ```
pub fn recognize(table: &RouteTable, method: &str, path: &str) -> Result<MatchResult> {
	let method = parse_method_token(method)?;
	let path = normalize_path(path);

	for route in table.candidates(&path) {
		if !route.verb().permits(&method) {
			trace!(pattern = route.pattern(), %method, "verb constraint excludes route");
			continue;
		}

		let Some(bound) = route.compiled().captures(&path) else {
			continue;
		};

		let mut params: HashMap<String, String> = bound
			.into_iter()
			.map(|(key, value)| (key, decode_segment(&value)))
			.collect();

		if !format_permitted(table, route, &params) {
			trace!(pattern = route.pattern(), "format not in registry, falling through");
			continue;
		}

		for (key, value) in route.defaults() {
			params
				.entry(key.clone())
				.or_insert_with(|| value.clone());
		}

		debug!(pattern = route.pattern(), %method, %path, "route matched");
		return Ok(MatchResult {
			params,
			endpoint: route.endpoint(),
			route_name: route.name().map(str::to_string),
			route_pattern: route.pattern().to_string(),
		});
	}

	Err(RoutingError::NoRouteMatched {
		method: method.to_string(),
		path,
	})
}

/// Validate and parse the inbound method token. Tokens must already be
/// uppercase HTTP verb tokens; anything else is a client error.
pub(crate) fn parse_method_token(token: &str) -> Result<Method> {
	let well_formed =
		!token.is_empty() && token.chars().all(|c| c.is_ascii_uppercase() || c == '-');
	if !well_formed {
		return Err(RoutingError::UnknownHttpMethod {
			token: token.to_string(),
		});
	}
	Method::from_bytes(token.as_bytes()).map_err(|_| RoutingError::UnknownHttpMethod {
		token: token.to_string(),
	})
}

/// Collapse duplicate separators and force a leading slash. Trailing
/// slashes are preserved — patterns decide their own trailing-slash
/// policy.
pub(crate) fn normalize_path(path: &str) -> String {
	let mut normalized = String::with_capacity(path.len() + 1);
	if !path.starts_with('/') {
		normalized.push('/');
	}
	let mut last_was_slash = false;
	for ch in path.chars() {
		if ch == '/' {
			if last_was_slash {
				continue;
			}
			last_was_slash = true;
		} else {
			last_was_slash = false;
		}
		normalized.push(ch);
	}
	normalized
}

/// Percent-decode one bound segment value. Decoding happens after the
/// structural match so encoded separators cannot change what matched.
fn decode_segment(value: &str) -> String {
	percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// When a registry is installed and the route does not constrain
/// `format` itself, the bound extension must be known.
fn format_permitted(table: &RouteTable, route: &Route, params: &HashMap<String, String>) -> bool {
	let Some(registry) = table.format_registry() else {
		return true;
	};
	if route.has_format_requirement() {
		return true;
	}
	match params.get("format") {
		Some(extension) => registry.contains(extension),
		None => true,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_path_collapses_separators() {
		assert_eq!(normalize_path("//posts///42"), "/posts/42");
		assert_eq!(normalize_path("posts/42"), "/posts/42");
		assert_eq!(normalize_path("/posts/42/"), "/posts/42/");
		assert_eq!(normalize_path(""), "/");
	}

	#[test]
	fn test_method_token_validation() {
		assert!(parse_method_token("GET").is_ok());
		assert!(parse_method_token("DELETE").is_ok());
		assert!(matches!(
			parse_method_token("get"),
			Err(RoutingError::UnknownHttpMethod { .. })
		));
		assert!(matches!(
			parse_method_token(""),
			Err(RoutingError::UnknownHttpMethod { .. })
		));
		assert!(matches!(
			parse_method_token("G E T"),
			Err(RoutingError::UnknownHttpMethod { .. })
		));
	}

	#[test]
	fn test_decode_segment_handles_encoded_values() {
		assert_eq!(decode_segment("a%20b"), "a b");
		assert_eq!(decode_segment("plain"), "plain");
	}
}
