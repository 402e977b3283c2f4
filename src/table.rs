//! The ordered collection of compiled routes.
//!
//! A table is built once from an ordered list of definitions and is
//! read-only afterwards; reloads build a fresh table and publish it
//! atomically through the route set. Registration order is preserved
//! exactly — precedence is "first declared, first matched".

use crate::ast::{Leaf, PatternNode};
use crate::errors::{Result, RoutingError};
use crate::format::FormatRegistry;
use crate::route::{Route, RouteDefinition};
use std::collections::HashMap;
use tracing::debug;

/// An immutable, matchable set of routes.
#[derive(Debug)]
pub struct RouteTable {
	routes: Vec<Route>,
	by_name: HashMap<String, usize>,
	/// Coarse prune index: first literal path segment → route indices.
	static_heads: HashMap<String, Vec<usize>>,
	/// Routes whose first segment is dynamic; always candidates.
	dynamic_heads: Vec<usize>,
	format_registry: Option<FormatRegistry>,
}

impl RouteTable {
	/// Compile `definitions` in order into a table.
	///
	/// # Errors
	///
	/// Any parse or compile failure aborts the whole build (bad routes
	/// are never silently skipped). A duplicate non-blank name fails
	/// with [`RoutingError::DuplicateRouteName`] naming the conflict.
	pub fn build(
		definitions: Vec<RouteDefinition>,
		format_registry: Option<FormatRegistry>,
	) -> Result<RouteTable> {
		let mut routes = Vec::with_capacity(definitions.len());
		let mut by_name = HashMap::new();
		let mut static_heads: HashMap<String, Vec<usize>> = HashMap::new();
		let mut dynamic_heads = Vec::new();

		for (precedence, definition) in definitions.into_iter().enumerate() {
			let route = definition.compile(precedence)?;

			if let Some(name) = route.name() {
				if !name.is_empty() && by_name.contains_key(name) {
					return Err(RoutingError::DuplicateRouteName {
						name: name.to_string(),
					});
				}
				if !name.is_empty() {
					by_name.insert(name.to_string(), precedence);
				}
			}

			match first_literal_segment(route.ast()) {
				Some(head) => static_heads.entry(head).or_default().push(precedence),
				None => dynamic_heads.push(precedence),
			}

			debug!(
				pattern = route.pattern(),
				name = route.name().unwrap_or(""),
				precedence,
				"registered route"
			);
			routes.push(route);
		}

		Ok(RouteTable {
			routes,
			by_name,
			static_heads,
			dynamic_heads,
			format_registry,
		})
	}

	/// All routes in precedence order.
	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// Number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// O(1) lookup of a named route.
	pub fn route_named(&self, name: &str) -> Option<&Route> {
		self.by_name.get(name).map(|&index| &self.routes[index])
	}

	/// The injected format lookup, if one was installed.
	pub fn format_registry(&self) -> Option<&FormatRegistry> {
		self.format_registry.as_ref()
	}

	/// Candidate routes for a normalized path, in precedence order.
	/// Routes bucketed under a different first literal segment are
	/// pruned; the merge keeps declaration order intact.
	pub(crate) fn candidates<'a>(&'a self, path: &str) -> Vec<&'a Route> {
		let head = path
			.trim_start_matches('/')
			.split(['/', '.'])
			.next()
			.unwrap_or("");

		let static_bucket = self
			.static_heads
			.get(head)
			.map(Vec::as_slice)
			.unwrap_or(&[]);

		// Merge two index lists that are each ascending.
		let mut merged = Vec::with_capacity(static_bucket.len() + self.dynamic_heads.len());
		let (mut i, mut j) = (0, 0);
		while i < static_bucket.len() || j < self.dynamic_heads.len() {
			let take_static = match (static_bucket.get(i), self.dynamic_heads.get(j)) {
				(Some(&s), Some(&d)) => s < d,
				(Some(_), None) => true,
				_ => false,
			};
			if take_static {
				merged.push(&self.routes[static_bucket[i]]);
				i += 1;
			} else {
				merged.push(&self.routes[self.dynamic_heads[j]]);
				j += 1;
			}
		}
		merged
	}
}

/// The first path segment of the pattern when it is fully literal, e.g.
/// `posts` for `/posts/:id`. Patterns opening with a dynamic or optional
/// part get no bucket and are tried for every path.
fn first_literal_segment(ast: &PatternNode) -> Option<String> {
	let leaves = ast.leaves();
	let (first, depth) = leaves.first()?;
	if *depth != 0 {
		return None;
	}
	let Leaf::Literal(text) = first else {
		return None;
	};

	let trimmed = text.trim_start_matches('/');
	let head: String = trimmed
		.chars()
		.take_while(|&c| c != '/' && c != '.')
		.collect();
	if head.is_empty() {
		// Pattern starts with "/" followed by a dynamic segment.
		return None;
	}
	// The head is only a safe bucket when the literal closes the
	// segment itself (more of the literal follows, or the pattern ends
	// here with nothing appended by later leaves).
	let closes_segment = trimmed.len() > head.len() || leaves.len() == 1;
	if closes_segment { Some(head) } else { None }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::endpoint::{Endpoint, EndpointResponse, RouteRequest};
	use async_trait::async_trait;
	use std::sync::Arc;

	struct Stub;

	#[async_trait]
	impl Endpoint for Stub {
		async fn call(&self, _request: RouteRequest) -> EndpointResponse {
			EndpointResponse::ok()
		}
	}

	fn def(pattern: &str) -> RouteDefinition {
		RouteDefinition::new(pattern, Arc::new(Stub))
	}

	#[test]
	fn test_duplicate_names_are_rejected() {
		let err = RouteTable::build(
			vec![
				def("/posts").with_name("posts"),
				def("/articles").with_name("posts"),
			],
			None,
		)
		.unwrap_err();
		assert_eq!(
			err,
			RoutingError::DuplicateRouteName {
				name: "posts".to_string()
			}
		);
	}

	#[test]
	fn test_blank_names_may_repeat() {
		let table = RouteTable::build(
			vec![def("/a").with_name(""), def("/b").with_name("")],
			None,
		)
		.unwrap();
		assert_eq!(table.len(), 2);
	}

	#[test]
	fn test_named_lookup() {
		let table = RouteTable::build(
			vec![def("/posts/:id").with_name("post")],
			None,
		)
		.unwrap();
		assert!(table.route_named("post").is_some());
		assert!(table.route_named("missing").is_none());
	}

	#[test]
	fn test_candidates_prune_other_static_heads() {
		let table = RouteTable::build(
			vec![
				def("/posts/:id"),
				def("/users/:id"),
				def("/:controller/:action"),
			],
			None,
		)
		.unwrap();

		let candidates = table.candidates("/posts/7");
		let patterns: Vec<_> = candidates.iter().map(|r| r.pattern()).collect();
		assert_eq!(patterns, vec!["/posts/:id", "/:controller/:action"]);
	}

	#[test]
	fn test_candidates_preserve_declaration_order() {
		let table = RouteTable::build(
			vec![
				def("/:controller"),
				def("/posts/new"),
				def("/posts/:id"),
			],
			None,
		)
		.unwrap();

		let candidates = table.candidates("/posts/new");
		let patterns: Vec<_> = candidates.iter().map(|r| r.pattern()).collect();
		assert_eq!(patterns, vec!["/:controller", "/posts/new", "/posts/:id"]);
	}

	#[test]
	fn test_bad_route_aborts_build() {
		let err = RouteTable::build(vec![def("/ok"), def("/broken(")], None).unwrap_err();
		assert!(err.is_startup_error());
	}
}
