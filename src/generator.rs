//! Reverse URL generation: route + params + recall → literal path.
//!
//! Generation is the literal inverse of matching. It walks the same AST
//! the matcher compiled, so segment key order agrees in both directions.
//! Values come from the caller's params first, then from recall (the
//! current request's parameters) — but recall is cut off as soon as a
//! supplied value diverges from it on a higher-precedence key, so a new
//! `controller` is never silently mixed with a stale `action` or `id`.
//! An optional group is emitted only when some leaf inside it resolved
//! to a non-default value; a default-valued trailing suffix is elided.

use crate::ast::PatternNode;
use crate::errors::{Result, RoutingError};
use crate::route::Route;
use crate::table::RouteTable;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Characters escaped inside one path segment.
const SEGMENT_SET: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}')
	.add(b'%')
	.add(b'/');

/// Star values keep their separators; everything else escapes as above.
const STAR_SET: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}')
	.add(b'%');

/// A generated path plus the supplied params that did not become path
/// segments — candidates for a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPath {
	/// The literal path.
	pub path: String,
	/// Leftover params, sorted by key for deterministic output.
	pub query: Vec<(String, String)>,
}

impl GeneratedPath {
	/// Render `path?query`, omitting the `?` when nothing is left over.
	pub fn into_path_and_query(self) -> String {
		if self.query.is_empty() {
			return self.path;
		}
		match serde_urlencoded::to_string(&self.query) {
			Ok(query) if !query.is_empty() => format!("{}?{}", self.path, query),
			_ => self.path,
		}
	}
}

/// Generate a path from a named route, or from the best route the
/// parameter set can satisfy when `name` is `None`.
///
/// # Errors
///
/// - [`RoutingError::UnknownRouteName`] for an unregistered name.
/// - [`RoutingError::MissingGenerationKeys`] when required segments
///   stay unfilled after params, recall and defaults; the error lists
///   every missing key.
/// - [`RoutingError::GenerationFailed`] when a supplied value violates
///   the segment's requirement, or no route satisfies the params.
pub fn generate(
	table: &RouteTable,
	name: Option<&str>,
	params: &HashMap<String, String>,
	recall: &HashMap<String, String>,
) -> Result<GeneratedPath> {
	match name {
		Some(name) => {
			let route = table
				.route_named(name)
				.ok_or_else(|| RoutingError::UnknownRouteName {
					name: name.to_string(),
				})?;
			let generated = try_generate(route, params, recall, false)?;
			debug!(route = name, path = generated.path.as_str(), "generated path");
			Ok(generated)
		}
		None => generate_nameless(table, params, recall),
	}
}

/// Walk the whole table in precedence order and keep the tightest
/// success: fewest leftover params, declaration order on ties.
fn generate_nameless(
	table: &RouteTable,
	params: &HashMap<String, String>,
	recall: &HashMap<String, String>,
) -> Result<GeneratedPath> {
	let mut best: Option<(usize, GeneratedPath)> = None;
	let mut best_failure: Option<RoutingError> = None;

	for route in table.routes() {
		match try_generate(route, params, recall, true) {
			Ok(generated) => {
				let extras = generated.query.len();
				if best.as_ref().is_none_or(|(b, _)| extras < *b) {
					best = Some((extras, generated));
				}
			}
			Err(failure) => {
				trace!(pattern = route.pattern(), %failure, "generation candidate rejected");
				keep_closest_failure(&mut best_failure, failure);
			}
		}
	}

	match best {
		Some((_, generated)) => {
			debug!(path = generated.path.as_str(), "generated path (nameless)");
			Ok(generated)
		}
		None => Err(best_failure.unwrap_or_else(|| RoutingError::GenerationFailed {
			route: "<nameless>".to_string(),
			reason: "no route satisfies the supplied parameters".to_string(),
		})),
	}
}

/// Prefer reporting the failure that got furthest: a missing-keys error
/// with the fewest keys beats any other, later errors never displace an
/// earlier equally-good one.
fn keep_closest_failure(best: &mut Option<RoutingError>, candidate: RoutingError) {
	let rank = |err: &RoutingError| match err {
		RoutingError::MissingGenerationKeys { missing, .. } => missing.len(),
		_ => usize::MAX,
	};
	if best.as_ref().is_none_or(|b| rank(&candidate) < rank(b)) {
		*best = Some(candidate);
	}
}

/// Attempt generation against one route.
fn try_generate(
	route: &Route,
	params: &HashMap<String, String>,
	recall: &HashMap<String, String>,
	check_discriminators: bool,
) -> Result<GeneratedPath> {
	let effective = effective_params(route, params, recall);

	// Nameless selection: a supplied value conflicting with one of the
	// route's fixed discriminator defaults rules the route out.
	if check_discriminators {
		for (key, fixed) in route.discriminator_defaults() {
			if let Some(value) = effective.get(key)
				&& value != fixed
			{
				return Err(RoutingError::GenerationFailed {
					route: route.label().to_string(),
					reason: format!(
						"param `{}`=`{}` conflicts with the route's fixed `{}`",
						key, value, fixed
					),
				});
			}
		}
	}

	let fragment = emit_node(route, route.ast(), &effective)?;
	if !fragment.missing.is_empty() {
		return Err(RoutingError::MissingGenerationKeys {
			route: route.label().to_string(),
			missing: fragment.missing,
		});
	}

	let mut query: Vec<(String, String)> = params
		.iter()
		.filter(|(key, value)| !consumed_by_route(route, key, value))
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect();
	query.sort();

	Ok(GeneratedPath {
		path: fragment.text,
		query,
	})
}

/// Merge params over recall with the divergence cutoff. Keys are walked
/// in precedence order: `controller`/`action`-style discriminators
/// first, then segment keys in pattern order. Once a supplied value
/// disagrees with recall, recall is abandoned for every later key.
fn effective_params(
	route: &Route,
	params: &HashMap<String, String>,
	recall: &HashMap<String, String>,
) -> HashMap<String, String> {
	let mut effective = HashMap::new();
	let mut diverged = false;

	for key in ordered_keys(route) {
		if let Some(value) = params.get(&key) {
			if recall.get(&key).is_some_and(|recalled| recalled != value) {
				diverged = true;
			}
			effective.insert(key, value.clone());
		} else if !diverged
			&& let Some(value) = recall.get(&key)
		{
			effective.insert(key, value.clone());
		}
	}
	effective
}

/// Key precedence for the recall cutoff: `controller`, then `action`,
/// then the remaining discriminators (sorted for determinism), then the
/// pattern's own segment keys in declaration order.
fn ordered_keys(route: &Route) -> Vec<String> {
	let discriminators: Vec<&String> = route.discriminator_defaults().map(|(key, _)| key).collect();
	let mut keys = Vec::new();
	for special in ["controller", "action"] {
		if discriminators.iter().any(|key| key.as_str() == special) {
			keys.push(special.to_string());
		}
	}
	let mut rest: Vec<String> = discriminators
		.iter()
		.filter(|key| key.as_str() != "controller" && key.as_str() != "action")
		.map(|key| key.to_string())
		.collect();
	rest.sort();
	keys.extend(rest);
	keys.extend(route.segment_keys().iter().cloned());
	keys
}

/// A param is consumed when it filled a path segment or restated one of
/// the route's fixed discriminator defaults; everything else is a
/// query-string candidate.
fn consumed_by_route(route: &Route, key: &str, value: &str) -> bool {
	if route.segment_keys().iter().any(|k| k == key) {
		return true;
	}
	route
		.discriminator_defaults()
		.any(|(k, fixed)| k == key && fixed == value)
}

/// One rendered subtree: its text, whether any leaf inside resolved to
/// a non-default value, and which required leaves stayed unfilled.
struct Fragment {
	text: String,
	non_default: bool,
	missing: Vec<String>,
}

fn emit_node(route: &Route, node: &PatternNode, effective: &HashMap<String, String>) -> Result<Fragment> {
	match node {
		PatternNode::Literal(text) => Ok(Fragment {
			text: text.clone(),
			non_default: false,
			missing: Vec::new(),
		}),
		PatternNode::Symbol { name } => emit_leaf(route, name, effective, SEGMENT_SET),
		PatternNode::Star { name } => emit_leaf(route, name, effective, STAR_SET),
		PatternNode::Group(child) => {
			let fragment = emit_node(route, child, effective)?;
			if !fragment.non_default {
				// Every leaf inside is default-valued or absent: elide.
				return Ok(Fragment {
					text: String::new(),
					non_default: false,
					missing: Vec::new(),
				});
			}
			// The group must render, so unfilled leaves inside it are
			// real failures now.
			Ok(fragment)
		}
		PatternNode::Cat { left, right } => {
			let mut fragment = emit_node(route, left, effective)?;
			let right = emit_node(route, right, effective)?;
			fragment.text.push_str(&right.text);
			fragment.non_default |= right.non_default;
			fragment.missing.extend(right.missing);
			Ok(fragment)
		}
	}
}

fn emit_leaf(
	route: &Route,
	name: &str,
	effective: &HashMap<String, String>,
	escape_set: &'static AsciiSet,
) -> Result<Fragment> {
	let default = route.defaults().get(name);

	if let Some(value) = effective.get(name) {
		if let Some(check) = route.compiled().requirement_check(name)
			&& !check.is_match(value)
		{
			return Err(RoutingError::GenerationFailed {
				route: route.label().to_string(),
				reason: format!("value `{}` for `{}` violates its requirement", value, name),
			});
		}
		return Ok(Fragment {
			text: utf8_percent_encode(value, escape_set).to_string(),
			non_default: default != Some(value),
			missing: Vec::new(),
		});
	}

	if let Some(value) = default {
		// Default-valued leaf: rendered if a sibling forces the group,
		// but never counts as content on its own.
		return Ok(Fragment {
			text: utf8_percent_encode(value, escape_set).to_string(),
			non_default: false,
			missing: Vec::new(),
		});
	}

	Ok(Fragment {
		text: String::new(),
		non_default: false,
		missing: vec![name.to_string()],
	})
}
