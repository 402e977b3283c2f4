//! Pattern compiler: AST plus requirements → one matchable regex.
//!
//! Each route compiles to a single anchored regex with one named capture
//! per segment key, so the regex engine's leftmost-first semantics give
//! the ordered-choice-with-backtracking behavior matching needs across
//! optional groups. Capture order equals segment key order, which is the
//! same order generation walks.
//!
//! All validation happens here, at registration time: a route that
//! compiles never fails structurally at request time.

use crate::ast::{Leaf, PatternNode};
use crate::errors::{Result, RoutingError};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// Default constraint for a named segment: anything up to the next `/`.
const DEFAULT_SEGMENT: &str = "[^/]+";
/// Narrowed constraint used when the segment is immediately followed by
/// a literal dot, so `/posts/:id.:format` splits at the right place.
const DOT_NARROWED_SEGMENT: &str = "[^/.]+";
/// A glob segment captures the nonempty remainder, separators included.
const STAR_SEGMENT: &str = ".+";

/// Upper bound on pattern source length; longer patterns are rejected
/// rather than compiled into pathological regexes.
const MAX_PATTERN_LENGTH: usize = 1024;
/// Compiled-regex size cap handed to [`RegexBuilder::size_limit`].
const MAX_REGEX_SIZE: usize = 1 << 20;

/// A per-segment requirement: either a regex the bound value must match
/// in full, or a literal value it must equal exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
	/// Regex source, unanchored; the compiler anchors it itself.
	Pattern(String),
	/// Exact required value.
	Equals(String),
}

impl Requirement {
	fn source(&self) -> String {
		match self {
			Requirement::Pattern(src) => src.clone(),
			Requirement::Equals(value) => regex::escape(value),
		}
	}
}

/// The matchable form of one route pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	regex: Regex,
	keys: Vec<String>,
	required_keys: Vec<String>,
	/// Anchored requirement checkers, reused by the generator to verify
	/// supplied values before emitting them.
	requirement_checks: HashMap<String, Regex>,
}

impl CompiledPattern {
	/// Compile `ast` (parsed from `pattern`) under `requirements`.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::InvalidRouteDefinition`] when:
	/// - the pattern exceeds the length bound,
	/// - the same segment key appears twice,
	/// - a requirement names a key absent from the pattern,
	/// - a requirement regex is anchored (`^`, `$`, `\A`, `\z`) or does
	///   not compile (unterminated character classes land here),
	/// - the assembled route regex exceeds the size cap.
	pub fn compile(
		pattern: &str,
		ast: &PatternNode,
		requirements: &HashMap<String, Requirement>,
	) -> Result<CompiledPattern> {
		let invalid = |reason: String| RoutingError::InvalidRouteDefinition {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"pattern length {} exceeds the {} byte limit",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let keys: Vec<String> = ast.keys().into_iter().map(str::to_string).collect();
		let mut seen = HashSet::new();
		for key in &keys {
			if !seen.insert(key.as_str()) {
				return Err(invalid(format!("segment key `{}` appears twice", key)));
			}
		}

		for (key, requirement) in requirements {
			if !seen.contains(key.as_str()) {
				return Err(invalid(format!(
					"requirement references key `{}` which does not appear in the pattern",
					key
				)));
			}
			if let Requirement::Pattern(src) = requirement {
				validate_requirement_anchoring(key, src).map_err(&invalid)?;
			}
		}

		let narrowed = dot_narrowed_keys(ast);
		let mut source = String::from("^");
		build_regex(ast, requirements, &narrowed, &mut source);
		source.push('$');

		let regex = RegexBuilder::new(&source)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| invalid(format!("pattern does not compile: {}", e)))?;

		let mut requirement_checks = HashMap::new();
		for (key, requirement) in requirements {
			let check = RegexBuilder::new(&format!("^(?:{})$", requirement.source()))
				.size_limit(MAX_REGEX_SIZE)
				.build()
				.map_err(|e| {
					invalid(format!("requirement for `{}` does not compile: {}", key, e))
				})?;
			requirement_checks.insert(key.clone(), check);
		}

		let required_keys = ast
			.leaves()
			.into_iter()
			.filter_map(|(leaf, depth)| match leaf {
				Leaf::Symbol(name) | Leaf::Star(name) if depth == 0 => {
					Some(name.to_string())
				}
				_ => None,
			})
			.collect();

		Ok(CompiledPattern {
			regex,
			keys,
			required_keys,
			requirement_checks,
		})
	}

	/// Attempt a structural match, returning bound `(key, value)` pairs
	/// in segment key order. Keys inside unmatched optional groups are
	/// omitted, never bound to empty strings. Values are returned raw;
	/// percent-decoding is the recognizer's job.
	pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
		let caps = self.regex.captures(path)?;
		Some(
			self.keys
				.iter()
				.filter_map(|key| {
					caps.name(key)
						.map(|m| (key.clone(), m.as_str().to_string()))
				})
				.collect(),
		)
	}

	/// Segment keys in declaration order.
	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	/// Keys outside any optional group; generation must fill these.
	pub fn required_keys(&self) -> &[String] {
		&self.required_keys
	}

	/// The anchored checker for `key`'s requirement, if one was given.
	pub fn requirement_check(&self, key: &str) -> Option<&Regex> {
		self.requirement_checks.get(key)
	}
}

/// Requirement regexes must arrive unanchored; the compiler adds its own
/// anchors, and user anchors would silently break the assembled route
/// regex instead.
fn validate_requirement_anchoring(
	key: &str,
	source: &str,
) -> std::result::Result<(), String> {
	let improperly_anchored = source.starts_with('^')
		|| source.starts_with(r"\A")
		|| (source.ends_with('$') && !source.ends_with(r"\$"))
		|| source.ends_with(r"\z")
		|| source.ends_with(r"\Z");
	if improperly_anchored {
		Err(format!(
			"requirement for `{}` must not carry its own anchors",
			key
		))
	} else {
		Ok(())
	}
}

/// Names of symbols whose next leaf is a literal starting with `.`;
/// those get the dot-narrowed default constraint.
fn dot_narrowed_keys(ast: &PatternNode) -> HashSet<String> {
	let leaves = ast.leaves();
	let mut narrowed = HashSet::new();
	for window in leaves.windows(2) {
		if let [(Leaf::Symbol(name), _), (Leaf::Literal(text), _)] = window
			&& text.starts_with('.')
		{
			narrowed.insert((*name).to_string());
		}
	}
	narrowed
}

fn build_regex(
	node: &PatternNode,
	requirements: &HashMap<String, Requirement>,
	narrowed: &HashSet<String>,
	out: &mut String,
) {
	match node {
		PatternNode::Literal(text) => out.push_str(&regex::escape(text)),
		PatternNode::Symbol { name } => {
			let constraint = match requirements.get(name) {
				Some(requirement) => requirement.source(),
				None if narrowed.contains(name) => DOT_NARROWED_SEGMENT.to_string(),
				None => DEFAULT_SEGMENT.to_string(),
			};
			out.push_str("(?P<");
			out.push_str(name);
			out.push('>');
			out.push_str(&constraint);
			out.push(')');
		}
		PatternNode::Star { name } => {
			let constraint = match requirements.get(name) {
				Some(requirement) => requirement.source(),
				None => STAR_SEGMENT.to_string(),
			};
			out.push_str("(?P<");
			out.push_str(name);
			out.push('>');
			out.push_str(&constraint);
			out.push(')');
		}
		PatternNode::Group(child) => {
			out.push_str("(?:");
			build_regex(child, requirements, narrowed, out);
			out.push_str(")?");
		}
		PatternNode::Cat { left, right } => {
			build_regex(left, requirements, narrowed, out);
			build_regex(right, requirements, narrowed, out);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse;

	fn compile(pattern: &str) -> CompiledPattern {
		let ast = parse(pattern).unwrap();
		CompiledPattern::compile(pattern, &ast, &HashMap::new()).unwrap()
	}

	fn compile_with(
		pattern: &str,
		requirements: HashMap<String, Requirement>,
	) -> Result<CompiledPattern> {
		let ast = parse(pattern).unwrap();
		CompiledPattern::compile(pattern, &ast, &requirements)
	}

	#[test]
	fn test_static_pattern_matches_exactly() {
		let compiled = compile("/posts/new");
		assert!(compiled.captures("/posts/new").is_some());
		assert!(compiled.captures("/posts/old").is_none());
		assert!(compiled.captures("/posts/newer").is_none());
		// Matching is case-sensitive.
		assert!(compiled.captures("/Posts/new").is_none());
	}

	#[test]
	fn test_symbol_binds_segment() {
		let compiled = compile("/posts/:id");
		let bound = compiled.captures("/posts/42").unwrap();
		assert_eq!(bound, vec![("id".to_string(), "42".to_string())]);
		assert!(compiled.captures("/posts/42/edit").is_none());
	}

	#[test]
	fn test_dot_narrowing_splits_id_and_format() {
		let compiled = compile("/posts/:id.:format");
		let bound = compiled.captures("/posts/42.json").unwrap();
		assert_eq!(bound[0], ("id".to_string(), "42".to_string()));
		assert_eq!(bound[1], ("format".to_string(), "json".to_string()));
	}

	#[test]
	fn test_optional_group_omits_unbound_key() {
		let compiled = compile("/posts/:id(.:format)");
		let bound = compiled.captures("/posts/42").unwrap();
		assert_eq!(bound.len(), 1, "format must be omitted, not empty");

		let bound = compiled.captures("/posts/42.json").unwrap();
		assert_eq!(bound.len(), 2);
	}

	#[test]
	fn test_star_captures_across_separators() {
		let compiled = compile("/files/*path");
		let bound = compiled.captures("/files/a/b/c.txt").unwrap();
		assert_eq!(bound, vec![("path".to_string(), "a/b/c.txt".to_string())]);
		// Empty remainder is not a match.
		assert!(compiled.captures("/files/").is_none());
	}

	#[test]
	fn test_required_keys_exclude_grouped_keys() {
		let compiled = compile("/posts/:id(.:format)");
		assert_eq!(compiled.required_keys(), ["id".to_string()]);
		assert_eq!(
			compiled.keys(),
			["id".to_string(), "format".to_string()]
		);
	}

	#[test]
	fn test_requirement_constrains_match() {
		let mut requirements = HashMap::new();
		requirements.insert("id".to_string(), Requirement::Pattern(r"\d+".to_string()));
		let compiled = compile_with("/users/:id", requirements).unwrap();
		assert!(compiled.captures("/users/42").is_some());
		assert!(compiled.captures("/users/abc").is_none());
	}

	#[test]
	fn test_literal_requirement_requires_exact_value() {
		let mut requirements = HashMap::new();
		requirements.insert(
			"kind".to_string(),
			Requirement::Equals("audio".to_string()),
		);
		let compiled = compile_with("/media/:kind", requirements).unwrap();
		assert!(compiled.captures("/media/audio").is_some());
		assert!(compiled.captures("/media/video").is_none());
	}

	#[test]
	fn test_rejects_requirement_for_unknown_key() {
		let mut requirements = HashMap::new();
		requirements.insert("id".to_string(), Requirement::Pattern(r"\d+".to_string()));
		let err = compile_with("/posts/new", requirements).unwrap_err();
		assert!(matches!(err, RoutingError::InvalidRouteDefinition { .. }));
	}

	#[test]
	fn test_rejects_anchored_requirement() {
		let mut requirements = HashMap::new();
		requirements.insert(
			"id".to_string(),
			Requirement::Pattern(r"^\d+$".to_string()),
		);
		let err = compile_with("/posts/:id", requirements).unwrap_err();
		match err {
			RoutingError::InvalidRouteDefinition { reason, .. } => {
				assert!(reason.contains("anchors"), "reason: {}", reason);
			}
			other => panic!("unexpected error {:?}", other),
		}
	}

	#[test]
	fn test_rejects_unterminated_character_class() {
		let mut requirements = HashMap::new();
		requirements.insert(
			"id".to_string(),
			Requirement::Pattern(r"[0-9".to_string()),
		);
		let err = compile_with("/posts/:id", requirements).unwrap_err();
		assert!(matches!(err, RoutingError::InvalidRouteDefinition { .. }));
	}

	#[test]
	fn test_rejects_duplicate_segment_keys() {
		let ast = parse("/x/:id/:id").unwrap();
		let err =
			CompiledPattern::compile("/x/:id/:id", &ast, &HashMap::new()).unwrap_err();
		assert!(matches!(err, RoutingError::InvalidRouteDefinition { .. }));
	}

	#[test]
	fn test_sibling_optional_groups_match_independently() {
		let compiled = compile("/a(/:b)(/:c)");
		// Both absent.
		assert_eq!(compiled.captures("/a").unwrap().len(), 0);
		// Greedy preference binds the first group first.
		let bound = compiled.captures("/a/x").unwrap();
		assert_eq!(bound, vec![("b".to_string(), "x".to_string())]);
		let bound = compiled.captures("/a/x/y").unwrap();
		assert_eq!(bound.len(), 2);
	}
}
