//! Recursive-descent parser for route patterns.
//!
//! Grammar (informal):
//!
//! ```text
//! pattern := term*
//! term    := literal-run | ':' identifier | '*' identifier | '(' pattern ')'
//! ```
//!
//! A literal run is a maximal sequence of characters that are not `:`,
//! `*`, `(` or `)`. Separator characters (`/`, `.`) stay inside literal
//! nodes — they drive segment-boundary detection when matching and join
//! segments when generating. Parentheses nest, so `/a(/:b)(/:c)` and
//! `/a(/:b(/:c))` are both valid.
//!
//! # Examples
//!
//! ```
//! use waypoint::parser::parse;
//!
//! let ast = parse("/posts/:id(.:format)").unwrap();
//! assert_eq!(ast.keys(), vec!["id", "format"]);
//! ```

use crate::ast::{Leaf, PatternNode};
use crate::errors::{Result, RoutingError};

/// Parse a route-pattern string into an AST.
///
/// # Errors
///
/// Returns [`RoutingError::MalformedPattern`] on:
/// - unmatched parentheses (either direction),
/// - an empty named segment (`:` or `*` with no identifier),
/// - an empty pattern or empty group,
/// - a star segment that is not in tail position.
pub fn parse(pattern: &str) -> Result<PatternNode> {
	let mut parser = Parser {
		pattern,
		chars: pattern.char_indices().peekable(),
	};
	let ast = parser.parse_sequence(0)?;
	// A stray ')' stops parse_sequence at depth 0 without consuming it.
	if let Some(&(at, _)) = parser.chars.peek() {
		return Err(parser.malformed(format!("unmatched `)` at byte {}", at)));
	}
	validate_star_tail(pattern, &ast)?;
	Ok(ast)
}

struct Parser<'a> {
	pattern: &'a str,
	chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
	fn malformed(&self, reason: String) -> RoutingError {
		RoutingError::MalformedPattern {
			pattern: self.pattern.to_string(),
			reason,
		}
	}

	/// Parse terms until end of input or, inside a group, the closing
	/// parenthesis (left unconsumed for the caller).
	fn parse_sequence(&mut self, depth: usize) -> Result<PatternNode> {
		let mut nodes = Vec::new();

		while let Some(&(at, ch)) = self.chars.peek() {
			match ch {
				')' => break,
				'(' => {
					self.chars.next();
					let child = self.parse_sequence(depth + 1)?;
					match self.chars.peek() {
						Some(&(_, ')')) => {
							self.chars.next();
						}
						_ => {
							return Err(
								self.malformed(format!("unmatched `(` at byte {}", at))
							);
						}
					}
					nodes.push(PatternNode::Group(Box::new(child)));
				}
				':' => {
					self.chars.next();
					let name = self.take_identifier();
					if name.is_empty() {
						return Err(self.malformed(format!(
							"empty segment name after `:` at byte {}",
							at
						)));
					}
					nodes.push(PatternNode::Symbol { name });
				}
				'*' => {
					self.chars.next();
					let name = self.take_identifier();
					if name.is_empty() {
						return Err(self.malformed(format!(
							"empty segment name after `*` at byte {}",
							at
						)));
					}
					nodes.push(PatternNode::Star { name });
				}
				_ => {
					nodes.push(PatternNode::Literal(self.take_literal_run()));
				}
			}
		}

		if nodes.is_empty() {
			let what = if depth == 0 { "pattern" } else { "group" };
			return Err(self.malformed(format!("empty {}", what)));
		}
		Ok(PatternNode::sequence(nodes))
	}

	/// Consume a maximal identifier: a leading ASCII letter or `_`,
	/// then letters, digits and `_`. The leading-letter rule keeps every
	/// segment name usable as a regex capture-group name downstream.
	fn take_identifier(&mut self) -> String {
		let mut ident = String::new();
		while let Some(&(_, ch)) = self.chars.peek() {
			let ok = if ident.is_empty() {
				ch.is_ascii_alphabetic() || ch == '_'
			} else {
				ch.is_ascii_alphanumeric() || ch == '_'
			};
			if ok {
				ident.push(ch);
				self.chars.next();
			} else {
				break;
			}
		}
		ident
	}

	/// Consume a maximal run of characters outside the meta set.
	fn take_literal_run(&mut self) -> String {
		let mut run = String::new();
		while let Some(&(_, ch)) = self.chars.peek() {
			if matches!(ch, ':' | '*' | '(' | ')') {
				break;
			}
			run.push(ch);
			self.chars.next();
		}
		run
	}
}

/// A star segment must be the final leaf of the whole pattern; anything
/// after it could never be reached by the glob's greedy capture.
fn validate_star_tail(pattern: &str, ast: &PatternNode) -> Result<()> {
	let leaves = ast.leaves();
	for (i, (leaf, _)) in leaves.iter().enumerate() {
		if let Leaf::Star(name) = leaf
			&& i + 1 != leaves.len()
		{
			return Err(RoutingError::MalformedPattern {
				pattern: pattern.to_string(),
				reason: format!("star segment `*{}` must be in tail position", name),
			});
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::PatternNode;
	use rstest::rstest;

	#[test]
	fn test_parses_static_pattern() {
		let ast = parse("/posts/new").unwrap();
		assert_eq!(ast, PatternNode::Literal("/posts/new".to_string()));
	}

	#[test]
	fn test_parses_symbol_and_optional_format() {
		let ast = parse("/posts/:id(.:format)").unwrap();
		assert_eq!(ast.keys(), vec!["id", "format"]);
		// The optional suffix must sit inside a Group node.
		let leaves = ast.leaves();
		assert_eq!(leaves.len(), 4);
		assert_eq!(leaves[3].1, 1, "format leaf should be one group deep");
	}

	#[test]
	fn test_parses_nested_groups() {
		let ast = parse("/a(/:b(/:c))").unwrap();
		assert_eq!(ast.keys(), vec!["b", "c"]);
		let leaves = ast.leaves();
		// c sits two groups deep, b one.
		assert_eq!(leaves.last().unwrap().1, 2);
	}

	#[test]
	fn test_parses_sibling_groups() {
		let ast = parse("/a(/:b)(/:c)").unwrap();
		assert_eq!(ast.keys(), vec!["b", "c"]);
	}

	#[test]
	fn test_parses_star_in_tail() {
		let ast = parse("/files/*path").unwrap();
		assert_eq!(ast.keys(), vec!["path"]);
		assert!(ast.has_star());
	}

	#[test]
	fn test_separators_stay_literal() {
		let ast = parse("/posts/:id.:format").unwrap();
		let leaves = ast.leaves();
		assert_eq!(
			leaves[2].0,
			crate::ast::Leaf::Literal("."),
			"the dot between segments must be preserved"
		);
	}

	#[rstest]
	#[case("/posts/(")]
	#[case("/posts/)")]
	#[case("/a(/:b")]
	#[case("/posts/:")]
	#[case("/posts/:/edit")]
	#[case("/files/*")]
	#[case("")]
	#[case("/a()")]
	fn test_rejects_malformed_patterns(#[case] pattern: &str) {
		let err = parse(pattern).unwrap_err();
		assert!(
			matches!(err, RoutingError::MalformedPattern { .. }),
			"expected MalformedPattern for {:?}, got {:?}",
			pattern,
			err
		);
	}

	#[rstest]
	#[case("/files/*path/edit")]
	#[case("/files/*path(.:format)")]
	#[case("/files/*path/:id")]
	fn test_rejects_star_outside_tail(#[case] pattern: &str) {
		let err = parse(pattern).unwrap_err();
		match err {
			RoutingError::MalformedPattern { reason, .. } => {
				assert!(reason.contains("tail position"), "reason: {}", reason);
			}
			other => panic!("expected MalformedPattern, got {:?}", other),
		}
	}

	#[test]
	fn test_identifier_stops_at_non_word_chars() {
		let ast = parse("/u/:name-x").unwrap();
		assert_eq!(ast.keys(), vec!["name"]);
		let leaves = ast.leaves();
		assert_eq!(leaves.last().unwrap().0, crate::ast::Leaf::Literal("-x"));
	}
}
