//! Abstract syntax tree for route patterns.
//!
//! A parsed pattern is a binary tree of [`PatternNode`]s. The in-order
//! traversal of `Symbol` and `Star` leaves, left to right, defines the
//! segment key order; matching and generation both walk the same tree so
//! they agree on that order by construction.

/// One node of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
	/// A fixed run of characters, including separator characters
	/// (`/`, `.`), which participate in both matching and generation.
	Literal(String),
	/// A named dynamic segment (`:id`). Its constraint defaults to
	/// "one or more non-separator characters" and may be overridden by
	/// a per-route requirement at compile time.
	Symbol {
		/// The segment key this leaf binds.
		name: String,
	},
	/// A named glob segment (`*path`) that greedily captures the
	/// remainder of the path, separators included.
	Star {
		/// The segment key this leaf binds.
		name: String,
	},
	/// An optional subsequence (`(.:format)`); matches zero or one
	/// occurrence of its child.
	Group(Box<PatternNode>),
	/// Concatenation of two nodes in sequence.
	Cat {
		/// First node in sequence.
		left: Box<PatternNode>,
		/// Remainder of the sequence.
		right: Box<PatternNode>,
	},
}

impl PatternNode {
	/// Fold a sequence of nodes into a right-leaning `Cat` chain.
	/// Panics on an empty sequence; the parser never produces one.
	pub(crate) fn sequence(nodes: Vec<PatternNode>) -> PatternNode {
		nodes
			.into_iter()
			.rev()
			.reduce(|right, left| PatternNode::Cat {
				left: Box::new(left),
				right: Box::new(right),
			})
			.expect("pattern sequence must not be empty")
	}

	/// Segment keys (`Symbol` and `Star` names) in traversal order.
	pub fn keys(&self) -> Vec<&str> {
		let mut keys = Vec::new();
		self.collect_keys(&mut keys);
		keys
	}

	fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
		match self {
			PatternNode::Literal(_) => {}
			PatternNode::Symbol { name } | PatternNode::Star { name } => keys.push(name),
			PatternNode::Group(child) => child.collect_keys(keys),
			PatternNode::Cat { left, right } => {
				left.collect_keys(keys);
				right.collect_keys(keys);
			}
		}
	}

	/// Whether any `Star` leaf appears in this subtree.
	pub fn has_star(&self) -> bool {
		match self {
			PatternNode::Literal(_) | PatternNode::Symbol { .. } => false,
			PatternNode::Star { .. } => true,
			PatternNode::Group(child) => child.has_star(),
			PatternNode::Cat { left, right } => left.has_star() || right.has_star(),
		}
	}

	/// Leaves (`Literal`, `Symbol`, `Star`) in traversal order, each
	/// tagged with its optional-group nesting depth. Used by the
	/// compiler for constraint narrowing and required-key analysis.
	pub(crate) fn leaves(&self) -> Vec<(Leaf<'_>, usize)> {
		let mut out = Vec::new();
		self.collect_leaves(0, &mut out);
		out
	}

	fn collect_leaves<'a>(&'a self, depth: usize, out: &mut Vec<(Leaf<'a>, usize)>) {
		match self {
			PatternNode::Literal(text) => out.push((Leaf::Literal(text), depth)),
			PatternNode::Symbol { name } => out.push((Leaf::Symbol(name), depth)),
			PatternNode::Star { name } => out.push((Leaf::Star(name), depth)),
			PatternNode::Group(child) => child.collect_leaves(depth + 1, out),
			PatternNode::Cat { left, right } => {
				left.collect_leaves(depth, out);
				right.collect_leaves(depth, out);
			}
		}
	}
}

/// A flattened leaf reference produced by [`PatternNode::leaves`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Leaf<'a> {
	Literal(&'a str),
	Symbol(&'a str),
	Star(&'a str),
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sym(name: &str) -> PatternNode {
		PatternNode::Symbol {
			name: name.to_string(),
		}
	}

	#[test]
	fn test_keys_follow_traversal_order() {
		// /users/:user_id/posts(/:post_id)
		let ast = PatternNode::sequence(vec![
			PatternNode::Literal("/users/".to_string()),
			sym("user_id"),
			PatternNode::Literal("/posts".to_string()),
			PatternNode::Group(Box::new(PatternNode::sequence(vec![
				PatternNode::Literal("/".to_string()),
				sym("post_id"),
			]))),
		]);
		assert_eq!(ast.keys(), vec!["user_id", "post_id"]);
	}

	#[test]
	fn test_leaf_depths_track_group_nesting() {
		let ast = PatternNode::sequence(vec![
			sym("a"),
			PatternNode::Group(Box::new(PatternNode::Group(Box::new(sym("b"))))),
		]);
		let leaves = ast.leaves();
		assert_eq!(leaves[0], (Leaf::Symbol("a"), 0));
		assert_eq!(leaves[1], (Leaf::Symbol("b"), 2));
	}

	#[test]
	fn test_has_star_sees_through_groups() {
		let ast = PatternNode::Group(Box::new(PatternNode::Star {
			name: "rest".to_string(),
		}));
		assert!(ast.has_star());
		assert!(!sym("id").has_star());
	}
}
