//! Error taxonomy for the routing engine.
//!
//! Startup-time errors (`MalformedPattern`, `InvalidRouteDefinition`,
//! `DuplicateRouteName`) abort table construction and are never recovered.
//! Request-time errors (`NoRouteMatched`, `UnknownHttpMethod`) are per-call
//! and leave the shared table untouched. Generation-time errors surface to
//! the caller with enough context to debug the call site.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// All failure modes of parsing, registration, recognition and generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
	/// The route pattern string violates the grammar.
	#[error("malformed pattern `{pattern}`: {reason}")]
	MalformedPattern {
		/// The offending pattern source.
		pattern: String,
		/// Human-readable grammar violation.
		reason: String,
	},

	/// The route is grammatically valid but cannot be registered,
	/// e.g. a requirement references a key absent from the pattern.
	#[error("invalid route definition for `{pattern}`: {reason}")]
	InvalidRouteDefinition {
		/// Pattern source of the rejected route.
		pattern: String,
		/// Why registration was refused.
		reason: String,
	},

	/// Two routes were registered under the same non-blank name.
	#[error("duplicate route name `{name}`")]
	DuplicateRouteName {
		/// The conflicting name.
		name: String,
	},

	/// No route matched the incoming request. Callers typically turn
	/// this into a 404 or cascade to the next handler; it is not a
	/// routing bug.
	#[error("no route matches {method} {path}")]
	NoRouteMatched {
		/// The (validated) method token.
		method: String,
		/// The normalized request path.
		path: String,
	},

	/// The inbound method token is not an uppercase HTTP verb.
	#[error("unknown HTTP method token `{token}`")]
	UnknownHttpMethod {
		/// The rejected token, verbatim.
		token: String,
	},

	/// Generation was asked for a route name that was never registered.
	#[error("no route named `{name}`")]
	UnknownRouteName {
		/// The unresolved route name.
		name: String,
	},

	/// Generation could not fill every required segment. The message
	/// enumerates the missing keys so templates can be fixed quickly.
	#[error("cannot generate `{route}`: missing required keys [{}]", .missing.join(", "))]
	MissingGenerationKeys {
		/// Route name when generation was by name, else the pattern.
		route: String,
		/// Segment keys with no supplied, recalled or default value.
		missing: Vec<String>,
	},

	/// Generation failed for a reason other than missing keys, e.g. a
	/// supplied value violating the segment's requirement regex.
	#[error("cannot generate `{route}`: {reason}")]
	GenerationFailed {
		/// Route name or pattern.
		route: String,
		/// Why the path could not be produced.
		reason: String,
	},
}

impl RoutingError {
	/// Whether this error is fatal at startup (parse/registration time)
	/// as opposed to a per-request outcome.
	pub fn is_startup_error(&self) -> bool {
		matches!(
			self,
			RoutingError::MalformedPattern { .. }
				| RoutingError::InvalidRouteDefinition { .. }
				| RoutingError::DuplicateRouteName { .. }
		)
	}

	/// Whether this error represents "no route matched", the outcome a
	/// dispatcher may cascade past rather than report as a hard error.
	pub fn is_not_found(&self) -> bool {
		matches!(self, RoutingError::NoRouteMatched { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_keys_are_enumerated() {
		let err = RoutingError::MissingGenerationKeys {
			route: "post".to_string(),
			missing: vec!["id".to_string(), "format".to_string()],
		};
		assert_eq!(
			err.to_string(),
			"cannot generate `post`: missing required keys [id, format]"
		);
	}

	#[test]
	fn test_startup_classification() {
		let parse = RoutingError::MalformedPattern {
			pattern: "/a(".to_string(),
			reason: "unmatched parenthesis".to_string(),
		};
		assert!(parse.is_startup_error());

		let not_found = RoutingError::NoRouteMatched {
			method: "GET".to_string(),
			path: "/missing".to_string(),
		};
		assert!(!not_found.is_startup_error());
		assert!(not_found.is_not_found());
	}
}
