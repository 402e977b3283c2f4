//! Route definitions and their compiled form.
//!
//! A [`RouteDefinition`] is the declarative input the configuration
//! layer hands over: pattern source, optional name, verb constraint,
//! per-segment requirements, defaults and the endpoint. Compiling it
//! produces a [`Route`] — AST plus matcher plus precedence — which is
//! immutable for the lifetime of its table.

use crate::ast::PatternNode;
use crate::compiler::{CompiledPattern, Requirement};
use crate::endpoint::Endpoint;
use crate::errors::Result;
use crate::parser;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Which HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbConstraint {
	/// No verb filtering; the route answers every method.
	Any,
	/// Only the listed methods match.
	Only(Vec<Method>),
}

impl VerbConstraint {
	/// Constrain to a single method.
	pub fn only(method: Method) -> Self {
		VerbConstraint::Only(vec![method])
	}

	/// Whether `method` passes this constraint.
	pub fn permits(&self, method: &Method) -> bool {
		match self {
			VerbConstraint::Any => true,
			VerbConstraint::Only(methods) => methods.contains(method),
		}
	}
}

/// Declarative route input, built up in chaining form.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use http::Method;
/// use waypoint::compiler::Requirement;
/// use waypoint::endpoint::{Endpoint, EndpointResponse, RouteRequest};
/// use waypoint::route::RouteDefinition;
///
/// # use async_trait::async_trait;
/// # struct Stub;
/// # #[async_trait]
/// # impl Endpoint for Stub {
/// #     async fn call(&self, _request: RouteRequest) -> EndpointResponse {
/// #         EndpointResponse::ok()
/// #     }
/// # }
/// let definition = RouteDefinition::new("/posts/:id(.:format)", Arc::new(Stub))
///     .with_name("post")
///     .with_verb(Method::GET)
///     .with_requirement("id", Requirement::Pattern(r"\d+".to_string()))
///     .with_default("format", "html");
/// assert_eq!(definition.name(), Some("post"));
/// ```
#[derive(Clone)]
pub struct RouteDefinition {
	pattern: String,
	name: Option<String>,
	verb: VerbConstraint,
	requirements: HashMap<String, Requirement>,
	defaults: HashMap<String, String>,
	endpoint: Arc<dyn Endpoint>,
}

impl RouteDefinition {
	/// Start a definition from a pattern and its endpoint.
	pub fn new(pattern: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> Self {
		Self {
			pattern: pattern.into(),
			name: None,
			verb: VerbConstraint::Any,
			requirements: HashMap::new(),
			defaults: HashMap::new(),
			endpoint,
		}
	}

	/// Name the route for reverse lookup.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Restrict the route to one method.
	pub fn with_verb(mut self, method: Method) -> Self {
		self.verb = VerbConstraint::only(method);
		self
	}

	/// Restrict the route to a method set.
	pub fn with_verbs(mut self, methods: Vec<Method>) -> Self {
		self.verb = VerbConstraint::Only(methods);
		self
	}

	/// Attach a per-segment requirement.
	pub fn with_requirement(mut self, key: impl Into<String>, requirement: Requirement) -> Self {
		self.requirements.insert(key.into(), requirement);
		self
	}

	/// Attach a default value. Defaults pre-fill generation and let a
	/// default-valued optional suffix be elided from generated paths;
	/// keys that are not pattern segments act as fixed discriminators
	/// (the `controller`/`action` style) during nameless generation.
	pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.defaults.insert(key.into(), value.into());
		self
	}

	/// The pattern source.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// The route name, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Re-prefix the pattern, used when mounting under a path prefix.
	pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
		let prefix = prefix.trim_end_matches('/');
		let joined = if self.pattern.starts_with('/') {
			format!("{}{}", prefix, self.pattern)
		} else {
			format!("{}/{}", prefix, self.pattern)
		};
		self.pattern = if joined.starts_with('/') {
			joined
		} else {
			format!("/{}", joined)
		};
		self
	}

	/// Parse and compile into an immutable [`Route`] with the given
	/// precedence rank (its registration position).
	pub(crate) fn compile(self, precedence: usize) -> Result<Route> {
		let ast = parser::parse(&self.pattern)?;
		let compiled = CompiledPattern::compile(&self.pattern, &ast, &self.requirements)?;
		Ok(Route {
			pattern: self.pattern,
			ast,
			compiled,
			name: self.name,
			verb: self.verb,
			defaults: self.defaults,
			endpoint: self.endpoint,
			precedence,
		})
	}
}

/// A compiled route inside a table.
#[derive(Clone)]
pub struct Route {
	pattern: String,
	ast: PatternNode,
	compiled: CompiledPattern,
	name: Option<String>,
	verb: VerbConstraint,
	defaults: HashMap<String, String>,
	endpoint: Arc<dyn Endpoint>,
	precedence: usize,
}

impl Route {
	/// The original pattern source.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// The parsed pattern.
	pub fn ast(&self) -> &PatternNode {
		&self.ast
	}

	/// The matchable form.
	pub fn compiled(&self) -> &CompiledPattern {
		&self.compiled
	}

	/// The route name, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// The verb constraint.
	pub fn verb(&self) -> &VerbConstraint {
		&self.verb
	}

	/// Default parameter values.
	pub fn defaults(&self) -> &HashMap<String, String> {
		&self.defaults
	}

	/// The endpoint invoked on a match.
	pub fn endpoint(&self) -> Arc<dyn Endpoint> {
		self.endpoint.clone()
	}

	/// Registration order; lower matches first.
	pub fn precedence(&self) -> usize {
		self.precedence
	}

	/// Segment keys in pattern order.
	pub fn segment_keys(&self) -> &[String] {
		self.compiled.keys()
	}

	/// Whether the route explicitly constrains `format`.
	pub(crate) fn has_format_requirement(&self) -> bool {
		self.compiled.requirement_check("format").is_some()
	}

	/// Default keys that are not pattern segments — the fixed
	/// discriminator values nameless generation matches against.
	pub fn discriminator_defaults(&self) -> impl Iterator<Item = (&String, &String)> {
		let keys = self.compiled.keys();
		self.defaults
			.iter()
			.filter(move |(key, _)| !keys.contains(*key))
	}

	/// Label used in generation errors: the name when present, else the
	/// pattern source.
	pub(crate) fn label(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.pattern)
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern)
			.field("name", &self.name)
			.field("verb", &self.verb)
			.field("defaults", &self.defaults)
			.field("precedence", &self.precedence)
			.finish_non_exhaustive()
	}
}
