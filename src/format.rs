//! Format lookup for `:format` suffix segments.
//!
//! The router needs just enough format knowledge to decide whether a
//! matched `.json`-style suffix names something the application serves.
//! That knowledge is injected as a [`FormatRegistry`] rather than read
//! from a process-wide table, and the built-in vocabulary is a closed
//! enum instead of dynamically synthesized predicates.

use std::collections::HashSet;

/// The closed set of formats the default registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFormat {
	/// `html`
	Html,
	/// `json`
	Json,
	/// `xml`
	Xml,
	/// `csv`
	Csv,
	/// `txt`
	Text,
	/// `js`
	JavaScript,
}

impl KnownFormat {
	/// Every known format, in a stable order.
	pub const ALL: [KnownFormat; 6] = [
		KnownFormat::Html,
		KnownFormat::Json,
		KnownFormat::Xml,
		KnownFormat::Csv,
		KnownFormat::Text,
		KnownFormat::JavaScript,
	];

	/// The extension string this format answers to.
	pub fn extension(&self) -> &'static str {
		match self {
			KnownFormat::Html => "html",
			KnownFormat::Json => "json",
			KnownFormat::Xml => "xml",
			KnownFormat::Csv => "csv",
			KnownFormat::Text => "txt",
			KnownFormat::JavaScript => "js",
		}
	}

	/// Look a format up by extension string.
	pub fn from_extension(extension: &str) -> Option<KnownFormat> {
		KnownFormat::ALL
			.iter()
			.copied()
			.find(|format| format.extension() == extension)
	}
}

/// An injected `extension -> bool` lookup capability.
///
/// When a registry is installed on a route table, a matched `format`
/// segment that carries no explicit requirement is verified against it;
/// unknown extensions make the route fall through instead of binding.
///
/// # Examples
///
/// ```
/// use waypoint::format::FormatRegistry;
///
/// let mut registry = FormatRegistry::with_known_formats();
/// assert!(registry.contains("json"));
/// assert!(!registry.contains("php"));
///
/// registry.register("ics");
/// assert!(registry.contains("ics"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
	extensions: HashSet<String>,
}

impl FormatRegistry {
	/// An empty registry; every extension is unknown.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry pre-populated with [`KnownFormat::ALL`].
	pub fn with_known_formats() -> Self {
		let extensions = KnownFormat::ALL
			.iter()
			.map(|format| format.extension().to_string())
			.collect();
		Self { extensions }
	}

	/// Add an application-specific extension.
	pub fn register(&mut self, extension: impl Into<String>) {
		self.extensions.insert(extension.into());
	}

	/// Whether `extension` is served.
	pub fn contains(&self, extension: &str) -> bool {
		self.extensions.contains(extension)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_known_formats_round_trip_by_extension() {
		for format in KnownFormat::ALL {
			assert_eq!(KnownFormat::from_extension(format.extension()), Some(format));
		}
		assert_eq!(KnownFormat::from_extension("php"), None);
	}

	#[test]
	fn test_empty_registry_rejects_everything() {
		let registry = FormatRegistry::new();
		assert!(!registry.contains("json"));
	}
}
