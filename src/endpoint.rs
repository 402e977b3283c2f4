//! The dispatch boundary between the router and application endpoints.
//!
//! The router hands a matched request to an [`Endpoint`] and receives a
//! status/headers/body triple back. It never interprets the response
//! further; everything richer (content negotiation, cookies, caching)
//! belongs to the HTTP layer collaborator.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::collections::HashMap;

/// What an endpoint receives: the validated method, the normalized
/// request path, and the bound parameters merged with route defaults.
#[derive(Debug, Clone)]
pub struct RouteRequest {
	/// Validated HTTP method.
	pub method: Method,
	/// Normalized request path (leading slash, collapsed separators).
	pub path: String,
	/// Bound segment values merged with the route's defaults. Mutable so
	/// middleware-style callers can enrich it before dispatch.
	pub params: HashMap<String, String>,
}

/// The uninterpreted response triple.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Bytes,
}

impl EndpointResponse {
	/// An empty 200 response.
	pub fn ok() -> Self {
		Self {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Replace the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Replace the status.
	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}
}

/// An invocable endpoint. Implementations are shared behind
/// `Arc<dyn Endpoint>` and must be safe to call concurrently.
#[async_trait]
pub trait Endpoint: Send + Sync {
	/// Handle a recognized request.
	async fn call(&self, request: RouteRequest) -> EndpointResponse;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_response_builders() {
		let response = EndpointResponse::ok()
			.with_status(StatusCode::CREATED)
			.with_body("made");
		assert_eq!(response.status, StatusCode::CREATED);
		assert_eq!(response.body, Bytes::from("made"));
	}
}
