//! External validation seam
//!
//! A resolver validates the whole record at once, as an alternative to the
//! per-field inline rules. Schema libraries plug in here.

use crate::error::FormErrors;
use async_trait::async_trait;
use serde_json::Value;

/// Whole-record validator supplied from outside the form.
///
/// When a form carries a resolver, full-form validation runs the resolver
/// first; its per-field errors take precedence, and inline rules run only
/// for the fields the resolver left clean.
#[async_trait]
pub trait Resolver: Send + Sync {
	/// Validate `values` and return the per-field errors found. An empty
	/// map means the record passed.
	async fn resolve(&self, values: &Value) -> FormErrors;
}

#[async_trait]
impl<T: Resolver + ?Sized> Resolver for std::sync::Arc<T> {
	async fn resolve(&self, values: &Value) -> FormErrors {
		(**self).resolve(values).await
	}
}
