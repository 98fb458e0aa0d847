//! Serializable state snapshots for diagnostics
//!
//! A [`FormSnapshot`] is a plain-data extraction of everything a form
//! currently knows, detached from the live handle. It is what the demo
//! apps print on their diagnostic console and what an inspector UI would
//! consume.

use crate::error::FieldError;
use crate::form::Form;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Point-in-time copy of a form's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSnapshot {
	pub values: Value,
	/// Field path → error, keyed by the dotted path string.
	pub errors: BTreeMap<String, FieldError>,
	pub touched: Vec<String>,
	pub dirty: Vec<String>,
	pub is_loading: bool,
	pub is_dirty: bool,
	pub is_valid: bool,
	pub is_submitting: bool,
	pub is_submitted: bool,
	pub is_submit_successful: bool,
	pub submit_count: u32,
}

impl Form {
	/// Capture the current state for diagnostics.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_forms::{Form, FormOptions};
	/// use serde_json::json;
	///
	/// let form = Form::new(FormOptions::new().default_values(json!({ "username": "" })));
	/// let snapshot = form.snapshot();
	///
	/// assert!(snapshot.is_valid);
	/// assert_eq!(snapshot.values, json!({ "username": "" }));
	/// assert!(serde_json::to_string(&snapshot).is_ok());
	/// ```
	pub fn snapshot(&self) -> FormSnapshot {
		let state = self.inner.state.read();
		FormSnapshot {
			values: state.values.clone(),
			errors: state
				.errors
				.iter()
				.map(|(path, error)| (path.to_string(), error.clone()))
				.collect(),
			touched: state.touched.iter().map(|p| p.to_string()).collect(),
			dirty: state.dirty.iter().map(|p| p.to_string()).collect(),
			is_loading: state.is_loading,
			is_dirty: !state.dirty.is_empty(),
			is_valid: state.errors.is_empty(),
			is_submitting: state.is_submitting,
			is_submitted: state.is_submitted,
			is_submit_successful: state.is_submit_successful,
			submit_count: state.submit_count,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::form::{Form, FormOptions};
	use crate::rules::FieldRules;
	use serde_json::json;

	#[tokio::test]
	async fn test_snapshot_reflects_errors_and_flags() {
		// Arrange
		let form = Form::new(FormOptions::new().default_values(json!({ "email": "" })));
		form.register("email", FieldRules::new().required("Email required"));

		// Act
		let _ = form.submit().await;
		let snapshot = form.snapshot();

		// Assert
		assert!(!snapshot.is_valid);
		assert!(snapshot.is_submitted);
		assert_eq!(snapshot.submit_count, 1);
		assert_eq!(snapshot.errors["email"].message, "Email required");
	}

	#[tokio::test]
	async fn test_snapshot_roundtrips_through_json() {
		let form = Form::new(FormOptions::new().default_values(json!({ "email": "" })));
		form.input("email", json!("user@example.com")).await;

		let snapshot = form.snapshot();
		let json = serde_json::to_string(&snapshot).unwrap();
		let back: super::FormSnapshot = serde_json::from_str(&json).unwrap();

		assert_eq!(back.values, snapshot.values);
		assert_eq!(back.dirty, vec!["email".to_string()]);
	}
}
