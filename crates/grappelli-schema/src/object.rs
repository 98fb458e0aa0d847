//! Whole-record schemas and the resolver adapter

use crate::ValueSchema;
use async_trait::async_trait;
use grappelli_forms::{FieldError, FieldPath, FormErrors, Resolver};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declarative schema over a record's named fields.
///
/// Validation walks the declared fields in order and collects the first
/// failure per field into a path → message map; an empty map means the
/// record passed. Fields present in the record but absent from the schema
/// are ignored.
///
/// The schema doubles as a form [`Resolver`], which is how it is attached:
///
/// ```
/// use grappelli_forms::{Form, FormOptions, Mode};
/// use grappelli_schema::{object, string};
/// use serde_json::json;
///
/// let schema = object()
///     .field("username", string().required("USERNAME REQUIRED"))
///     .field("email", string().email("EMAIL NOT VALID").required("EMAIL REQUIRED"));
///
/// let form = Form::new(
///     FormOptions::new()
///         .default_values(json!({ "username": "", "email": "" }))
///         .mode(Mode::OnTouched)
///         .resolver(schema),
/// );
/// ```
#[derive(Default)]
pub struct ObjectSchema {
	fields: Vec<(String, Box<dyn ValueSchema>)>,
}

impl ObjectSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare a field. Dotted names address nested slots.
	pub fn field(mut self, name: impl Into<String>, schema: impl ValueSchema + 'static) -> Self {
		self.fields.push((name.into(), Box::new(schema)));
		self
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|(name, _)| name.as_str())
	}

	/// Validate a record; returns field name → message for every failure.
	pub fn validate(&self, values: &Value) -> BTreeMap<String, String> {
		let mut issues = BTreeMap::new();
		for (name, schema) in &self.fields {
			let value = lookup(values, name);
			if let Err(message) = schema.check(value) {
				issues.insert(name.clone(), message);
			}
		}
		issues
	}
}

#[async_trait]
impl Resolver for ObjectSchema {
	async fn resolve(&self, values: &Value) -> FormErrors {
		self.validate(values)
			.into_iter()
			.map(|(name, message)| (FieldPath::from(name), FieldError::schema(message)))
			.collect()
	}
}

/// Dotted lookup without pulling in the forms crate's path machinery.
fn lookup<'a>(values: &'a Value, name: &str) -> Option<&'a Value> {
	let mut current = values;
	for part in name.split('.').filter(|p| !p.is_empty()) {
		current = match part.parse::<usize>() {
			Ok(index) => current.as_array()?.get(index)?,
			Err(_) => current.as_object()?.get(part)?,
		};
	}
	Some(current)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{number, object, string};
	use rstest::rstest;
	use serde_json::json;

	fn signup_schema() -> ObjectSchema {
		object()
			.field("username", string().required("USERNAME REQUIRED"))
			.field("email", string().email("EMAIL NOT VALID").required("EMAIL REQUIRED"))
	}

	#[rstest]
	fn test_empty_record_fails_both_fields() {
		// Arrange
		let schema = signup_schema();

		// Act
		let issues = schema.validate(&json!({ "username": "", "email": "" }));

		// Assert
		assert_eq!(issues["username"], "USERNAME REQUIRED");
		assert_eq!(issues["email"], "EMAIL REQUIRED");
	}

	#[rstest]
	fn test_clean_record_has_no_issues() {
		let schema = signup_schema();
		let issues = schema.validate(&json!({
			"username": "django",
			"email": "quintette@example.com",
		}));
		assert!(issues.is_empty());
	}

	#[rstest]
	fn test_shape_failure_has_custom_message() {
		let schema = signup_schema();
		let issues = schema.validate(&json!({ "username": "django", "email": "not-an-email" }));
		assert_eq!(issues["email"], "EMAIL NOT VALID");
	}

	#[rstest]
	fn test_dotted_names_address_nested_slots() {
		let schema = object().field("social.twitter", string().required("TWITTER REQUIRED"));

		let issues = schema.validate(&json!({ "social": { "twitter": "" } }));
		assert_eq!(issues["social.twitter"], "TWITTER REQUIRED");

		let issues = schema.validate(&json!({ "social": { "twitter": "@me" } }));
		assert!(issues.is_empty());
	}

	#[rstest]
	fn test_mixed_field_kinds() {
		let schema = object()
			.field("username", string().required("USERNAME REQUIRED"))
			.field("age", number().min(0.0, "AGE NEGATIVE").integer("AGE FRACTIONAL"));

		let issues = schema.validate(&json!({ "username": "django", "age": 20 }));
		assert!(issues.is_empty());

		let issues = schema.validate(&json!({ "username": "django", "age": -2 }));
		assert_eq!(issues["age"], "AGE NEGATIVE");
	}

	#[tokio::test]
	async fn test_resolver_adapter_emits_schema_errors() {
		use grappelli_forms::{ErrorKind, Resolver};

		// Arrange
		let schema = signup_schema();

		// Act
		let errors = schema.resolve(&json!({ "username": "", "email": "x@y.z" })).await;

		// Assert
		let error = errors.get(&FieldPath::from("username")).unwrap();
		assert_eq!(error.kind, ErrorKind::Schema);
		assert_eq!(error.message, "USERNAME REQUIRED");
		assert!(!errors.contains(&FieldPath::from("email")));
	}
}
