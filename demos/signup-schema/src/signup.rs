//! Signup form wiring
//!
//! Structural validation is delegated wholesale to a declarative schema;
//! one inline predicate rides alongside it, and a manual error slot can be
//! filled outside the validation path entirely.

use grappelli::schema::{object, string};
use grappelli::{FieldRules, Form, FormOptions, Mode};
use serde_json::json;

pub fn build_signup_form() -> Form {
	let schema = object()
		.field("username", string().required("USERNAME REQUIRED"))
		.field(
			"email",
			string().email("EMAIL NOT VALID").required("EMAIL REQUIRED"),
		);

	let form = Form::new(
		FormOptions::new()
			.default_values(json!({ "username": "", "email": "" }))
			.mode(Mode::OnTouched)
			.resolver(schema),
	);

	// One extra predicate the schema knows nothing about.
	form.register(
		"email",
		FieldRules::new().validate("not_admin", |value, _record| {
			if value.as_str() == Some("admin@example.com") {
				Err("Enter a different email address".into())
			} else {
				Ok(())
			}
		}),
	);

	form
}

#[cfg(test)]
mod tests {
	use super::*;
	use grappelli::{ErrorKind, FieldPath};

	#[tokio::test]
	async fn test_schema_messages_surface_verbatim() {
		// Arrange
		let form = build_signup_form();

		// Act
		let errors = form.submit().await.unwrap_err();

		// Assert
		assert_eq!(
			errors.get(&FieldPath::from("username")).unwrap().message,
			"USERNAME REQUIRED"
		);
		assert_eq!(
			errors.get(&FieldPath::from("email")).unwrap().message,
			"EMAIL REQUIRED"
		);
	}

	#[tokio::test]
	async fn test_inline_predicate_runs_alongside_schema() {
		let form = build_signup_form();
		form.input("username", json!("django")).await;
		form.input("email", json!("admin@example.com")).await;

		let errors = form.submit().await.unwrap_err();

		assert_eq!(
			errors.get(&FieldPath::from("email")).unwrap().message,
			"Enter a different email address"
		);
	}

	#[tokio::test]
	async fn test_manual_error_renders_immediately() {
		// Arrange: a record the schema accepts
		let form = build_signup_form();
		form.input("username", json!("django")).await;
		form.input("email", json!("user@example.com")).await;
		assert!(form.is_valid());

		// Act: inject outside the validation path
		form.set_error("username", "ERROR MANUAL");

		// Assert
		let error = form.error("username").unwrap();
		assert_eq!(error.kind, ErrorKind::Manual);
		assert_eq!(error.message, "ERROR MANUAL");
		assert!(!form.is_valid());
	}

	#[tokio::test]
	async fn test_successful_submission_resets_the_view() {
		let form = build_signup_form();
		form.input("username", json!("django")).await;
		form.input("email", json!("user@example.com")).await;

		let payload = form.submit().await.unwrap();
		assert_eq!(payload["username"], json!("django"));
		assert!(form.is_submit_successful());

		form.reset();
		assert_eq!(form.values(), json!({ "username": "", "email": "" }));
		assert!(!form.is_submit_successful());
	}
}
