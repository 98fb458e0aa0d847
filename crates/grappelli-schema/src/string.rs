//! String constraints

use crate::{is_blank, ValueSchema};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

// Same liberal shape the UI layer uses for email inputs: something, an @,
// something, a dot, something, no whitespace anywhere.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

type TestFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

enum Constraint {
	Required(String),
	Email(String),
	Min(usize, String),
	Max(usize, String),
	Matches(Regex, String),
	Test(String, TestFn, String),
}

/// Declarative constraints over a string slot.
///
/// Constraints other than `required` only run on non-empty values, so
/// `string().email(..)` without `required(..)` accepts an empty field.
///
/// # Examples
///
/// ```
/// use grappelli_schema::{string, ValueSchema};
/// use serde_json::json;
///
/// let schema = string().email("EMAIL NOT VALID").required("EMAIL REQUIRED");
///
/// assert_eq!(schema.check(None), Err("EMAIL REQUIRED".to_string()));
/// assert_eq!(schema.check(Some(&json!("nope"))), Err("EMAIL NOT VALID".to_string()));
/// assert!(schema.check(Some(&json!("user@example.com"))).is_ok());
/// ```
#[derive(Default)]
pub struct StringSchema {
	constraints: Vec<Constraint>,
}

impl StringSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject empty values with `message`.
	pub fn required(mut self, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Required(message.into()));
		self
	}

	/// Reject values that are not email-shaped.
	pub fn email(mut self, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Email(message.into()));
		self
	}

	/// Reject values shorter than `min` characters.
	pub fn min(mut self, min: usize, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Min(min, message.into()));
		self
	}

	/// Reject values longer than `max` characters.
	pub fn max(mut self, max: usize, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Max(max, message.into()));
		self
	}

	/// Reject values not matching `pattern`.
	pub fn matches(mut self, pattern: Regex, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Matches(pattern, message.into()));
		self
	}

	/// Add a named custom test.
	pub fn test<F>(mut self, name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.constraints
			.push(Constraint::Test(name.into(), Arc::new(predicate), message.into()));
		self
	}
}

impl ValueSchema for StringSchema {
	fn check(&self, value: Option<&Value>) -> Result<(), String> {
		if is_blank(value) {
			for constraint in &self.constraints {
				if let Constraint::Required(message) = constraint {
					return Err(message.clone());
				}
			}
			return Ok(());
		}
		let Some(s) = value.and_then(Value::as_str) else {
			return Err("Must be a string".to_string());
		};

		for constraint in &self.constraints {
			match constraint {
				Constraint::Required(_) => {}
				Constraint::Email(message) => {
					if !EMAIL_REGEX.is_match(s) {
						return Err(message.clone());
					}
				}
				Constraint::Min(min, message) => {
					if s.chars().count() < *min {
						return Err(message.clone());
					}
				}
				Constraint::Max(max, message) => {
					if s.chars().count() > *max {
						return Err(message.clone());
					}
				}
				Constraint::Matches(pattern, message) => {
					if !pattern.is_match(s) {
						return Err(message.clone());
					}
				}
				Constraint::Test(_, predicate, message) => {
					if !predicate(s) {
						return Err(message.clone());
					}
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::string;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(None)]
	#[case(Some(json!(null)))]
	#[case(Some(json!("")))]
	#[case(Some(json!("   ")))]
	fn test_required_rejects_blank(#[case] value: Option<Value>) {
		// Arrange
		let schema = string().required("USERNAME REQUIRED");

		// Act
		let result = schema.check(value.as_ref());

		// Assert
		assert_eq!(result, Err("USERNAME REQUIRED".to_string()));
	}

	#[rstest]
	fn test_optional_blank_passes_other_constraints() {
		let schema = string().email("EMAIL NOT VALID");
		assert!(schema.check(Some(&json!(""))).is_ok());
	}

	#[rstest]
	#[case("user@example.com", true)]
	#[case("user@sub.example.com", true)]
	#[case("no-at-sign", false)]
	#[case("two@@example.com", false)]
	#[case("spaces in@example.com", false)]
	fn test_email_shape(#[case] input: &str, #[case] ok: bool) {
		let schema = string().email("EMAIL NOT VALID");
		assert_eq!(schema.check(Some(&json!(input))).is_ok(), ok, "input: {input}");
	}

	#[rstest]
	fn test_constraints_run_in_declaration_order() {
		// email is declared before min, so it speaks first
		let schema = string().email("bad email").min(50, "too short");
		assert_eq!(schema.check(Some(&json!("x"))), Err("bad email".to_string()));
	}

	#[rstest]
	fn test_custom_named_test() {
		let schema = string().test(
			"not_admin",
			|s| s != "admin@example.com",
			"Enter a different email address",
		);

		assert!(schema.check(Some(&json!("user@example.com"))).is_ok());
		assert_eq!(
			schema.check(Some(&json!("admin@example.com"))),
			Err("Enter a different email address".to_string())
		);
	}

	#[rstest]
	fn test_non_string_value_is_a_type_error() {
		let schema = string().required("required");
		assert_eq!(schema.check(Some(&json!(42))), Err("Must be a string".to_string()));
	}
}
