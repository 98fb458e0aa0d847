//! Numeric constraints

use crate::{is_blank, ValueSchema};
use serde_json::Value;

enum Constraint {
	Required(String),
	Min(f64, String),
	Max(f64, String),
	Integer(String),
}

/// Declarative constraints over a numeric slot.
///
/// # Examples
///
/// ```
/// use grappelli_schema::{number, ValueSchema};
/// use serde_json::json;
///
/// let schema = number().required("AGE REQUIRED").min(0.0, "AGE NEGATIVE");
///
/// assert!(schema.check(Some(&json!(20))).is_ok());
/// assert_eq!(schema.check(Some(&json!(-3))), Err("AGE NEGATIVE".to_string()));
/// assert_eq!(schema.check(None), Err("AGE REQUIRED".to_string()));
/// ```
#[derive(Default)]
pub struct NumberSchema {
	constraints: Vec<Constraint>,
}

impl NumberSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject missing values with `message`.
	pub fn required(mut self, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Required(message.into()));
		self
	}

	/// Reject numbers below `min`.
	pub fn min(mut self, min: f64, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Min(min, message.into()));
		self
	}

	/// Reject numbers above `max`.
	pub fn max(mut self, max: f64, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Max(max, message.into()));
		self
	}

	/// Reject numbers with a fractional part.
	pub fn integer(mut self, message: impl Into<String>) -> Self {
		self.constraints.push(Constraint::Integer(message.into()));
		self
	}
}

impl ValueSchema for NumberSchema {
	fn check(&self, value: Option<&Value>) -> Result<(), String> {
		if is_blank(value) {
			for constraint in &self.constraints {
				if let Constraint::Required(message) = constraint {
					return Err(message.clone());
				}
			}
			return Ok(());
		}
		let Some(n) = value.and_then(Value::as_f64) else {
			return Err("Must be a number".to_string());
		};

		for constraint in &self.constraints {
			match constraint {
				Constraint::Required(_) => {}
				Constraint::Min(min, message) => {
					if n < *min {
						return Err(message.clone());
					}
				}
				Constraint::Max(max, message) => {
					if n > *max {
						return Err(message.clone());
					}
				}
				Constraint::Integer(message) => {
					if n.fract() != 0.0 {
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
	use crate::number;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(0), true)]
	#[case(json!(150), true)]
	#[case(json!(-1), false)]
	#[case(json!(151), false)]
	fn test_bounds(#[case] value: Value, #[case] ok: bool) {
		// Arrange
		let schema = number().min(0.0, "too small").max(150.0, "too large");

		// Act & Assert
		assert_eq!(schema.check(Some(&value)).is_ok(), ok);
	}

	#[rstest]
	fn test_integer_constraint() {
		let schema = number().integer("whole numbers only");

		assert!(schema.check(Some(&json!(20))).is_ok());
		assert_eq!(
			schema.check(Some(&json!(20.5))),
			Err("whole numbers only".to_string())
		);
	}

	#[rstest]
	fn test_non_number_value_is_a_type_error() {
		let schema = number().required("required");
		assert_eq!(schema.check(Some(&json!("20"))), Err("Must be a number".to_string()));
	}

	#[rstest]
	fn test_optional_missing_number_passes() {
		let schema = number().min(0.0, "too small");
		assert!(schema.check(None).is_ok());
	}
}
