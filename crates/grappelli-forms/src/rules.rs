//! Per-field registration rules
//!
//! A registration call carries the field's validation rules and input
//! handling: required-ness, a pattern, length and range bounds, named
//! synchronous and asynchronous predicates, value coercion, and an optional
//! disabled predicate derived from the rest of the record.

use crate::error::{ErrorKind, FieldError};
use chrono::{Datelike, NaiveDate};
use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Named synchronous predicate: `(field value, whole record) -> Err(message)`.
pub type SyncPredicateFn = Arc<dyn Fn(&Value, &Value) -> Result<(), String> + Send + Sync>;

/// Named asynchronous predicate. Receives owned copies of the field value
/// and the record so the returned future borrows nothing.
pub type AsyncPredicateFn =
	Arc<dyn Fn(Value, Value) -> BoxFuture<'static, Result<(), FieldError>> + Send + Sync>;

/// Disabled predicate over the current record.
pub type DisabledFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Input coercion applied before the value reaches the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coerce {
	#[default]
	None,
	/// Parse string input as a number (integer when fractionless).
	Number,
	/// Parse string input as a calendar date, stored as ISO `YYYY-MM-DD`.
	Date,
}

// Accepted date shapes, most specific first. Two-digit years are rejected
// by the 4-digit guard in `coerce_date`.
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%b %d %Y", "%d %b %Y"];

/// Validation rules and input handling for one registered field.
///
/// Rules run in a fixed order: coercion happens on input; then
/// required → pattern → length bounds → numeric bounds → named synchronous
/// predicates → named asynchronous predicates, in registration order. The
/// first failure wins and occupies the field's single error slot. An empty
/// optional field passes without running the remaining rules.
///
/// # Examples
///
/// ```
/// use grappelli_forms::FieldRules;
/// use regex::Regex;
///
/// let rules = FieldRules::new()
///     .required("Email required")
///     .pattern(Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap(), "Email not valid")
///     .validate("not_admin", |value, _record| {
///         if value.as_str() == Some("admin@example.com") {
///             Err("Enter a different email address".into())
///         } else {
///             Ok(())
///         }
///     });
///
/// assert!(rules.is_required());
/// ```
#[derive(Clone, Default)]
pub struct FieldRules {
	required: Option<String>,
	pattern: Option<(Regex, String)>,
	min_length: Option<(usize, String)>,
	max_length: Option<(usize, String)>,
	min: Option<(f64, String)>,
	max: Option<(f64, String)>,
	validators: Vec<(String, SyncPredicateFn)>,
	async_validators: Vec<(String, AsyncPredicateFn)>,
	coerce: Coerce,
	disabled_when: Option<DisabledFn>,
}

impl FieldRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject empty values with `message`.
	pub fn required(mut self, message: impl Into<String>) -> Self {
		self.required = Some(message.into());
		self
	}

	/// Reject string values not matching `pattern`.
	pub fn pattern(mut self, pattern: Regex, message: impl Into<String>) -> Self {
		self.pattern = Some((pattern, message.into()));
		self
	}

	/// Reject strings shorter than `min` characters.
	pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
		self.min_length = Some((min, message.into()));
		self
	}

	/// Reject strings longer than `max` characters.
	pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
		self.max_length = Some((max, message.into()));
		self
	}

	/// Reject numbers below `min`.
	pub fn min(mut self, min: f64, message: impl Into<String>) -> Self {
		self.min = Some((min, message.into()));
		self
	}

	/// Reject numbers above `max`.
	pub fn max(mut self, max: f64, message: impl Into<String>) -> Self {
		self.max = Some((max, message.into()));
		self
	}

	/// Add a named synchronous predicate. Predicates run in registration
	/// order after the built-in rules.
	pub fn validate<F>(mut self, name: impl Into<String>, predicate: F) -> Self
	where
		F: Fn(&Value, &Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validators.push((name.into(), Arc::new(predicate)));
		self
	}

	/// Add a named asynchronous predicate, run after every synchronous rule
	/// passed.
	pub fn validate_async<F, Fut>(mut self, name: impl Into<String>, predicate: F) -> Self
	where
		F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), FieldError>> + Send + 'static,
	{
		let wrapped: AsyncPredicateFn =
			Arc::new(move |value, record| Box::pin(predicate(value, record)));
		self.async_validators.push((name.into(), wrapped));
		self
	}

	/// Coerce string input to a number before it reaches the value tree.
	pub fn coerce_number(mut self) -> Self {
		self.coerce = Coerce::Number;
		self
	}

	/// Coerce string input to an ISO date before it reaches the value tree.
	pub fn coerce_date(mut self) -> Self {
		self.coerce = Coerce::Date;
		self
	}

	/// Disable the field whenever `predicate` holds for the current record.
	/// A disabled field skips validation and is excluded from the submitted
	/// payload.
	pub fn disabled_when<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&Value) -> bool + Send + Sync + 'static,
	{
		self.disabled_when = Some(Arc::new(predicate));
		self
	}

	pub fn is_required(&self) -> bool {
		self.required.is_some()
	}

	pub fn coercion(&self) -> Coerce {
		self.coerce
	}

	pub fn has_async_validators(&self) -> bool {
		!self.async_validators.is_empty()
	}

	pub(crate) fn is_disabled_for(&self, record: &Value) -> bool {
		match &self.disabled_when {
			Some(predicate) => predicate(record),
			None => false,
		}
	}

	pub(crate) fn async_validators(&self) -> &[(String, AsyncPredicateFn)] {
		&self.async_validators
	}

	/// Apply this field's coercion to raw input.
	pub(crate) fn apply_coercion(&self, raw: Value) -> Result<Value, FieldError> {
		match self.coerce {
			Coerce::None => Ok(raw),
			Coerce::Number => coerce_number(raw),
			Coerce::Date => coerce_date(raw),
		}
	}

	/// Run every synchronous rule against `value`; first failure wins.
	pub(crate) fn check_sync(
		&self,
		value: Option<&Value>,
		record: &Value,
	) -> Result<(), FieldError> {
		if is_empty_value(value) {
			return match &self.required {
				Some(message) => Err(FieldError::required(message.clone())),
				None => Ok(()),
			};
		}
		let Some(value) = value else {
			return Ok(());
		};

		if let Some((pattern, message)) = &self.pattern
			&& let Some(s) = value.as_str()
			&& !pattern.is_match(s)
		{
			return Err(FieldError::pattern(message.clone()));
		}

		if let Some((min, message)) = &self.min_length
			&& let Some(s) = value.as_str()
			&& s.chars().count() < *min
		{
			return Err(FieldError::new(ErrorKind::MinLength, message.clone()));
		}

		if let Some((max, message)) = &self.max_length
			&& let Some(s) = value.as_str()
			&& s.chars().count() > *max
		{
			return Err(FieldError::new(ErrorKind::MaxLength, message.clone()));
		}

		if let Some((min, message)) = &self.min
			&& let Some(n) = value.as_f64()
			&& n < *min
		{
			return Err(FieldError::new(ErrorKind::Min, message.clone()));
		}

		if let Some((max, message)) = &self.max
			&& let Some(n) = value.as_f64()
			&& n > *max
		{
			return Err(FieldError::new(ErrorKind::Max, message.clone()));
		}

		for (_, predicate) in &self.validators {
			if let Err(message) = predicate(value, record) {
				return Err(FieldError::validate(message));
			}
		}

		Ok(())
	}
}

impl fmt::Debug for FieldRules {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldRules")
			.field("required", &self.required.is_some())
			.field("pattern", &self.pattern.as_ref().map(|(p, _)| p.as_str()))
			.field(
				"validators",
				&self.validators.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
			)
			.field(
				"async_validators",
				&self
					.async_validators
					.iter()
					.map(|(n, _)| n.as_str())
					.collect::<Vec<_>>(),
			)
			.field("coerce", &self.coerce)
			.field("disabled_when", &self.disabled_when.is_some())
			.finish()
	}
}

/// Missing, null, and blank strings count as empty for `required`.
///
/// Exposed because disabled predicates routinely need the same notion of
/// emptiness (a field disabled "while X is empty").
///
/// # Examples
///
/// ```
/// use grappelli_forms::is_empty_value;
/// use serde_json::json;
///
/// assert!(is_empty_value(None));
/// assert!(is_empty_value(Some(&json!(null))));
/// assert!(is_empty_value(Some(&json!("  "))));
/// assert!(!is_empty_value(Some(&json!("x"))));
/// assert!(!is_empty_value(Some(&json!(0))));
/// ```
pub fn is_empty_value(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(s)) => s.trim().is_empty(),
		Some(_) => false,
	}
}

fn coerce_number(raw: Value) -> Result<Value, FieldError> {
	match raw {
		Value::Null => Ok(Value::Null),
		Value::Number(_) => Ok(raw),
		Value::String(s) => {
			let s = s.trim();
			if s.is_empty() {
				return Ok(Value::Null);
			}
			if let Ok(i) = s.parse::<i64>() {
				return Ok(Value::from(i));
			}
			match s.parse::<f64>() {
				Ok(f) if f.is_finite() => Ok(serde_json::json!(f)),
				_ => Err(FieldError::coerce("Enter a valid number")),
			}
		}
		_ => Err(FieldError::coerce("Enter a valid number")),
	}
}

fn coerce_date(raw: Value) -> Result<Value, FieldError> {
	match raw {
		Value::Null => Ok(Value::Null),
		Value::String(s) => {
			let s = s.trim();
			if s.is_empty() {
				return Ok(Value::Null);
			}
			for format in DATE_INPUT_FORMATS {
				if let Ok(date) = NaiveDate::parse_from_str(s, format) {
					// Ambiguous 2-digit years never reach the tree.
					if !(1000..=9999).contains(&date.year()) {
						continue;
					}
					return Ok(serde_json::json!(date.format("%Y-%m-%d").to_string()));
				}
			}
			Err(FieldError::coerce("Enter a valid date with a 4-digit year"))
		}
		_ => Err(FieldError::coerce("Enter a valid date")),
	}
}
