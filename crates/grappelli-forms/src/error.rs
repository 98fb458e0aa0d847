//! Field-scoped validation errors and the form error map
//!
//! Validation failures are data, not control flow: each field owns a single
//! error slot holding the first failure found for it, and the map of those
//! slots travels with the form state.

use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What produced a [`FieldError`].
///
/// Mirrors the rule pipeline: built-in rules, named predicates, coercion,
/// an external schema, manual injection, or a remote check that could not
/// run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	Required,
	Pattern,
	MinLength,
	MaxLength,
	Min,
	Max,
	Validate,
	Coerce,
	Schema,
	Manual,
	Remote,
}

/// One field's validation failure: a kind tag plus the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
	pub kind: ErrorKind,
	pub message: String,
}

impl FieldError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn required(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Required, message)
	}

	pub fn pattern(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Pattern, message)
	}

	pub fn validate(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Validate, message)
	}

	pub fn coerce(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Coerce, message)
	}

	pub fn schema(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Schema, message)
	}

	/// An error injected outside the validation path.
	pub fn manual(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Manual, message)
	}

	/// A remote check that could not be carried out.
	pub fn remote(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Remote, message)
	}
}

impl fmt::Display for FieldError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.message)
	}
}

/// The per-field error map of a form: one slot per field path.
///
/// # Examples
///
/// ```
/// use grappelli_forms::{FieldError, FieldPath, FormErrors};
///
/// let mut errors = FormErrors::new();
/// errors.insert(FieldPath::from("email"), FieldError::required("Email required"));
///
/// assert!(!errors.is_empty());
/// assert_eq!(errors.get(&FieldPath::from("email")).unwrap().message, "Email required");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
	map: BTreeMap<FieldPath, FieldError>,
}

impl FormErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, path: FieldPath, error: FieldError) -> Option<FieldError> {
		self.map.insert(path, error)
	}

	pub fn remove(&mut self, path: &FieldPath) -> Option<FieldError> {
		self.map.remove(path)
	}

	pub fn get(&self, path: &FieldPath) -> Option<&FieldError> {
		self.map.get(path)
	}

	pub fn contains(&self, path: &FieldPath) -> bool {
		self.map.contains_key(path)
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn clear(&mut self) {
		self.map.clear();
	}

	pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldError)> {
		self.map.iter()
	}

	pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
		self.map.keys()
	}

	/// Fold another error map into this one; the newcomer wins on conflict.
	pub fn merge(&mut self, other: FormErrors) {
		for (path, error) in other.map {
			self.map.insert(path, error);
		}
	}
}

impl fmt::Display for FormErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.map.is_empty() {
			return write!(f, "no field errors");
		}
		for (i, (path, error)) in self.map.iter().enumerate() {
			if i > 0 {
				write!(f, "; ")?;
			}
			write!(f, "{}: {}", path, error.message)?;
		}
		Ok(())
	}
}

impl std::error::Error for FormErrors {}

impl IntoIterator for FormErrors {
	type Item = (FieldPath, FieldError);
	type IntoIter = std::collections::btree_map::IntoIter<FieldPath, FieldError>;

	fn into_iter(self) -> Self::IntoIter {
		self.map.into_iter()
	}
}

impl FromIterator<(FieldPath, FieldError)> for FormErrors {
	fn from_iter<T: IntoIterator<Item = (FieldPath, FieldError)>>(iter: T) -> Self {
		Self {
			map: iter.into_iter().collect(),
		}
	}
}

/// Failures of form operations themselves, as opposed to field validation.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("default values resolver failed: {0}")]
	DefaultValues(String),
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_single_slot_per_field() {
		// Arrange
		let mut errors = FormErrors::new();
		let path = FieldPath::from("email");

		// Act: second write overwrites the slot
		errors.insert(path.clone(), FieldError::required("Email required"));
		errors.insert(path.clone(), FieldError::pattern("Email not valid"));

		// Assert
		assert_eq!(errors.len(), 1);
		assert_eq!(errors.get(&path).unwrap().kind, ErrorKind::Pattern);
	}

	#[rstest]
	fn test_merge_prefers_newcomer() {
		let mut base = FormErrors::new();
		base.insert(FieldPath::from("email"), FieldError::required("a"));
		base.insert(FieldPath::from("username"), FieldError::required("b"));

		let mut other = FormErrors::new();
		other.insert(FieldPath::from("email"), FieldError::schema("c"));

		base.merge(other);

		assert_eq!(base.get(&FieldPath::from("email")).unwrap().message, "c");
		assert_eq!(base.get(&FieldPath::from("username")).unwrap().message, "b");
	}

	#[rstest]
	fn test_display_lists_paths() {
		let mut errors = FormErrors::new();
		errors.insert(FieldPath::from("social.twitter"), FieldError::required("Twitter required"));

		assert_eq!(errors.to_string(), "social.twitter: Twitter required");
	}

	#[rstest]
	fn test_manual_error_shape_matches_rule_errors() {
		let manual = FieldError::manual("ERROR MANUAL");
		assert_eq!(manual.kind, ErrorKind::Manual);
		assert_eq!(manual.to_string(), "ERROR MANUAL");
	}
}
