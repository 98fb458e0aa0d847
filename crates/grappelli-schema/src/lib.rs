//! Declarative schema validation for Grappelli forms
//!
//! An [`ObjectSchema`] describes the shape of a whole record at once —
//! required-ness, email shape, bounds, custom tests — each constraint
//! carrying its own message. It plugs into a form through the
//! [`Resolver`](grappelli_forms::Resolver) seam as an alternative to
//! per-field inline rules.
//!
//! ```
//! use grappelli_schema::{object, string};
//!
//! let schema = object()
//!     .field("username", string().required("USERNAME REQUIRED"))
//!     .field("email", string().email("EMAIL NOT VALID").required("EMAIL REQUIRED"));
//!
//! let issues = schema.validate(&serde_json::json!({ "username": "", "email": "nope" }));
//! assert_eq!(issues["username"], "USERNAME REQUIRED");
//! assert_eq!(issues["email"], "EMAIL NOT VALID");
//! ```

pub mod number;
pub mod object;
pub mod string;

pub use number::NumberSchema;
pub use object::ObjectSchema;
pub use string::StringSchema;

use serde_json::Value;

/// Constraint set over a single value slot.
///
/// An empty optional value passes; a missing-or-empty value only fails when
/// the schema declares `required`.
pub trait ValueSchema: Send + Sync {
	/// Check one slot; `Err` carries the message of the first failed
	/// constraint.
	fn check(&self, value: Option<&Value>) -> Result<(), String>;
}

/// Start a string schema.
pub fn string() -> StringSchema {
	StringSchema::new()
}

/// Start a number schema.
pub fn number() -> NumberSchema {
	NumberSchema::new()
}

/// Start an object schema.
pub fn object() -> ObjectSchema {
	ObjectSchema::new()
}

pub(crate) fn is_blank(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(s)) => s.trim().is_empty(),
		Some(_) => false,
	}
}
