//! # Grappelli
//!
//! Declarative form state management and validation for Rust.
//!
//! Grappelli is the controller a view wires its inputs into: it owns the
//! record being edited, tracks dirty/touched state, schedules validation
//! according to a configurable trigger policy, manages dynamic field
//! arrays with stable row identity, and exposes submission, reset and
//! manual-error-injection affordances. Structural validation can be
//! expressed inline per field or delegated wholesale to a declarative
//! schema through the resolver seam.
//!
//! ## Crates
//!
//! - [`forms`] — the form-state controller ([`Form`], [`FieldRules`],
//!   field arrays, watch subscriptions, snapshots)
//! - [`schema`] — the declarative schema language and its resolver adapter
//!
//! ## Example
//!
//! ```
//! use grappelli::{FieldRules, Form, FormOptions, Mode};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let form = Form::new(
//!     FormOptions::new()
//!         .default_values(json!({ "username": "" }))
//!         .mode(Mode::OnTouched),
//! );
//! form.register("username", FieldRules::new().required("Username required"));
//!
//! form.blur("username").await;
//! assert_eq!(form.error("username").unwrap().message, "Username required");
//!
//! form.input("username", json!("django")).await;
//! let payload = form.submit().await.unwrap();
//! assert_eq!(payload, json!({ "username": "django" }));
//! # });
//! ```

pub use grappelli_forms as forms;
pub use grappelli_schema as schema;

pub use grappelli_forms::{
	is_empty_value, ArrayRow, ChangeEvent, Coerce, ErrorKind, FieldArray, FieldError, FieldPath,
	FieldRules, Form, FormError, FormErrors, FormOptions, FormResult, FormSnapshot, Mode,
	Resolver, Segment, SetValueOptions, Watch,
};
