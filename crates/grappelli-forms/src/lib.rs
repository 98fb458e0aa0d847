//! Form state management and validation for Grappelli
//!
//! This crate provides the form-state controller a view wires its inputs
//! into:
//! - dirty/touched tracking and submission flags
//! - validation scheduling with configurable trigger policies
//! - inline per-field rules: required, pattern, bounds, named synchronous
//!   and asynchronous predicates, value coercion, conditional disabling
//! - an external resolver seam for whole-record schema validation
//! - dynamic field arrays with stable row identity
//! - value-change subscriptions and serializable diagnostic snapshots

pub mod error;
pub mod field_array;
pub mod form;
pub mod path;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod watch;

pub use error::{ErrorKind, FieldError, FormError, FormErrors, FormResult};
pub use field_array::{ArrayRow, FieldArray};
pub use form::{Form, FormOptions, Mode, SetValueOptions};
pub use path::{FieldPath, Segment};
pub use resolver::Resolver;
pub use rules::{is_empty_value, Coerce, FieldRules};
pub use snapshot::FormSnapshot;
pub use watch::{ChangeEvent, Watch};
