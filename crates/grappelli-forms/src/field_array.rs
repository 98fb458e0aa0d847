//! Dynamic field arrays
//!
//! A [`FieldArray`] manages a variable-length list inside the record. Every
//! row carries a generated UUID key that stays stable while other rows are
//! appended or removed, which is what a rendering layer needs for list
//! diffing. The list never shrinks below one entry: removal of row 0 is a
//! no-op, so a view can simply omit the remove control on the first row.

use crate::form::{Form, FormState};
use crate::path::{self, FieldPath};
use crate::watch::ChangeEvent;
use serde_json::Value;
use uuid::Uuid;

/// One rendered row of a field array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRow {
	/// Stable identity for list diffing.
	pub key: Uuid,
	pub index: usize,
	pub value: Value,
}

/// Handle over one array slot of a form.
///
/// Obtained from [`Form::field_array`]; cheap to recreate, all state lives
/// in the form.
pub struct FieldArray {
	form: Form,
	path: FieldPath,
}

impl Form {
	/// Manage the array at `path`. Installs an empty array if the slot does
	/// not hold one yet.
	pub fn field_array(&self, path: impl Into<FieldPath>) -> FieldArray {
		let path = path.into();
		{
			let mut state = self.inner.state.write();
			if path::get_at(&state.values, &path).map(Value::is_array) != Some(true) {
				path::set_at(&mut state.values, &path, Value::Array(vec![]));
			}
			sync_keys(&mut state, &path);
		}
		FieldArray {
			form: self.clone(),
			path,
		}
	}
}

impl FieldArray {
	pub fn path(&self) -> &FieldPath {
		&self.path
	}

	/// Current rows with their stable keys.
	pub fn fields(&self) -> Vec<ArrayRow> {
		let mut state = self.form.inner.state.write();
		sync_keys(&mut state, &self.path);
		let values = match path::get_at(&state.values, &self.path).and_then(Value::as_array) {
			Some(rows) => rows.clone(),
			None => return vec![],
		};
		let keys = state.array_keys.get(&self.path).cloned().unwrap_or_default();
		values
			.into_iter()
			.zip(keys)
			.enumerate()
			.map(|(index, (value, key))| ArrayRow { key, index, value })
			.collect()
	}

	pub fn len(&self) -> usize {
		let state = self.form.inner.state.read();
		path::get_at(&state.values, &self.path)
			.and_then(Value::as_array)
			.map(|rows| rows.len())
			.unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Append a row at the end. Returns the new row's stable key.
	pub fn append(&self, value: Value) -> Uuid {
		let key = Uuid::new_v4();
		let event = {
			let mut state = self.form.inner.state.write();
			sync_keys(&mut state, &self.path);
			let index = match path::get_at(&state.values, &self.path).and_then(Value::as_array) {
				Some(rows) => rows.len(),
				None => 0,
			};
			path::set_at(&mut state.values, &self.path.index(index), value);
			state
				.array_keys
				.entry(self.path.clone())
				.or_default()
				.push(key);
			mark_array_dirty(&mut state, &self.path);
			ChangeEvent {
				name: Some(self.path.clone()),
				values: state.values.clone(),
			}
		};
		tracing::trace!(array = %self.path, "row appended");
		self.form.emit(event);
		key
	}

	/// Remove the row at `index`, shifting later rows down while their keys
	/// travel with them. Removal of row 0 is a no-op returning `false`, so
	/// the list never becomes empty.
	pub fn remove(&self, index: usize) -> bool {
		if index == 0 {
			tracing::trace!(array = %self.path, "remove of row 0 ignored");
			return false;
		}
		let event = {
			let mut state = self.form.inner.state.write();
			sync_keys(&mut state, &self.path);
			let len = match path::get_at(&state.values, &self.path).and_then(Value::as_array) {
				Some(rows) => rows.len(),
				None => 0,
			};
			if index >= len {
				return false;
			}
			path::remove_at(&mut state.values, &self.path.index(index));
			if let Some(keys) = state.array_keys.get_mut(&self.path) {
				keys.remove(index);
			}
			shift_bookkeeping(&mut state, &self.path, index);
			mark_array_dirty(&mut state, &self.path);
			ChangeEvent {
				name: Some(self.path.clone()),
				values: state.values.clone(),
			}
		};
		self.form.shift_registry_after_remove(&self.path, index);
		tracing::trace!(array = %self.path, index, "row removed");
		self.form.emit(event);
		true
	}
}

/// Keep the key list in step with the array: keys for new rows, truncation
/// for rows that disappeared behind our back.
fn sync_keys(state: &mut FormState, path: &FieldPath) {
	let len = path::get_at(&state.values, path)
		.and_then(Value::as_array)
		.map(|rows| rows.len())
		.unwrap_or(0);
	let keys = state.array_keys.entry(path.clone()).or_default();
	while keys.len() < len {
		keys.push(Uuid::new_v4());
	}
	keys.truncate(len);
}

/// Errors, touched and dirty entries under the array re-home onto the
/// shifted indices; entries of the removed row are dropped.
fn shift_bookkeeping(state: &mut FormState, prefix: &FieldPath, removed: usize) {
	let errors = std::mem::take(&mut state.errors);
	state.errors = errors
		.into_iter()
		.filter_map(|(p, e)| path::shift_after_remove(&p, prefix, removed).map(|p| (p, e)))
		.collect();
	state.touched = std::mem::take(&mut state.touched)
		.into_iter()
		.filter_map(|p| path::shift_after_remove(&p, prefix, removed))
		.collect();
	state.dirty = std::mem::take(&mut state.dirty)
		.into_iter()
		.filter_map(|p| path::shift_after_remove(&p, prefix, removed))
		.collect();
}

fn mark_array_dirty(state: &mut FormState, path: &FieldPath) {
	let current = path::get_at(&state.values, path);
	let default = path::get_at(&state.defaults, path);
	if current == default {
		state.dirty.remove(path);
	} else {
		state.dirty.insert(path.clone());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::form::{Form, FormOptions};
	use crate::rules::FieldRules;
	use serde_json::json;

	fn phone_form() -> Form {
		Form::new(
			FormOptions::new().default_values(json!({ "ph_numbers": [{ "number": "" }] })),
		)
	}

	#[tokio::test]
	async fn test_list_starts_at_defaults_and_never_empties() {
		// Arrange
		let form = phone_form();
		let phones = form.field_array("ph_numbers");
		assert_eq!(phones.len(), 1);

		// Act & Assert: remove of row 0 is a no-op
		assert!(!phones.remove(0));
		assert_eq!(phones.len(), 1);
	}

	#[tokio::test]
	async fn test_append_and_remove_rows() {
		let form = phone_form();
		let phones = form.field_array("ph_numbers");

		phones.append(json!({ "number": "" }));
		phones.append(json!({ "number": "" }));
		assert_eq!(phones.len(), 3);

		form.input("ph_numbers.1.number", json!("555")).await;
		form.input("ph_numbers.2.number", json!("777")).await;

		assert!(phones.remove(1));
		assert_eq!(phones.len(), 2);
		assert_eq!(form.value("ph_numbers.1.number"), Some(json!("777")));
	}

	#[tokio::test]
	async fn test_row_keys_survive_removal_of_other_rows() {
		// Arrange
		let form = phone_form();
		let phones = form.field_array("ph_numbers");
		phones.append(json!({ "number": "b" }));
		let key_c = phones.append(json!({ "number": "c" }));

		let before: Vec<_> = phones.fields().into_iter().map(|row| row.key).collect();

		// Act
		phones.remove(1);

		// Assert: the surviving third row kept its key, now at index 1
		let after = phones.fields();
		assert_eq!(after.len(), 2);
		assert_eq!(after[0].key, before[0]);
		assert_eq!(after[1].key, key_c);
	}

	#[tokio::test]
	async fn test_out_of_bounds_remove_is_rejected() {
		let form = phone_form();
		let phones = form.field_array("ph_numbers");

		assert!(!phones.remove(5));
	}

	#[tokio::test]
	async fn test_bookkeeping_shifts_with_removed_rows() {
		// Arrange: per-row registration with an error on the last row
		let form = phone_form();
		let phones = form.field_array("ph_numbers");
		phones.append(json!({ "number": "" }));
		phones.append(json!({ "number": "" }));
		form.register("ph_numbers.2.number", FieldRules::new().required("Number required"));
		form.blur("ph_numbers.2.number").await;
		form.trigger("ph_numbers.2.number").await;
		assert!(form.error("ph_numbers.2.number").is_some());

		// Act: removing row 1 re-homes row 2's bookkeeping onto index 1
		phones.remove(1);

		// Assert
		assert!(form.error("ph_numbers.2.number").is_none());
		assert!(form.error("ph_numbers.1.number").is_some());
		assert!(form.is_touched("ph_numbers.1.number"));
	}

	#[tokio::test]
	async fn test_reset_restores_default_rows() {
		let form = phone_form();
		let phones = form.field_array("ph_numbers");
		phones.append(json!({ "number": "extra" }));
		assert!(form.is_dirty());

		form.reset();

		let phones = form.field_array("ph_numbers");
		assert_eq!(phones.len(), 1);
		assert!(!form.is_dirty());
	}
}
