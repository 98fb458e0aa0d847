//! The form-state controller
//!
//! [`Form`] owns one transient record and everything the surrounding view
//! needs to know about it: current values, per-field errors, touched/dirty
//! bookkeeping, submission flags, and the machinery that schedules
//! validation according to the configured trigger policy.
//!
//! A `Form` is a cheaply cloneable handle; clones observe the same state,
//! which is how a background task resolving default values and the event
//! loop driving inputs share one form.

use crate::error::{FieldError, FormError, FormErrors, FormResult};
use crate::path::{self, FieldPath};
use crate::resolver::Resolver;
use crate::rules::{is_empty_value, FieldRules};
use crate::watch::{ChangeEvent, Watch};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Validation trigger policy.
///
/// `OnTouched` reproduces the "validate on first blur, thereafter on every
/// change" behavior. After the first submission every mode re-validates on
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
	/// Validate only when the form is submitted.
	#[default]
	OnSubmit,
	/// Validate whenever a field loses focus.
	OnBlur,
	/// Validate on every change.
	OnChange,
	/// Validate on first blur, thereafter on every change.
	OnTouched,
	/// Validate on both blur and change.
	All,
}

type DefaultsLoaderFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// Configuration a view supplies when mounting a form.
///
/// # Examples
///
/// ```
/// use grappelli_forms::{Form, FormOptions, Mode};
/// use serde_json::json;
///
/// let form = Form::new(
///     FormOptions::new()
///         .default_values(json!({ "username": "", "email": "" }))
///         .mode(Mode::OnTouched),
/// );
/// assert!(!form.is_loading());
/// assert_eq!(form.values(), json!({ "username": "", "email": "" }));
/// ```
pub struct FormOptions {
	defaults: Value,
	loader: Option<DefaultsLoaderFn>,
	mode: Mode,
	resolver: Option<Arc<dyn Resolver>>,
}

impl FormOptions {
	pub fn new() -> Self {
		Self {
			defaults: Value::Object(serde_json::Map::new()),
			loader: None,
			mode: Mode::default(),
			resolver: None,
		}
	}

	/// Synchronous default values.
	pub fn default_values(mut self, values: Value) -> Self {
		self.defaults = values;
		self
	}

	/// Placeholder defaults installed at mount, overwritten once `loader`
	/// resolves (see [`Form::resolve_default_values`]).
	pub fn default_values_async<F, Fut>(mut self, placeholder: Value, loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Value, String>> + Send + 'static,
	{
		self.defaults = placeholder;
		self.loader = Some(Arc::new(move || Box::pin(loader())));
		self
	}

	pub fn mode(mut self, mode: Mode) -> Self {
		self.mode = mode;
		self
	}

	/// Attach an external whole-record validator.
	pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
		self.resolver = Some(Arc::new(resolver));
		self
	}
}

impl Default for FormOptions {
	fn default() -> Self {
		Self::new()
	}
}

/// Propagation flags for [`Form::set_value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetValueOptions {
	pub should_validate: bool,
	pub should_dirty: bool,
	pub should_touch: bool,
}

impl SetValueOptions {
	/// Validate, dirty and touch in one go.
	pub fn all() -> Self {
		Self {
			should_validate: true,
			should_dirty: true,
			should_touch: true,
		}
	}
}

struct Registration {
	path: FieldPath,
	rules: FieldRules,
}

pub(crate) struct FormState {
	pub(crate) values: Value,
	pub(crate) defaults: Value,
	pub(crate) errors: FormErrors,
	pub(crate) touched: BTreeSet<FieldPath>,
	pub(crate) dirty: BTreeSet<FieldPath>,
	pub(crate) array_keys: BTreeMap<FieldPath, Vec<Uuid>>,
	pub(crate) is_loading: bool,
	pub(crate) is_submitting: bool,
	pub(crate) is_submitted: bool,
	pub(crate) is_submit_successful: bool,
	pub(crate) submit_count: u32,
}

pub(crate) struct FormInner {
	pub(crate) state: RwLock<FormState>,
	registry: RwLock<Vec<Registration>>,
	mode: Mode,
	resolver: Option<Arc<dyn Resolver>>,
	loader: Option<DefaultsLoaderFn>,
	// Mount/reset epoch; async completions from an older epoch are dropped.
	generation: AtomicU64,
	events: broadcast::Sender<ChangeEvent>,
}

/// Handle over one form instance.
pub struct Form {
	pub(crate) inner: Arc<FormInner>,
}

impl Clone for Form {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl Form {
	/// Mount a new form. Values start at the (placeholder) defaults; when an
	/// asynchronous loader is configured the form reports `is_loading` until
	/// [`Form::resolve_default_values`] completes.
	pub fn new(options: FormOptions) -> Self {
		let (events, _) = broadcast::channel(64);
		let is_loading = options.loader.is_some();
		let form = Self {
			inner: Arc::new(FormInner {
				state: RwLock::new(FormState {
					values: options.defaults.clone(),
					defaults: options.defaults,
					errors: FormErrors::new(),
					touched: BTreeSet::new(),
					dirty: BTreeSet::new(),
					array_keys: BTreeMap::new(),
					is_loading,
					is_submitting: false,
					is_submitted: false,
					is_submit_successful: false,
					submit_count: 0,
				}),
				registry: RwLock::new(Vec::new()),
				mode: options.mode,
				resolver: options.resolver,
				loader: options.loader,
				generation: AtomicU64::new(0),
				events,
			}),
		};
		tracing::debug!(mode = ?form.inner.mode, "form mounted");
		form
	}

	/// Await the asynchronous defaults loader and install its record as both
	/// defaults and values. A resolution arriving after a reset is discarded.
	/// On failure the placeholder defaults stay in place.
	pub async fn resolve_default_values(&self) -> FormResult<()> {
		let Some(loader) = self.inner.loader.clone() else {
			return Ok(());
		};
		let generation = self.generation();
		let result = loader().await;
		let event = {
			let mut state = self.inner.state.write();
			if self.generation() != generation {
				tracing::warn!("discarding default values resolved after reset");
				return Ok(());
			}
			state.is_loading = false;
			match result {
				Ok(values) => {
					state.defaults = values.clone();
					state.values = values;
					state.dirty.clear();
					ChangeEvent {
						name: None,
						values: state.values.clone(),
					}
				}
				Err(message) => {
					drop(state);
					tracing::warn!(%message, "default values resolver failed; keeping placeholder defaults");
					return Err(FormError::DefaultValues(message));
				}
			}
		};
		tracing::debug!("default values resolved");
		self.emit(event);
		Ok(())
	}

	/// Bind a named slot and its rules. Re-registering a path replaces the
	/// rules.
	pub fn register(&self, path: impl Into<FieldPath>, rules: FieldRules) {
		let path = path.into();
		tracing::trace!(field = %path, ?rules, "register");
		let mut registry = self.inner.registry.write();
		match registry.iter_mut().find(|r| r.path == path) {
			Some(existing) => existing.rules = rules,
			None => registry.push(Registration { path, rules }),
		}
	}

	/// Drop a binding together with its error slot and bookkeeping.
	pub fn unregister(&self, path: impl Into<FieldPath>) {
		let path = path.into();
		self.inner.registry.write().retain(|r| r.path != path);
		let mut state = self.inner.state.write();
		state.errors.remove(&path);
		state.touched.remove(&path);
		state.dirty.remove(&path);
	}

	/// Keystroke-level change: coerce, write, track dirtiness, and
	/// re-validate when the trigger policy calls for it.
	pub async fn input(&self, path: impl Into<FieldPath>, raw: Value) {
		let path = path.into();
		if self.is_disabled(&path) {
			tracing::trace!(field = %path, "input ignored, field disabled");
			return;
		}
		let rules = self.rules_for(&path);
		let coerced = match &rules {
			Some(rules) => match rules.apply_coercion(raw) {
				Ok(value) => value,
				Err(error) => {
					tracing::debug!(field = %path, message = %error, "coercion failed");
					let event = {
						let mut state = self.inner.state.write();
						path::set_at(&mut state.values, &path, Value::Null);
						update_dirty(&mut state, &path);
						state.errors.insert(path.clone(), error);
						ChangeEvent {
							name: Some(path),
							values: state.values.clone(),
						}
					};
					self.emit(event);
					return;
				}
			},
			None => raw,
		};
		let event = {
			let mut state = self.inner.state.write();
			path::set_at(&mut state.values, &path, coerced);
			update_dirty(&mut state, &path);
			ChangeEvent {
				name: Some(path.clone()),
				values: state.values.clone(),
			}
		};
		self.emit(event);
		if self.should_validate_on_change(&path) {
			self.validate_field(&path).await;
		}
	}

	/// Focus left the field: mark it touched and validate when the policy
	/// says so.
	pub async fn blur(&self, path: impl Into<FieldPath>) {
		let path = path.into();
		let newly_touched = self.inner.state.write().touched.insert(path.clone());
		if newly_touched {
			tracing::trace!(field = %path, "touched");
		}
		if matches!(self.inner.mode, Mode::OnTouched | Mode::OnBlur | Mode::All) {
			self.validate_field(&path).await;
		}
	}

	/// Programmatic set with propagation flags.
	pub async fn set_value(
		&self,
		path: impl Into<FieldPath>,
		value: Value,
		options: SetValueOptions,
	) {
		let path = path.into();
		let event = {
			let mut state = self.inner.state.write();
			path::set_at(&mut state.values, &path, value);
			if options.should_dirty {
				update_dirty(&mut state, &path);
			}
			if options.should_touch {
				state.touched.insert(path.clone());
			}
			ChangeEvent {
				name: Some(path.clone()),
				values: state.values.clone(),
			}
		};
		tracing::trace!(field = %path, "set_value");
		self.emit(event);
		if options.should_validate {
			self.validate_field(&path).await;
		}
	}

	/// Current value at `path`, if any.
	pub fn value(&self, path: impl Into<FieldPath>) -> Option<Value> {
		let path = path.into();
		path::get_at(&self.inner.state.read().values, &path).cloned()
	}

	/// The whole record as it currently stands.
	pub fn values(&self) -> Value {
		self.inner.state.read().values.clone()
	}

	/// Current error map.
	pub fn errors(&self) -> FormErrors {
		self.inner.state.read().errors.clone()
	}

	/// Error slot of one field.
	pub fn error(&self, path: impl Into<FieldPath>) -> Option<FieldError> {
		let path = path.into();
		self.inner.state.read().errors.get(&path).cloned()
	}

	/// Force validation of a single field. Returns whether it is valid.
	pub async fn trigger(&self, path: impl Into<FieldPath>) -> bool {
		let path = path.into();
		self.validate_field(&path).await
	}

	/// Force validation of the whole form. Field validations run
	/// concurrently; each one is independent and last-write-wins on its own
	/// error slot.
	pub async fn trigger_all(&self) -> bool {
		let generation = self.generation();
		match self.run_validation(generation).await {
			Some(errors) => {
				let valid = errors.is_empty();
				tracing::debug!(valid, error_count = errors.len(), "full validation");
				let mut state = self.inner.state.write();
				if self.generation() == generation {
					state.errors = errors;
				}
				valid
			}
			None => self.is_valid(),
		}
	}

	/// Validate everything and, when the record is clean, hand back the
	/// payload with disabled fields excluded. Flags (`is_submitting`,
	/// `is_submitted`, `is_submit_successful`, `submit_count`) are
	/// maintained across the call. A submission interrupted by a reset
	/// reports failure with an empty error map.
	pub async fn submit(&self) -> Result<Value, FormErrors> {
		let generation = self.generation();
		self.inner.state.write().is_submitting = true;
		tracing::debug!("submit started");
		let Some(errors) = self.run_validation(generation).await else {
			tracing::warn!("submission discarded, form was reset while validating");
			return Err(FormErrors::new());
		};
		let mut state = self.inner.state.write();
		if self.generation() != generation {
			tracing::warn!("submission discarded, form was reset while validating");
			return Err(FormErrors::new());
		}
		state.is_submitting = false;
		state.is_submitted = true;
		state.submit_count += 1;
		state.is_submit_successful = errors.is_empty();
		state.errors = errors.clone();
		if errors.is_empty() {
			let payload = self.payload(&state.values);
			tracing::debug!(submit_count = state.submit_count, "form submitted");
			Ok(payload)
		} else {
			tracing::debug!(%errors, "submission blocked");
			Err(errors)
		}
	}

	/// Restore defaults and clear errors, bookkeeping and submit flags.
	/// Bumps the generation so in-flight asynchronous work is discarded.
	pub fn reset(&self) {
		self.inner.generation.fetch_add(1, Ordering::AcqRel);
		let event = {
			let mut state = self.inner.state.write();
			state.values = state.defaults.clone();
			state.errors.clear();
			state.touched.clear();
			state.dirty.clear();
			state.array_keys.clear();
			state.is_loading = false;
			state.is_submitting = false;
			state.is_submitted = false;
			state.is_submit_successful = false;
			state.submit_count = 0;
			ChangeEvent {
				name: None,
				values: state.values.clone(),
			}
		};
		tracing::debug!("form reset");
		self.emit(event);
	}

	/// Like [`Form::reset`], but installs a new default record first.
	pub fn reset_to(&self, defaults: Value) {
		{
			let mut state = self.inner.state.write();
			state.defaults = defaults;
		}
		self.reset();
	}

	/// Inject a field error outside the validation path. The error is
	/// rendered exactly like a rule failure and survives until the field is
	/// next validated or the slot is cleared.
	pub fn set_error(&self, path: impl Into<FieldPath>, message: impl Into<String>) {
		let path = path.into();
		let error = FieldError::manual(message);
		tracing::debug!(field = %path, message = %error, "manual error set");
		self.inner.state.write().errors.insert(path, error);
	}

	/// Clear one field's error slot.
	pub fn clear_error(&self, path: impl Into<FieldPath>) {
		let path = path.into();
		self.inner.state.write().errors.remove(&path);
	}

	/// Clear every error slot.
	pub fn clear_errors(&self) {
		self.inner.state.write().errors.clear();
	}

	/// Whether the field's disabled predicate currently holds.
	pub fn is_disabled(&self, path: impl Into<FieldPath>) -> bool {
		let path = path.into();
		match self.rules_for(&path) {
			Some(rules) => {
				let state = self.inner.state.read();
				rules.is_disabled_for(&state.values)
			}
			None => false,
		}
	}

	/// Subscribe to value-change events. Dropping the handle unsubscribes.
	pub fn watch(&self) -> Watch {
		Watch::new(self.inner.events.subscribe())
	}

	pub fn is_loading(&self) -> bool {
		self.inner.state.read().is_loading
	}

	/// Whether any field differs from its default.
	pub fn is_dirty(&self) -> bool {
		!self.inner.state.read().dirty.is_empty()
	}

	/// Whether the error map is empty.
	pub fn is_valid(&self) -> bool {
		self.inner.state.read().errors.is_empty()
	}

	pub fn is_submitting(&self) -> bool {
		self.inner.state.read().is_submitting
	}

	pub fn is_submitted(&self) -> bool {
		self.inner.state.read().is_submitted
	}

	pub fn is_submit_successful(&self) -> bool {
		self.inner.state.read().is_submit_successful
	}

	pub fn submit_count(&self) -> u32 {
		self.inner.state.read().submit_count
	}

	pub fn is_touched(&self, path: impl Into<FieldPath>) -> bool {
		let path = path.into();
		self.inner.state.read().touched.contains(&path)
	}

	pub fn is_field_dirty(&self, path: impl Into<FieldPath>) -> bool {
		let path = path.into();
		self.inner.state.read().dirty.contains(&path)
	}

	pub fn touched_paths(&self) -> Vec<FieldPath> {
		self.inner.state.read().touched.iter().cloned().collect()
	}

	pub fn dirty_paths(&self) -> Vec<FieldPath> {
		self.inner.state.read().dirty.iter().cloned().collect()
	}

	// ------------------------------------------------------------------
	// internals

	pub(crate) fn generation(&self) -> u64 {
		self.inner.generation.load(Ordering::Acquire)
	}

	pub(crate) fn emit(&self, event: ChangeEvent) {
		// Nobody listening is fine.
		let _ = self.inner.events.send(event);
	}

	fn rules_for(&self, path: &FieldPath) -> Option<FieldRules> {
		self.inner
			.registry
			.read()
			.iter()
			.find(|r| r.path == *path)
			.map(|r| r.rules.clone())
	}

	fn registrations(&self) -> Vec<(FieldPath, FieldRules)> {
		self.inner
			.registry
			.read()
			.iter()
			.map(|r| (r.path.clone(), r.rules.clone()))
			.collect()
	}

	pub(crate) fn shift_registry_after_remove(&self, prefix: &FieldPath, removed: usize) {
		let mut registry = self.inner.registry.write();
		let mut shifted = Vec::with_capacity(registry.len());
		for registration in registry.drain(..) {
			if let Some(path) = path::shift_after_remove(&registration.path, prefix, removed) {
				shifted.push(Registration {
					path,
					rules: registration.rules,
				});
			}
		}
		*registry = shifted;
	}

	fn should_validate_on_change(&self, path: &FieldPath) -> bool {
		let state = self.inner.state.read();
		if state.is_submitted {
			return true;
		}
		match self.inner.mode {
			Mode::OnChange | Mode::All => true,
			Mode::OnTouched => state.touched.contains(path),
			Mode::OnSubmit | Mode::OnBlur => false,
		}
	}

	/// Validate one field against a snapshot of the record; the outcome is
	/// written back only if the generation is unchanged. Returns whether
	/// the field ended up valid.
	async fn validate_field(&self, path: &FieldPath) -> bool {
		let generation = self.generation();
		let values = self.values();
		let rules = self.rules_for(path);

		if let Some(rules) = &rules
			&& rules.is_disabled_for(&values)
		{
			self.inner.state.write().errors.remove(path);
			return true;
		}

		let mut outcome = None;
		if let Some(resolver) = &self.inner.resolver {
			outcome = resolver.resolve(&values).await.remove(path);
		}
		if outcome.is_none()
			&& let Some(rules) = &rules
		{
			outcome = check_field(rules, path, &values).await;
		}

		let mut state = self.inner.state.write();
		if self.generation() != generation {
			tracing::warn!(field = %path, "discarding validation outcome from a stale run");
			return outcome.is_none();
		}
		match outcome {
			Some(error) => {
				tracing::debug!(field = %path, kind = ?error.kind, message = %error, "field invalid");
				state.errors.insert(path.clone(), error);
				false
			}
			None => {
				state.errors.remove(path);
				true
			}
		}
	}

	/// Full-form validation against a snapshot. Returns `None` when the
	/// form was reset while validating.
	async fn run_validation(&self, generation: u64) -> Option<FormErrors> {
		let values = self.values();
		let registrations = self.registrations();

		let mut errors = match &self.inner.resolver {
			Some(resolver) => resolver.resolve(&values).await,
			None => FormErrors::new(),
		};

		let pending: Vec<_> = registrations
			.iter()
			.filter(|(path, rules)| !errors.contains(path) && !rules.is_disabled_for(&values))
			.map(|(path, rules)| {
				let values = values.clone();
				let path = path.clone();
				let rules = rules.clone();
				async move {
					let outcome = check_field(&rules, &path, &values).await;
					(path, outcome)
				}
			})
			.collect();

		for (path, outcome) in futures::future::join_all(pending).await {
			if let Some(error) = outcome {
				errors.insert(path, error);
			}
		}

		if self.generation() != generation {
			return None;
		}
		Some(errors)
	}

	/// The record as submitted: disabled fields are stripped out.
	fn payload(&self, values: &Value) -> Value {
		let mut payload = values.clone();
		for (path, rules) in self.registrations() {
			if rules.is_disabled_for(values) {
				path::remove_at(&mut payload, &path);
			}
		}
		payload
	}
}

/// Sync rules first, then asynchronous predicates in order; first failure
/// wins. Empty optional values skip the predicates entirely.
async fn check_field(rules: &FieldRules, path: &FieldPath, values: &Value) -> Option<FieldError> {
	let value = path::get_at(values, path).cloned();
	if let Err(error) = rules.check_sync(value.as_ref(), values) {
		return Some(error);
	}
	if is_empty_value(value.as_ref()) {
		return None;
	}
	for (name, predicate) in rules.async_validators() {
		tracing::trace!(field = %path, validator = %name, "running async predicate");
		if let Err(error) = predicate(value.clone().unwrap_or(Value::Null), values.clone()).await {
			return Some(error);
		}
	}
	None
}

fn update_dirty(state: &mut FormState, path: &FieldPath) {
	let current = path::get_at(&state.values, path);
	let default = path::get_at(&state.defaults, path);
	let same = match (current, default) {
		(None, None) => true,
		(Some(Value::Null), None) | (None, Some(Value::Null)) => true,
		(Some(a), Some(b)) => a == b,
		_ => false,
	};
	if same {
		state.dirty.remove(path);
	} else {
		state.dirty.insert(path.clone());
	}
}
