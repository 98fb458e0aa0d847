//! Creator-profile form wiring
//!
//! Builds the rich form: ten-odd fields including a nested social block, a
//! fixed pair of phone slots, a resizable list of extra numbers, numeric
//! and date coercion, and an asynchronous availability check on the email
//! address. Default values are seeded from a remote user record.

use crate::remote::UserDirectory;
use chrono::Local;
use grappelli::{is_empty_value, FieldError, FieldRules, Form, FormOptions, Mode};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Values the form mounts with while the remote seed is in flight.
pub fn placeholder_defaults() -> Value {
	json!({
		"username": "",
		"email": "",
		"channel": "",
		"social": { "twitter": "", "facebook": "" },
		"phones": ["", ""],
		"ph_numbers": [{ "number": "" }],
		"age": null,
		"birth_date": null,
	})
}

/// The record installed once the remote user fetch resolves; only the
/// email comes from the wire.
pub fn seeded_defaults(user_email: &str) -> Value {
	json!({
		"username": "Default Creator",
		"email": user_email,
		"channel": "Default Channel",
		"social": { "twitter": "", "facebook": "" },
		"phones": ["111", "333"],
		"ph_numbers": [{ "number": "" }],
		"age": 20,
		"birth_date": Local::now().date_naive().format("%Y-%m-%d").to_string(),
	})
}

/// Build the profile form against a user directory.
pub fn build_profile_form(directory: Arc<dyn UserDirectory>) -> Form {
	let seed = directory.clone();
	let form = Form::new(
		FormOptions::new()
			.default_values_async(placeholder_defaults(), move || {
				let seed = seed.clone();
				async move {
					let user = seed.user(1).await.map_err(|e| e.to_string())?;
					Ok(seeded_defaults(&user.email))
				}
			})
			.mode(Mode::OnTouched),
	);

	form.register("username", FieldRules::new().required("Username required"));

	let lookup = directory.clone();
	form.register(
		"email",
		FieldRules::new()
			.required("Email required")
			.pattern(EMAIL_REGEX.clone(), "Email not valid")
			.validate("not_admin", |value, _record| {
				if value.as_str() == Some("admin@example.com") {
					Err("Enter a different email address".into())
				} else {
					Ok(())
				}
			})
			.validate("not_blacklisted", |value, _record| {
				if value.as_str().is_some_and(|s| s.ends_with("admin@baddomain.com")) {
					Err("This domain is not supported".into())
				} else {
					Ok(())
				}
			})
			.validate_async("email_available", move |value, _record| {
				let lookup = lookup.clone();
				async move {
					let email = value.as_str().unwrap_or_default().to_string();
					match lookup.email_taken(&email).await {
						Ok(true) => Err(FieldError::validate("Email already exists")),
						Ok(false) => Ok(()),
						Err(error) => {
							tracing::warn!(%error, "availability check failed");
							Err(FieldError::remote("Could not verify email address"))
						}
					}
				}
			}),
	);

	form.register("channel", FieldRules::new().required("Channel required"));

	form.register(
		"social.twitter",
		FieldRules::new()
			.required("Twitter required")
			.disabled_when(|record| is_empty_value(record.get("channel"))),
	);
	form.register("social.facebook", FieldRules::new().required("Facebook required"));

	form.register("phones.0", FieldRules::new().required("Primary phone required"));
	form.register("phones.1", FieldRules::new().required("Secondary phone required"));

	form.register("age", FieldRules::new().required("Age required").coerce_number());
	form.register(
		"birth_date",
		FieldRules::new().required("Birth date required").coerce_date(),
	);

	form
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::remote::{RemoteError, UserRecord};
	use async_trait::async_trait;
	use grappelli::{ErrorKind, FieldPath};

	/// In-memory directory: a fixed seed user plus a taken-address list.
	struct StubDirectory {
		taken: Vec<&'static str>,
		fail_lookups: bool,
	}

	impl StubDirectory {
		fn empty() -> Arc<Self> {
			Arc::new(Self {
				taken: vec![],
				fail_lookups: false,
			})
		}

		fn with_taken(taken: Vec<&'static str>) -> Arc<Self> {
			Arc::new(Self {
				taken,
				fail_lookups: false,
			})
		}

		fn failing() -> Arc<Self> {
			Arc::new(Self {
				taken: vec![],
				fail_lookups: true,
			})
		}
	}

	#[async_trait]
	impl UserDirectory for StubDirectory {
		async fn user(&self, id: u64) -> Result<UserRecord, RemoteError> {
			Ok(UserRecord {
				id,
				name: "Leanne Graham".to_string(),
				email: "sincere@april.biz".to_string(),
			})
		}

		async fn email_taken(&self, email: &str) -> Result<bool, RemoteError> {
			if self.fail_lookups {
				// Shape matches what reqwest yields on a dead endpoint.
				let error = reqwest::Client::new()
					.get("http://127.0.0.1:1/unreachable")
					.send()
					.await
					.expect_err("sending to a closed port must fail");
				return Err(RemoteError::Transport(error));
			}
			Ok(self.taken.contains(&email))
		}
	}

	async fn fill_valid(form: &Form) {
		form.input("username", json!("django")).await;
		form.input("email", json!("user@example.com")).await;
		form.input("channel", json!("Hot Club")).await;
		form.input("social.twitter", json!("@quintette")).await;
		form.input("social.facebook", json!("quintette")).await;
		form.input("phones.0", json!("111")).await;
		form.input("phones.1", json!("333")).await;
		form.input("age", json!("20")).await;
		form.input("birth_date", json!("1910-01-23")).await;
	}

	#[tokio::test]
	async fn test_empty_required_fields_block_submission() {
		// Arrange: placeholder defaults, nothing filled in
		let form = build_profile_form(StubDirectory::empty());

		// Act
		let errors = form.submit().await.unwrap_err();

		// Assert: every required field reports, and submission is blocked
		for (field, message) in [
			("username", "Username required"),
			("email", "Email required"),
			("channel", "Channel required"),
			("social.facebook", "Facebook required"),
			("phones.0", "Primary phone required"),
			("phones.1", "Secondary phone required"),
			("age", "Age required"),
			("birth_date", "Birth date required"),
		] {
			assert_eq!(
				errors.get(&FieldPath::from(field)).map(|e| e.message.as_str()),
				Some(message),
				"field: {field}"
			);
		}
		// Twitter is disabled while channel is empty, so it must not block.
		assert!(!errors.contains(&FieldPath::from("social.twitter")));
		assert!(!form.is_submit_successful());
	}

	#[tokio::test]
	async fn test_admin_email_is_always_rejected() {
		let form = build_profile_form(StubDirectory::empty());

		form.input("email", json!("admin@example.com")).await;
		form.blur("email").await;

		assert_eq!(
			form.error("email").unwrap().message,
			"Enter a different email address"
		);
	}

	#[tokio::test]
	async fn test_blacklisted_domain_is_rejected() {
		let form = build_profile_form(StubDirectory::empty());

		form.input("email", json!("anything.admin@baddomain.com")).await;
		form.blur("email").await;

		assert_eq!(form.error("email").unwrap().message, "This domain is not supported");
	}

	#[tokio::test]
	async fn test_taken_email_is_rejected_by_the_async_check() {
		let form = build_profile_form(StubDirectory::with_taken(vec!["taken@example.com"]));

		form.input("email", json!("taken@example.com")).await;
		form.blur("email").await;

		assert_eq!(form.error("email").unwrap().message, "Email already exists");
	}

	#[tokio::test]
	async fn test_failed_availability_lookup_is_a_remote_error() {
		let form = build_profile_form(StubDirectory::failing());

		form.input("email", json!("user@example.com")).await;
		form.blur("email").await;

		let error = form.error("email").unwrap();
		assert_eq!(error.kind, ErrorKind::Remote);
		assert_eq!(error.message, "Could not verify email address");
	}

	#[tokio::test]
	async fn test_twitter_disabled_exactly_while_channel_empty() {
		let form = build_profile_form(StubDirectory::empty());

		assert!(form.is_disabled("social.twitter"));
		form.input("channel", json!("Hot Club")).await;
		assert!(!form.is_disabled("social.twitter"));
		form.input("channel", json!("")).await;
		assert!(form.is_disabled("social.twitter"));
	}

	#[tokio::test]
	async fn test_defaults_seed_from_the_directory() {
		// Arrange
		let form = build_profile_form(StubDirectory::empty());
		assert!(form.is_loading());

		// Act
		form.resolve_default_values().await.unwrap();

		// Assert: email came off the wire, the rest is canned
		assert!(!form.is_loading());
		assert_eq!(form.value("email"), Some(json!("sincere@april.biz")));
		assert_eq!(form.value("username"), Some(json!("Default Creator")));
		assert_eq!(form.value("phones"), Some(json!(["111", "333"])));
		assert!(!form.is_dirty());
	}

	#[tokio::test]
	async fn test_phone_list_grows_and_never_drops_below_one() {
		let form = build_profile_form(StubDirectory::empty());
		let phones = form.field_array("ph_numbers");
		assert_eq!(phones.len(), 1);

		phones.append(json!({ "number": "" }));
		form.input("ph_numbers.1.number", json!("555")).await;
		assert_eq!(phones.len(), 2);

		assert!(!phones.remove(0));
		assert!(phones.remove(1));
		assert_eq!(phones.len(), 1);
	}

	#[tokio::test]
	async fn test_valid_record_submits_and_coerces() {
		// Arrange
		let form = build_profile_form(StubDirectory::empty());
		fill_valid(&form).await;

		// Act
		let payload = form.submit().await.unwrap();

		// Assert: age and birth date were coerced on input
		assert_eq!(payload["age"], json!(20));
		assert_eq!(payload["birth_date"], json!("1910-01-23"));
		assert_eq!(payload["social"]["twitter"], json!("@quintette"));
		assert!(form.is_submit_successful());

		// The view resets after a successful submission
		form.reset();
		assert_eq!(form.values(), placeholder_defaults());
		assert!(!form.is_submit_successful());
	}
}
