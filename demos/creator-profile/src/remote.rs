//! Placeholder API client
//!
//! Two read-only GET calls against a public placeholder JSON API: one user
//! record to seed default values, and a by-email query backing the
//! availability check.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Environment override for the API base URL, so the demo can be pointed
/// at a local stub.
pub const BASE_URL_ENV: &str = "PLACEHOLDER_API_URL";

#[derive(Debug, Error)]
pub enum RemoteError {
	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),
}

/// The slice of the placeholder user record this demo reads.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
	pub id: u64,
	pub name: String,
	pub email: String,
}

/// Directory lookups the profile form depends on. The form wiring is
/// generic over this seam so tests run against an in-memory stub.
#[async_trait]
pub trait UserDirectory: Send + Sync {
	async fn user(&self, id: u64) -> Result<UserRecord, RemoteError>;
	async fn email_taken(&self, email: &str) -> Result<bool, RemoteError>;
}

#[derive(Clone)]
pub struct PlaceholderClient {
	http: reqwest::Client,
	base_url: String,
}

impl PlaceholderClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into(),
		}
	}

	pub fn from_env() -> Self {
		let base_url =
			std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
		Self::new(base_url)
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}
}

#[async_trait]
impl UserDirectory for PlaceholderClient {
	async fn user(&self, id: u64) -> Result<UserRecord, RemoteError> {
		let url = format!("{}/users/{}", self.base_url, id);
		let user: UserRecord = self
			.http
			.get(url)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		tracing::debug!(id = user.id, user = %user.name, "fetched user record");
		Ok(user)
	}

	async fn email_taken(&self, email: &str) -> Result<bool, RemoteError> {
		let url = format!("{}/users", self.base_url);
		let matches: Vec<UserRecord> = self
			.http
			.get(url)
			.query(&[("email", email)])
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		Ok(!matches.is_empty())
	}
}
