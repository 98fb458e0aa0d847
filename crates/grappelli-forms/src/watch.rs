//! Value-change subscriptions
//!
//! A [`Watch`] is the live subscription a mounted view holds on its form.
//! Dropping it tears the subscription down; the sender side never blocks on
//! slow or absent receivers.

use crate::path::FieldPath;
use serde_json::Value;
use tokio::sync::broadcast;

/// One value-change notification: which field moved (if any single field
/// did) and the whole record after the change.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
	/// The changed path; `None` for wholesale changes (reset, resolved
	/// defaults).
	pub name: Option<FieldPath>,
	/// The full record after the change.
	pub values: Value,
}

/// Subscription handle for value-change events.
///
/// Events missed while the subscriber lagged are skipped, not replayed;
/// a watcher only ever cares about the latest state of the record.
pub struct Watch {
	receiver: broadcast::Receiver<ChangeEvent>,
}

impl Watch {
	pub(crate) fn new(receiver: broadcast::Receiver<ChangeEvent>) -> Self {
		Self { receiver }
	}

	/// Wait for the next change. Returns `None` once the form is gone.
	pub async fn changed(&mut self) -> Option<ChangeEvent> {
		loop {
			match self.receiver.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(skipped)) => {
					tracing::trace!(skipped, "watch lagged, skipping to latest");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}
}
