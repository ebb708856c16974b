//! Error types for table execution

use thiserror::Error;

/// Table error type
///
/// Resolution problems during query execution (unknown sort columns, bad
/// relations, unknown groups) never surface as errors; they are logged and
/// skipped. Only parse failures and data source failures are returned.
#[derive(Debug, Error)]
pub enum TableError {
	/// The raw request query string could not be decoded
	#[error("Invalid query string: {0}")]
	InvalidQueryString(String),

	/// The data source failed while fetching rows or counts
	#[error("Backend error: {0}")]
	Backend(String),

	/// A record action could not be resolved for a row
	#[error("Action '{action}' failed: {message}")]
	Action {
		/// Name of the failing action
		action: String,
		/// Failure description
		message: String,
	},

	/// Table settings could not be loaded
	#[error("Settings error: {0}")]
	Settings(String),

	/// JSON serialization failed
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

impl TableError {
	/// Shorthand for an action failure
	pub fn action(action: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Action {
			action: action.into(),
			message: message.into(),
		}
	}
}
