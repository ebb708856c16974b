//! Table settings
//!
//! Defaults applied to every [`Table`](crate::Table) built with these
//! settings. Settings can be loaded from a TOML document so that projects
//! keep page sizes and sort defaults next to their other configuration.

use crate::error::{TableError, TableResult};
use crate::query::SortDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Page size applied when grouping is active and nothing else is configured
pub const DEFAULT_GROUPED_PER_PAGE: u64 = 100;

/// Default page size
pub const DEFAULT_PER_PAGE: u64 = 12;

/// Defaults shared by tables
///
/// # Examples
///
/// ```
/// use reinhardt_tables::settings::TableSettings;
///
/// let settings = TableSettings::from_toml_str(r#"
///     per_page = 25
///     default_sort_column = "created_at"
/// "#).unwrap();
///
/// assert_eq!(settings.per_page, 25);
/// assert_eq!(settings.grouped_per_page, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
	/// Page size when the request does not supply `per_page`
	pub per_page: u64,
	/// Page size used while grouped, unless the table configures its own
	pub grouped_per_page: u64,
	/// Upper bound for request-supplied `per_page`
	pub max_per_page: Option<u64>,
	/// Sort column when the request does not supply `sort`
	pub default_sort_column: Option<String>,
	/// Sort direction when the request does not supply `direction`
	pub default_sort_direction: SortDirection,
	/// Placeholder shown in the search box
	pub search_placeholder: String,
	/// Heading shown when no records match
	pub empty_state_heading: String,
	/// Virtual field name mapped to the physical column used for sorting
	pub sort_fallbacks: BTreeMap<String, String>,
}

impl Default for TableSettings {
	fn default() -> Self {
		let mut sort_fallbacks = BTreeMap::new();
		sort_fallbacks.insert("full_name".to_string(), "first_name".to_string());

		Self {
			per_page: DEFAULT_PER_PAGE,
			grouped_per_page: DEFAULT_GROUPED_PER_PAGE,
			max_per_page: None,
			default_sort_column: Some("id".to_string()),
			default_sort_direction: SortDirection::Desc,
			search_placeholder: "Search...".to_string(),
			empty_state_heading: "No records found".to_string(),
			sort_fallbacks,
		}
	}
}

impl TableSettings {
	/// Parse settings from a TOML document; missing keys keep their defaults
	pub fn from_toml_str(source: &str) -> TableResult<Self> {
		toml::from_str(source).map_err(|e| TableError::Settings(e.to_string()))
	}

	/// Load settings from a TOML file
	pub fn from_toml_file(path: impl AsRef<Path>) -> TableResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path)
			.map_err(|e| TableError::Settings(format!("{}: {}", path.display(), e)))?;
		Self::from_toml_str(&source)
	}

	/// Clamp a request-supplied page size to `max_per_page`
	pub fn clamp_per_page(&self, per_page: u64) -> u64 {
		match self.max_per_page {
			Some(max) => per_page.min(max),
			None => per_page,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_defaults() {
		let settings = TableSettings::default();
		assert_eq!(settings.per_page, 12);
		assert_eq!(settings.grouped_per_page, 100);
		assert_eq!(settings.default_sort_column.as_deref(), Some("id"));
		assert_eq!(settings.default_sort_direction, SortDirection::Desc);
		assert_eq!(
			settings.sort_fallbacks.get("full_name").map(String::as_str),
			Some("first_name")
		);
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let settings = TableSettings::from_toml_str(
			r#"
			max_per_page = 200
			default_sort_direction = "asc"

			[sort_fallbacks]
			display_name = "last_name"
			"#,
		)
		.unwrap();

		assert_eq!(settings.per_page, 12);
		assert_eq!(settings.max_per_page, Some(200));
		assert_eq!(settings.default_sort_direction, SortDirection::Asc);
		assert_eq!(settings.sort_fallbacks.len(), 1);
		assert_eq!(settings.clamp_per_page(1000), 200);
	}

	#[test]
	fn test_invalid_toml_is_settings_error() {
		let err = TableSettings::from_toml_str("per_page = \"many\"").unwrap_err();
		assert!(matches!(err, TableError::Settings(_)));
	}

	#[test]
	fn test_from_toml_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "per_page = 30").unwrap();

		let settings = TableSettings::from_toml_file(file.path()).unwrap();
		assert_eq!(settings.per_page, 30);
	}

	#[test]
	fn test_missing_file_is_settings_error() {
		let err = TableSettings::from_toml_file("/nonexistent/tables.toml").unwrap_err();
		assert!(matches!(err, TableError::Settings(_)));
	}
}
