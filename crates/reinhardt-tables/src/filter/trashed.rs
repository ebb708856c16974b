//! Soft-delete visibility filter

use super::base::{Filter, FilterBuilder, FilterCore};
use crate::query::{QueryBuilder, TrashedMode};
use crate::request::FilterValue;
use serde_json::{Map, Value, json};

/// Filter switching between non-deleted, all and only soft-deleted rows
///
/// Named `trashed` with default state `without`. For `with` and `only` the
/// filter also strips the global soft-delete scope from the base query, so
/// the executor runs it ahead of search and the other filters.
#[derive(Debug, Clone)]
pub struct TrashedFilter {
	core: FilterCore,
}

impl TrashedFilter {
	/// Trashed filter under the conventional `trashed` name
	pub fn make() -> Self {
		Self::named("trashed")
	}

	/// Trashed filter under a custom name
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			core: FilterCore::new(name),
		}
		.label("Deleted records")
		.default("without")
	}

	/// Visibility selected by a request value; blank means `without`
	pub fn mode(value: &FilterValue) -> Option<TrashedMode> {
		match value.as_str() {
			Some("") | Some("without") => Some(TrashedMode::Without),
			Some("with") => Some(TrashedMode::With),
			Some("only") => Some(TrashedMode::Only),
			_ => None,
		}
	}
}

impl FilterBuilder for TrashedFilter {
	fn core_mut(&mut self) -> &mut FilterCore {
		&mut self.core
	}
}

impl Filter for TrashedFilter {
	fn core(&self) -> &FilterCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"TrashedFilter"
	}

	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		if let Some(mode) = Self::mode(value) {
			query.trashed(mode);
		}
	}

	fn modifies_base_query(&self) -> bool {
		true
	}

	fn modify_base_query(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		if matches!(Self::mode(value), Some(TrashedMode::With | TrashedMode::Only)) {
			query.remove_soft_delete_scope();
		}
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = Map::new();
		props.insert(
			"options".to_string(),
			json!([
				{"value": "without", "label": "Without deleted records"},
				{"value": "with", "label": "With deleted records"},
				{"value": "only", "label": "Only deleted records"},
			]),
		);
		props.insert("isTrashedFilter".to_string(), json!(true));
		props
	}
}
