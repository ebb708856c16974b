//! Toggle-gated query filter

use super::base::{Filter, FilterBuilder, FilterCore};
use crate::query::QueryBuilder;
use crate::request::FilterValue;

/// Filter rendered as a toggle that runs its query only when switched on
///
/// `""`, `"0"`, `"false"` and empty lists leave the query untouched.
#[derive(Debug, Clone)]
pub struct QueryFilter {
	core: FilterCore,
}

impl QueryFilter {
	/// Query filter named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: FilterCore::new(name),
		}
	}

	fn is_on(value: &FilterValue) -> bool {
		match value {
			FilterValue::Single(single) => !matches!(single.as_str(), "" | "0" | "false"),
			FilterValue::Many(items) => !items.is_empty(),
		}
	}
}

impl FilterBuilder for QueryFilter {
	fn core_mut(&mut self) -> &mut FilterCore {
		&mut self.core
	}
}

impl Filter for QueryFilter {
	fn core(&self) -> &FilterCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"QueryFilter"
	}

	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		if Self::is_on(value) {
			self.core.run_query(query, value);
		}
	}
}
