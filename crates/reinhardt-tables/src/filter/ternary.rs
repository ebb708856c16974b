//! Three-state filter

use super::base::{Filter, FilterBuilder, FilterCore};
use crate::query::QueryBuilder;
use crate::request::FilterValue;
use crate::value::as_flag;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

/// Query mutation for one ternary state
pub type StateQuery = Arc<dyn Fn(&mut dyn QueryBuilder) + Send + Sync>;

/// Filter with true, false and blank states
///
/// Blank (`""`, `"blank"` or a list) runs the blank query, if any. Other
/// values are read as booleans (`1`, `true`, `on`, `yes`) and run the
/// matching state query. Without state queries the attribute is compared
/// with `true`/`false`, or tested for `NOT NULL`/`NULL` in nullable mode.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::filter::{Filter, TernaryFilter};
/// use reinhardt_tables::query::{Condition, MemoryQuery, ModelMeta};
/// use reinhardt_tables::request::FilterValue;
/// use serde_json::json;
///
/// let filter = TernaryFilter::make("email_verified_at").nullable(true);
/// let mut query = MemoryQuery::from_json(ModelMeta::new("users"), json!([]));
///
/// filter.apply(&mut query, &FilterValue::from("1"));
/// assert_eq!(query.conditions(), &[Condition::is_not_null("email_verified_at")]);
/// ```
#[derive(Clone)]
pub struct TernaryFilter {
	core: FilterCore,
	true_label: String,
	false_label: String,
	placeholder_label: Option<String>,
	nullable: bool,
	true_query: Option<StateQuery>,
	false_query: Option<StateQuery>,
	blank_query: Option<StateQuery>,
}

impl TernaryFilter {
	/// Ternary filter named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: FilterCore::new(name),
			true_label: "Yes".to_string(),
			false_label: "No".to_string(),
			placeholder_label: None,
			nullable: false,
			true_query: None,
			false_query: None,
			blank_query: None,
		}
	}

	/// Label of the true option
	pub fn true_label(mut self, label: impl Into<String>) -> Self {
		self.true_label = label.into();
		self
	}

	/// Label of the false option
	pub fn false_label(mut self, label: impl Into<String>) -> Self {
		self.false_label = label.into();
		self
	}

	/// Label of the blank option
	pub fn placeholder_label(mut self, label: impl Into<String>) -> Self {
		self.placeholder_label = Some(label.into());
		self
	}

	/// Test the attribute for `NULL` instead of comparing with booleans
	pub fn nullable(mut self, nullable: bool) -> Self {
		self.nullable = nullable;
		self
	}

	/// Query run for the true state
	pub fn true_query<F>(mut self, query: F) -> Self
	where
		F: Fn(&mut dyn QueryBuilder) + Send + Sync + 'static,
	{
		self.true_query = Some(Arc::new(query));
		self
	}

	/// Query run for the false state
	pub fn false_query<F>(mut self, query: F) -> Self
	where
		F: Fn(&mut dyn QueryBuilder) + Send + Sync + 'static,
	{
		self.false_query = Some(Arc::new(query));
		self
	}

	/// Query run for the blank state
	pub fn blank_query<F>(mut self, query: F) -> Self
	where
		F: Fn(&mut dyn QueryBuilder) + Send + Sync + 'static,
	{
		self.blank_query = Some(Arc::new(query));
		self
	}
}

impl fmt::Debug for TernaryFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TernaryFilter")
			.field("core", &self.core)
			.field("nullable", &self.nullable)
			.field("has_true_query", &self.true_query.is_some())
			.field("has_false_query", &self.false_query.is_some())
			.field("has_blank_query", &self.blank_query.is_some())
			.finish_non_exhaustive()
	}
}

impl FilterBuilder for TernaryFilter {
	fn core_mut(&mut self) -> &mut FilterCore {
		&mut self.core
	}
}

impl Filter for TernaryFilter {
	fn core(&self) -> &FilterCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"TernaryFilter"
	}

	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		let state = match value.as_str() {
			None | Some("") | Some("blank") => {
				if let Some(blank) = &self.blank_query {
					blank(query);
				}
				return;
			}
			Some(state) => as_flag(&Value::String(state.to_string())),
		};

		let configured = if state {
			&self.true_query
		} else {
			&self.false_query
		};
		if let Some(state_query) = configured {
			state_query(query);
			return;
		}

		let attribute = self.core.attribute();
		match (state, self.nullable) {
			(true, true) => query.where_not_null(attribute),
			(false, true) => query.where_null(attribute),
			(flag, false) => query.where_eq(attribute, Value::Bool(flag)),
		}
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = Map::new();
		props.insert(
			"options".to_string(),
			json!([
				{"value": "true", "label": self.true_label},
				{"value": "false", "label": self.false_label},
			]),
		);
		props.insert(
			"placeholder".to_string(),
			json!(self.placeholder_label.as_deref().unwrap_or("All")),
		);
		props.insert("nullable".to_string(), json!(self.nullable));
		props
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::query::{Condition, MemoryQuery, ModelMeta};
	use rstest::{fixture, rstest};

	#[fixture]
	fn query() -> MemoryQuery {
		MemoryQuery::from_json(ModelMeta::new("users"), json!([]))
	}

	fn dispatching() -> TernaryFilter {
		TernaryFilter::make("verified")
			.true_query(|query| query.where_eq("path", json!("true")))
			.false_query(|query| query.where_eq("path", json!("false")))
			.blank_query(|query| query.where_eq("path", json!("blank")))
	}

	#[rstest]
	#[case(FilterValue::from(""), "blank")]
	#[case(FilterValue::from("blank"), "blank")]
	#[case(FilterValue::from("1"), "true")]
	#[case(FilterValue::from("true"), "true")]
	#[case(FilterValue::from("0"), "false")]
	#[case(FilterValue::from("false"), "false")]
	#[case(FilterValue::from("nonsense"), "false")]
	fn test_three_way_dispatch(
		mut query: MemoryQuery,
		#[case] value: FilterValue,
		#[case] path: &str,
	) {
		dispatching().apply(&mut query, &value);
		assert_eq!(query.conditions(), &[Condition::eq("path", path)]);
	}

	#[rstest]
	fn test_blank_without_query_is_noop(mut query: MemoryQuery) {
		TernaryFilter::make("verified").apply(&mut query, &FilterValue::from(""));
		assert!(query.conditions().is_empty());
	}

	#[rstest]
	#[case("1", Condition::eq("is_admin", true))]
	#[case("0", Condition::eq("is_admin", false))]
	fn test_boolean_comparison(
		mut query: MemoryQuery,
		#[case] value: &str,
		#[case] expected: Condition,
	) {
		TernaryFilter::make("is_admin").apply(&mut query, &FilterValue::from(value));
		assert_eq!(query.conditions(), &[expected]);
	}

	#[rstest]
	fn test_nullable_false_state(mut query: MemoryQuery) {
		TernaryFilter::make("verified")
			.attribute("email_verified_at")
			.nullable(true)
			.apply(&mut query, &FilterValue::from("0"));
		assert_eq!(query.conditions(), &[Condition::is_null("email_verified_at")]);
	}

	#[rstest]
	fn test_only_true_query_configured(mut query: MemoryQuery) {
		let filter = TernaryFilter::make("active").true_query(|query| query.where_null("banned_at"));
		filter.apply(&mut query, &FilterValue::from("0"));
		assert_eq!(query.conditions(), &[Condition::eq("active", false)]);
	}

	#[test]
	fn test_props() {
		let props = TernaryFilter::make("verified")
			.true_label("Verified")
			.to_props();
		assert_eq!(props["component"], json!("TernaryFilter"));
		assert_eq!(props["options"][0]["label"], json!("Verified"));
		assert_eq!(props["options"][1]["label"], json!("No"));
		assert_eq!(props["placeholder"], json!("All"));
	}
}
