//! Select filter

use super::base::{Filter, FilterBuilder, FilterCore};
use crate::query::QueryBuilder;
use crate::request::FilterValue;
use serde_json::{Map, Value, json};

/// Filter choosing one or more values from a fixed list
///
/// Without a custom query, a single value applies `attribute = value` and a
/// multiple filter applies `attribute IN (values)`. Blank values are
/// ignored.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::filter::{Filter, SelectFilter};
/// use reinhardt_tables::query::{MemoryQuery, ModelMeta, QueryBuilder};
/// use reinhardt_tables::request::FilterValue;
/// use serde_json::json;
///
/// let filter = SelectFilter::make("status")
///     .options([("draft", "Draft"), ("published", "Published")])
///     .multiple(true);
///
/// let mut query = MemoryQuery::from_json(
///     ModelMeta::new("posts"),
///     json!([{"status": "draft"}, {"status": "published"}, {"status": "archived"}]),
/// );
/// filter.apply(&mut query, &FilterValue::from(vec!["draft", "published"]));
/// assert_eq!(query.get().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SelectFilter {
	core: FilterCore,
	options: Vec<(String, String)>,
	multiple: bool,
	searchable: bool,
	selectable_placeholder: bool,
	placeholder: Option<String>,
}

impl SelectFilter {
	/// Select filter named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: FilterCore::new(name),
			options: Vec::new(),
			multiple: false,
			searchable: false,
			selectable_placeholder: true,
			placeholder: None,
		}
	}

	/// Options as `(value, label)` pairs, in display order
	pub fn options<I, V, L>(mut self, options: I) -> Self
	where
		I: IntoIterator<Item = (V, L)>,
		V: Into<String>,
		L: Into<String>,
	{
		self.options = options
			.into_iter()
			.map(|(value, label)| (value.into(), label.into()))
			.collect();
		self
	}

	/// Allow selecting several values
	pub fn multiple(mut self, multiple: bool) -> Self {
		self.multiple = multiple;
		self
	}

	/// Allow searching options
	pub fn searchable(mut self, searchable: bool) -> Self {
		self.searchable = searchable;
		self
	}

	/// Allow selecting the empty placeholder
	pub fn selectable_placeholder(mut self, selectable: bool) -> Self {
		self.selectable_placeholder = selectable;
		self
	}

	/// Placeholder text
	pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	/// Whether several values can be selected
	pub fn is_multiple(&self) -> bool {
		self.multiple
	}
}

impl FilterBuilder for SelectFilter {
	fn core_mut(&mut self) -> &mut FilterCore {
		&mut self.core
	}
}

impl Filter for SelectFilter {
	fn core(&self) -> &FilterCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"SelectFilter"
	}

	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		if self.core.run_query(query, value) {
			return;
		}

		let attribute = self.core.attribute();
		match value {
			FilterValue::Many(values) if !values.is_empty() => {
				let values = values.iter().cloned().map(Value::String).collect();
				query.where_in(attribute, values);
			}
			FilterValue::Single(single) if !self.multiple && !single.is_empty() => {
				query.where_eq(attribute, Value::String(single.clone()));
			}
			_ => {}
		}
	}

	fn extra_props(&self) -> Map<String, Value> {
		let options: Vec<Value> = self
			.options
			.iter()
			.map(|(value, label)| json!({"value": value, "label": label}))
			.collect();
		let placeholder = self
			.placeholder
			.clone()
			.or_else(|| self.selectable_placeholder.then(|| "All".to_string()));

		let mut props = Map::new();
		props.insert("options".to_string(), Value::Array(options));
		props.insert("multiple".to_string(), json!(self.multiple));
		props.insert("searchable".to_string(), json!(self.searchable));
		props.insert("placeholder".to_string(), json!(placeholder));
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
		MemoryQuery::from_json(ModelMeta::new("posts"), json!([]))
	}

	#[rstest]
	fn test_single_value_applies_equality(mut query: MemoryQuery) {
		SelectFilter::make("status").apply(&mut query, &FilterValue::from("draft"));
		assert_eq!(query.conditions(), &[Condition::eq("status", "draft")]);
	}

	#[rstest]
	fn test_attribute_override(mut query: MemoryQuery) {
		SelectFilter::make("state")
			.attribute("status")
			.apply(&mut query, &FilterValue::from("draft"));
		assert_eq!(query.conditions(), &[Condition::eq("status", "draft")]);
	}

	#[rstest]
	#[case(FilterValue::from(""))]
	#[case(FilterValue::Many(vec![]))]
	fn test_blank_values_are_ignored(mut query: MemoryQuery, #[case] value: FilterValue) {
		SelectFilter::make("status").apply(&mut query, &value);
		assert!(query.conditions().is_empty());
	}

	#[rstest]
	fn test_multiple_applies_where_in(mut query: MemoryQuery) {
		SelectFilter::make("status")
			.multiple(true)
			.apply(&mut query, &FilterValue::from(vec!["a", "b"]));
		assert_eq!(
			query.conditions(),
			&[Condition::is_in("status", vec![json!("a"), json!("b")])]
		);
	}

	#[rstest]
	fn test_multiple_ignores_scalar(mut query: MemoryQuery) {
		SelectFilter::make("status")
			.multiple(true)
			.apply(&mut query, &FilterValue::from("a"));
		assert!(query.conditions().is_empty());
	}

	#[rstest]
	fn test_custom_query_wins(mut query: MemoryQuery) {
		SelectFilter::make("status")
			.query(|query, _| query.where_null("published_at"))
			.apply(&mut query, &FilterValue::from("draft"));
		assert_eq!(query.conditions(), &[Condition::is_null("published_at")]);
	}

	#[test]
	fn test_props() {
		let props = SelectFilter::make("status")
			.options([("draft", "Draft")])
			.to_props();
		assert_eq!(props["component"], json!("SelectFilter"));
		assert_eq!(props["options"][0], json!({"value": "draft", "label": "Draft"}));
		assert_eq!(props["placeholder"], json!("All"));

		let props = SelectFilter::make("status")
			.selectable_placeholder(false)
			.to_props();
		assert_eq!(props["placeholder"], Value::Null);
	}
}
