//! Filter trait and shared filter state

use crate::query::QueryBuilder;
use crate::request::FilterValue;
use crate::value::headline;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

/// Query mutation run with the request value
pub type FilterQuery = Arc<dyn Fn(&mut dyn QueryBuilder, &FilterValue) + Send + Sync>;

/// Indicator label derived from the request value
pub type IndicatorFn = Arc<dyn Fn(&FilterValue) -> Option<String> + Send + Sync>;

/// Active-filter indicator shown above the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
	/// Text shown in the indicator chip
	pub label: String,
	/// Request parameter cleared when the indicator is removed
	pub remove_field: String,
}

/// State shared by every filter variant
#[derive(Clone)]
pub struct FilterCore {
	name: String,
	label: Option<String>,
	attribute: Option<String>,
	default: Option<FilterValue>,
	query: Option<FilterQuery>,
	indicate_using: Option<IndicatorFn>,
}

impl FilterCore {
	/// Core for a filter named `name`
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: None,
			attribute: None,
			default: None,
			query: None,
			indicate_using: None,
		}
	}

	/// Filter name, matched against request parameters
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Display label, derived from the name when not set
	pub fn label(&self) -> String {
		self.label.clone().unwrap_or_else(|| headline(&self.name))
	}

	/// Queried attribute; the filter name unless overridden
	pub fn attribute(&self) -> &str {
		self.attribute.as_deref().unwrap_or(&self.name)
	}

	/// Default value echoed to the UI
	pub fn default_value(&self) -> Option<&FilterValue> {
		self.default.as_ref()
	}

	/// Run the custom query callback, returning whether one was configured
	pub fn run_query(&self, query: &mut dyn QueryBuilder, value: &FilterValue) -> bool {
		match &self.query {
			Some(callback) => {
				callback(query, value);
				true
			}
			None => false,
		}
	}

	/// Indicator for a request value, when an indicator callback is set
	pub fn indicator(&self, value: &FilterValue) -> Option<Indicator> {
		let callback = self.indicate_using.as_ref()?;
		callback(value).map(|label| Indicator {
			label,
			remove_field: self.name.clone(),
		})
	}

	/// Props shared by all filters, tagged with the rendering component
	pub fn props(&self, component: &str) -> Map<String, Value> {
		let mut props = Map::new();
		props.insert("component".to_string(), json!(component));
		props.insert("name".to_string(), json!(self.name));
		props.insert("label".to_string(), json!(self.label()));
		props.insert("attribute".to_string(), json!(self.attribute()));
		props.insert(
			"default".to_string(),
			self.default
				.as_ref()
				.map(FilterValue::to_json)
				.unwrap_or(Value::Null),
		);
		props
	}
}

impl fmt::Debug for FilterCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FilterCore")
			.field("name", &self.name)
			.field("label", &self.label)
			.field("attribute", &self.attribute)
			.field("default", &self.default)
			.field("has_query", &self.query.is_some())
			.finish_non_exhaustive()
	}
}

/// Trait for table filters
///
/// A filter maps the request value supplied under its name to a query
/// mutation. The executor only calls [`apply`](Filter::apply) when the
/// request carries a value for the filter.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::filter::{BaseFilter, Filter, FilterBuilder};
/// use reinhardt_tables::query::{MemoryQuery, ModelMeta, QueryBuilder};
/// use reinhardt_tables::request::FilterValue;
/// use serde_json::json;
///
/// let filter = BaseFilter::make("min_total").query(|query, value| {
///     if let Some(min) = value.as_str().and_then(|v| v.parse::<i64>().ok()) {
///         query.where_condition(reinhardt_tables::query::Condition::compare(
///             "total",
///             reinhardt_tables::query::Operator::Gte,
///             min,
///         ));
///     }
/// });
///
/// let mut query = MemoryQuery::from_json(
///     ModelMeta::new("orders"),
///     json!([{"id": 1, "total": 5}, {"id": 2, "total": 50}]),
/// );
/// filter.apply(&mut query, &FilterValue::from("10"));
/// assert_eq!(query.get().unwrap().len(), 1);
/// ```
pub trait Filter: Send + Sync {
	/// Shared filter state
	fn core(&self) -> &FilterCore;

	/// Rendering component name
	fn component(&self) -> &'static str;

	/// Filter name
	fn name(&self) -> &str {
		self.core().name()
	}

	/// Mutate the query for a request value
	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue);

	/// Whether the filter adjusts the base query before other filtering
	fn modifies_base_query(&self) -> bool {
		false
	}

	/// Adjust the base query (global scopes) before search and filters run
	fn modify_base_query(&self, _query: &mut dyn QueryBuilder, _value: &FilterValue) {}

	/// Active-filter indicator for a request value
	fn indicator(&self, value: &FilterValue) -> Option<Indicator> {
		self.core().indicator(value)
	}

	/// Filter-specific props merged over the shared ones
	fn extra_props(&self) -> Map<String, Value> {
		Map::new()
	}

	/// Serialized filter configuration
	fn to_props(&self) -> Value {
		let mut props = self.core().props(self.component());
		props.extend(self.extra_props());
		Value::Object(props)
	}
}

/// Fluent configuration shared by every filter variant
pub trait FilterBuilder: Sized {
	/// Mutable access to the shared state
	fn core_mut(&mut self) -> &mut FilterCore;

	/// Set the display label
	fn label(mut self, label: impl Into<String>) -> Self {
		self.core_mut().label = Some(label.into());
		self
	}

	/// Query this attribute instead of the filter name
	fn attribute(mut self, attribute: impl Into<String>) -> Self {
		self.core_mut().attribute = Some(attribute.into());
		self
	}

	/// Default value shown in the UI
	fn default(mut self, value: impl Into<FilterValue>) -> Self {
		self.core_mut().default = Some(value.into());
		self
	}

	/// Custom query mutation
	fn query<F>(mut self, query: F) -> Self
	where
		F: Fn(&mut dyn QueryBuilder, &FilterValue) + Send + Sync + 'static,
	{
		self.core_mut().query = Some(Arc::new(query));
		self
	}

	/// Indicator label for active values
	fn indicate_using<F>(mut self, indicator: F) -> Self
	where
		F: Fn(&FilterValue) -> Option<String> + Send + Sync + 'static,
	{
		self.core_mut().indicate_using = Some(Arc::new(indicator));
		self
	}
}

/// Generic filter backed by a query callback
///
/// Without a callback the filter is a no-op.
#[derive(Debug, Clone)]
pub struct BaseFilter {
	core: FilterCore,
}

impl BaseFilter {
	/// Filter named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: FilterCore::new(name),
		}
	}
}

impl FilterBuilder for BaseFilter {
	fn core_mut(&mut self) -> &mut FilterCore {
		&mut self.core
	}
}

impl Filter for BaseFilter {
	fn core(&self) -> &FilterCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"BaseFilter"
	}

	fn apply(&self, query: &mut dyn QueryBuilder, value: &FilterValue) {
		self.core.run_query(query, value);
	}
}
