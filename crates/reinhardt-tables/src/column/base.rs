//! Base column trait and shared column state

use super::summarizer::Summarizer;
use crate::value::{Record, headline};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

/// Custom state getter: computes a column's value from the whole record
pub type StateGetter = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// Value formatter: `(state, record) -> formatted state`
pub type Formatter = Arc<dyn Fn(&Value, &Record) -> Value + Send + Sync>;

/// Per-record evaluator: `(state, record) -> value or none`
///
/// Static configuration is stored as a constant evaluator, so evaluation
/// never needs to inspect whether a setting was a value or a function.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::column::Evaluator;
/// use serde_json::{Map, json};
///
/// let record = Map::new();
/// let fixed = Evaluator::constant("success".to_string());
/// let computed = Evaluator::new(|state, _| state.as_str().map(str::to_uppercase));
///
/// assert_eq!(fixed.evaluate(&json!(null), &record).as_deref(), Some("success"));
/// assert_eq!(computed.evaluate(&json!("new"), &record).as_deref(), Some("NEW"));
/// ```
pub struct Evaluator<T> {
	function: Arc<dyn Fn(&Value, &Record) -> Option<T> + Send + Sync>,
}

impl<T> Evaluator<T> {
	/// Wrap an evaluation function
	pub fn new<F>(function: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<T> + Send + Sync + 'static,
	{
		Self {
			function: Arc::new(function),
		}
	}

	/// Evaluator that always yields `value`
	pub fn constant(value: T) -> Self
	where
		T: Clone + Send + Sync + 'static,
	{
		Self::new(move |_, _| Some(value.clone()))
	}

	/// Evaluate for one record
	pub fn evaluate(&self, state: &Value, record: &Record) -> Option<T> {
		(self.function)(state, record)
	}
}

impl<T> Clone for Evaluator<T> {
	fn clone(&self) -> Self {
		Self {
			function: Arc::clone(&self.function),
		}
	}
}

impl<T> fmt::Debug for Evaluator<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Evaluator")
	}
}

/// Horizontal cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
	/// Start of the cell
	#[default]
	Start,
	/// Centered
	Center,
	/// End of the cell
	End,
	/// Justified
	Justify,
}

/// State shared by every column variant
#[derive(Clone)]
pub struct ColumnCore {
	name: String,
	label: Option<String>,
	sortable: bool,
	searchable: bool,
	searchable_columns: Vec<String>,
	toggleable: bool,
	toggled_hidden_by_default: bool,
	state_using: Option<StateGetter>,
	format_using: Option<Formatter>,
	description: Option<Evaluator<String>>,
	description_position: String,
	alignment: Alignment,
	tooltip: Option<Evaluator<String>>,
	url: Option<Evaluator<String>>,
	open_url_in_new_tab: bool,
	prefix: Option<String>,
	suffix: Option<String>,
	grow: bool,
	size: Option<String>,
}

impl ColumnCore {
	/// Core for a column named `name`
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: None,
			sortable: false,
			searchable: false,
			searchable_columns: Vec::new(),
			toggleable: true,
			toggled_hidden_by_default: false,
			state_using: None,
			format_using: None,
			description: None,
			description_position: "below".to_string(),
			alignment: Alignment::default(),
			tooltip: None,
			url: None,
			open_url_in_new_tab: false,
			prefix: None,
			suffix: None,
			grow: false,
			size: None,
		}
	}

	/// Column name, possibly dotted
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Display label, derived from the name when not set
	pub fn label(&self) -> String {
		self.label
			.clone()
			.unwrap_or_else(|| headline(&self.name))
	}

	/// Whether the column can be sorted
	pub fn is_sortable(&self) -> bool {
		self.sortable
	}

	/// Whether the column takes part in global search
	pub fn is_searchable(&self) -> bool {
		self.searchable
	}

	/// Columns matched by global search; the column's own name by default
	pub fn searchable_columns(&self) -> Vec<String> {
		if self.searchable_columns.is_empty() {
			vec![self.name.clone()]
		} else {
			self.searchable_columns.clone()
		}
	}

	/// Whether a custom state getter is configured
	pub fn has_state_getter(&self) -> bool {
		self.state_using.is_some()
	}

	/// Compute the state with the custom getter, if configured
	pub fn state(&self, record: &Record) -> Option<Value> {
		self.state_using.as_ref().map(|getter| getter(record))
	}

	/// Whether a formatter is configured
	pub fn has_formatter(&self) -> bool {
		self.format_using.is_some()
	}

	/// Format a state, if a formatter is configured
	pub fn format(&self, state: &Value, record: &Record) -> Option<Value> {
		self.format_using
			.as_ref()
			.map(|formatter| formatter(state, record))
	}

	/// Description for a record
	pub fn description(&self, state: &Value, record: &Record) -> Option<String> {
		self.description
			.as_ref()
			.and_then(|description| description.evaluate(state, record))
	}

	/// Tooltip for a record
	pub fn tooltip(&self, state: &Value, record: &Record) -> Option<String> {
		self.tooltip
			.as_ref()
			.and_then(|tooltip| tooltip.evaluate(state, record))
	}

	/// Cell URL for a record
	pub fn url(&self, state: &Value, record: &Record) -> Option<String> {
		self.url.as_ref().and_then(|url| url.evaluate(state, record))
	}

	/// Props shared by all columns, tagged with the rendering component
	pub fn props(&self, component: &str) -> Map<String, Value> {
		let props = json!({
			"component": component,
			"name": self.name,
			"label": self.label(),
			"sortable": self.sortable,
			"searchable": self.searchable,
			"toggleable": self.toggleable,
			"isToggledHiddenByDefault": self.toggled_hidden_by_default,
			"descriptionPosition": self.description_position,
			"alignment": self.alignment,
			"hasTooltip": self.tooltip.is_some(),
			"hasUrl": self.url.is_some(),
			"openUrlInNewTab": self.open_url_in_new_tab,
			"prefix": self.prefix,
			"suffix": self.suffix,
			"grow": self.grow,
			"size": self.size,
			"hasFormatUsing": self.format_using.is_some(),
		});
		match props {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}
}

impl fmt::Debug for ColumnCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ColumnCore")
			.field("name", &self.name)
			.field("label", &self.label)
			.field("sortable", &self.sortable)
			.field("searchable", &self.searchable)
			.field("has_state_getter", &self.state_using.is_some())
			.field("has_formatter", &self.format_using.is_some())
			.finish_non_exhaustive()
	}
}

/// Trait for table column definitions
///
/// A column describes one displayed field: its capabilities (sorting,
/// searching, relationship counts) and the per-record evaluators the record
/// processor calls in a fixed order (icon, color, size, description).
/// Evaluators return `None` when the column has nothing to contribute.
pub trait Column: Send + Sync {
	/// Shared column state
	fn core(&self) -> &ColumnCore;

	/// Rendering component name
	fn component(&self) -> &'static str;

	/// Column name, possibly dotted (`customer.full_name`)
	fn name(&self) -> &str {
		self.core().name()
	}

	/// Whether the column can be sorted
	fn is_sortable(&self) -> bool {
		self.core().is_sortable()
	}

	/// Whether the column takes part in global search
	fn is_searchable(&self) -> bool {
		self.core().is_searchable()
	}

	/// Columns matched by global search
	fn searchable_columns(&self) -> Vec<String> {
		self.core().searchable_columns()
	}

	/// Relationship counted into `{relation}_count`
	fn counts_relation(&self) -> Option<&str> {
		None
	}

	/// Aggregates computed over the returned records
	fn summarizers(&self) -> &[Summarizer] {
		&[]
	}

	/// Icon for a record
	fn evaluate_icon(&self, _state: &Value, _record: &Record) -> Option<String> {
		None
	}

	/// Color for a record
	fn evaluate_color(&self, _state: &Value, _record: &Record) -> Option<String> {
		None
	}

	/// Size for a record
	fn evaluate_size(&self, _state: &Value, _record: &Record) -> Option<String> {
		None
	}

	/// Description for a record
	fn evaluate_description(&self, state: &Value, record: &Record) -> Option<String> {
		self.core().description(state, record)
	}

	/// Column-specific props merged over the shared ones
	fn extra_props(&self) -> Map<String, Value> {
		Map::new()
	}

	/// Serialized column configuration
	fn to_props(&self) -> Value {
		let mut props = self.core().props(self.component());
		props.extend(self.extra_props());
		Value::Object(props)
	}
}

/// Fluent configuration shared by every column variant
pub trait ColumnBuilder: Sized {
	/// Mutable access to the shared state
	fn core_mut(&mut self) -> &mut ColumnCore;

	/// Set the display label
	fn label(mut self, label: impl Into<String>) -> Self {
		self.core_mut().label = Some(label.into());
		self
	}

	/// Allow sorting by this column
	fn sortable(mut self, sortable: bool) -> Self {
		self.core_mut().sortable = sortable;
		self
	}

	/// Include this column in global search
	fn searchable(mut self, searchable: bool) -> Self {
		self.core_mut().searchable = searchable;
		self
	}

	/// Search these underlying columns instead of the column's own name
	fn searchable_in<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let core = self.core_mut();
		core.searchable = true;
		core.searchable_columns = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Allow hiding the column, optionally hidden until toggled on
	fn toggleable(mut self, toggleable: bool, hidden_by_default: bool) -> Self {
		let core = self.core_mut();
		core.toggleable = toggleable;
		core.toggled_hidden_by_default = hidden_by_default;
		self
	}

	/// Compute the state from the whole record
	fn state_using<F>(mut self, getter: F) -> Self
	where
		F: Fn(&Record) -> Value + Send + Sync + 'static,
	{
		self.core_mut().state_using = Some(Arc::new(getter));
		self
	}

	/// Transform the state before display
	fn format_using<F>(mut self, formatter: F) -> Self
	where
		F: Fn(&Value, &Record) -> Value + Send + Sync + 'static,
	{
		self.core_mut().format_using = Some(Arc::new(formatter));
		self
	}

	/// Static description shown with every cell
	fn description(mut self, description: impl Into<String>) -> Self {
		self.core_mut().description = Some(Evaluator::constant(description.into()));
		self
	}

	/// Per-record description
	fn description_using<F>(mut self, description: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.core_mut().description = Some(Evaluator::new(description));
		self
	}

	/// Where the description is placed (`below` or `above`)
	fn description_position(mut self, position: impl Into<String>) -> Self {
		self.core_mut().description_position = position.into();
		self
	}

	/// Cell alignment
	fn alignment(mut self, alignment: Alignment) -> Self {
		self.core_mut().alignment = alignment;
		self
	}

	/// Static tooltip
	fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
		self.core_mut().tooltip = Some(Evaluator::constant(tooltip.into()));
		self
	}

	/// Per-record tooltip
	fn tooltip_using<F>(mut self, tooltip: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.core_mut().tooltip = Some(Evaluator::new(tooltip));
		self
	}

	/// Per-record cell URL
	fn url_using<F>(mut self, url: F, open_in_new_tab: bool) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		let core = self.core_mut();
		core.url = Some(Evaluator::new(url));
		core.open_url_in_new_tab = open_in_new_tab;
		self
	}

	/// Text rendered before the value
	fn prefix(mut self, prefix: impl Into<String>) -> Self {
		self.core_mut().prefix = Some(prefix.into());
		self
	}

	/// Text rendered after the value
	fn suffix(mut self, suffix: impl Into<String>) -> Self {
		self.core_mut().suffix = Some(suffix.into());
		self
	}

	/// Let the column take the remaining width
	fn grow(mut self, grow: bool) -> Self {
		self.core_mut().grow = grow;
		self
	}

	/// Text size (`sm`, `md`, `lg`)
	fn size(mut self, size: impl Into<String>) -> Self {
		self.core_mut().size = Some(size.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct PlainColumn {
		core: ColumnCore,
	}

	impl Column for PlainColumn {
		fn core(&self) -> &ColumnCore {
			&self.core
		}

		fn component(&self) -> &'static str {
			"PlainColumn"
		}
	}

	impl ColumnBuilder for PlainColumn {
		fn core_mut(&mut self) -> &mut ColumnCore {
			&mut self.core
		}
	}

	fn plain(name: &str) -> PlainColumn {
		PlainColumn {
			core: ColumnCore::new(name),
		}
	}

	#[rstest]
	#[case("name", "Name")]
	#[case("created_at", "Created at")]
	#[case("customer.full_name", "Customer full name")]
	#[case("", "")]
	fn test_default_label(#[case] name: &str, #[case] expected: &str) {
		assert_eq!(plain(name).core().label(), expected);
	}

	#[test]
	fn test_defaults() {
		let column = plain("email");
		assert!(!column.is_sortable());
		assert!(!column.is_searchable());
		assert_eq!(column.searchable_columns(), vec!["email".to_string()]);
		assert!(column.counts_relation().is_none());
		assert!(column.summarizers().is_empty());
	}

	#[test]
	fn test_searchable_in_overrides_columns() {
		let column = plain("full_name").searchable_in(["first_name", "last_name"]);
		assert!(column.is_searchable());
		assert_eq!(column.searchable_columns(), vec!["first_name", "last_name"]);
	}

	#[test]
	fn test_state_getter_and_formatter() {
		let column = plain("total")
			.state_using(|record| record.get("amount").cloned().unwrap_or(Value::Null))
			.format_using(|state, _| json!(format!("${}", state)));
		let record = json!({"amount": 5}).as_object().cloned().unwrap();

		let state = column.core().state(&record).unwrap();
		assert_eq!(state, json!(5));
		assert_eq!(column.core().format(&state, &record), Some(json!("$5")));
	}

	#[test]
	fn test_props() {
		let column = plain("name")
			.label("Full name")
			.sortable(true)
			.alignment(Alignment::End)
			.tooltip("Customer name");
		let props = column.to_props();

		assert_eq!(props["component"], json!("PlainColumn"));
		assert_eq!(props["label"], json!("Full name"));
		assert_eq!(props["sortable"], json!(true));
		assert_eq!(props["alignment"], json!("end"));
		assert_eq!(props["hasTooltip"], json!(true));
		assert_eq!(props["hasFormatUsing"], json!(false));
	}

	#[test]
	fn test_description_evaluators() {
		let record = Map::new();
		let fixed = plain("a").description("static");
		let computed = plain("b").description_using(|state, _| state.as_str().map(String::from));

		assert_eq!(
			fixed.evaluate_description(&json!(null), &record).as_deref(),
			Some("static")
		);
		assert_eq!(
			computed.evaluate_description(&json!("x"), &record).as_deref(),
			Some("x")
		);
		assert_eq!(computed.evaluate_description(&json!(1), &record), None);
	}
}
