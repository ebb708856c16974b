//! Row grouping
//!
//! A [`Group`] clusters rows by one column. At most one group is active per
//! request; its title and description are derived per record and attached
//! to each output record.

use crate::value::{Record, lookup_path, stringify};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Group title derived from `(record, group value)`
pub type GroupTitleFn = Arc<dyn Fn(&Record, &Value) -> String + Send + Sync>;

/// Group description derived from `(record, group value)`
pub type GroupDescriptionFn = Arc<dyn Fn(&Record, &Value) -> Option<String> + Send + Sync>;

/// Page size policy while a group is active and the request has no `per_page`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupedPagination {
	/// Use the settings' grouped page size (100 unless configured)
	#[default]
	Default,
	/// Use this page size
	PerPage(u64),
	/// Return every matching row without pagination
	Disabled,
}

/// Group metadata attached to each output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeta {
	/// Group column
	pub column: String,
	/// Record's value for the group column
	pub value: Value,
	/// Title of the record's group
	pub title: String,
	/// Description of the record's group
	pub description: Option<String>,
}

/// Column to group rows by
///
/// Titles resolve in order: custom callback, title attribute on the record,
/// the stringified group value.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::grouping::Group;
/// use serde_json::json;
///
/// let group = Group::make("team_id").title_attribute("team_name");
/// let record = json!({"team_id": 3, "team_name": "Core"});
/// let record = record.as_object().unwrap();
///
/// assert_eq!(group.title_for_record(record, &json!(3)), "Core");
/// assert_eq!(group.label(), "Team id");
/// ```
#[derive(Clone)]
pub struct Group {
	column: String,
	label: Option<String>,
	collapsible: bool,
	title_using: Option<GroupTitleFn>,
	description_using: Option<GroupDescriptionFn>,
	title_attribute: Option<String>,
	description_attribute: Option<String>,
	order_query: bool,
}

impl Group {
	/// Group by `column`
	pub fn make(column: impl Into<String>) -> Self {
		Self {
			column: column.into(),
			label: None,
			collapsible: true,
			title_using: None,
			description_using: None,
			title_attribute: None,
			description_attribute: None,
			order_query: true,
		}
	}

	/// Set the display label
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Allow collapsing groups in the UI
	pub fn collapsible(mut self, collapsible: bool) -> Self {
		self.collapsible = collapsible;
		self
	}

	/// Derive the title from the record
	pub fn title_using<F>(mut self, title: F) -> Self
	where
		F: Fn(&Record, &Value) -> String + Send + Sync + 'static,
	{
		self.title_using = Some(Arc::new(title));
		self
	}

	/// Derive the description from the record
	pub fn description_using<F>(mut self, description: F) -> Self
	where
		F: Fn(&Record, &Value) -> Option<String> + Send + Sync + 'static,
	{
		self.description_using = Some(Arc::new(description));
		self
	}

	/// Record attribute holding the title
	pub fn title_attribute(mut self, attribute: impl Into<String>) -> Self {
		self.title_attribute = Some(attribute.into());
		self
	}

	/// Record attribute holding the description
	pub fn description_attribute(mut self, attribute: impl Into<String>) -> Self {
		self.description_attribute = Some(attribute.into());
		self
	}

	/// Order the query by the group column before the requested sort
	pub fn order_query(mut self, order: bool) -> Self {
		self.order_query = order;
		self
	}

	/// Group column
	pub fn column(&self) -> &str {
		&self.column
	}

	/// Display label; the column with underscores as spaces by default
	pub fn label(&self) -> String {
		if let Some(label) = &self.label {
			return label.clone();
		}
		let spaced = self.column.replace('_', " ");
		let mut chars = spaced.chars();
		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		}
	}

	/// Whether groups can be collapsed
	pub fn is_collapsible(&self) -> bool {
		self.collapsible
	}

	/// Whether the executor orders by the group column first
	pub fn should_order_query(&self) -> bool {
		self.order_query
	}

	/// Title of the group a record belongs to
	pub fn title_for_record(&self, record: &Record, value: &Value) -> String {
		if let Some(title) = &self.title_using {
			return title(record, value);
		}
		if let Some(attribute) = &self.title_attribute
			&& let Some(title) = lookup_path(record, attribute).filter(|v| !v.is_null())
		{
			return stringify(title);
		}
		stringify(value)
	}

	/// Description of the group a record belongs to
	pub fn description_for_record(&self, record: &Record, value: &Value) -> Option<String> {
		if let Some(description) = &self.description_using {
			return description(record, value);
		}
		let attribute = self.description_attribute.as_ref()?;
		lookup_path(record, attribute)
			.filter(|v| !v.is_null())
			.map(stringify)
	}

	/// Group metadata for one record
	pub fn meta_for_record(&self, record: &Record, value: Value) -> GroupMeta {
		GroupMeta {
			column: self.column.clone(),
			title: self.title_for_record(record, &value),
			description: self.description_for_record(record, &value),
			value,
		}
	}

	/// Serialized group configuration
	pub fn to_props(&self) -> Value {
		json!({
			"column": self.column,
			"label": self.label(),
			"collapsible": self.collapsible,
			"titleAttribute": self.title_attribute,
			"descriptionAttribute": self.description_attribute,
		})
	}
}

impl fmt::Debug for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Group")
			.field("column", &self.column)
			.field("label", &self.label)
			.field("order_query", &self.order_query)
			.finish_non_exhaustive()
	}
}

/// Resolve the active group by exact column match
///
/// Unknown names yield no active group.
pub fn find_group<'a>(groups: &'a [Group], column: Option<&str>) -> Option<&'a Group> {
	let column = column?;
	let found = groups.iter().find(|group| group.column == column);
	if found.is_none() {
		tracing::debug!(group = column, "requested group is not declared, grouping disabled");
	}
	found
}
