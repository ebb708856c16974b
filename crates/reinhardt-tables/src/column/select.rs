//! Inline select column

use super::base::{Column, ColumnBuilder, ColumnCore};
use serde_json::{Map, Value, json};

/// Column editable through a select input
#[derive(Debug, Clone)]
pub struct SelectColumn {
	core: ColumnCore,
	options: Vec<(String, String)>,
	rules: Vec<String>,
	native: bool,
	options_searchable: bool,
	selectable_placeholder: bool,
}

impl SelectColumn {
	/// Select column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			options: Vec::new(),
			rules: Vec::new(),
			native: true,
			options_searchable: false,
			selectable_placeholder: true,
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

	/// Validation rules applied on update
	pub fn rules<I, S>(mut self, rules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.rules = rules.into_iter().map(Into::into).collect();
		self
	}

	/// Use the browser's native select
	pub fn native(mut self, native: bool) -> Self {
		self.native = native;
		self
	}

	/// Allow searching options
	pub fn options_searchable(mut self, searchable: bool) -> Self {
		self.options_searchable = searchable;
		self
	}

	/// Allow selecting the empty placeholder
	pub fn selectable_placeholder(mut self, selectable: bool) -> Self {
		self.selectable_placeholder = selectable;
		self
	}
}

impl ColumnBuilder for SelectColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for SelectColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"SelectColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		let options: Vec<Value> = self
			.options
			.iter()
			.map(|(value, label)| json!({"value": value, "label": label}))
			.collect();

		let mut props = Map::new();
		props.insert("options".to_string(), Value::Array(options));
		props.insert("rules".to_string(), json!(self.rules));
		props.insert("native".to_string(), json!(self.native));
		props.insert(
			"optionsSearchable".to_string(),
			json!(self.options_searchable),
		);
		props.insert(
			"selectablePlaceholder".to_string(),
			json!(self.selectable_placeholder),
		);
		props
	}
}
