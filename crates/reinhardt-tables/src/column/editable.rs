//! Inline editable columns: checkbox, toggle and text input

use super::base::{Column, ColumnBuilder, ColumnCore};
use serde_json::{Map, Value, json};

fn rules_from<I, S>(rules: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	rules.into_iter().map(Into::into).collect()
}

fn editable_props(rules: &[String]) -> Map<String, Value> {
	let mut props = Map::new();
	props.insert("rules".to_string(), json!(rules));
	props.insert("editable".to_string(), json!(true));
	props
}

/// Column editable through a checkbox
#[derive(Debug, Clone)]
pub struct CheckboxColumn {
	core: ColumnCore,
	rules: Vec<String>,
}

impl CheckboxColumn {
	/// Checkbox column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			rules: Vec::new(),
		}
	}

	/// Validation rules applied on update
	pub fn rules<I, S>(mut self, rules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.rules = rules_from(rules);
		self
	}
}

impl ColumnBuilder for CheckboxColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for CheckboxColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"CheckboxColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		editable_props(&self.rules)
	}
}

/// Column editable through a toggle switch
#[derive(Debug, Clone)]
pub struct ToggleColumn {
	core: ColumnCore,
	rules: Vec<String>,
}

impl ToggleColumn {
	/// Toggle column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			rules: Vec::new(),
		}
	}

	/// Validation rules applied on update
	pub fn rules<I, S>(mut self, rules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.rules = rules_from(rules);
		self
	}
}

impl ColumnBuilder for ToggleColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for ToggleColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"ToggleColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		editable_props(&self.rules)
	}
}

/// Column editable through a text input
#[derive(Debug, Clone)]
pub struct TextInputColumn {
	core: ColumnCore,
	rules: Vec<String>,
	input_type: String,
	input_prefix: Option<String>,
	input_suffix: Option<String>,
	prefix_icon: Option<String>,
	suffix_icon: Option<String>,
	prefix_icon_color: Option<String>,
	suffix_icon_color: Option<String>,
}

impl TextInputColumn {
	/// Text input column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			rules: Vec::new(),
			input_type: "text".to_string(),
			input_prefix: None,
			input_suffix: None,
			prefix_icon: None,
			suffix_icon: None,
			prefix_icon_color: None,
			suffix_icon_color: None,
		}
	}

	/// Validation rules applied on update
	pub fn rules<I, S>(mut self, rules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.rules = rules_from(rules);
		self
	}

	/// HTML input type (`text`, `number`, `email`, ...)
	pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
		self.input_type = input_type.into();
		self
	}

	/// Text inside the input, before the value
	pub fn input_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.input_prefix = Some(prefix.into());
		self
	}

	/// Text inside the input, after the value
	pub fn input_suffix(mut self, suffix: impl Into<String>) -> Self {
		self.input_suffix = Some(suffix.into());
		self
	}

	/// Icon before the input, with an optional color
	pub fn input_prefix_icon(mut self, icon: impl Into<String>, color: Option<&str>) -> Self {
		self.prefix_icon = Some(icon.into());
		self.prefix_icon_color = color.map(String::from);
		self
	}

	/// Icon after the input, with an optional color
	pub fn input_suffix_icon(mut self, icon: impl Into<String>, color: Option<&str>) -> Self {
		self.suffix_icon = Some(icon.into());
		self.suffix_icon_color = color.map(String::from);
		self
	}
}

impl ColumnBuilder for TextInputColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for TextInputColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"TextInputColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = editable_props(&self.rules);
		props.insert("type".to_string(), json!(self.input_type));
		props.insert("inputPrefix".to_string(), json!(self.input_prefix));
		props.insert("inputSuffix".to_string(), json!(self.input_suffix));
		props.insert("prefixIcon".to_string(), json!(self.prefix_icon));
		props.insert("suffixIcon".to_string(), json!(self.suffix_icon));
		props.insert("prefixIconColor".to_string(), json!(self.prefix_icon_color));
		props.insert("suffixIconColor".to_string(), json!(self.suffix_icon_color));
		props
	}
}
