//! Icon and boolean columns

use super::base::{Column, ColumnBuilder, ColumnCore, Evaluator};
use crate::value::{Record, is_truthy, stringify};
use serde_json::{Map, Value, json};

/// Default icon for truthy states in boolean mode
pub const TRUE_ICON: &str = "CheckCircle";
/// Default icon for falsy states in boolean mode
pub const FALSE_ICON: &str = "XCircle";
/// Default color for truthy states in boolean mode
pub const TRUE_COLOR: &str = "success";
/// Default color for falsy states in boolean mode
pub const FALSE_COLOR: &str = "danger";

/// Column rendering its state as an icon
///
/// In boolean mode the state's truthiness picks the true/false icon and
/// color. Otherwise the icon evaluator decides, falling back to the state
/// itself as the icon name.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::column::{BooleanColumn, Column};
/// use serde_json::json;
///
/// let column = BooleanColumn::make("is_active");
/// let record = Default::default();
///
/// assert_eq!(column.evaluate_icon(&json!(true), &record).as_deref(), Some("CheckCircle"));
/// assert_eq!(column.evaluate_color(&json!(0), &record).as_deref(), Some("danger"));
/// ```
#[derive(Debug, Clone)]
pub struct IconColumn {
	core: ColumnCore,
	icon: Option<Evaluator<String>>,
	color: Option<Evaluator<String>>,
	icon_size: Option<Evaluator<String>>,
	boolean: bool,
	true_icon: Option<Evaluator<String>>,
	false_icon: Option<Evaluator<String>>,
	true_color: Option<Evaluator<String>>,
	false_color: Option<Evaluator<String>>,
	wrap: bool,
}

impl IconColumn {
	/// Icon column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			icon: None,
			color: None,
			icon_size: Some(Evaluator::constant("large".to_string())),
			boolean: false,
			true_icon: None,
			false_icon: None,
			true_color: None,
			false_color: None,
			wrap: false,
		}
	}

	/// Static icon
	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(Evaluator::constant(icon.into()));
		self
	}

	/// Per-record icon
	pub fn icon_using<F>(mut self, icon: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.icon = Some(Evaluator::new(icon));
		self
	}

	/// Static color
	pub fn color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(Evaluator::constant(color.into()));
		self
	}

	/// Per-record color
	pub fn color_using<F>(mut self, color: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.color = Some(Evaluator::new(color));
		self
	}

	/// Static icon size; `None` clears the default `large`
	pub fn icon_size(mut self, size: Option<&str>) -> Self {
		self.icon_size = size.map(|size| Evaluator::constant(size.to_string()));
		self
	}

	/// Per-record icon size
	pub fn icon_size_using<F>(mut self, size: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.icon_size = Some(Evaluator::new(size));
		self
	}

	/// Switch boolean mode
	pub fn boolean(mut self, boolean: bool) -> Self {
		self.boolean = boolean;
		self
	}

	/// Icon for truthy states in boolean mode
	pub fn true_icon(mut self, icon: impl Into<String>) -> Self {
		self.true_icon = Some(Evaluator::constant(icon.into()));
		self
	}

	/// Icon for falsy states in boolean mode
	pub fn false_icon(mut self, icon: impl Into<String>) -> Self {
		self.false_icon = Some(Evaluator::constant(icon.into()));
		self
	}

	/// Color for truthy states in boolean mode
	pub fn true_color(mut self, color: impl Into<String>) -> Self {
		self.true_color = Some(Evaluator::constant(color.into()));
		self
	}

	/// Color for falsy states in boolean mode
	pub fn false_color(mut self, color: impl Into<String>) -> Self {
		self.false_color = Some(Evaluator::constant(color.into()));
		self
	}

	/// Wrap icons onto several lines
	pub fn wrap(mut self, wrap: bool) -> Self {
		self.wrap = wrap;
		self
	}

	/// Whether boolean mode is on
	pub fn is_boolean(&self) -> bool {
		self.boolean
	}

	fn boolean_choice(
		state: &Value,
		record: &Record,
		when_true: &Option<Evaluator<String>>,
		when_false: &Option<Evaluator<String>>,
		defaults: (&str, &str),
	) -> Option<String> {
		let truthy = is_truthy(state);
		let configured = if truthy { when_true } else { when_false };
		if let Some(evaluator) = configured {
			return evaluator.evaluate(state, record);
		}
		let fallback = if truthy { defaults.0 } else { defaults.1 };
		Some(fallback.to_string())
	}
}

impl ColumnBuilder for IconColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for IconColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"IconColumn"
	}

	fn evaluate_icon(&self, state: &Value, record: &Record) -> Option<String> {
		if self.boolean {
			return Self::boolean_choice(
				state,
				record,
				&self.true_icon,
				&self.false_icon,
				(TRUE_ICON, FALSE_ICON),
			);
		}
		if let Some(icon) = &self.icon {
			return icon.evaluate(state, record);
		}
		(!state.is_null()).then(|| stringify(state))
	}

	fn evaluate_color(&self, state: &Value, record: &Record) -> Option<String> {
		if self.boolean {
			return Self::boolean_choice(
				state,
				record,
				&self.true_color,
				&self.false_color,
				(TRUE_COLOR, FALSE_COLOR),
			);
		}
		self.color
			.as_ref()
			.and_then(|color| color.evaluate(state, record))
	}

	fn evaluate_size(&self, state: &Value, record: &Record) -> Option<String> {
		self.icon_size
			.as_ref()
			.and_then(|size| size.evaluate(state, record))
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = Map::new();
		props.insert("boolean".to_string(), json!(self.boolean));
		props.insert("wrap".to_string(), json!(self.wrap));
		props
	}
}

/// Icon column in boolean mode
pub struct BooleanColumn;

impl BooleanColumn {
	/// Boolean column named `name`
	pub fn make(name: impl Into<String>) -> IconColumn {
		IconColumn::make(name).boolean(true)
	}
}
