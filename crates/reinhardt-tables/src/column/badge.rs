//! Badge column

use super::base::{Column, ColumnBuilder, ColumnCore, Evaluator};
use super::summarizer::Summarizer;
use super::text::TextColumn;
use crate::value::Record;
use serde_json::{Map, Value, json};

/// Named colors usable as an unconditional badge color
pub const NAMED_COLORS: [&str; 7] = [
	"primary",
	"secondary",
	"success",
	"warning",
	"danger",
	"info",
	"gray",
];

/// Color assigned when nothing else matches
pub const FALLBACK_COLOR: &str = "gray";

/// One entry of a badge color table
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeColor {
	/// Applies to every state; only named colors are honoured
	Default(String),
	/// Applies when the state equals `state` exactly
	When {
		/// Color to use
		color: String,
		/// State that selects the color
		state: Value,
	},
}

/// Text column rendered as a colored badge
///
/// Color resolution order: the text column's own color, then the colors
/// evaluator, then the first matching entry of the colors table, then
/// `gray`.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::column::{BadgeColumn, Column};
/// use serde_json::json;
///
/// let column = BadgeColumn::make("status")
///     .color_when("warning", "reviewing")
///     .color_when("success", "published");
/// let record = Default::default();
///
/// assert_eq!(column.evaluate_color(&json!("published"), &record).as_deref(), Some("success"));
/// assert_eq!(column.evaluate_color(&json!("draft"), &record).as_deref(), Some("gray"));
/// ```
#[derive(Debug, Clone)]
pub struct BadgeColumn {
	text: TextColumn,
	colors: Vec<BadgeColor>,
	colors_using: Option<Evaluator<String>>,
}

impl BadgeColumn {
	/// Badge column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			text: TextColumn::make(name).badge(true),
			colors: Vec::new(),
			colors_using: None,
		}
	}

	/// Use `color` when the state equals `state`
	pub fn color_when(mut self, color: impl Into<String>, state: impl Into<Value>) -> Self {
		self.colors.push(BadgeColor::When {
			color: color.into(),
			state: state.into(),
		});
		self
	}

	/// Unconditional color entry
	pub fn default_color(mut self, color: impl Into<String>) -> Self {
		self.colors.push(BadgeColor::Default(color.into()));
		self
	}

	/// Replace the colors table
	pub fn colors(mut self, colors: impl IntoIterator<Item = BadgeColor>) -> Self {
		self.colors = colors.into_iter().collect();
		self
	}

	/// Per-record colors evaluator
	pub fn colors_using<F>(mut self, colors: F) -> Self
	where
		F: Fn(&Value, &Record) -> Option<String> + Send + Sync + 'static,
	{
		self.colors_using = Some(Evaluator::new(colors));
		self
	}

	/// Static color taking precedence over the colors table
	pub fn color(mut self, color: impl Into<String>) -> Self {
		self.text = self.text.color(color);
		self
	}

	/// Count a relationship into this column
	pub fn counts(mut self, relation: impl Into<String>) -> Self {
		self.text = self.text.counts(relation);
		self
	}

	/// Attach summarizers
	pub fn summarize(mut self, summarizers: impl IntoIterator<Item = Summarizer>) -> Self {
		self.text = self.text.summarize(summarizers);
		self
	}

	fn colors_props(&self) -> Value {
		let mut table = Map::new();
		let mut defaults = Vec::new();
		for entry in &self.colors {
			match entry {
				BadgeColor::Default(color) => defaults.push(Value::String(color.clone())),
				BadgeColor::When { color, state } => {
					table.insert(color.clone(), state.clone());
				}
			}
		}
		json!({"defaults": defaults, "conditions": table})
	}
}

impl ColumnBuilder for BadgeColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		self.text.core_mut()
	}
}

impl Column for BadgeColumn {
	fn core(&self) -> &ColumnCore {
		self.text.core()
	}

	fn component(&self) -> &'static str {
		"TextColumn"
	}

	fn counts_relation(&self) -> Option<&str> {
		self.text.counts_relation()
	}

	fn summarizers(&self) -> &[Summarizer] {
		self.text.summarizers()
	}

	fn evaluate_color(&self, state: &Value, record: &Record) -> Option<String> {
		if self.text.has_color()
			&& let Some(color) = self.text.evaluate_color(state, record)
		{
			return Some(color);
		}

		if let Some(colors) = &self.colors_using {
			return colors.evaluate(state, record);
		}

		for entry in &self.colors {
			match entry {
				BadgeColor::Default(color) if NAMED_COLORS.contains(&color.as_str()) => {
					return Some(color.clone());
				}
				BadgeColor::Default(_) => {}
				BadgeColor::When {
					color,
					state: condition,
				} if condition == state => return Some(color.clone()),
				BadgeColor::When { .. } => {}
			}
		}

		Some(FALLBACK_COLOR.to_string())
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = self.text.extra_props();
		props.insert("colors".to_string(), self.colors_props());
		props
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn record() -> Record {
		Record::new()
	}

	#[rstest]
	#[case(json!("active"), "success")]
	#[case(json!("inactive"), "danger")]
	#[case(json!("other"), "gray")]
	fn test_conditional_colors(#[case] state: Value, #[case] expected: &str) {
		let column = BadgeColumn::make("status")
			.color_when("success", "active")
			.color_when("danger", "inactive");
		assert_eq!(
			column.evaluate_color(&state, &record()).as_deref(),
			Some(expected)
		);
	}

	#[test]
	fn test_strict_state_equality() {
		let column = BadgeColumn::make("level").color_when("danger", 1);
		assert_eq!(
			column.evaluate_color(&json!("1"), &record()).as_deref(),
			Some("gray")
		);
		assert_eq!(
			column.evaluate_color(&json!(1), &record()).as_deref(),
			Some("danger")
		);
	}

	#[test]
	fn test_default_entry_must_be_named_color() {
		let unnamed = BadgeColumn::make("status").default_color("fuchsia");
		assert_eq!(
			unnamed.evaluate_color(&json!("x"), &record()).as_deref(),
			Some("gray")
		);

		let named = BadgeColumn::make("status")
			.default_color("info")
			.color_when("success", "x");
		assert_eq!(
			named.evaluate_color(&json!("x"), &record()).as_deref(),
			Some("info")
		);
	}

	#[test]
	fn test_precedence() {
		let column = BadgeColumn::make("status")
			.color_when("success", "x")
			.colors_using(|_, _| Some("warning".to_string()));
		assert_eq!(
			column.evaluate_color(&json!("x"), &record()).as_deref(),
			Some("warning")
		);

		let column = column.color("primary");
		assert_eq!(
			column.evaluate_color(&json!("x"), &record()).as_deref(),
			Some("primary")
		);
	}

	#[test]
	fn test_colors_evaluator_may_return_none() {
		let column = BadgeColumn::make("status").colors_using(|_, _| None);
		assert_eq!(column.evaluate_color(&json!("x"), &record()), None);
	}

	#[test]
	fn test_props() {
		let props = BadgeColumn::make("status")
			.color_when("success", "active")
			.to_props();
		assert_eq!(props["badge"], json!(true));
		assert_eq!(props["colors"]["conditions"]["success"], json!("active"));
	}
}
