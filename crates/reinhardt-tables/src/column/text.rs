//! Text column

use super::base::{Column, ColumnBuilder, ColumnCore, Evaluator};
use super::summarizer::Summarizer;
use crate::value::Record;
use serde_json::{Map, Value, json};

/// Locale-aware number formatting options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericFormat {
	/// Decimal places
	pub decimal_places: Option<u32>,
	/// Decimal separator
	pub decimal_separator: Option<String>,
	/// Thousands separator
	pub thousands_separator: Option<String>,
	/// Locale (`en`, `de`, ...)
	pub locale: Option<String>,
}

/// Column rendering its state as text
///
/// # Examples
///
/// ```
/// use reinhardt_tables::column::{Column, ColumnBuilder, TextColumn};
/// use serde_json::json;
///
/// let column = TextColumn::make("orders_count")
///     .counts("orders")
///     .color("primary")
///     .sortable(true);
///
/// assert_eq!(column.counts_relation(), Some("orders"));
/// assert_eq!(
///     column.evaluate_color(&json!(3), &Default::default()).as_deref(),
///     Some("primary")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TextColumn {
	core: ColumnCore,
	limit: Option<usize>,
	wrap: bool,
	copyable: Option<String>,
	badge: bool,
	date_time_format: Option<String>,
	date_format: Option<String>,
	since: bool,
	icon: Option<String>,
	icon_position: String,
	weight: Option<String>,
	money: Option<(String, u32)>,
	color: Option<Evaluator<String>>,
	html: bool,
	separator: Option<String>,
	list_with_line_breaks: bool,
	bulleted: bool,
	counts_relation: Option<String>,
	numeric: Option<NumericFormat>,
	summarizers: Vec<Summarizer>,
}

impl TextColumn {
	/// Text column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			limit: None,
			wrap: false,
			copyable: None,
			badge: false,
			date_time_format: None,
			date_format: None,
			since: false,
			icon: None,
			icon_position: "before".to_string(),
			weight: None,
			money: None,
			color: None,
			html: false,
			separator: None,
			list_with_line_breaks: false,
			bulleted: false,
			counts_relation: None,
			numeric: None,
			summarizers: Vec::new(),
		}
	}

	/// Count a relationship into this column
	///
	/// The column should be named `{relation}_count`; the executor adds the
	/// count to the query.
	pub fn counts(mut self, relation: impl Into<String>) -> Self {
		self.counts_relation = Some(relation.into());
		self
	}

	/// Truncate displayed text to `characters`
	pub fn limit(mut self, characters: usize) -> Self {
		self.limit = Some(characters);
		self
	}

	/// Wrap long text
	pub fn wrap(mut self, wrap: bool) -> Self {
		self.wrap = wrap;
		self
	}

	/// Show a copy button with `message`
	pub fn copyable(mut self, message: impl Into<String>) -> Self {
		self.copyable = Some(message.into());
		self
	}

	/// Render as a badge
	pub fn badge(mut self, badge: bool) -> Self {
		self.badge = badge;
		self
	}

	/// Whether the column renders as a badge
	pub fn is_badge(&self) -> bool {
		self.badge
	}

	/// Format as date and time
	pub fn date_time(mut self, format: impl Into<String>) -> Self {
		self.date_time_format = Some(format.into());
		self
	}

	/// Format as date
	pub fn date(mut self, format: impl Into<String>) -> Self {
		self.date_format = Some(format.into());
		self
	}

	/// Render as relative time
	pub fn since(mut self, since: bool) -> Self {
		self.since = since;
		self
	}

	/// Static icon next to the text
	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	/// Icon placement (`before` or `after`)
	pub fn icon_position(mut self, position: impl Into<String>) -> Self {
		self.icon_position = position.into();
		self
	}

	/// Font weight
	pub fn weight(mut self, weight: impl Into<String>) -> Self {
		self.weight = Some(weight.into());
		self
	}

	/// Format as money, dividing stored values by `divide_by`
	pub fn money(mut self, currency: impl Into<String>, divide_by: u32) -> Self {
		self.money = Some((currency.into(), divide_by));
		self
	}

	/// Format as a number
	pub fn numeric(mut self, format: NumericFormat) -> Self {
		self.numeric = Some(format);
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

	/// Render the state as HTML
	pub fn html(mut self, html: bool) -> Self {
		self.html = html;
		self
	}

	/// Split list values on `separator`
	pub fn separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = Some(separator.into());
		self
	}

	/// Render list values on separate lines
	pub fn list_with_line_breaks(mut self, enabled: bool) -> Self {
		self.list_with_line_breaks = enabled;
		self
	}

	/// Render list values as bullets (implies line breaks)
	pub fn bulleted(mut self, bulleted: bool) -> Self {
		self.bulleted = bulleted;
		if bulleted {
			self.list_with_line_breaks = true;
		}
		self
	}

	/// Attach summarizers
	pub fn summarize(mut self, summarizers: impl IntoIterator<Item = Summarizer>) -> Self {
		self.summarizers = summarizers.into_iter().collect();
		self
	}

	pub(crate) fn has_color(&self) -> bool {
		self.color.is_some()
	}
}

impl ColumnBuilder for TextColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for TextColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"TextColumn"
	}

	fn counts_relation(&self) -> Option<&str> {
		self.counts_relation.as_deref()
	}

	fn summarizers(&self) -> &[Summarizer] {
		&self.summarizers
	}

	fn evaluate_color(&self, state: &Value, record: &Record) -> Option<String> {
		self.color
			.as_ref()
			.and_then(|color| color.evaluate(state, record))
	}

	fn extra_props(&self) -> Map<String, Value> {
		let numeric = self.numeric.as_ref().map(|format| {
			json!({
				"decimalPlaces": format.decimal_places,
				"decimalSeparator": format.decimal_separator,
				"thousandsSeparator": format.thousands_separator,
				"locale": format.locale,
			})
		});
		let money = self.money.as_ref().map(|(currency, divide_by)| {
			json!({"currency": currency, "divideBy": divide_by})
		});

		let props = json!({
			"limit": self.limit,
			"wrap": self.wrap,
			"copyable": self.copyable,
			"badge": self.badge,
			"dateTimeFormat": self.date_time_format,
			"dateFormat": self.date_format,
			"icon": self.icon,
			"iconPosition": self.icon_position,
			"weight": self.weight,
			"moneyFormat": money,
			"colorCallback": self.color.is_some(),
			"html": self.html,
			"since": self.since,
			"separator": self.separator,
			"listWithLineBreaks": self.list_with_line_breaks,
			"bulleted": self.bulleted,
			"numericFormat": numeric,
			"summarizers": self.summarizers.iter().map(Summarizer::to_props).collect::<Vec<_>>(),
		});
		match props {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}
}
