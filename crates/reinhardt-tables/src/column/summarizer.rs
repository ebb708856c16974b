//! Column summarizers
//!
//! Aggregates computed over the records returned for the current page.

use crate::value::{Record, lookup_path};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Custom summary: `(records, column) -> value`
pub type SummaryFn = Arc<dyn Fn(&[Record], &str) -> Value + Send + Sync>;

/// Built-in aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
	/// Sum of numeric values
	Sum,
	/// Mean of numeric values
	Average,
	/// Number of records
	Count,
}

impl SummaryKind {
	fn type_name(&self) -> &'static str {
		match self {
			SummaryKind::Sum => "Sum",
			SummaryKind::Average => "Average",
			SummaryKind::Count => "Count",
		}
	}
}

/// Aggregate attached to a column
///
/// # Examples
///
/// ```
/// use reinhardt_tables::column::Summarizer;
/// use serde_json::json;
///
/// let records: Vec<_> = [json!({"price": 10}), json!({"price": 5})]
///     .iter()
///     .map(|r| r.as_object().unwrap().clone())
///     .collect();
///
/// assert_eq!(Summarizer::sum().execute(&records, "price"), json!(15));
/// assert_eq!(Summarizer::average().execute(&records, "price"), json!(7.5));
/// ```
#[derive(Clone)]
pub struct Summarizer {
	kind: SummaryKind,
	label: Option<String>,
	using: Option<SummaryFn>,
	column: Option<String>,
	precision: Option<u32>,
	money: bool,
	currency: Option<String>,
}

impl Summarizer {
	fn new(kind: SummaryKind) -> Self {
		Self {
			kind,
			label: None,
			using: None,
			column: None,
			precision: None,
			money: false,
			currency: None,
		}
	}

	/// Sum of the column's numeric values
	pub fn sum() -> Self {
		Self::new(SummaryKind::Sum)
	}

	/// Average of the column's numeric values
	pub fn average() -> Self {
		Self::new(SummaryKind::Average)
	}

	/// Number of records
	pub fn count() -> Self {
		Self::new(SummaryKind::Count)
	}

	/// Set the label
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Replace the built-in aggregate with a custom function
	pub fn using<F>(mut self, function: F) -> Self
	where
		F: Fn(&[Record], &str) -> Value + Send + Sync + 'static,
	{
		self.using = Some(Arc::new(function));
		self
	}

	/// Summarize a different column than the one it is attached to
	pub fn column(mut self, column: impl Into<String>) -> Self {
		self.column = Some(column.into());
		self
	}

	/// Round to `precision` decimal places
	pub fn precision(mut self, precision: u32) -> Self {
		self.precision = Some(precision);
		self
	}

	/// Format the result as money (`1,234.50 USD`)
	pub fn money(mut self, currency: Option<&str>) -> Self {
		self.money = true;
		self.currency = currency.map(str::to_string);
		self
	}

	/// Aggregate kind
	pub fn kind(&self) -> SummaryKind {
		self.kind
	}

	/// Compute the summary for `column` over `records`
	pub fn execute(&self, records: &[Record], column: &str) -> Value {
		if let Some(using) = &self.using {
			return self.format_result(using(records, column));
		}
		let column = self.column.as_deref().unwrap_or(column);
		self.format_result(self.summarize(records, column))
	}

	fn summarize(&self, records: &[Record], column: &str) -> Value {
		if self.kind == SummaryKind::Count {
			return json!(records.len());
		}

		let values: Vec<&Value> = records
			.iter()
			.filter_map(|record| lookup_path(record, column))
			.filter(|value| !value.is_null())
			.collect();

		match self.kind {
			SummaryKind::Sum => {
				let integers: Option<Vec<i64>> = values.iter().map(|v| v.as_i64()).collect();
				match integers {
					Some(integers) => json!(integers.iter().sum::<i64>()),
					None => json!(values.iter().filter_map(|v| as_f64(v)).sum::<f64>()),
				}
			}
			SummaryKind::Average => {
				let numbers: Vec<f64> = values.iter().filter_map(|v| as_f64(v)).collect();
				if numbers.is_empty() {
					Value::Null
				} else {
					json!(numbers.iter().sum::<f64>() / numbers.len() as f64)
				}
			}
			SummaryKind::Count => json!(records.len()),
		}
	}

	fn format_result(&self, value: Value) -> Value {
		if value.is_null() {
			return value;
		}

		let mut value = value;
		if let Some(precision) = self.precision
			&& let Some(number) = as_f64(&value)
		{
			let factor = 10f64.powi(precision as i32);
			value = json!((number * factor).round() / factor);
		}

		if self.money {
			let currency = self.currency.as_deref().unwrap_or("USD");
			let number = as_f64(&value).unwrap_or_default();
			return json!(format!("{} {}", format_money(number), currency));
		}
		value
	}

	/// Serialized summarizer configuration
	pub fn to_props(&self) -> Value {
		json!({
			"type": self.kind.type_name(),
			"label": self.label,
			"column": self.column,
			"precision": self.precision,
			"isMoney": self.money,
			"currency": self.currency,
		})
	}
}

impl fmt::Debug for Summarizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Summarizer")
			.field("kind", &self.kind)
			.field("label", &self.label)
			.field("column", &self.column)
			.field("custom", &self.using.is_some())
			.finish_non_exhaustive()
	}
}

fn as_f64(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Two decimals with comma thousands separators
fn format_money(number: f64) -> String {
	let fixed = format!("{:.2}", number.abs());
	let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

	let mut grouped = String::new();
	for (i, digit) in integer.chars().enumerate() {
		if i > 0 && (integer.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}

	let sign = if number < 0.0 { "-" } else { "" };
	format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[fixture]
	fn records() -> Vec<Record> {
		[
			json!({"price": 10, "qty": "2.5"}),
			json!({"price": 20, "qty": null}),
			json!({"price": 1234.5}),
		]
		.iter()
		.filter_map(|r| r.as_object().cloned())
		.collect()
	}

	#[rstest]
	fn test_sum_mixed_is_float(records: Vec<Record>) {
		assert_eq!(Summarizer::sum().execute(&records, "price"), json!(1264.5));
	}

	#[rstest]
	fn test_sum_integers_stays_integer(records: Vec<Record>) {
		assert_eq!(Summarizer::sum().execute(&records[..2], "price"), json!(30));
	}

	#[rstest]
	fn test_average_skips_nulls(records: Vec<Record>) {
		assert_eq!(Summarizer::average().execute(&records, "qty"), json!(2.5));
		assert_eq!(Summarizer::average().execute(&[], "qty"), Value::Null);
	}

	#[rstest]
	fn test_count(records: Vec<Record>) {
		assert_eq!(Summarizer::count().execute(&records, "price"), json!(3));
	}

	#[rstest]
	fn test_precision_and_money(records: Vec<Record>) {
		let average = Summarizer::average().precision(1);
		assert_eq!(average.execute(&records, "price"), json!(421.5));

		let money = Summarizer::sum().money(Some("EUR"));
		assert_eq!(money.execute(&records, "price"), json!("1,264.50 EUR"));
	}

	#[rstest]
	fn test_custom_using_and_column_override(records: Vec<Record>) {
		let max = Summarizer::sum().using(|records, column| {
			json!(records.iter().filter_map(|r| r[column].as_f64()).fold(0.0, f64::max))
		});
		assert_eq!(max.execute(&records, "price"), json!(1234.5));

		let other = Summarizer::sum().column("qty");
		assert_eq!(other.execute(&records, "price"), json!(2.5));
	}

	#[rstest]
	#[case(0.0, "0.00")]
	#[case(999.999, "1,000.00")]
	#[case(1234567.891, "1,234,567.89")]
	#[case(-42.5, "-42.50")]
	fn test_format_money(#[case] number: f64, #[case] expected: &str) {
		assert_eq!(format_money(number), expected);
	}

	#[test]
	fn test_props() {
		let props = Summarizer::average().label("Avg").to_props();
		assert_eq!(props["type"], json!("Average"));
		assert_eq!(props["label"], json!("Avg"));
		assert_eq!(props["isMoney"], json!(false));
	}
}
