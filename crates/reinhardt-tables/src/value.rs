//! Record representation and loose value semantics
//!
//! Rows flow through the table pipeline as JSON objects. Comparisons follow
//! the loose rules admin data sources apply to request-supplied strings:
//! `"1"` equals `1`, `"true"` equals `true`, and so on.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A single row: string-keyed attributes, possibly nesting related rows
pub type Record = Map<String, Value>;

/// Resolve `key` against a record, supporting dot notation
///
/// An exact key match wins over path traversal, so flattened keys such as
/// `"customer.name"` resolve before the nested `customer` object is walked.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::value::lookup_path;
/// use serde_json::json;
///
/// let record = json!({"customer": {"name": "Jane"}});
/// let record = record.as_object().unwrap();
/// assert_eq!(lookup_path(record, "customer.name"), Some(&json!("Jane")));
/// assert_eq!(lookup_path(record, "customer.email"), None);
/// ```
pub fn lookup_path<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
	if let Some(value) = record.get(key) {
		return Some(value);
	}

	if !key.contains('.') {
		return None;
	}

	let mut segments = key.split('.');
	let mut current = record.get(segments.next()?)?;
	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}
	Some(current)
}

/// Truthiness of a value
///
/// `null`, `false`, `0`, `""`, `"0"` and empty arrays are falsy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty() && s != "0",
		Value::Array(items) => !items.is_empty(),
		Value::Object(_) => true,
	}
}

/// Render a value as display text
///
/// Strings render without quotes, `null` renders empty, `true` as `"1"` and
/// `false` as empty.
pub fn stringify(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(true) => "1".to_string(),
		Value::Bool(false) => String::new(),
		Value::Number(n) => n.to_string(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Interpret a value as a boolean flag (`"1"`, `"true"`, `"on"`, `"yes"`)
pub fn as_flag(value: &Value) -> bool {
	match value {
		Value::String(s) => matches!(
			s.trim().to_ascii_lowercase().as_str(),
			"1" | "true" | "on" | "yes"
		),
		other => is_truthy(other),
	}
}

fn as_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
		_ => None,
	}
}

/// Loose equality between a stored value and a filter operand
pub fn loose_eq(left: &Value, right: &Value) -> bool {
	match (left, right) {
		(Value::Null, Value::Null) => true,
		(Value::Null, _) | (_, Value::Null) => false,
		(Value::Bool(b), other) | (other, Value::Bool(b)) => *b == as_flag(other),
		(Value::Number(_), _) | (_, Value::Number(_)) => {
			match (as_number(left), as_number(right)) {
				(Some(a), Some(b)) => a == b,
				_ => stringify(left) == stringify(right),
			}
		}
		(Value::String(a), Value::String(b)) => a == b,
		_ => left == right,
	}
}

/// Ordering used for sorting and range comparisons
///
/// `null` sorts before everything else; numbers compare numerically, other
/// scalars compare by their display text.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
	match (left, right) {
		(Value::Null, Value::Null) => Ordering::Equal,
		(Value::Null, _) => Ordering::Less,
		(_, Value::Null) => Ordering::Greater,
		_ => match (as_number(left), as_number(right)) {
			(Some(a), Some(b)) if !left.is_string() || !right.is_string() => {
				a.partial_cmp(&b).unwrap_or(Ordering::Equal)
			}
			_ => stringify(left).cmp(&stringify(right)),
		},
	}
}

/// Case-insensitive `LIKE` matching supporting `%` and `_` wildcards
pub fn like_matches(value: &Value, pattern: &str) -> bool {
	if value.is_null() {
		return false;
	}
	let text: Vec<char> = stringify(value).to_lowercase().chars().collect();
	let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
	like_match_chars(&text, &pattern)
}

fn like_match_chars(text: &[char], pattern: &[char]) -> bool {
	// Iterative wildcard match with backtracking on the last `%`
	let (mut t, mut p) = (0, 0);
	let mut star: Option<(usize, usize)> = None;
	while t < text.len() {
		if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
			t += 1;
			p += 1;
		} else if p < pattern.len() && pattern[p] == '%' {
			star = Some((p, t));
			p += 1;
		} else if let Some((star_p, star_t)) = star {
			p = star_p + 1;
			t = star_t + 1;
			star = Some((star_p, star_t + 1));
		} else {
			return false;
		}
	}
	while p < pattern.len() && pattern[p] == '%' {
		p += 1;
	}
	p == pattern.len()
}

/// Human label derived from a field name
///
/// `customer.full_name` becomes `Customer full name`.
pub fn headline(name: &str) -> String {
	let spaced = name.replace(['_', '.'], " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn record(value: Value) -> Record {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_lookup_prefers_exact_key() {
		let row = record(json!({"a.b": 1, "a": {"b": 2}}));
		assert_eq!(lookup_path(&row, "a.b"), Some(&json!(1)));
	}

	#[test]
	fn test_lookup_nested_path() {
		let row = record(json!({"customer": {"address": {"city": "Oslo"}}}));
		assert_eq!(
			lookup_path(&row, "customer.address.city"),
			Some(&json!("Oslo"))
		);
		assert_eq!(lookup_path(&row, "customer.address.zip"), None);
		assert_eq!(lookup_path(&row, "missing"), None);
	}

	#[test]
	fn test_lookup_through_scalar_is_none() {
		let row = record(json!({"customer": "Jane"}));
		assert_eq!(lookup_path(&row, "customer.name"), None);
	}

	#[rstest]
	#[case(json!(null), false)]
	#[case(json!(false), false)]
	#[case(json!(0), false)]
	#[case(json!(""), false)]
	#[case(json!("0"), false)]
	#[case(json!([]), false)]
	#[case(json!(true), true)]
	#[case(json!(2), true)]
	#[case(json!("false"), true)]
	#[case(json!({}), true)]
	fn test_is_truthy(#[case] value: Value, #[case] expected: bool) {
		assert_eq!(is_truthy(&value), expected);
	}

	#[rstest]
	#[case(json!(1), json!("1"), true)]
	#[case(json!(true), json!("1"), true)]
	#[case(json!(false), json!("0"), true)]
	#[case(json!(true), json!(1), true)]
	#[case(json!("active"), json!("active"), true)]
	#[case(json!("active"), json!("Active"), false)]
	#[case(json!(null), json!(""), false)]
	#[case(json!(2.5), json!("2.5"), true)]
	fn test_loose_eq(#[case] left: Value, #[case] right: Value, #[case] expected: bool) {
		assert_eq!(loose_eq(&left, &right), expected);
	}

	#[test]
	fn test_compare_values_numeric_and_null() {
		assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
		assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
		assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
		// Two strings compare as text even when numeric-looking
		assert_eq!(compare_values(&json!("10"), &json!("9")), Ordering::Less);
	}

	#[rstest]
	#[case("Ann", "%ann%", true)]
	#[case("a@x.com", "%X.COM%", true)]
	#[case("Bob", "%ann%", false)]
	#[case("Bob", "B_b", true)]
	#[case("Bob", "%", true)]
	#[case("", "%a%", false)]
	fn test_like_matches(#[case] text: &str, #[case] pattern: &str, #[case] expected: bool) {
		assert_eq!(like_matches(&json!(text), pattern), expected);
	}

	#[test]
	fn test_like_never_matches_null() {
		assert!(!like_matches(&json!(null), "%"));
	}

	#[test]
	fn test_stringify() {
		assert_eq!(stringify(&json!("x")), "x");
		assert_eq!(stringify(&json!(3)), "3");
		assert_eq!(stringify(&json!(null)), "");
		assert_eq!(stringify(&json!(true)), "1");
	}
}
