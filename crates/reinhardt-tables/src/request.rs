//! Incoming request parameters
//!
//! Tables never read ambient request state. Callers pass a [`RequestParams`]
//! value, either built directly or decoded from the raw query string.

use crate::error::{TableError, TableResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Query keys read by the table itself; filters cannot use these names
pub const RESERVED_PARAMS: [&str; 6] = ["search", "sort", "direction", "group", "page", "per_page"];

/// Value supplied for a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
	/// A single scalar value (`?status=active`)
	Single(String),
	/// Multiple values (`?status[]=active&status[]=draft`)
	Many(Vec<String>),
}

impl FilterValue {
	/// The scalar value, or `None` for multi-valued input
	pub fn as_str(&self) -> Option<&str> {
		match self {
			FilterValue::Single(s) => Some(s),
			FilterValue::Many(_) => None,
		}
	}

	/// All supplied values
	pub fn values(&self) -> Vec<&str> {
		match self {
			FilterValue::Single(s) => vec![s.as_str()],
			FilterValue::Many(items) => items.iter().map(String::as_str).collect(),
		}
	}

	/// Whether the value carries nothing (`""` or an empty list)
	pub fn is_blank(&self) -> bool {
		match self {
			FilterValue::Single(s) => s.is_empty(),
			FilterValue::Many(items) => items.is_empty(),
		}
	}

	/// Whether the value should produce an active-filter indicator
	pub fn is_indicated(&self) -> bool {
		match self {
			FilterValue::Single(s) => !s.is_empty() && s != "false",
			FilterValue::Many(items) => !items.is_empty(),
		}
	}

	/// The value as JSON, for query operands and props
	pub fn to_json(&self) -> Value {
		match self {
			FilterValue::Single(s) => Value::String(s.clone()),
			FilterValue::Many(items) => {
				Value::Array(items.iter().cloned().map(Value::String).collect())
			}
		}
	}
}

impl From<&str> for FilterValue {
	fn from(value: &str) -> Self {
		FilterValue::Single(value.to_string())
	}
}

impl From<String> for FilterValue {
	fn from(value: String) -> Self {
		FilterValue::Single(value)
	}
}

impl From<Vec<String>> for FilterValue {
	fn from(values: Vec<String>) -> Self {
		FilterValue::Many(values)
	}
}

impl From<Vec<&str>> for FilterValue {
	fn from(values: Vec<&str>) -> Self {
		FilterValue::Many(values.into_iter().map(str::to_string).collect())
	}
}

/// Parameters consumed by the query executor
///
/// # Examples
///
/// ```
/// use reinhardt_tables::request::{FilterValue, RequestParams};
///
/// let params = RequestParams::from_query_string(
///     "search=ann&sort=name&direction=desc&status[]=active&status[]=draft&page=2",
/// ).unwrap();
///
/// assert_eq!(params.search.as_deref(), Some("ann"));
/// assert_eq!(params.page, Some(2));
/// assert_eq!(
///     params.filter("status"),
///     Some(&FilterValue::Many(vec!["active".into(), "draft".into()]))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
	/// Global search term
	pub search: Option<String>,
	/// Requested sort column
	pub sort: Option<String>,
	/// Requested sort direction (anything but `asc`/`desc` coerces to `asc`)
	pub direction: Option<String>,
	/// Requested group column
	pub group: Option<String>,
	/// Requested page (1-indexed)
	pub page: Option<u64>,
	/// Requested page size
	pub per_page: Option<u64>,
	/// Filter values keyed by filter name
	pub filters: HashMap<String, FilterValue>,
}

impl RequestParams {
	/// Create empty parameters
	pub fn new() -> Self {
		Self::default()
	}

	/// Decode a raw `application/x-www-form-urlencoded` query string
	///
	/// Keys ending in `[]` accumulate into multi-valued filters. `page` and
	/// `per_page` values that are not positive integers are dropped.
	pub fn from_query_string(query: &str) -> TableResult<Self> {
		let query = query.strip_prefix('?').unwrap_or(query);
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
			.map_err(|e| TableError::InvalidQueryString(e.to_string()))?;
		Ok(Self::from_pairs(pairs))
	}

	/// Build parameters from decoded key/value pairs
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut params = Self::default();
		for (key, value) in pairs {
			let key = key.into();
			let value = value.into();

			if let Some(name) = key.strip_suffix("[]") {
				let entry = params
					.filters
					.entry(name.to_string())
					.or_insert_with(|| FilterValue::Many(Vec::new()));
				match entry {
					FilterValue::Many(items) => items.push(value),
					FilterValue::Single(previous) => {
						let previous = std::mem::take(previous);
						*entry = FilterValue::Many(vec![previous, value]);
					}
				}
				continue;
			}

			match key.as_str() {
				"search" => params.search = Some(value),
				"sort" => params.sort = Some(value),
				"direction" => params.direction = Some(value),
				"group" => params.group = Some(value),
				"page" => params.page = parse_positive(&value),
				"per_page" => params.per_page = parse_positive(&value),
				_ => {
					params.filters.insert(key, FilterValue::Single(value));
				}
			}
		}
		params
	}

	/// Set the search term
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = Some(search.into());
		self
	}

	/// Set the sort column and direction
	pub fn with_sort(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
		self.sort = Some(column.into());
		self.direction = Some(direction.into());
		self
	}

	/// Set the group column
	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	/// Set the page
	pub fn with_page(mut self, page: u64) -> Self {
		self.page = Some(page);
		self
	}

	/// Set the page size
	pub fn with_per_page(mut self, per_page: u64) -> Self {
		self.per_page = Some(per_page);
		self
	}

	/// Set a filter value
	pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
		self.filters.insert(name.into(), value.into());
		self
	}

	/// Value supplied for a filter, if any
	pub fn filter(&self, name: &str) -> Option<&FilterValue> {
		self.filters.get(name)
	}

	/// Search term, if present and non-empty
	pub fn search_term(&self) -> Option<&str> {
		self.search.as_deref().filter(|s| !s.is_empty())
	}
}

fn parse_positive(value: &str) -> Option<u64> {
	value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_reserved_names_never_reach_filters() {
		for name in RESERVED_PARAMS {
			let params = RequestParams::from_pairs([(name, "7")]);
			assert_eq!(params.filter(name), None, "{name}");
		}
	}

	#[test]
	fn test_parse_reserved_and_filters() {
		let params =
			RequestParams::from_query_string("?search=x&group=team&per_page=50&status=active")
				.unwrap();
		assert_eq!(params.search.as_deref(), Some("x"));
		assert_eq!(params.group.as_deref(), Some("team"));
		assert_eq!(params.per_page, Some(50));
		assert_eq!(params.filter("status"), Some(&FilterValue::from("active")));
		assert!(params.filter("search").is_none());
	}

	#[test]
	fn test_array_keys_accumulate() {
		let params = RequestParams::from_query_string("tags[]=a&tags[]=b&tags[]=c").unwrap();
		assert_eq!(
			params.filter("tags"),
			Some(&FilterValue::from(vec!["a", "b", "c"]))
		);
	}

	#[test]
	fn test_percent_decoding() {
		let params = RequestParams::from_query_string("search=x.com%20ann&name=J+Doe").unwrap();
		assert_eq!(params.search.as_deref(), Some("x.com ann"));
		assert_eq!(params.filter("name"), Some(&FilterValue::from("J Doe")));
	}

	#[rstest]
	#[case("page=0", None)]
	#[case("page=-3", None)]
	#[case("page=abc", None)]
	#[case("page=4", Some(4))]
	fn test_page_must_be_positive(#[case] query: &str, #[case] expected: Option<u64>) {
		let params = RequestParams::from_query_string(query).unwrap();
		assert_eq!(params.page, expected);
	}

	#[test]
	fn test_search_term_ignores_empty() {
		let params = RequestParams::new().with_search("");
		assert_eq!(params.search_term(), None);
	}

	#[rstest]
	#[case(FilterValue::from(""), false)]
	#[case(FilterValue::from("false"), false)]
	#[case(FilterValue::from("0"), true)]
	#[case(FilterValue::Many(vec![]), false)]
	#[case(FilterValue::from(vec!["a"]), true)]
	fn test_is_indicated(#[case] value: FilterValue, #[case] expected: bool) {
		assert_eq!(value.is_indicated(), expected);
	}
}
