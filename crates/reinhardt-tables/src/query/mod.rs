//! Query-builder abstraction
//!
//! Tables never talk to a data source directly. They receive a
//! [`QueryBuilder`] from their query callback and mutate it in place: eager
//! loads, counts, filters, search, ordering and finally pagination.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryQuery`]: rows held as JSON objects, evaluated in process
//! - [`SqlQuery`]: compiles to a `SELECT` with sea-query and delegates
//!   execution to a [`SqlConnection`] (feature `sql`)

pub mod condition;
pub mod memory;
pub mod model;
#[cfg(feature = "sql")]
pub mod sql;

pub use condition::{Condition, Operator, Predicate};
pub use memory::MemoryQuery;
pub use model::{ModelMeta, Relation, RelationKind};
#[cfg(feature = "sql")]
pub use sql::{SqlConnection, SqlDialect, SqlQuery};

use crate::error::TableResult;
use crate::value::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	/// Ascending
	#[default]
	Asc,
	/// Descending
	Desc,
}

impl SortDirection {
	/// Parse a request-supplied direction
	///
	/// Only `asc` and `desc` are recognised; anything else coerces to
	/// [`SortDirection::Asc`].
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::query::SortDirection;
	///
	/// assert_eq!(SortDirection::from_param("desc"), SortDirection::Desc);
	/// assert_eq!(SortDirection::from_param("banana"), SortDirection::Asc);
	/// ```
	pub fn from_param(value: &str) -> Self {
		match value {
			"desc" => SortDirection::Desc,
			_ => SortDirection::Asc,
		}
	}

	/// Lowercase name
	pub fn as_str(&self) -> &'static str {
		match self {
			SortDirection::Asc => "asc",
			SortDirection::Desc => "desc",
		}
	}
}

/// Soft-delete visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashedMode {
	/// Exclude soft-deleted rows (the global scope)
	#[default]
	Without,
	/// Include soft-deleted rows
	With,
	/// Only soft-deleted rows
	Only,
}

/// A left join against a related table
///
/// An aliased join is referenced by its alias, which keeps self-referencing
/// relations (`people.manager_id -> people.id`) apart from the base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
	/// Joined table
	pub table: String,
	/// Name the joined table is referenced by, when different from `table`
	pub alias: Option<String>,
	/// Qualified column on the existing side (`orders.customer_id`)
	pub first: String,
	/// Qualified column on the joined side (`customers.id`)
	pub second: String,
}

impl Join {
	/// Create a join
	pub fn new(
		table: impl Into<String>,
		first: impl Into<String>,
		second: impl Into<String>,
	) -> Self {
		Self {
			table: table.into(),
			alias: None,
			first: first.into(),
			second: second.into(),
		}
	}

	/// Reference the joined table as `alias`
	pub fn alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = Some(alias.into());
		self
	}

	/// Alias if set, otherwise the table name
	pub fn name(&self) -> &str {
		self.alias.as_deref().unwrap_or(&self.table)
	}
}

/// Pagination metadata
///
/// `from`/`to` are 1-indexed positions of the first and last record on the
/// page, both `0` when the page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	/// Total number of matching records
	pub total: u64,
	/// Page size
	pub per_page: u64,
	/// Current page (1-indexed)
	pub current_page: u64,
	/// Last page, never below 1
	pub last_page: u64,
	/// Position of the first record on the page
	pub from: u64,
	/// Position of the last record on the page
	pub to: u64,
}

impl Pagination {
	/// Compute pagination for `count` records returned on `current_page`
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::query::Pagination;
	///
	/// let pagination = Pagination::new(25, 10, 3, 5);
	/// assert_eq!(pagination.last_page, 3);
	/// assert_eq!((pagination.from, pagination.to), (21, 25));
	/// ```
	pub fn new(total: u64, per_page: u64, current_page: u64, count: u64) -> Self {
		let per_page = per_page.max(1);
		let current_page = current_page.max(1);
		let last_page = total.div_ceil(per_page).max(1);
		let (from, to) = if count == 0 {
			(0, 0)
		} else {
			let from = (current_page - 1) * per_page + 1;
			(from, from + count - 1)
		};

		Self {
			total,
			per_page,
			current_page,
			last_page,
			from,
			to,
		}
	}

	/// Pagination block for a table without data
	pub fn empty(per_page: u64) -> Self {
		Self {
			total: 0,
			per_page,
			current_page: 1,
			last_page: 1,
			from: 0,
			to: 0,
		}
	}
}

/// One page of records
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
	/// Records on the page
	pub records: Vec<Record>,
	/// Pagination metadata
	pub pagination: Pagination,
}

/// Mutable query handle consumed by the table executor
///
/// Implementations accumulate state through the mutating methods and run
/// the query when [`paginate`](QueryBuilder::paginate) or
/// [`get`](QueryBuilder::get) is called. Column names may be plain
/// (`name`), table-qualified (`customers.name`) or relation-qualified
/// (`customer.name`).
pub trait QueryBuilder {
	/// Metadata of the queried model
	fn model(&self) -> &ModelMeta;

	/// Add a condition, combined with existing ones by AND
	fn where_condition(&mut self, condition: Condition);

	/// `column = value`
	fn where_eq(&mut self, column: &str, value: Value) {
		self.where_condition(Condition::eq(column, value));
	}

	/// `column IN (values)`
	fn where_in(&mut self, column: &str, values: Vec<Value>) {
		self.where_condition(Condition::is_in(column, values));
	}

	/// `column IS NULL`
	fn where_null(&mut self, column: &str) {
		self.where_condition(Condition::is_null(column));
	}

	/// `column IS NOT NULL`
	fn where_not_null(&mut self, column: &str) {
		self.where_condition(Condition::is_not_null(column));
	}

	/// OR-combined conditions added as one AND clause; empty input is ignored
	fn where_any(&mut self, conditions: Vec<Condition>) {
		if !conditions.is_empty() {
			self.where_condition(Condition::Or(conditions));
		}
	}

	/// Append an ordering; earlier orderings take precedence
	fn order_by(&mut self, column: &str, direction: SortDirection);

	/// Left join another table
	fn left_join(&mut self, join: Join);

	/// Restrict the selected columns to `table.*`
	fn select_table_columns(&mut self, table: &str);

	/// Eager-load relations onto the returned records
	fn with(&mut self, relations: &[String]);

	/// Add `{relation}_count` attributes to the returned records
	fn with_count(&mut self, relations: &[String]);

	/// Set soft-delete visibility
	fn trashed(&mut self, mode: TrashedMode);

	/// Drop the global "exclude soft-deleted" scope
	fn remove_soft_delete_scope(&mut self) {
		self.trashed(TrashedMode::With);
	}

	/// Whether `table` has a physical `column`
	fn has_column(&self, table: &str, column: &str) -> bool;

	/// Run the query, returning one page
	fn paginate(&mut self, per_page: u64, page: u64) -> TableResult<Page>;

	/// Run the query, returning every matching record
	fn get(&mut self) -> TableResult<Vec<Record>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("asc", SortDirection::Asc)]
	#[case("desc", SortDirection::Desc)]
	#[case("DESC", SortDirection::Asc)]
	#[case("banana", SortDirection::Asc)]
	#[case("", SortDirection::Asc)]
	fn test_direction_coercion(#[case] input: &str, #[case] expected: SortDirection) {
		assert_eq!(SortDirection::from_param(input), expected);
	}

	#[rstest]
	#[case(0, 12, 1, 0, (1, 0, 0))]
	#[case(30, 12, 1, 12, (3, 1, 12))]
	#[case(30, 12, 3, 6, (3, 25, 30))]
	#[case(30, 12, 9, 0, (3, 0, 0))]
	fn test_pagination(
		#[case] total: u64,
		#[case] per_page: u64,
		#[case] page: u64,
		#[case] count: u64,
		#[case] expected: (u64, u64, u64),
	) {
		let pagination = Pagination::new(total, per_page, page, count);
		assert_eq!(
			(pagination.last_page, pagination.from, pagination.to),
			expected
		);
		assert_eq!(pagination.current_page, page);
	}

	#[test]
	fn test_empty_pagination() {
		let pagination = Pagination::empty(12);
		assert_eq!(pagination, Pagination::new(0, 12, 1, 0));
	}
}
