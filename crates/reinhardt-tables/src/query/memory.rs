//! In-memory query backend
//!
//! Evaluates the accumulated query against rows held as JSON objects. Joined
//! and related tables are registered by table name.

use super::{
	Condition, Join, ModelMeta, Page, Pagination, QueryBuilder, SortDirection, TrashedMode,
};
use crate::error::TableResult;
use crate::value::{Record, compare_values, lookup_path, loose_eq};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Query over in-memory rows
///
/// # Examples
///
/// ```
/// use reinhardt_tables::query::{Condition, MemoryQuery, ModelMeta, QueryBuilder, SortDirection};
/// use serde_json::json;
///
/// let mut query = MemoryQuery::from_json(
///     ModelMeta::new("users"),
///     json!([
///         {"id": 1, "name": "Ann"},
///         {"id": 2, "name": "Bob"},
///         {"id": 3, "name": "Cleo"},
///     ]),
/// );
/// query.where_condition(Condition::like("name", "%o%"));
/// query.order_by("id", SortDirection::Desc);
///
/// let rows = query.get().unwrap();
/// assert_eq!(rows[0]["name"], json!("Cleo"));
/// assert_eq!(rows.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryQuery {
	model: ModelMeta,
	rows: Vec<Record>,
	tables: HashMap<String, Vec<Record>>,
	schemas: HashMap<String, BTreeSet<String>>,
	conditions: Vec<Condition>,
	orders: Vec<(String, SortDirection)>,
	joins: Vec<Join>,
	eager: Vec<String>,
	counts: Vec<String>,
	trashed: TrashedMode,
	selected_table: Option<String>,
}

impl MemoryQuery {
	/// Query over `rows` of `model`
	pub fn new(model: ModelMeta, rows: Vec<Record>) -> Self {
		Self {
			model,
			rows,
			tables: HashMap::new(),
			schemas: HashMap::new(),
			conditions: Vec::new(),
			orders: Vec::new(),
			joins: Vec::new(),
			eager: Vec::new(),
			counts: Vec::new(),
			trashed: TrashedMode::default(),
			selected_table: None,
		}
	}

	/// Query over a JSON array of objects; non-object entries are ignored
	pub fn from_json(model: ModelMeta, rows: Value) -> Self {
		Self::new(model, json_rows(rows))
	}

	/// Register rows of a related table
	pub fn table(mut self, name: impl Into<String>, rows: Vec<Record>) -> Self {
		self.tables.insert(name.into(), rows);
		self
	}

	/// Register rows of a related table from a JSON array
	pub fn table_json(self, name: impl Into<String>, rows: Value) -> Self {
		self.table(name, json_rows(rows))
	}

	/// Declare the physical columns of a table
	///
	/// Without a declaration, a column exists when any row of the table
	/// carries it.
	pub fn schema<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.schemas.insert(
			table.into(),
			columns.into_iter().map(Into::into).collect(),
		);
		self
	}

	/// Conditions added so far
	pub fn conditions(&self) -> &[Condition] {
		&self.conditions
	}

	/// Orderings added so far
	pub fn orders(&self) -> &[(String, SortDirection)] {
		&self.orders
	}

	/// Joins added so far
	pub fn joins(&self) -> &[Join] {
		&self.joins
	}

	/// Relations marked for eager loading
	pub fn eager_loads(&self) -> &[String] {
		&self.eager
	}

	/// Relations marked for counting
	pub fn counts(&self) -> &[String] {
		&self.counts
	}

	/// Current soft-delete visibility
	pub fn trashed_mode(&self) -> TrashedMode {
		self.trashed
	}

	/// Table restricted by [`QueryBuilder::select_table_columns`]
	pub fn selected_table(&self) -> Option<&str> {
		self.selected_table.as_deref()
	}

	fn table_rows(&self, table: &str) -> &[Record] {
		if table == self.model.table {
			return &self.rows;
		}
		self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
	}

	fn in_scope(&self, row: &Record) -> bool {
		let Some(column) = &self.model.soft_delete_column else {
			return true;
		};
		let deleted = row.get(column).is_some_and(|v| !v.is_null());
		match self.trashed {
			TrashedMode::Without => !deleted,
			TrashedMode::With => true,
			TrashedMode::Only => deleted,
		}
	}

	fn joined_row<'a>(&'a self, row: &Record, join: &Join) -> Option<&'a Record> {
		let key = self.resolve(row, &join.first)?;
		let (_, related_column) = join.second.split_once('.')?;
		self.table_rows(&join.table).iter().find(|candidate| {
			candidate
				.get(related_column)
				.is_some_and(|value| loose_eq(value, &key))
		})
	}

	/// Resolve a plain, table-qualified or relation-qualified column
	fn resolve(&self, row: &Record, column: &str) -> Option<Value> {
		let Some((prefix, rest)) = column.split_once('.') else {
			return row.get(column).cloned();
		};

		if prefix == self.model.table {
			return lookup_path(row, rest).cloned();
		}
		if let Some(join) = self.joins.iter().find(|join| join.name() == prefix) {
			return self
				.joined_row(row, join)
				.and_then(|joined| lookup_path(joined, rest).cloned());
		}
		if let Some(value) = lookup_path(row, column) {
			return Some(value.clone());
		}
		let relation = self.model.relation(prefix)?;
		let related = self.table_rows(&relation.related_table);
		relation
			.matching(row, related)
			.first()
			.and_then(|related_row| lookup_path(related_row, rest).cloned())
	}

	fn matching_rows(&self) -> Vec<Record> {
		let mut rows: Vec<Record> = self
			.rows
			.iter()
			.filter(|row| self.in_scope(row))
			.cloned()
			.collect();

		for name in &self.counts {
			let Some(relation) = self.model.relation(name) else {
				tracing::debug!(relation = %name, "Skipping count of unknown relation");
				continue;
			};
			let related = self.table_rows(&relation.related_table);
			for row in rows.iter_mut() {
				let count = relation.matching(row, related).len() as u64;
				row.insert(relation.count_attribute(), Value::from(count));
			}
		}

		let resolve = |row: &Record, column: &str| self.resolve(row, column);
		rows.retain(|row| {
			self.conditions
				.iter()
				.all(|condition| condition.evaluate(row, &resolve))
		});

		if !self.orders.is_empty() {
			// Stable sort keeps insertion order among equal keys
			rows.sort_by(|a, b| {
				for (column, direction) in &self.orders {
					let left = resolve(a, column.as_str()).unwrap_or(Value::Null);
					let right = resolve(b, column.as_str()).unwrap_or(Value::Null);
					let ordering = match direction {
						SortDirection::Asc => compare_values(&left, &right),
						SortDirection::Desc => compare_values(&right, &left),
					};
					if ordering != Ordering::Equal {
						return ordering;
					}
				}
				Ordering::Equal
			});
		}

		rows
	}

	fn load_relations(&self, rows: &mut [Record]) {
		for name in &self.eager {
			match self.model.relation(name) {
				Some(relation) => {
					relation.attach(rows, self.table_rows(&relation.related_table));
				}
				None => tracing::debug!(relation = %name, "Skipping eager load of unknown relation"),
			}
		}
	}
}

impl QueryBuilder for MemoryQuery {
	fn model(&self) -> &ModelMeta {
		&self.model
	}

	fn where_condition(&mut self, condition: Condition) {
		self.conditions.push(condition);
	}

	fn order_by(&mut self, column: &str, direction: SortDirection) {
		self.orders.push((column.to_string(), direction));
	}

	fn left_join(&mut self, join: Join) {
		if !self.joins.contains(&join) {
			self.joins.push(join);
		}
	}

	fn select_table_columns(&mut self, table: &str) {
		self.selected_table = Some(table.to_string());
	}

	fn with(&mut self, relations: &[String]) {
		push_unique(&mut self.eager, relations);
	}

	fn with_count(&mut self, relations: &[String]) {
		push_unique(&mut self.counts, relations);
	}

	fn trashed(&mut self, mode: TrashedMode) {
		self.trashed = mode;
	}

	fn has_column(&self, table: &str, column: &str) -> bool {
		match self.schemas.get(table) {
			Some(columns) => columns.contains(column),
			None => self
				.table_rows(table)
				.iter()
				.any(|row| row.contains_key(column)),
		}
	}

	fn paginate(&mut self, per_page: u64, page: u64) -> TableResult<Page> {
		let per_page = per_page.max(1);
		let page = page.max(1);
		let rows = self.matching_rows();
		let total = rows.len() as u64;

		let offset = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
		let limit = usize::try_from(per_page).unwrap_or(usize::MAX);
		let mut records: Vec<Record> = rows.into_iter().skip(offset).take(limit).collect();
		self.load_relations(&mut records);

		let pagination = Pagination::new(total, per_page, page, records.len() as u64);
		Ok(Page {
			records,
			pagination,
		})
	}

	fn get(&mut self) -> TableResult<Vec<Record>> {
		let mut records = self.matching_rows();
		self.load_relations(&mut records);
		Ok(records)
	}
}

fn push_unique(target: &mut Vec<String>, items: &[String]) {
	for item in items {
		if !target.contains(item) {
			target.push(item.clone());
		}
	}
}

fn json_rows(rows: Value) -> Vec<Record> {
	match rows {
		Value::Array(items) => items
			.into_iter()
			.filter_map(|item| match item {
				Value::Object(map) => Some(map),
				_ => None,
			})
			.collect(),
		_ => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn orders() -> MemoryQuery {
		let model = ModelMeta::new("orders")
			.soft_deletes()
			.belongs_to("customer", "customers", "customer_id", "id")
			.has_many("items", "order_items", "order_id", "id");

		MemoryQuery::from_json(
			model,
			json!([
				{"id": 1, "team": "b", "customer_id": 10, "deleted_at": null},
				{"id": 2, "team": "a", "customer_id": 11, "deleted_at": null},
				{"id": 3, "team": "a", "customer_id": 10, "deleted_at": "2024-01-01"},
				{"id": 4, "team": "b", "customer_id": 12, "deleted_at": null},
			]),
		)
		.table_json(
			"customers",
			json!([
				{"id": 10, "first_name": "Zed"},
				{"id": 11, "first_name": "Amy"},
				{"id": 12, "first_name": "Max"},
			]),
		)
		.table_json(
			"order_items",
			json!([
				{"id": 100, "order_id": 1},
				{"id": 101, "order_id": 1},
				{"id": 102, "order_id": 4},
			]),
		)
	}

	fn ids(rows: &[Record]) -> Vec<i64> {
		rows.iter().filter_map(|r| r["id"].as_i64()).collect()
	}

	#[rstest]
	fn test_soft_delete_scope(mut orders: MemoryQuery) {
		assert_eq!(ids(&orders.get().unwrap()), vec![1, 2, 4]);

		orders.remove_soft_delete_scope();
		assert_eq!(ids(&orders.get().unwrap()), vec![1, 2, 3, 4]);

		orders.trashed(TrashedMode::Only);
		assert_eq!(ids(&orders.get().unwrap()), vec![3]);
	}

	#[rstest]
	fn test_multi_key_sort_is_stable(mut orders: MemoryQuery) {
		orders.order_by("team", SortDirection::Asc);
		orders.order_by("id", SortDirection::Desc);
		assert_eq!(ids(&orders.get().unwrap()), vec![2, 4, 1]);
	}

	#[rstest]
	fn test_sort_through_join(mut orders: MemoryQuery) {
		orders.left_join(Join::new("customers", "orders.customer_id", "customers.id"));
		orders.order_by("customers.first_name", SortDirection::Asc);
		orders.select_table_columns("orders");

		let rows = orders.get().unwrap();
		assert_eq!(ids(&rows), vec![2, 4, 1]);
		assert!(!rows[0].contains_key("first_name"));
		assert_eq!(orders.selected_table(), Some("orders"));
	}

	#[test]
	fn test_sort_through_aliased_self_join() {
		let model = ModelMeta::new("people").belongs_to("manager", "people", "manager_id", "id");
		let mut people = MemoryQuery::from_json(
			model.clone(),
			json!([
				{"id": 1, "name": "Zoe", "manager_id": 3},
				{"id": 2, "name": "Bob", "manager_id": 1},
				{"id": 3, "name": "Amy", "manager_id": null},
			]),
		);

		let join = model.relation("manager").unwrap().sort_join("people").unwrap();
		people.left_join(join);
		people.order_by("manager_sort.name", SortDirection::Asc);

		assert_eq!(ids(&people.get().unwrap()), vec![3, 1, 2]);
	}

	#[rstest]
	fn test_relation_qualified_condition(mut orders: MemoryQuery) {
		orders.where_condition(Condition::like("customer.first_name", "%a%"));
		assert_eq!(ids(&orders.get().unwrap()), vec![2, 4]);
	}

	#[rstest]
	fn test_eager_load_and_counts(mut orders: MemoryQuery) {
		orders.with(&["customer".to_string(), "customer".to_string()]);
		orders.with_count(&["items".to_string()]);

		let rows = orders.get().unwrap();
		assert_eq!(orders.eager_loads().len(), 1);
		assert_eq!(rows[0]["customer"]["first_name"], json!("Zed"));
		assert_eq!(rows[0]["items_count"], json!(2));
		assert_eq!(rows[1]["items_count"], json!(0));
	}

	#[rstest]
	fn test_paginate(mut orders: MemoryQuery) {
		let page = orders.paginate(2, 2).unwrap();
		assert_eq!(ids(&page.records), vec![4]);
		assert_eq!(page.pagination.total, 3);
		assert_eq!(page.pagination.last_page, 2);
		assert_eq!((page.pagination.from, page.pagination.to), (3, 3));
	}

	#[rstest]
	fn test_has_column(orders: MemoryQuery) {
		assert!(orders.has_column("customers", "first_name"));
		assert!(!orders.has_column("customers", "full_name"));

		let declared = orders.schema("customers", ["id", "full_name"]);
		assert!(declared.has_column("customers", "full_name"));
	}
}
