//! Query execution
//!
//! Turns the table's base query into the filtered, sorted and paginated row
//! set for one request. Steps run in a fixed order because later steps
//! depend on earlier ones: a relation sort adds a join, after which the
//! selection has to be narrowed back to the model's own table.
//!
//! Resolution problems (unknown relation, missing column, HasMany sort,
//! unknown group) are logged at `debug` and skipped. Only backend failures
//! from `paginate`/`get` are returned as errors.

use crate::error::TableResult;
use crate::grouping::{Group, GroupedPagination};
use crate::query::{Condition, ModelMeta, Pagination, QueryBuilder, SortDirection};
use crate::request::RequestParams;
use crate::table::Table;
use crate::value::Record;

/// Rows produced for one request
#[derive(Debug)]
pub struct Execution<'a> {
	/// Raw rows, in query order
	pub rows: Vec<Record>,
	/// Pagination metadata; `None` when every row was returned
	pub pagination: Option<Pagination>,
	/// Group active for the request
	pub active_group: Option<&'a Group>,
	/// Metadata of the queried model
	pub model: Option<ModelMeta>,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs a table's query against request parameters
///
/// # Pipeline
///
/// ```mermaid
/// graph TD
///     Q[query factory] --> C[with_count: counted relations]
///     C --> W[with: dotted column prefixes]
///     W --> B[base-query filters: soft-delete scope]
///     B --> S[search: OR LIKE across searchable columns]
///     S --> F[filters in declaration order]
///     F --> G[group column ASC]
///     G --> O[requested or default sort]
///     O -->|relation.column| J[left join + select model columns]
///     O --> P{page size}
///     J --> P
///     P -->|Some| PG[paginate]
///     P -->|None| ALL[get]
/// ```
pub struct QueryExecutor<'a> {
	table: &'a Table,
	params: &'a RequestParams,
}

impl<'a> QueryExecutor<'a> {
	/// Executor for `table` and one request
	pub fn new(table: &'a Table, params: &'a RequestParams) -> Self {
		Self { table, params }
	}

	/// Build, run and paginate the query
	///
	/// A table without a query factory yields no rows and an empty
	/// pagination block.
	pub fn execute(&self) -> TableResult<Execution<'a>> {
		let Some(factory) = &self.table.query else {
			tracing::debug!("table has no query, returning empty result");
			return Ok(Execution {
				rows: Vec::new(),
				pagination: Some(Pagination::empty(self.table.settings.per_page)),
				active_group: None,
				model: None,
			});
		};

		let mut query = factory();
		let query = query.as_mut();
		let model = query.model().clone();
		let active_group = self.table.active_group(self.params);

		self.load_counts(query);
		self.load_relations(query);
		self.modify_base_query(query);
		self.apply_search(query);
		self.apply_filters(query);

		if let Some(group) = active_group
			&& group.should_order_query()
		{
			query.order_by(group.column(), SortDirection::Asc);
		}
		self.apply_sort(query, &model);

		let (rows, pagination) = match self.page_size(active_group.is_some()) {
			Some(per_page) => {
				let page = self.params.page.unwrap_or(1);
				let page = query.paginate(per_page, page)?;
				(page.records, Some(page.pagination))
			}
			None => (query.get()?, None),
		};

		tracing::debug!(
			rows = rows.len(),
			total = pagination.map(|p| p.total),
			group = active_group.map(Group::column),
			"table query executed"
		);

		Ok(Execution {
			rows,
			pagination,
			active_group,
			model: Some(model),
		})
	}

	fn load_counts(&self, query: &mut dyn QueryBuilder) {
		let mut relations: Vec<String> = Vec::new();
		for column in &self.table.columns {
			if let Some(relation) = column.counts_relation()
				&& !relations.iter().any(|r| r == relation)
			{
				relations.push(relation.to_string());
			}
		}
		if !relations.is_empty() {
			query.with_count(&relations);
		}
	}

	fn load_relations(&self, query: &mut dyn QueryBuilder) {
		let mut relations: Vec<String> = Vec::new();
		for column in &self.table.columns {
			if let Some((relation, _)) = column.name().split_once('.')
				&& !relations.iter().any(|r| r == relation)
			{
				relations.push(relation.to_string());
			}
		}
		if !relations.is_empty() {
			query.with(&relations);
		}
	}

	fn modify_base_query(&self, query: &mut dyn QueryBuilder) {
		for filter in &self.table.filters {
			if !filter.modifies_base_query() {
				continue;
			}
			if let Some(value) = self.params.filter(filter.name()) {
				filter.modify_base_query(query, value);
			}
		}
	}

	fn apply_search(&self, query: &mut dyn QueryBuilder) {
		if !self.table.searchable {
			return;
		}
		let Some(term) = self.params.search_term() else {
			return;
		};

		let pattern = format!("%{}%", term);
		let conditions: Vec<Condition> = self
			.table
			.columns
			.iter()
			.filter(|column| column.is_searchable())
			.flat_map(|column| column.searchable_columns())
			.map(|column| Condition::like(column, pattern.clone()))
			.collect();

		if conditions.is_empty() {
			tracing::debug!(term, "no searchable columns, search ignored");
			return;
		}
		query.where_any(conditions);
	}

	fn apply_filters(&self, query: &mut dyn QueryBuilder) {
		for filter in &self.table.filters {
			if let Some(value) = self.params.filter(filter.name()) {
				filter.apply(query, value);
			}
		}
	}

	fn apply_sort(&self, query: &mut dyn QueryBuilder, model: &ModelMeta) {
		let settings = &self.table.settings;
		// An explicit empty `sort` clears the default
		let Some(column) = self
			.params
			.sort
			.as_deref()
			.or(settings.default_sort_column.as_deref())
			.filter(|sort| !sort.is_empty())
		else {
			return;
		};
		let direction = match self.params.direction.as_deref() {
			Some(direction) => SortDirection::from_param(direction),
			None => settings.default_sort_direction,
		};

		let Some((relation_name, field)) = column.split_once('.') else {
			query.order_by(column, direction);
			return;
		};

		let Some(relation) = model.relation(relation_name) else {
			tracing::debug!(sort = column, "unknown relation, sort skipped");
			return;
		};
		let Some(join) = relation.sort_join(&model.table) else {
			tracing::debug!(sort = column, "relation yields many rows, sort skipped");
			return;
		};

		let related_table = &relation.related_table;
		let physical = if query.has_column(related_table, field) {
			field
		} else {
			match settings.sort_fallbacks.get(field) {
				Some(fallback) if query.has_column(related_table, fallback) => fallback.as_str(),
				_ => {
					tracing::debug!(
						sort = column,
						table = %related_table,
						"related column not found, sort skipped"
					);
					return;
				}
			}
		};

		let sort_column = format!("{}.{}", join.name(), physical);
		query.left_join(join);
		query.order_by(&sort_column, direction);
		query.select_table_columns(&model.table);
	}

	/// Page size for the request, `None` to return every row
	fn page_size(&self, grouped: bool) -> Option<u64> {
		let settings = &self.table.settings;
		if !self.table.paginated {
			return None;
		}
		if let Some(per_page) = self.params.per_page {
			return Some(settings.clamp_per_page(per_page));
		}
		if !grouped {
			return Some(settings.per_page);
		}
		match self.table.grouped_pagination {
			GroupedPagination::Disabled => None,
			GroupedPagination::PerPage(per_page) if per_page > 0 => Some(per_page),
			_ => Some(settings.grouped_per_page),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::column::{ColumnBuilder, TextColumn};
	use crate::filter::{BaseFilter, FilterBuilder, TrashedFilter};
	use crate::query::{MemoryQuery, TrashedMode};
	use rstest::*;
	use serde_json::json;
	use std::sync::{Arc, Mutex};

	fn model() -> ModelMeta {
		ModelMeta::new("users")
			.soft_deletes()
			.belongs_to("team", "teams", "team_id", "id")
			.has_many("posts", "posts", "user_id", "id")
	}

	fn memory() -> MemoryQuery {
		MemoryQuery::from_json(
			model(),
			json!([
				{"id": 1, "name": "Ann", "team_id": 2, "deleted_at": null},
				{"id": 2, "name": "Bob", "team_id": 1, "deleted_at": null},
				{"id": 3, "name": "Cy", "team_id": 1, "deleted_at": "2024-05-01"},
			]),
		)
		.table_json(
			"teams",
			json!([{"id": 1, "first_name": "Alpha"}, {"id": 2, "first_name": "Beta"}]),
		)
	}

	/// Table whose query factory records the last built query
	fn capturing(table: Table) -> (Table, Arc<Mutex<Option<MemoryQuery>>>) {
		let seen: Arc<Mutex<Option<MemoryQuery>>> = Arc::new(Mutex::new(None));
		let slot = Arc::clone(&seen);
		let table = table.query(move || {
			let slot = Arc::clone(&slot);
			Box::new(Capture {
				inner: memory(),
				slot,
			})
		});
		(table, seen)
	}

	/// Delegating query that stores itself when executed
	struct Capture {
		inner: MemoryQuery,
		slot: Arc<Mutex<Option<MemoryQuery>>>,
	}

	impl QueryBuilder for Capture {
		fn model(&self) -> &ModelMeta {
			self.inner.model()
		}
		fn where_condition(&mut self, condition: Condition) {
			self.inner.where_condition(condition);
		}
		fn order_by(&mut self, column: &str, direction: SortDirection) {
			self.inner.order_by(column, direction);
		}
		fn left_join(&mut self, join: crate::query::Join) {
			self.inner.left_join(join);
		}
		fn select_table_columns(&mut self, table: &str) {
			self.inner.select_table_columns(table);
		}
		fn with(&mut self, relations: &[String]) {
			self.inner.with(relations);
		}
		fn with_count(&mut self, relations: &[String]) {
			self.inner.with_count(relations);
		}
		fn trashed(&mut self, mode: TrashedMode) {
			self.inner.trashed(mode);
		}
		fn has_column(&self, table: &str, column: &str) -> bool {
			self.inner.has_column(table, column)
		}
		fn paginate(&mut self, per_page: u64, page: u64) -> TableResult<crate::query::Page> {
			*self.slot.lock().unwrap() = Some(self.inner.clone());
			self.inner.paginate(per_page, page)
		}
		fn get(&mut self) -> TableResult<Vec<Record>> {
			*self.slot.lock().unwrap() = Some(self.inner.clone());
			self.inner.get()
		}
	}

	fn executed(seen: &Arc<Mutex<Option<MemoryQuery>>>) -> MemoryQuery {
		seen.lock().unwrap().clone().unwrap()
	}

	#[test]
	fn test_relations_and_counts_deduplicated() {
		let (table, seen) = capturing(
			Table::make()
				.column(TextColumn::make("team.first_name"))
				.column(TextColumn::make("team.id"))
				.column(TextColumn::make("posts_count").counts("posts"))
				.column(TextColumn::make("post_total").counts("posts")),
		);
		table.get_records(&RequestParams::new()).unwrap();

		let query = executed(&seen);
		assert_eq!(query.eager_loads(), ["team".to_string()]);
		assert_eq!(query.counts(), ["posts".to_string()]);
	}

	#[rstest]
	#[case("team.first_name", Some("team_sort.first_name"))]
	#[case("team.full_name", Some("team_sort.first_name"))]
	#[case("team.missing", None)]
	#[case("posts.title", None)]
	#[case("owner.name", None)]
	fn test_relation_sort(#[case] sort: &str, #[case] expected: Option<&str>) {
		let mut table = Table::make();
		table.settings.default_sort_column = None;
		let (table, seen) = capturing(table);
		table
			.get_records(&RequestParams::new().with_sort(sort, "asc"))
			.unwrap();

		let query = executed(&seen);
		match expected {
			Some(column) => {
				assert_eq!(query.orders(), [(column.to_string(), SortDirection::Asc)]);
				assert_eq!(query.joins().len(), 1);
				assert_eq!(query.selected_table(), Some("users"));
			}
			None => {
				assert!(query.orders().is_empty());
				assert!(query.joins().is_empty());
			}
		}
	}

	#[test]
	fn test_relation_sort_orders_rows() {
		let table = Table::make().query(|| Box::new(memory()));
		let records = table
			.get_records(&RequestParams::new().with_sort("team.first_name", "asc"))
			.unwrap();
		let ids: Vec<_> = records.records.iter().map(|r| r.attributes["id"].clone()).collect();
		assert_eq!(ids, [json!(2), json!(1)]);
	}

	#[test]
	fn test_trashed_scope_applied_alongside_other_filters() {
		let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
		let log = Arc::clone(&order);
		let (table, seen) = capturing(
			Table::make()
				.filter(BaseFilter::make("name").query(move |_, _| {
					log.lock().unwrap().push("name");
				}))
				.filter(TrashedFilter::make()),
		);
		let params = RequestParams::new()
			.with_filter("name", "x")
			.with_filter("trashed", "only");
		table.get_records(&params).unwrap();

		assert_eq!(executed(&seen).trashed_mode(), TrashedMode::Only);
		assert_eq!(*order.lock().unwrap(), ["name"]);
	}

	#[test]
	fn test_trashed_filter_includes_deleted_rows() {
		let table = Table::make()
			.filter(TrashedFilter::make())
			.query(|| Box::new(memory()));

		let without = table.get_records(&RequestParams::new()).unwrap();
		assert_eq!(without.records.len(), 2);

		let with = table
			.get_records(&RequestParams::new().with_filter("trashed", "with"))
			.unwrap();
		assert_eq!(with.records.len(), 3);
	}

	#[rstest]
	#[case(GroupedPagination::Default, None, Some(100))]
	#[case(GroupedPagination::PerPage(25), None, Some(25))]
	#[case(GroupedPagination::PerPage(0), None, Some(100))]
	#[case(GroupedPagination::Disabled, None, None)]
	#[case(GroupedPagination::Disabled, Some(5), Some(5))]
	fn test_grouped_page_size(
		#[case] policy: GroupedPagination,
		#[case] requested: Option<u64>,
		#[case] expected: Option<u64>,
	) {
		let table = Table::make()
			.group(Group::make("team_id"))
			.default_group("team_id")
			.grouped_pagination(policy);
		let mut params = RequestParams::new();
		params.per_page = requested;

		assert_eq!(QueryExecutor::new(&table, &params).page_size(true), expected);
		assert_eq!(
			QueryExecutor::new(&table, &params).page_size(false),
			Some(requested.unwrap_or(12))
		);
	}

	#[test]
	fn test_per_page_clamped_to_max() {
		let mut table = Table::make();
		table.settings.max_per_page = Some(50);
		let params = RequestParams::new().with_per_page(500);
		assert_eq!(QueryExecutor::new(&table, &params).page_size(false), Some(50));
	}

	#[test]
	fn test_unpaginated_table_returns_all_rows() {
		let table = Table::make().paginated(false).query(|| Box::new(memory()));
		let records = table.get_records(&RequestParams::new()).unwrap();
		assert!(records.pagination.is_none());
		assert_eq!(records.records.len(), 2);
	}

	#[test]
	fn test_search_disabled_table_ignores_term() {
		let (table, seen) = capturing(
			Table::make()
				.searchable(false)
				.column(TextColumn::make("name").searchable(true)),
		);
		table
			.get_records(&RequestParams::new().with_search("Ann"))
			.unwrap();
		assert!(executed(&seen).conditions().is_empty());
	}
}
