//! SQL query backend
//!
//! Compiles the accumulated query into sea-query `SELECT` statements and
//! hands the rendered SQL to a [`SqlConnection`]. Relation-qualified columns
//! (`customer.name`) and `{relation}_count` attributes compile to correlated
//! subqueries; eager loads run as secondary `IN` queries.

use super::{
	Condition, Join, ModelMeta, Operator, Page, Pagination, Predicate, QueryBuilder, Relation,
	SortDirection, TrashedMode,
};
use crate::error::TableResult;
use crate::value::Record;
use sea_query::{
	Alias, Asterisk, Condition as SqlCondition, Expr, ExprTrait, Func, JoinType, MysqlQueryBuilder,
	Order, PostgresQueryBuilder, Query, SelectStatement, SqliteQueryBuilder,
};
use serde_json::Value;
use std::sync::Arc;

/// SQL dialect used to render statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
	/// PostgreSQL
	#[default]
	Postgres,
	/// MySQL / MariaDB
	Mysql,
	/// SQLite
	Sqlite,
}

impl SqlDialect {
	/// Render a statement with inlined values
	pub fn render(&self, statement: &SelectStatement) -> String {
		match self {
			SqlDialect::Postgres => statement.to_string(PostgresQueryBuilder),
			SqlDialect::Mysql => statement.to_string(MysqlQueryBuilder),
			SqlDialect::Sqlite => statement.to_string(SqliteQueryBuilder),
		}
	}
}

/// Executes rendered SQL
pub trait SqlConnection: Send + Sync {
	/// Run a `SELECT` and return rows as JSON objects
	fn fetch_all(&self, sql: &str) -> TableResult<Vec<Record>>;

	/// Run a `SELECT COUNT(*)` and return the count
	fn fetch_count(&self, sql: &str) -> TableResult<u64>;

	/// Whether `table` has a physical `column`
	fn has_column(&self, table: &str, column: &str) -> bool;
}

/// Query compiled to SQL
///
/// # Examples
///
/// ```
/// use reinhardt_tables::query::{Condition, ModelMeta, QueryBuilder, SqlConnection, SqlQuery};
/// use reinhardt_tables::{Record, TableResult};
/// use std::sync::Arc;
///
/// struct NoRows;
///
/// impl SqlConnection for NoRows {
///     fn fetch_all(&self, _sql: &str) -> TableResult<Vec<Record>> { Ok(vec![]) }
///     fn fetch_count(&self, _sql: &str) -> TableResult<u64> { Ok(0) }
///     fn has_column(&self, _table: &str, _column: &str) -> bool { true }
/// }
///
/// let mut query = SqlQuery::new(ModelMeta::new("users"), Arc::new(NoRows));
/// query.where_condition(Condition::eq("active", true));
///
/// assert!(query.to_sql().contains("\"users\".\"active\""));
/// ```
#[derive(Clone)]
pub struct SqlQuery {
	model: ModelMeta,
	connection: Arc<dyn SqlConnection>,
	dialect: SqlDialect,
	conditions: Vec<Condition>,
	orders: Vec<(String, SortDirection)>,
	joins: Vec<Join>,
	eager: Vec<String>,
	counts: Vec<String>,
	trashed: TrashedMode,
	selected_table: Option<String>,
}

impl std::fmt::Debug for SqlQuery {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SqlQuery")
			.field("model", &self.model)
			.field("dialect", &self.dialect)
			.field("conditions", &self.conditions)
			.field("orders", &self.orders)
			.field("joins", &self.joins)
			.finish_non_exhaustive()
	}
}

impl SqlQuery {
	/// Query over `model` executed on `connection`
	pub fn new(model: ModelMeta, connection: Arc<dyn SqlConnection>) -> Self {
		Self {
			model,
			connection,
			dialect: SqlDialect::default(),
			conditions: Vec::new(),
			orders: Vec::new(),
			joins: Vec::new(),
			eager: Vec::new(),
			counts: Vec::new(),
			trashed: TrashedMode::default(),
			selected_table: None,
		}
	}

	/// Set the rendering dialect
	pub fn dialect(mut self, dialect: SqlDialect) -> Self {
		self.dialect = dialect;
		self
	}

	/// Rendered `SELECT` without limit/offset
	pub fn to_sql(&self) -> String {
		self.dialect.render(&self.select_statement())
	}

	/// Rendered `SELECT COUNT(*)`
	pub fn to_count_sql(&self) -> String {
		self.dialect.render(&self.count_statement())
	}

	fn column_ref(&self, column: &str) -> (Alias, Alias) {
		match column.split_once('.') {
			Some((table, name)) => (Alias::new(table), Alias::new(name)),
			None => (Alias::new(&self.model.table), Alias::new(column)),
		}
	}

	fn relation_subquery(&self, relation: &Relation) -> SelectStatement {
		Query::select()
			.from(Alias::new(&relation.related_table))
			.and_where(
				Expr::col((
					Alias::new(&relation.related_table),
					Alias::new(relation.related_key()),
				))
				.equals((
					Alias::new(&self.model.table),
					Alias::new(relation.parent_key()),
				)),
			)
			.to_owned()
	}

	fn count_expr(&self, relation: &Relation) -> Expr {
		let mut subquery = self.relation_subquery(relation);
		subquery.expr(Expr::cust("COUNT(*)"));
		Expr::cust(format!("({})", self.dialect.render(&subquery)))
	}

	fn related_value_expr(&self, relation: &Relation, column: &str) -> Expr {
		let mut subquery = self.relation_subquery(relation);
		subquery
			.column((Alias::new(&relation.related_table), Alias::new(column)))
			.limit(1);
		Expr::cust(format!("({})", self.dialect.render(&subquery)))
	}

	/// Expression for a plain, table-qualified or relation-qualified column
	fn column_expr(&self, column: &str) -> Expr {
		if let Some((prefix, rest)) = column.split_once('.') {
			let is_table =
				prefix == self.model.table || self.joins.iter().any(|join| join.name() == prefix);
			if !is_table && let Some(relation) = self.model.relation(prefix) {
				return self.related_value_expr(relation, rest);
			}
			return Expr::col(self.column_ref(column));
		}

		let counted = self
			.counts
			.iter()
			.filter_map(|name| self.model.relation(name))
			.find(|relation| relation.count_attribute() == column);
		match counted {
			Some(relation) => self.count_expr(relation),
			None => Expr::col(self.column_ref(column)),
		}
	}

	fn predicate_expr(&self, predicate: &Predicate) -> Expr {
		let column = self.column_expr(predicate.column());
		match predicate {
			Predicate::Compare {
				operator, value, ..
			} => {
				let value = sql_value(value);
				match operator {
					Operator::Eq => column.eq(value),
					Operator::Ne => column.ne(value),
					Operator::Gt => column.gt(value),
					Operator::Gte => column.gte(value),
					Operator::Lt => column.lt(value),
					Operator::Lte => column.lte(value),
				}
			}
			Predicate::Like { pattern, .. } => {
				Expr::expr(Func::lower(column)).like(pattern.to_lowercase())
			}
			Predicate::In { values, .. } => column.is_in(values.iter().map(sql_value)),
			Predicate::IsNull(_) => column.is_null(),
			Predicate::IsNotNull(_) => column.is_not_null(),
		}
	}

	fn condition_sql(&self, condition: &Condition) -> SqlCondition {
		match condition {
			Condition::Where(predicate) => SqlCondition::all().add(self.predicate_expr(predicate)),
			Condition::And(conditions) => conditions
				.iter()
				.fold(SqlCondition::all(), |acc, c| acc.add(self.condition_sql(c))),
			Condition::Or(conditions) => conditions
				.iter()
				.fold(SqlCondition::any(), |acc, c| acc.add(self.condition_sql(c))),
			Condition::Not(inner) => self.condition_sql(inner).not(),
		}
	}

	/// FROM, joins, soft-delete scope and conditions
	fn base_statement(&self) -> SelectStatement {
		let mut statement = Query::select()
			.from(Alias::new(&self.model.table))
			.to_owned();

		for join in &self.joins {
			let on = Expr::col(self.column_ref(&join.first)).equals(self.column_ref(&join.second));
			match &join.alias {
				Some(alias) => {
					statement.join_as(
						JoinType::LeftJoin,
						Alias::new(&join.table),
						Alias::new(alias),
						on,
					);
				}
				None => {
					statement.left_join(Alias::new(&join.table), on);
				}
			}
		}

		if let Some(column) = &self.model.soft_delete_column {
			let deleted_at = Expr::col((Alias::new(&self.model.table), Alias::new(column)));
			match self.trashed {
				TrashedMode::Without => {
					statement.and_where(deleted_at.is_null());
				}
				TrashedMode::Only => {
					statement.and_where(deleted_at.is_not_null());
				}
				TrashedMode::With => {}
			}
		}

		for condition in &self.conditions {
			statement.cond_where(self.condition_sql(condition));
		}

		statement
	}

	fn select_statement(&self) -> SelectStatement {
		let mut statement = self.base_statement();
		let table = self
			.selected_table
			.clone()
			.unwrap_or_else(|| self.model.table.clone());
		statement.column((Alias::new(table), Asterisk));

		for name in &self.counts {
			match self.model.relation(name) {
				Some(relation) => {
					statement.expr_as(
						self.count_expr(relation),
						Alias::new(relation.count_attribute()),
					);
				}
				None => tracing::debug!(relation = %name, "Skipping count of unknown relation"),
			}
		}

		for (column, direction) in &self.orders {
			let order = match direction {
				SortDirection::Asc => Order::Asc,
				SortDirection::Desc => Order::Desc,
			};
			statement.order_by_expr(self.column_expr(column), order);
		}

		statement
	}

	fn count_statement(&self) -> SelectStatement {
		let mut statement = self.base_statement();
		statement.expr(Expr::cust("COUNT(*)"));
		statement
	}

	fn load_relations(&self, rows: &mut [Record]) -> TableResult<()> {
		for name in &self.eager {
			let Some(relation) = self.model.relation(name) else {
				tracing::debug!(relation = %name, "Skipping eager load of unknown relation");
				continue;
			};

			let mut keys: Vec<&Value> = Vec::new();
			for row in rows.iter() {
				if let Some(key) = row.get(relation.parent_key()).filter(|v| !v.is_null())
					&& !keys.contains(&key)
				{
					keys.push(key);
				}
			}

			let related = if keys.is_empty() {
				Vec::new()
			} else {
				let statement = Query::select()
					.column(Asterisk)
					.from(Alias::new(&relation.related_table))
					.and_where(
						Expr::col((
							Alias::new(&relation.related_table),
							Alias::new(relation.related_key()),
						))
						.is_in(keys.into_iter().map(sql_value)),
					)
					.to_owned();
				self.connection
					.fetch_all(&self.dialect.render(&statement))?
			};
			relation.attach(rows, &related);
		}
		Ok(())
	}
}

impl QueryBuilder for SqlQuery {
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
		for relation in relations {
			if !self.eager.contains(relation) {
				self.eager.push(relation.clone());
			}
		}
	}

	fn with_count(&mut self, relations: &[String]) {
		for relation in relations {
			if !self.counts.contains(relation) {
				self.counts.push(relation.clone());
			}
		}
	}

	fn trashed(&mut self, mode: TrashedMode) {
		self.trashed = mode;
	}

	fn has_column(&self, table: &str, column: &str) -> bool {
		self.connection.has_column(table, column)
	}

	fn paginate(&mut self, per_page: u64, page: u64) -> TableResult<Page> {
		let per_page = Ord::max(per_page, 1);
		let page = Ord::max(page, 1);

		let total = self.connection.fetch_count(&self.to_count_sql())?;

		let mut statement = self.select_statement();
		statement
			.limit(per_page)
			.offset((page - 1).saturating_mul(per_page));
		let mut records = self.connection.fetch_all(&self.dialect.render(&statement))?;
		self.load_relations(&mut records)?;

		let pagination = Pagination::new(total, per_page, page, records.len() as u64);
		Ok(Page {
			records,
			pagination,
		})
	}

	fn get(&mut self) -> TableResult<Vec<Record>> {
		let mut records = self.connection.fetch_all(&self.to_sql())?;
		self.load_relations(&mut records)?;
		Ok(records)
	}
}

/// Convert a JSON operand to a sea-query value
fn sql_value(value: &Value) -> sea_query::Value {
	match value {
		Value::Null => sea_query::Value::String(None),
		Value::Bool(b) => (*b).into(),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				i.into()
			} else if let Some(u) = n.as_u64() {
				u.into()
			} else {
				n.as_f64().unwrap_or_default().into()
			}
		}
		Value::String(s) => s.clone().into(),
		other => other.to_string().into(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;
	use std::sync::Mutex;

	/// Connection returning canned rows and recording every statement
	#[derive(Default)]
	struct RecordingConnection {
		statements: Mutex<Vec<String>>,
		rows: Vec<Record>,
		related: Vec<Record>,
	}

	impl RecordingConnection {
		fn statements(&self) -> Vec<String> {
			self.statements.lock().unwrap().clone()
		}
	}

	impl SqlConnection for RecordingConnection {
		fn fetch_all(&self, sql: &str) -> TableResult<Vec<Record>> {
			let mut statements = self.statements.lock().unwrap();
			let rows = if statements.iter().any(|s| !s.contains("COUNT(*)")) {
				self.related.clone()
			} else {
				self.rows.clone()
			};
			statements.push(sql.to_string());
			Ok(rows)
		}

		fn fetch_count(&self, sql: &str) -> TableResult<u64> {
			self.statements.lock().unwrap().push(sql.to_string());
			Ok(self.rows.len() as u64)
		}

		fn has_column(&self, table: &str, column: &str) -> bool {
			table == "customers" && column == "first_name"
		}
	}

	fn record(value: Value) -> Record {
		value.as_object().cloned().unwrap()
	}

	#[fixture]
	fn model() -> ModelMeta {
		ModelMeta::new("orders")
			.soft_deletes()
			.belongs_to("customer", "customers", "customer_id", "id")
			.has_many("items", "order_items", "order_id", "id")
	}

	#[rstest]
	fn test_select_with_join_and_order(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection::default());
		let mut query = SqlQuery::new(model, connection);

		query.left_join(Join::new("customers", "orders.customer_id", "customers.id"));
		query.order_by("customers.first_name", SortDirection::Desc);
		query.select_table_columns("orders");

		let sql = query.to_sql();
		assert!(sql.contains("LEFT JOIN \"customers\""));
		assert!(sql.contains("\"orders\".\"customer_id\" = \"customers\".\"id\""));
		assert!(sql.contains("\"orders\".*"));
		assert!(sql.contains("ORDER BY \"customers\".\"first_name\" DESC"));
		assert!(sql.contains("\"orders\".\"deleted_at\" IS NULL"));
	}

	#[test]
	fn test_self_join_is_aliased() {
		let model = ModelMeta::new("people").belongs_to("manager", "people", "manager_id", "id");
		let join = model.relation("manager").unwrap().sort_join("people").unwrap();
		let mut query = SqlQuery::new(model, Arc::new(RecordingConnection::default()));

		query.left_join(join);
		query.order_by("manager_sort.name", SortDirection::Asc);

		let sql = query.to_sql();
		assert!(sql.contains("LEFT JOIN \"people\" AS \"manager_sort\""));
		assert!(sql.contains("\"people\".\"manager_id\" = \"manager_sort\".\"id\""));
		assert!(sql.contains("ORDER BY \"manager_sort\".\"name\" ASC"));
	}

	#[rstest]
	fn test_search_compiles_to_lowered_like(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection::default());
		let mut query = SqlQuery::new(model, connection);

		query.where_any(vec![
			Condition::like("name", "%Ann%"),
			Condition::like("email", "%Ann%"),
		]);

		let sql = query.to_sql();
		assert!(sql.contains("LIKE '%ann%'"));
		assert!(sql.contains(" OR "));
	}

	#[rstest]
	fn test_trashed_modes(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection::default());
		let mut query = SqlQuery::new(model, connection);

		query.trashed(TrashedMode::Only);
		assert!(query.to_sql().contains("IS NOT NULL"));

		query.remove_soft_delete_scope();
		assert!(!query.to_sql().contains("deleted_at"));
	}

	#[rstest]
	fn test_counts_and_relation_columns(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection::default());
		let mut query = SqlQuery::new(model, connection);

		query.with_count(&["items".to_string()]);
		query.where_condition(Condition::like("customer.first_name", "%a%"));
		query.order_by("items_count", SortDirection::Desc);

		let sql = query.to_sql();
		assert!(sql.contains("\"items_count\""));
		assert!(sql.contains("FROM \"order_items\""));
		assert!(sql.contains("FROM \"customers\""));
	}

	#[rstest]
	fn test_paginate_runs_count_then_select_then_eager(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection {
			rows: vec![record(json!({"id": 1, "customer_id": 7}))],
			related: vec![record(json!({"id": 7, "first_name": "Jane"}))],
			..Default::default()
		});
		let mut query = SqlQuery::new(model, connection.clone());
		query.with(&["customer".to_string()]);

		let page = query.paginate(10, 3).unwrap();

		let statements = connection.statements();
		assert_eq!(statements.len(), 3);
		assert!(statements[0].contains("COUNT(*)"));
		assert!(statements[1].contains("LIMIT 10"));
		assert!(statements[1].contains("OFFSET 20"));
		assert!(statements[2].contains("IN (7)"));
		assert_eq!(page.records[0]["customer"]["first_name"], json!("Jane"));
		assert_eq!(page.pagination.total, 1);
	}

	#[rstest]
	fn test_mysql_dialect_quoting(model: ModelMeta) {
		let connection = Arc::new(RecordingConnection::default());
		let query = SqlQuery::new(model, connection).dialect(SqlDialect::Mysql);
		assert!(query.to_sql().contains("`orders`"));
	}

	#[rstest]
	fn test_has_column_delegates(model: ModelMeta) {
		let query = SqlQuery::new(model, Arc::new(RecordingConnection::default()));
		assert!(query.has_column("customers", "first_name"));
		assert!(!query.has_column("customers", "full_name"));
	}
}
