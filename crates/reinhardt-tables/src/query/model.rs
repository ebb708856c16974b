//! Model metadata
//!
//! Describes the queried table: its primary key, soft-delete column and the
//! relations that columns may reach through dot notation.

use super::Join;
use crate::value::{Record, loose_eq};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default soft-delete timestamp column
pub const DELETED_AT: &str = "deleted_at";

/// Relationship kind with its key pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
	/// The parent row holds the foreign key (`orders.customer_id -> customers.id`)
	BelongsTo {
		/// Column on the parent table
		foreign_key: String,
		/// Referenced column on the related table
		owner_key: String,
	},
	/// The related table holds the foreign key, at most one related row
	HasOne {
		/// Column on the related table
		foreign_key: String,
		/// Referenced column on the parent table
		local_key: String,
	},
	/// The related table holds the foreign key, any number of related rows
	HasMany {
		/// Column on the related table
		foreign_key: String,
		/// Referenced column on the parent table
		local_key: String,
	},
}

/// A named relation to another table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
	/// Relation name, as used in dotted column names
	pub name: String,
	/// Related table
	pub related_table: String,
	/// Kind and keys
	pub kind: RelationKind,
}

impl Relation {
	/// Key on the parent row used for matching
	pub fn parent_key(&self) -> &str {
		match &self.kind {
			RelationKind::BelongsTo { foreign_key, .. } => foreign_key,
			RelationKind::HasOne { local_key, .. } | RelationKind::HasMany { local_key, .. } => {
				local_key
			}
		}
	}

	/// Key on the related row used for matching
	pub fn related_key(&self) -> &str {
		match &self.kind {
			RelationKind::BelongsTo { owner_key, .. } => owner_key,
			RelationKind::HasOne { foreign_key, .. }
			| RelationKind::HasMany { foreign_key, .. } => foreign_key,
		}
	}

	/// Whether the relation yields a list of rows
	pub fn is_many(&self) -> bool {
		matches!(self.kind, RelationKind::HasMany { .. })
	}

	/// Left join used to sort by a related column
	///
	/// The related table is aliased `{relation}_sort`. Only single-row
	/// relations can be joined for sorting; `HasMany` returns `None`.
	pub fn sort_join(&self, parent_table: &str) -> Option<Join> {
		match &self.kind {
			RelationKind::BelongsTo { .. } | RelationKind::HasOne { .. } => {
				let alias = format!("{}_sort", self.name);
				Some(
					Join::new(
						&self.related_table,
						format!("{}.{}", parent_table, self.parent_key()),
						format!("{}.{}", alias, self.related_key()),
					)
					.alias(alias),
				)
			}
			RelationKind::HasMany { .. } => None,
		}
	}

	/// Related rows belonging to `parent`
	pub fn matching<'a>(&self, parent: &Record, related: &'a [Record]) -> Vec<&'a Record> {
		let Some(key) = parent.get(self.parent_key()).filter(|v| !v.is_null()) else {
			return Vec::new();
		};
		related
			.iter()
			.filter(|row| {
				row.get(self.related_key())
					.is_some_and(|candidate| loose_eq(candidate, key))
			})
			.collect()
	}

	/// Attach related rows to each parent under the relation name
	///
	/// Single-row relations attach an object or `null`; `HasMany` attaches
	/// an array.
	pub fn attach(&self, parents: &mut [Record], related: &[Record]) {
		for parent in parents.iter_mut() {
			let matches = self.matching(parent, related);
			let value = if self.is_many() {
				Value::Array(
					matches
						.into_iter()
						.map(|row| Value::Object(row.clone()))
						.collect(),
				)
			} else {
				matches
					.first()
					.map(|row| Value::Object((*row).clone()))
					.unwrap_or(Value::Null)
			};
			parent.insert(self.name.clone(), value);
		}
	}

	/// Name of the aggregate count attribute
	pub fn count_attribute(&self) -> String {
		format!("{}_count", self.name)
	}
}

/// Metadata of a queried model
///
/// # Examples
///
/// ```
/// use reinhardt_tables::query::ModelMeta;
///
/// let model = ModelMeta::new("orders")
///     .soft_deletes()
///     .belongs_to("customer", "customers", "customer_id", "id")
///     .has_many("items", "order_items", "order_id", "id");
///
/// assert!(model.uses_soft_deletes());
/// assert_eq!(model.relation("customer").unwrap().related_table, "customers");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
	/// Table name
	pub table: String,
	/// Primary key column
	pub primary_key: String,
	/// Soft-delete timestamp column, when the model soft-deletes
	pub soft_delete_column: Option<String>,
	relations: BTreeMap<String, Relation>,
}

impl ModelMeta {
	/// Model over `table` with primary key `id`
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			primary_key: "id".to_string(),
			soft_delete_column: None,
			relations: BTreeMap::new(),
		}
	}

	/// Set the primary key column
	pub fn primary_key(mut self, column: impl Into<String>) -> Self {
		self.primary_key = column.into();
		self
	}

	/// Enable soft deletes using `deleted_at`
	pub fn soft_deletes(self) -> Self {
		self.soft_deletes_with(DELETED_AT)
	}

	/// Enable soft deletes using a custom column
	pub fn soft_deletes_with(mut self, column: impl Into<String>) -> Self {
		self.soft_delete_column = Some(column.into());
		self
	}

	/// Declare a belongs-to relation
	pub fn belongs_to(
		self,
		name: impl Into<String>,
		related_table: impl Into<String>,
		foreign_key: impl Into<String>,
		owner_key: impl Into<String>,
	) -> Self {
		self.relation_with(
			name,
			related_table,
			RelationKind::BelongsTo {
				foreign_key: foreign_key.into(),
				owner_key: owner_key.into(),
			},
		)
	}

	/// Declare a has-one relation
	pub fn has_one(
		self,
		name: impl Into<String>,
		related_table: impl Into<String>,
		foreign_key: impl Into<String>,
		local_key: impl Into<String>,
	) -> Self {
		self.relation_with(
			name,
			related_table,
			RelationKind::HasOne {
				foreign_key: foreign_key.into(),
				local_key: local_key.into(),
			},
		)
	}

	/// Declare a has-many relation
	pub fn has_many(
		self,
		name: impl Into<String>,
		related_table: impl Into<String>,
		foreign_key: impl Into<String>,
		local_key: impl Into<String>,
	) -> Self {
		self.relation_with(
			name,
			related_table,
			RelationKind::HasMany {
				foreign_key: foreign_key.into(),
				local_key: local_key.into(),
			},
		)
	}

	fn relation_with(
		mut self,
		name: impl Into<String>,
		related_table: impl Into<String>,
		kind: RelationKind,
	) -> Self {
		let name = name.into();
		self.relations.insert(
			name.clone(),
			Relation {
				name,
				related_table: related_table.into(),
				kind,
			},
		);
		self
	}

	/// Look up a relation by name
	pub fn relation(&self, name: &str) -> Option<&Relation> {
		self.relations.get(name)
	}

	/// All declared relations
	pub fn relations(&self) -> impl Iterator<Item = &Relation> {
		self.relations.values()
	}

	/// Whether the model soft-deletes
	pub fn uses_soft_deletes(&self) -> bool {
		self.soft_delete_column.is_some()
	}

	/// `table.column`
	pub fn qualify(&self, column: &str) -> String {
		format!("{}.{}", self.table, column)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	fn rows(value: Value) -> Vec<Record> {
		value
			.as_array()
			.unwrap()
			.iter()
			.map(|v| v.as_object().cloned().unwrap())
			.collect()
	}

	#[fixture]
	fn model() -> ModelMeta {
		ModelMeta::new("orders")
			.belongs_to("customer", "customers", "customer_id", "id")
			.has_one("invoice", "invoices", "order_id", "id")
			.has_many("items", "order_items", "order_id", "id")
	}

	#[rstest]
	fn test_sort_join_keys(model: ModelMeta) {
		let belongs = model.relation("customer").unwrap().sort_join("orders").unwrap();
		assert_eq!(belongs.table, "customers");
		assert_eq!(belongs.name(), "customer_sort");
		assert_eq!(belongs.first, "orders.customer_id");
		assert_eq!(belongs.second, "customer_sort.id");

		let has_one = model.relation("invoice").unwrap().sort_join("orders").unwrap();
		assert_eq!(has_one.first, "orders.id");
		assert_eq!(has_one.second, "invoice_sort.order_id");

		assert!(model.relation("items").unwrap().sort_join("orders").is_none());
	}

	#[rstest]
	fn test_attach_belongs_to_and_has_many(model: ModelMeta) {
		let mut parents = rows(json!([
			{"id": 1, "customer_id": 7},
			{"id": 2, "customer_id": null},
		]));
		let customers = rows(json!([{"id": 7, "name": "Jane"}]));
		let items = rows(json!([
			{"order_id": 1, "sku": "A"},
			{"order_id": 1, "sku": "B"},
		]));

		model.relation("customer").unwrap().attach(&mut parents, &customers);
		model.relation("items").unwrap().attach(&mut parents, &items);

		assert_eq!(parents[0]["customer"]["name"], json!("Jane"));
		assert_eq!(parents[1]["customer"], Value::Null);
		assert_eq!(parents[0]["items"].as_array().unwrap().len(), 2);
		assert_eq!(parents[1]["items"], json!([]));
	}

	#[test]
	fn test_soft_delete_column() {
		let model = ModelMeta::new("posts").soft_deletes_with("removed_at");
		assert_eq!(model.soft_delete_column.as_deref(), Some("removed_at"));
		assert!(!ModelMeta::new("posts").uses_soft_deletes());
	}
}
