//! Declarative admin tables for Reinhardt
//!
//! A [`Table`] is an ordered set of columns, filters and groups bound to a
//! query factory. For each request it runs the query (search, filters,
//! grouping, relation-aware sorting, pagination), turns every row into a
//! flat output record with per-column metadata and resolved record actions,
//! and returns an envelope the rendering layer consumes as props.
//!
//! # Features
//!
//! - **Columns**: text, badge, icon/boolean, image, select, checkbox, toggle,
//!   text input and color columns with per-record evaluators
//! - **Filters**: select, ternary, toggle (query) and trashed filters with
//!   active-filter indicators
//! - **Grouping**: row clustering with record-aware titles and descriptions
//! - **Query backends**: in-memory rows or SQL compiled with sea-query
//!   (feature `sql`)
//! - **Settings**: page sizes, sort defaults and sort fallbacks loaded from
//!   TOML
//!
//! # Example
//!
//! ```rust
//! use reinhardt_tables::prelude::*;
//! use serde_json::json;
//!
//! let table = Table::make()
//!     .column(TextColumn::make("name").searchable(true).sortable(true))
//!     .column(BadgeColumn::make("status"))
//!     .filter(SelectFilter::make("status").options([("draft", "Draft"), ("live", "Live")]))
//!     .record_action(Action::edit("/admin/posts/{id}/edit"))
//!     .query(|| {
//!         Box::new(MemoryQuery::from_json(
//!             ModelMeta::new("posts"),
//!             json!([
//!                 {"id": 1, "name": "Hello", "status": "draft"},
//!                 {"id": 2, "name": "World", "status": "live"},
//!             ]),
//!         ))
//!     });
//!
//! let params = RequestParams::from_query_string("status=live").unwrap();
//! let records = table.get_records(&params).unwrap();
//!
//! assert_eq!(records.records.len(), 1);
//! assert_eq!(records.records[0].url.as_deref(), Some("/admin/posts/2/edit"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod action;
pub mod card;
pub mod column;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod filter;
pub mod grouping;
pub mod processor;
pub mod query;
pub mod request;
pub mod settings;
pub mod table;
pub mod value;

// Re-exports for convenience
pub use action::{Action, RecordAction};
pub use card::Card;
pub use column::{Column, ColumnBuilder};
pub use envelope::{TableProps, TableRecords};
pub use error::{TableError, TableResult};
pub use filter::{Filter, FilterBuilder, Indicator};
pub use grouping::{Group, GroupedPagination};
pub use processor::OutputRecord;
pub use query::{MemoryQuery, ModelMeta, Pagination, QueryBuilder, SortDirection};
pub use request::{FilterValue, RequestParams};
pub use settings::TableSettings;
pub use table::{PaginationMode, Table};
pub use value::Record;

/// Re-export commonly used types
pub mod prelude {
	pub use crate::action::*;
	pub use crate::card::*;
	pub use crate::column::{
		Alignment, BadgeColor, BadgeColumn, BooleanColumn, CheckboxColumn, ColorColumn, Column,
		ColumnBuilder, IconColumn, ImageColumn, SelectColumn, Summarizer, TextColumn,
		TextInputColumn, ToggleColumn,
	};
	pub use crate::envelope::*;
	pub use crate::error::*;
	pub use crate::filter::{
		BaseFilter, Filter, FilterBuilder, Indicator, QueryFilter, SelectFilter, TernaryFilter,
		TrashedFilter,
	};
	pub use crate::grouping::*;
	pub use crate::processor::OutputRecord;
	pub use crate::query::{
		Condition, MemoryQuery, ModelMeta, Operator, Pagination, QueryBuilder, SortDirection,
		TrashedMode,
	};
	pub use crate::request::*;
	pub use crate::settings::TableSettings;
	pub use crate::table::*;
	pub use crate::value::Record;
}
