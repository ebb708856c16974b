//! Result envelope
//!
//! [`TableRecords`] is the data half of a response: processed records,
//! pagination and the active group. [`TableProps`] wraps it with the echoed
//! table configuration the rendering layer needs.

use crate::action::RecordAction;
use crate::error::TableResult;
use crate::filter::Indicator;
use crate::processor::OutputRecord;
use crate::query::{Pagination, SortDirection};
use crate::request::RequestParams;
use crate::table::{PaginationMode, Table};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Records for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecords {
	/// Processed records
	pub records: Vec<OutputRecord>,
	/// Pagination metadata; `None` when pagination was disabled
	pub pagination: Option<Pagination>,
	/// Active group column
	pub active_group: Option<String>,
	/// Summaries per summarized column, computed over `records`
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub summaries: BTreeMap<String, Vec<Value>>,
}

impl TableRecords {
	/// Serialize to JSON
	pub fn to_json(&self) -> TableResult<Value> {
		Ok(serde_json::to_value(self)?)
	}
}

/// Empty state shown when no records match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
	/// Heading
	pub heading: String,
	/// Description
	pub description: Option<String>,
	/// Icon
	pub icon: Option<String>,
}

/// Full props handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProps {
	/// Serialized columns
	pub columns: Vec<Value>,
	/// Serialized filters
	pub filters: Vec<Value>,
	/// Active-filter indicators
	pub filter_indicators: Vec<Indicator>,
	/// Table-level actions
	pub actions: Vec<Value>,
	/// Record action definitions
	pub record_actions: Vec<Value>,
	/// Header actions
	pub header_actions: Vec<Value>,
	/// Toolbar actions
	pub toolbar_actions: Vec<Value>,
	/// Bulk actions
	pub bulk_actions: Vec<Value>,
	/// Global search enabled
	pub searchable: bool,
	/// Search box placeholder
	pub search_placeholder: String,
	/// Pagination enabled
	pub paginated: bool,
	/// Default page size
	pub per_page: u64,
	/// Page size options
	pub pagination_page_options: Option<Vec<u64>>,
	/// Pagination control style
	pub pagination_mode: PaginationMode,
	/// First/last page links
	pub extreme_pagination_links: bool,
	/// Infinite scroll
	pub infinite_scroll: bool,
	/// Striped rows
	pub striped: bool,
	/// Row hover highlight
	pub hoverable: bool,
	/// Filters placement
	pub filters_layout: String,
	/// Rows can be reordered
	pub reorderable: bool,
	/// Column holding the row position
	pub reorderable_column: Option<String>,
	/// Serialized groups
	pub groups: Vec<Value>,
	/// Default group column
	pub default_group: Option<String>,
	/// Active group column
	pub active_group: Option<String>,
	/// Refresh interval
	pub poll_interval: Option<String>,
	/// Default sort column
	pub default_sort_column: Option<String>,
	/// Default sort direction
	pub default_sort_direction: SortDirection,
	/// Actions column stays visible
	pub fixed_actions: bool,
	/// Processed records
	pub records: Vec<OutputRecord>,
	/// Pagination metadata
	pub pagination: Option<Pagination>,
	/// Summaries per summarized column
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub summaries: BTreeMap<String, Vec<Value>>,
	/// Serialized card layout
	pub card: Option<Value>,
	/// Cards per grid row
	pub cards_per_row: u32,
	/// Grid view only
	pub grid_only: bool,
	/// Empty state
	pub empty_state: EmptyState,
	/// Records route
	pub query_route: Option<String>,
	/// Resource slug, empty when unset
	pub resource_slug: String,
	/// Model name
	pub model: Option<String>,
	/// Free-form options
	pub options: Map<String, Value>,
}

impl TableProps {
	/// Assemble props from a table, the request and its records
	pub fn build(table: &Table, params: &RequestParams, records: TableRecords) -> Self {
		let settings = table.settings();
		Self {
			columns: table.columns.iter().map(|column| column.to_props()).collect(),
			filters: table.filters.iter().map(|filter| filter.to_props()).collect(),
			filter_indicators: table.filter_indicators(params),
			actions: action_props(&table.actions),
			record_actions: action_props(&table.record_actions),
			header_actions: action_props(&table.header_actions),
			toolbar_actions: action_props(&table.toolbar_actions),
			bulk_actions: action_props(&table.bulk_actions),
			searchable: table.searchable,
			search_placeholder: settings.search_placeholder.clone(),
			paginated: table.paginated,
			per_page: settings.per_page,
			pagination_page_options: table.pagination_page_options.clone(),
			pagination_mode: table.pagination_mode,
			extreme_pagination_links: table.extreme_pagination_links,
			infinite_scroll: table.infinite_scroll,
			striped: table.striped,
			hoverable: table.hoverable,
			filters_layout: table.filters_layout.clone(),
			reorderable: table.reorderable_column.is_some(),
			reorderable_column: table.reorderable_column.clone(),
			groups: table.groups.iter().map(|group| group.to_props()).collect(),
			default_group: table.default_group.clone(),
			active_group: records.active_group,
			poll_interval: table.poll_interval.clone(),
			default_sort_column: settings.default_sort_column.clone(),
			default_sort_direction: settings.default_sort_direction,
			fixed_actions: table.fixed_actions,
			records: records.records,
			pagination: records.pagination,
			summaries: records.summaries,
			card: table.card.as_ref().map(|card| card.to_props()),
			cards_per_row: table.cards_per_row,
			grid_only: table.grid_only,
			empty_state: EmptyState {
				heading: settings.empty_state_heading.clone(),
				description: table.empty_state_description.clone(),
				icon: table.empty_state_icon.clone(),
			},
			query_route: table.query_route.clone(),
			resource_slug: table.resource_slug.clone().unwrap_or_default(),
			model: table.model.clone(),
			options: table.options.clone(),
		}
	}

	/// Serialize to JSON
	pub fn to_json(&self) -> TableResult<Value> {
		Ok(serde_json::to_value(self)?)
	}
}

fn action_props(actions: &[Box<dyn RecordAction>]) -> Vec<Value> {
	actions.iter().map(|action| action.to_props()).collect()
}
