//! Table definition
//!
//! [`Table`] is the aggregate root: an ordered set of columns, filters and
//! groups, a query factory, record actions and display configuration. It is
//! built once per request with the fluent setters, then asked for its
//! records ([`Table::get_records`]) or its full props ([`Table::to_props`]).

use crate::action::RecordAction;
use crate::card::Card;
use crate::column::Column;
use crate::envelope::{TableProps, TableRecords};
use crate::error::TableResult;
use crate::executor::QueryExecutor;
use crate::filter::{Filter, Indicator};
use crate::grouping::{Group, GroupedPagination, find_group};
use crate::processor::RecordProcessor;
use crate::query::{QueryBuilder, SortDirection};
use crate::request::{RESERVED_PARAMS, RequestParams};
use crate::settings::TableSettings;
use crate::value::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Factory producing a fresh query for each execution
pub type QueryFactory = Arc<dyn Fn() -> Box<dyn QueryBuilder> + Send + Sync>;

/// Clickable-row URL derived from the raw record
pub type RecordUrlFn = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

/// Pagination control style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
	/// Previous/next only
	Simple,
	/// Numbered pages
	#[default]
	Standard,
	/// Cursor-based
	Cursor,
}

/// Declarative admin table
///
/// # Examples
///
/// ```
/// use reinhardt_tables::prelude::*;
/// use serde_json::json;
///
/// let table = Table::make()
///     .column(TextColumn::make("name").searchable(true).sortable(true))
///     .column(TextColumn::make("email").searchable(true))
///     .query(|| {
///         Box::new(MemoryQuery::from_json(
///             ModelMeta::new("users"),
///             json!([
///                 {"id": 1, "name": "Ann", "email": "ann@example.com"},
///                 {"id": 2, "name": "Bob", "email": "bob@example.com"},
///             ]),
///         ))
///     });
///
/// let records = table
///     .get_records(&RequestParams::new().with_search("ann"))
///     .unwrap();
/// assert_eq!(records.records.len(), 1);
/// assert_eq!(records.pagination.unwrap().total, 1);
/// ```
#[derive(Clone)]
pub struct Table {
	pub(crate) columns: Vec<Arc<dyn Column>>,
	pub(crate) filters: Vec<Arc<dyn Filter>>,
	pub(crate) groups: Vec<Group>,
	pub(crate) default_group: Option<String>,
	pub(crate) grouped_pagination: GroupedPagination,
	pub(crate) query: Option<QueryFactory>,
	pub(crate) settings: TableSettings,
	pub(crate) searchable: bool,
	pub(crate) paginated: bool,
	pub(crate) pagination_page_options: Option<Vec<u64>>,
	pub(crate) pagination_mode: PaginationMode,
	pub(crate) extreme_pagination_links: bool,
	pub(crate) infinite_scroll: bool,
	pub(crate) striped: bool,
	pub(crate) hoverable: bool,
	pub(crate) filters_layout: String,
	pub(crate) reorderable_column: Option<String>,
	pub(crate) poll_interval: Option<String>,
	pub(crate) fixed_actions: bool,
	pub(crate) actions: Vec<Box<dyn RecordAction>>,
	pub(crate) record_actions: Vec<Box<dyn RecordAction>>,
	pub(crate) header_actions: Vec<Box<dyn RecordAction>>,
	pub(crate) toolbar_actions: Vec<Box<dyn RecordAction>>,
	pub(crate) bulk_actions: Vec<Box<dyn RecordAction>>,
	pub(crate) record_url: Option<RecordUrlFn>,
	pub(crate) record_url_from_first_action: bool,
	pub(crate) card: Option<Card>,
	pub(crate) cards_per_row: u32,
	pub(crate) grid_only: bool,
	pub(crate) empty_state_description: Option<String>,
	pub(crate) empty_state_icon: Option<String>,
	pub(crate) query_route: Option<String>,
	pub(crate) resource_slug: Option<String>,
	pub(crate) model: Option<String>,
	pub(crate) options: Map<String, Value>,
}

impl Table {
	/// Empty table with default settings
	pub fn make() -> Self {
		Self::with_settings(TableSettings::default())
	}

	/// Empty table using `settings` for page size, sort and labels
	pub fn with_settings(settings: TableSettings) -> Self {
		Self {
			columns: Vec::new(),
			filters: Vec::new(),
			groups: Vec::new(),
			default_group: None,
			grouped_pagination: GroupedPagination::default(),
			query: None,
			settings,
			searchable: true,
			paginated: true,
			pagination_page_options: None,
			pagination_mode: PaginationMode::default(),
			extreme_pagination_links: false,
			infinite_scroll: false,
			striped: false,
			hoverable: false,
			filters_layout: "sidebar".to_string(),
			reorderable_column: None,
			poll_interval: None,
			fixed_actions: false,
			actions: Vec::new(),
			record_actions: Vec::new(),
			header_actions: Vec::new(),
			toolbar_actions: Vec::new(),
			bulk_actions: Vec::new(),
			record_url: None,
			record_url_from_first_action: true,
			card: None,
			cards_per_row: 3,
			grid_only: false,
			empty_state_description: None,
			empty_state_icon: None,
			query_route: None,
			resource_slug: None,
			model: None,
			options: Map::new(),
		}
	}

	/// Append a column
	pub fn column(mut self, column: impl Column + 'static) -> Self {
		self.columns.push(Arc::new(column));
		self
	}

	/// Append shared columns
	pub fn columns(mut self, columns: impl IntoIterator<Item = Arc<dyn Column>>) -> Self {
		self.columns.extend(columns);
		self
	}

	/// Append a filter
	///
	/// Filters are looked up by name in the request, so a filter named after
	/// one of [`RESERVED_PARAMS`] (`search`, `sort`, `direction`, `group`,
	/// `page`, `per_page`) never receives a value.
	pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
		if RESERVED_PARAMS.contains(&filter.name()) {
			tracing::warn!(
				filter = filter.name(),
				"filter name is a reserved request parameter and will never be applied"
			);
		}
		self.filters.push(Arc::new(filter));
		self
	}

	/// Append shared filters
	pub fn filters(mut self, filters: impl IntoIterator<Item = Arc<dyn Filter>>) -> Self {
		self.filters.extend(filters);
		self
	}

	/// Declare a group
	pub fn group(mut self, group: Group) -> Self {
		self.groups.push(group);
		self
	}

	/// Group applied when the request does not select one
	pub fn default_group(mut self, column: impl Into<String>) -> Self {
		self.default_group = Some(column.into());
		self
	}

	/// Page size policy while grouped
	pub fn grouped_pagination(mut self, policy: GroupedPagination) -> Self {
		self.grouped_pagination = policy;
		self
	}

	/// Query factory called once per execution
	pub fn query<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Box<dyn QueryBuilder> + Send + Sync + 'static,
	{
		self.query = Some(Arc::new(factory));
		self
	}

	/// Enable global search
	pub fn searchable(mut self, searchable: bool) -> Self {
		self.searchable = searchable;
		self
	}

	/// Search box placeholder
	pub fn search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.settings.search_placeholder = placeholder.into();
		self
	}

	/// Enable pagination
	pub fn paginated(mut self, paginated: bool) -> Self {
		self.paginated = paginated;
		self
	}

	/// Enable pagination with page size options; the first option becomes the page size
	pub fn paginated_with(mut self, options: impl IntoIterator<Item = u64>) -> Self {
		let options: Vec<u64> = options.into_iter().collect();
		self.paginated = true;
		if let Some(first) = options.first() {
			self.settings.per_page = *first;
		}
		self.pagination_page_options = Some(options);
		self
	}

	/// Default page size
	pub fn per_page(mut self, per_page: u64) -> Self {
		self.settings.per_page = per_page;
		self
	}

	/// Page size options offered in the UI
	pub fn pagination_page_options(mut self, options: impl IntoIterator<Item = u64>) -> Self {
		self.pagination_page_options = Some(options.into_iter().collect());
		self
	}

	/// Pagination control style
	pub fn pagination_mode(mut self, mode: PaginationMode) -> Self {
		self.pagination_mode = mode;
		self
	}

	/// Show first/last page links
	pub fn extreme_pagination_links(mut self, enabled: bool) -> Self {
		self.extreme_pagination_links = enabled;
		self
	}

	/// Load further pages on scroll
	pub fn infinite_scroll(mut self, enabled: bool) -> Self {
		self.infinite_scroll = enabled;
		self
	}

	/// Striped rows
	pub fn striped(mut self, striped: bool) -> Self {
		self.striped = striped;
		self
	}

	/// Highlight rows on hover
	pub fn hoverable(mut self, hoverable: bool) -> Self {
		self.hoverable = hoverable;
		self
	}

	/// Filters placement (`sidebar`, `dropdown`, `above`)
	pub fn filters_layout(mut self, layout: impl Into<String>) -> Self {
		self.filters_layout = layout.into();
		self
	}

	/// Allow reordering rows by `column`
	pub fn reorderable(mut self, column: impl Into<String>) -> Self {
		self.reorderable_column = Some(column.into());
		self
	}

	/// Refresh the table every `interval` (`10s`)
	pub fn poll(mut self, interval: impl Into<String>) -> Self {
		self.poll_interval = Some(interval.into());
		self
	}

	/// Sort applied when the request has no `sort`/`direction`
	pub fn default_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
		self.settings.default_sort_column = Some(column.into());
		self.settings.default_sort_direction = direction;
		self
	}

	/// Sort requests for relation field `virtual_field` use `physical` instead
	/// when the related table has no such column
	pub fn sort_fallback(
		mut self,
		virtual_field: impl Into<String>,
		physical: impl Into<String>,
	) -> Self {
		self.settings
			.sort_fallbacks
			.insert(virtual_field.into(), physical.into());
		self
	}

	/// Keep the actions column visible while scrolling
	pub fn fixed_actions(mut self, fixed: bool) -> Self {
		self.fixed_actions = fixed;
		self
	}

	/// Table-level action
	pub fn action(mut self, action: impl RecordAction + 'static) -> Self {
		self.actions.push(Box::new(action));
		self
	}

	/// Action resolved and rendered per record
	pub fn record_action(mut self, action: impl RecordAction + 'static) -> Self {
		self.record_actions.push(Box::new(action));
		self
	}

	/// Action rendered in the table header
	pub fn header_action(mut self, action: impl RecordAction + 'static) -> Self {
		self.header_actions.push(Box::new(action));
		self
	}

	/// Action rendered in the toolbar
	pub fn toolbar_action(mut self, action: impl RecordAction + 'static) -> Self {
		self.toolbar_actions.push(Box::new(action));
		self
	}

	/// Action run on selected records
	pub fn bulk_action(mut self, action: impl RecordAction + 'static) -> Self {
		self.bulk_actions.push(Box::new(action));
		self
	}

	/// Clickable-row URL for each record
	pub fn record_url_using<F>(mut self, url: F) -> Self
	where
		F: Fn(&Record) -> Option<String> + Send + Sync + 'static,
	{
		self.record_url = Some(Arc::new(url));
		self
	}

	/// Stop using the first record action's URL as the row URL
	pub fn disable_record_url_from_first_action(mut self) -> Self {
		self.record_url_from_first_action = false;
		self
	}

	/// Card layout for the grid view
	pub fn card(mut self, card: Card) -> Self {
		self.card = Some(card);
		self
	}

	/// Cards per grid row
	pub fn cards_per_row(mut self, cards: u32) -> Self {
		self.cards_per_row = cards;
		self
	}

	/// Render only the grid view
	pub fn grid_only(mut self, grid_only: bool) -> Self {
		self.grid_only = grid_only;
		self
	}

	/// Empty state heading
	pub fn empty_state_heading(mut self, heading: impl Into<String>) -> Self {
		self.settings.empty_state_heading = heading.into();
		self
	}

	/// Empty state description
	pub fn empty_state_description(mut self, description: impl Into<String>) -> Self {
		self.empty_state_description = Some(description.into());
		self
	}

	/// Empty state icon
	pub fn empty_state_icon(mut self, icon: impl Into<String>) -> Self {
		self.empty_state_icon = Some(icon.into());
		self
	}

	/// Route the frontend queries for records
	pub fn query_route(mut self, route: impl Into<String>) -> Self {
		self.query_route = Some(route.into());
		self
	}

	/// Resource slug used to build frontend routes
	pub fn resource_slug(mut self, slug: impl Into<String>) -> Self {
		self.resource_slug = Some(slug.into());
		self
	}

	/// Model name echoed to the frontend
	pub fn model(mut self, model: impl Into<String>) -> Self {
		self.model = Some(model.into());
		self
	}

	/// Arbitrary option echoed in the props
	pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Settings in effect
	pub fn settings(&self) -> &TableSettings {
		&self.settings
	}

	/// Declared columns
	pub fn get_columns(&self) -> &[Arc<dyn Column>] {
		&self.columns
	}

	/// Declared filters
	pub fn get_filters(&self) -> &[Arc<dyn Filter>] {
		&self.filters
	}

	/// Declared groups
	pub fn get_groups(&self) -> &[Group] {
		&self.groups
	}

	/// Group selected by the request, or the default group
	///
	/// An empty `group` parameter disables grouping.
	pub fn active_group(&self, params: &RequestParams) -> Option<&Group> {
		let requested = match &params.group {
			Some(group) => Some(group.as_str()).filter(|g| !g.is_empty()),
			None => self.default_group.as_deref(),
		};
		find_group(&self.groups, requested)
	}

	/// Indicators for filters with a non-empty request value
	pub fn filter_indicators(&self, params: &RequestParams) -> Vec<Indicator> {
		self.filters
			.iter()
			.filter_map(|filter| {
				let value = params.filter(filter.name())?;
				if !value.is_indicated() {
					return None;
				}
				filter.indicator(value)
			})
			.collect()
	}

	/// Execute the query and process the resulting records
	pub fn get_records(&self, params: &RequestParams) -> TableResult<TableRecords> {
		let execution = QueryExecutor::new(self, params).execute()?;
		let mut processor = RecordProcessor::new(self, execution.active_group);
		if let Some(model) = &execution.model {
			processor = processor.with_model(model);
		}
		let summaries = processor.summaries(&execution.rows);
		let records = processor.process_all(&execution.rows);

		Ok(TableRecords {
			records,
			pagination: execution.pagination,
			active_group: execution.active_group.map(|group| group.column().to_string()),
			summaries,
		})
	}

	/// Full props for the rendering layer
	pub fn to_props(&self, params: &RequestParams) -> TableResult<TableProps> {
		let records = self.get_records(params)?;
		Ok(TableProps::build(self, params, records))
	}
}

impl Default for Table {
	fn default() -> Self {
		Self::make()
	}
}

impl fmt::Debug for Table {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Table")
			.field("columns", &self.columns.iter().map(|c| c.name()).collect::<Vec<_>>())
			.field("filters", &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>())
			.field("groups", &self.groups)
			.field("has_query", &self.query.is_some())
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::{BaseFilter, FilterBuilder, SelectFilter};
	use crate::request::FilterValue;
	use rstest::rstest;

	#[test]
	fn test_defaults() {
		let table = Table::make();
		assert_eq!(table.settings().per_page, 12);
		assert!(table.searchable);
		assert!(table.paginated);
		assert_eq!(table.filters_layout, "sidebar");
		assert_eq!(table.cards_per_row, 3);
	}

	#[test]
	fn test_paginated_with_uses_first_option() {
		let table = Table::make().paginated_with([25, 50, 100]);
		assert_eq!(table.settings().per_page, 25);
		assert_eq!(table.pagination_page_options, Some(vec![25, 50, 100]));
	}

	#[rstest]
	#[case(None, Some("team"))]
	#[case(Some("role"), Some("role"))]
	#[case(Some(""), None)]
	#[case(Some("unknown"), None)]
	fn test_active_group(#[case] requested: Option<&str>, #[case] expected: Option<&str>) {
		let table = Table::make()
			.group(Group::make("team"))
			.group(Group::make("role"))
			.default_group("team");
		let mut params = RequestParams::new();
		params.group = requested.map(String::from);

		assert_eq!(table.active_group(&params).map(Group::column), expected);
	}

	#[test]
	fn test_filter_indicators() {
		let table = Table::make()
			.filter(
				SelectFilter::make("status")
					.indicate_using(|value| value.as_str().map(|v| format!("Status: {}", v))),
			)
			.filter(BaseFilter::make("owner").indicate_using(|_| Some("Mine".to_string())))
			.filter(BaseFilter::make("silent"));
		let params = RequestParams::new()
			.with_filter("status", "draft")
			.with_filter("owner", "")
			.with_filter("silent", "1");

		let indicators = table.filter_indicators(&params);
		assert_eq!(indicators.len(), 1);
		assert_eq!(indicators[0].label, "Status: draft");
		assert_eq!(indicators[0].remove_field, "status");

		let params = RequestParams::new().with_filter("owner", FilterValue::from("false"));
		assert!(table.filter_indicators(&params).is_empty());
	}
}
