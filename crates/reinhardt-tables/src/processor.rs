//! Record processing
//!
//! Converts raw rows into [`OutputRecord`]s: row attributes plus per-column
//! presentation metadata, resolved record actions, group metadata and the
//! clickable-row URL. Processing never mutates the input rows.

use crate::action::RecordAction;
use crate::grouping::{Group, GroupMeta};
use crate::query::ModelMeta;
use crate::table::Table;
use crate::value::{Record, lookup_path};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Column name to evaluated metadata
pub type ColumnMeta = BTreeMap<String, String>;

/// One processed row
///
/// Serializes flat: row attributes at the top level next to the
/// underscore-prefixed metadata keys the rendering layer reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
	/// Row attributes, including resolved and formatted column values
	#[serde(flatten)]
	pub attributes: Record,
	/// Per-column icons
	#[serde(rename = "_icons")]
	pub icons: ColumnMeta,
	/// Per-column colors
	#[serde(rename = "_colors")]
	pub colors: ColumnMeta,
	/// Per-column sizes
	#[serde(rename = "_sizes")]
	pub sizes: ColumnMeta,
	/// Per-column descriptions
	#[serde(rename = "_descriptions")]
	pub descriptions: ColumnMeta,
	/// Record actions visible for this row
	#[serde(rename = "_actions")]
	pub actions: Vec<Value>,
	/// Group metadata, when a group is active
	#[serde(rename = "_group", skip_serializing_if = "Option::is_none")]
	pub group: Option<GroupMeta>,
	/// Clickable-row URL
	#[serde(rename = "_url", skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	/// Card badge color
	#[serde(rename = "_badgeColor", skip_serializing_if = "Option::is_none")]
	pub badge_color: Option<String>,
}

impl OutputRecord {
	fn new(attributes: Record) -> Self {
		Self {
			attributes,
			icons: ColumnMeta::new(),
			colors: ColumnMeta::new(),
			sizes: ColumnMeta::new(),
			descriptions: ColumnMeta::new(),
			actions: Vec::new(),
			group: None,
			url: None,
			badge_color: None,
		}
	}

	/// Attribute value by key
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}
}

/// Converts rows into output records for one table and request
#[derive(Debug)]
pub struct RecordProcessor<'a> {
	table: &'a Table,
	group: Option<&'a Group>,
	primary_key: String,
	soft_delete_column: Option<String>,
}

impl<'a> RecordProcessor<'a> {
	/// Processor for `table` with the request's active group
	pub fn new(table: &'a Table, group: Option<&'a Group>) -> Self {
		Self {
			table,
			group,
			primary_key: "id".to_string(),
			soft_delete_column: None,
		}
	}

	/// Use the queried model's primary key and soft-delete column
	pub fn with_model(mut self, model: &ModelMeta) -> Self {
		self.primary_key = model.primary_key.clone();
		self.soft_delete_column = model.soft_delete_column.clone();
		self
	}

	/// Process every row
	pub fn process_all(&self, rows: &[Record]) -> Vec<OutputRecord> {
		rows.iter().map(|row| self.process(row)).collect()
	}

	/// Process one row
	pub fn process(&self, row: &Record) -> OutputRecord {
		let mut attributes = row.clone();
		if let Some(column) = &self.soft_delete_column
			&& !attributes.contains_key(column)
		{
			attributes.insert(column.clone(), Value::Null);
		}
		let mut output = OutputRecord::new(attributes);

		for column in &self.table.columns {
			let name = column.name();
			let core = column.core();

			let state = if core.has_state_getter() {
				let state = core.state(row).unwrap_or(Value::Null);
				output.attributes.insert(name.to_string(), state.clone());
				state
			} else {
				let state = lookup_path(row, name).cloned().unwrap_or(Value::Null);
				if name.contains('.') && !state.is_null() {
					output.attributes.insert(name.to_string(), state.clone());
				}
				state
			};

			if let Some(icon) = column.evaluate_icon(&state, row) {
				output.icons.insert(name.to_string(), icon);
			}
			if let Some(color) = column.evaluate_color(&state, row) {
				output.colors.insert(name.to_string(), color);
			}
			if let Some(size) = column.evaluate_size(&state, row) {
				output.sizes.insert(name.to_string(), size);
			}
			if let Some(description) = column.evaluate_description(&state, row) {
				output.descriptions.insert(name.to_string(), description);
			}

			if let Some(formatted) = core.format(&state, row)
				&& formatted != state
			{
				output.attributes.insert(name.to_string(), formatted);
			}
		}

		if let Some(card) = &self.table.card
			&& card.has_badge_color()
			&& let Some(field) = card.badge_field_name()
			&& let Some(value) = output.attributes.get(field).filter(|value| !value.is_null())
		{
			output.badge_color = card.evaluate_badge_color(value);
		}

		output.actions = self.resolve_actions(row, &output.attributes);

		if let Some(group) = self.group {
			let value = output
				.attributes
				.get(group.column())
				.cloned()
				.unwrap_or(Value::Null);
			output.group = Some(group.meta_for_record(row, value));
		}

		output.url = self.record_url(row);
		output
	}

	/// Aggregates per summarized column, computed over the raw rows
	pub fn summaries(&self, rows: &[Record]) -> BTreeMap<String, Vec<Value>> {
		let mut summaries = BTreeMap::new();
		for column in &self.table.columns {
			let summarizers = column.summarizers();
			if summarizers.is_empty() {
				continue;
			}
			let values = summarizers
				.iter()
				.map(|summarizer| {
					let mut props = summarizer.to_props();
					props["value"] = summarizer.execute(rows, column.name());
					props
				})
				.collect();
			summaries.insert(column.name().to_string(), values);
		}
		summaries
	}

	fn record_key(&self, row: &Record) -> Option<Value> {
		row.get(&self.primary_key)
			.filter(|key| !key.is_null())
			.cloned()
	}

	/// Clone, resolve and serialize each record action for one row
	///
	/// A failing action is skipped for this row only.
	fn resolve_actions(&self, row: &Record, attributes: &Record) -> Vec<Value> {
		let key = self
			.record_key(row)
			.unwrap_or_else(|| Value::Object(row.clone()));

		let mut actions = Vec::new();
		for template in &self.table.record_actions {
			let mut action = template.clone();
			if let Some(column) = &self.soft_delete_column {
				action.resolve_soft_delete_column(column);
			}
			let resolved = action
				.resolve_record_context(&key)
				.and_then(|_| action.to_props_with_record(attributes));
			match resolved {
				Ok(Some(props)) => actions.push(props),
				Ok(None) => {}
				Err(error) => {
					tracing::warn!(
						action = action.name(),
						error = %error,
						"record action failed, skipped for this row"
					);
				}
			}
		}
		actions
	}

	fn record_url(&self, row: &Record) -> Option<String> {
		if let Some(url) = &self.table.record_url {
			return url(row);
		}
		if !self.table.record_url_from_first_action {
			return None;
		}

		let mut first: Box<dyn RecordAction> = self.table.record_actions.first()?.clone();
		if let Some(key) = self.record_key(row)
			&& let Err(error) = first.resolve_record_context(&key)
		{
			tracing::debug!(action = first.name(), error = %error, "row url not resolved");
			return None;
		}
		first.url()
	}
}
