//! Record actions
//!
//! Actions attached to each row. The record processor clones every action
//! per row, binds the row's key with
//! [`resolve_record_context`](RecordAction::resolve_record_context) and
//! serializes the clone, so row-specific state never leaks between rows.

use crate::error::{TableError, TableResult};
use crate::query::model::DELETED_AT;
use crate::value::{Record, stringify};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Placeholder replaced with the record key in URL templates
pub const KEY_PLACEHOLDER: &str = "{id}";

/// Visibility predicate evaluated per record
pub type VisibilityFn = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Trait for actions rendered with each record
///
/// # Examples
///
/// ```
/// use reinhardt_tables::action::{Action, RecordAction};
/// use serde_json::json;
///
/// let mut action = Action::edit("/admin/posts/{id}/edit");
/// action.resolve_record_context(&json!(7)).unwrap();
/// assert_eq!(action.url().as_deref(), Some("/admin/posts/7/edit"));
/// ```
pub trait RecordAction: Send + Sync {
	/// Action name (used as identifier)
	fn name(&self) -> &str;

	/// Clone into a new boxed instance
	fn box_clone(&self) -> Box<dyn RecordAction>;

	/// Bind record-specific context, typically the record key
	fn resolve_record_context(&mut self, _key: &Value) -> TableResult<()> {
		Ok(())
	}

	/// Bind the queried model's soft-delete column
	fn resolve_soft_delete_column(&mut self, _column: &str) {}

	/// Resolved URL, if the action navigates
	fn url(&self) -> Option<String> {
		None
	}

	/// Serialized action configuration
	fn to_props(&self) -> Value;

	/// Serialized action for one record; `None` when hidden for the record
	fn to_props_with_record(&self, _record: &Record) -> TableResult<Option<Value>> {
		Ok(Some(self.to_props()))
	}
}

impl Clone for Box<dyn RecordAction> {
	fn clone(&self) -> Self {
		self.box_clone()
	}
}

impl fmt::Debug for dyn RecordAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RecordAction")
			.field("name", &self.name())
			.finish_non_exhaustive()
	}
}

/// When an [`Action`] is shown for a record
#[derive(Clone)]
enum Visibility {
	Always,
	Trashed,
	NotTrashed,
	When(VisibilityFn),
}

/// Navigating action with a URL template and per-record visibility
#[derive(Clone)]
pub struct Action {
	name: String,
	label: Option<String>,
	icon: Option<String>,
	color: Option<String>,
	url_template: Option<String>,
	url: Option<String>,
	method: String,
	open_in_new_tab: bool,
	requires_confirmation: bool,
	modal_heading: Option<String>,
	visible: Visibility,
	soft_delete_column: String,
	record_key: Option<Value>,
}

impl Action {
	/// Action named `name`
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: None,
			icon: None,
			color: None,
			url_template: None,
			url: None,
			method: "GET".to_string(),
			open_in_new_tab: false,
			requires_confirmation: false,
			modal_heading: None,
			visible: Visibility::Always,
			soft_delete_column: DELETED_AT.to_string(),
			record_key: None,
		}
	}

	/// `view` action linking to `url_template`
	pub fn view(url_template: impl Into<String>) -> Self {
		Self::new("view")
			.label("View")
			.icon("Eye")
			.color("gray")
			.url_template(url_template)
	}

	/// `edit` action linking to `url_template`
	pub fn edit(url_template: impl Into<String>) -> Self {
		Self::new("edit")
			.label("Edit")
			.icon("Pencil")
			.color("primary")
			.url_template(url_template)
	}

	/// `delete` action, hidden for soft-deleted records
	pub fn delete(url_template: impl Into<String>) -> Self {
		Self::new("delete")
			.label("Delete")
			.icon("Trash2")
			.color("danger")
			.method("DELETE")
			.url_template(url_template)
			.requires_confirmation(true)
			.with_visibility(Visibility::NotTrashed)
	}

	/// `restore` action, shown only for soft-deleted records
	pub fn restore(url_template: impl Into<String>) -> Self {
		Self::new("restore")
			.label("Restore")
			.icon("RotateCcw")
			.color("success")
			.method("POST")
			.url_template(url_template)
			.requires_confirmation(true)
			.with_visibility(Visibility::Trashed)
	}

	/// Display label
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Icon name
	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	/// Color name
	pub fn color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	/// URL, with `{id}` replaced by the record key on resolution
	pub fn url_template(mut self, template: impl Into<String>) -> Self {
		let template = template.into();
		self.url = (!template.contains(KEY_PLACEHOLDER)).then(|| template.clone());
		self.url_template = Some(template);
		self
	}

	/// HTTP method used by the frontend
	pub fn method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();
		self
	}

	/// Open the URL in a new tab
	pub fn open_in_new_tab(mut self, open: bool) -> Self {
		self.open_in_new_tab = open;
		self
	}

	/// Ask for confirmation before running
	pub fn requires_confirmation(mut self, required: bool) -> Self {
		self.requires_confirmation = required;
		self
	}

	/// Heading of the confirmation modal
	pub fn modal_heading(mut self, heading: impl Into<String>) -> Self {
		self.modal_heading = Some(heading.into());
		self
	}

	/// Show the action only for records matching `predicate`
	pub fn visible<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&Record) -> bool + Send + Sync + 'static,
	{
		self.with_visibility(Visibility::When(Arc::new(predicate)))
	}

	/// Column read by `delete`/`restore` visibility; defaults to `deleted_at`
	///
	/// The record processor overrides it with the queried model's column.
	pub fn soft_delete_column(mut self, column: impl Into<String>) -> Self {
		self.soft_delete_column = column.into();
		self
	}

	fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visible = visibility;
		self
	}

	/// Key bound by the last resolution
	pub fn record_key(&self) -> Option<&Value> {
		self.record_key.as_ref()
	}

	fn is_visible(&self, record: &Record) -> bool {
		match &self.visible {
			Visibility::Always => true,
			Visibility::Trashed => self.is_trashed(record),
			Visibility::NotTrashed => !self.is_trashed(record),
			Visibility::When(predicate) => predicate(record),
		}
	}

	fn is_trashed(&self, record: &Record) -> bool {
		record
			.get(&self.soft_delete_column)
			.is_some_and(|value| !value.is_null())
	}
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action")
			.field("name", &self.name)
			.field("url_template", &self.url_template)
			.field("url", &self.url)
			.field("record_key", &self.record_key)
			.finish_non_exhaustive()
	}
}

impl RecordAction for Action {
	fn name(&self) -> &str {
		&self.name
	}

	fn box_clone(&self) -> Box<dyn RecordAction> {
		Box::new(self.clone())
	}

	fn resolve_record_context(&mut self, key: &Value) -> TableResult<()> {
		self.record_key = Some(key.clone());

		let Some(template) = &self.url_template else {
			return Ok(());
		};
		if !template.contains(KEY_PLACEHOLDER) {
			return Ok(());
		}

		match key {
			Value::String(_) | Value::Number(_) => {
				self.url = Some(template.replace(KEY_PLACEHOLDER, &stringify(key)));
				Ok(())
			}
			_ => Err(TableError::action(
				&self.name,
				"record has no scalar key to substitute into the URL",
			)),
		}
	}

	fn resolve_soft_delete_column(&mut self, column: &str) {
		self.soft_delete_column = column.to_string();
	}

	fn url(&self) -> Option<String> {
		self.url.clone()
	}

	fn to_props(&self) -> Value {
		json!({
			"name": self.name,
			"label": self.label,
			"icon": self.icon,
			"color": self.color,
			"url": self.url,
			"method": self.method,
			"openUrlInNewTab": self.open_in_new_tab,
			"requiresConfirmation": self.requires_confirmation,
			"modalHeading": self.modal_heading,
		})
	}

	fn to_props_with_record(&self, record: &Record) -> TableResult<Option<Value>> {
		if !self.is_visible(record) {
			return Ok(None);
		}
		let mut props = self.to_props();
		if let Value::Object(map) = &mut props {
			map.insert(
				"recordKey".to_string(),
				self.record_key.clone().unwrap_or(Value::Null),
			);
		}
		Ok(Some(props))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn record(value: Value) -> Record {
		value.as_object().cloned().unwrap()
	}

	#[rstest]
	#[case(json!(7), "/posts/7")]
	#[case(json!("a1b2"), "/posts/a1b2")]
	fn test_key_substitution(#[case] key: Value, #[case] expected: &str) {
		let mut action = Action::view("/posts/{id}");
		action.resolve_record_context(&key).unwrap();
		assert_eq!(action.url().as_deref(), Some(expected));
	}

	#[test]
	fn test_unresolved_template_has_no_url() {
		assert_eq!(Action::view("/posts/{id}").url(), None);
		assert_eq!(
			Action::new("export").url_template("/export").url().as_deref(),
			Some("/export")
		);
	}

	#[test]
	fn test_non_scalar_key_fails() {
		let mut action = Action::edit("/posts/{id}/edit");
		let error = action
			.resolve_record_context(&json!({"title": "no key"}))
			.unwrap_err();
		assert!(matches!(error, TableError::Action { ref action, .. } if action == "edit"));
	}

	#[test]
	fn test_clones_resolve_independently() {
		let template: Box<dyn RecordAction> = Box::new(Action::edit("/posts/{id}/edit"));
		let mut first = template.clone();
		let mut second = template.clone();

		first.resolve_record_context(&json!(1)).unwrap();
		second.resolve_record_context(&json!(2)).unwrap();

		assert_eq!(first.url().as_deref(), Some("/posts/1/edit"));
		assert_eq!(second.url().as_deref(), Some("/posts/2/edit"));
		assert_eq!(template.url(), None);
	}

	#[rstest]
	#[case(json!({"id": 1, "deleted_at": null}), true, false)]
	#[case(json!({"id": 1, "deleted_at": "2024-01-01"}), false, true)]
	fn test_soft_delete_visibility(
		#[case] row: Value,
		#[case] delete_visible: bool,
		#[case] restore_visible: bool,
	) {
		let row = record(row);
		let delete = Action::delete("/posts/{id}");
		let restore = Action::restore("/posts/{id}/restore");

		assert_eq!(delete.to_props_with_record(&row).unwrap().is_some(), delete_visible);
		assert_eq!(
			restore.to_props_with_record(&row).unwrap().is_some(),
			restore_visible
		);
	}

	#[rstest]
	#[case(json!({"id": 1, "archived_at": null, "deleted_at": "2024-01-01"}), true, false)]
	#[case(json!({"id": 1, "archived_at": "2024-01-01"}), false, true)]
	fn test_soft_delete_visibility_custom_column(
		#[case] row: Value,
		#[case] delete_visible: bool,
		#[case] restore_visible: bool,
	) {
		let row = record(row);
		let delete: Box<dyn RecordAction> = Box::new(Action::delete("/posts/{id}"));
		let mut delete = delete.clone();
		delete.resolve_soft_delete_column("archived_at");
		let restore = Action::restore("/posts/{id}/restore").soft_delete_column("archived_at");

		assert_eq!(delete.to_props_with_record(&row).unwrap().is_some(), delete_visible);
		assert_eq!(
			restore.to_props_with_record(&row).unwrap().is_some(),
			restore_visible
		);
	}

	#[test]
	fn test_props_with_record_include_key() {
		let mut action = Action::view("/posts/{id}");
		action.resolve_record_context(&json!(3)).unwrap();
		let props = action
			.to_props_with_record(&record(json!({"id": 3})))
			.unwrap()
			.unwrap();

		assert_eq!(props["name"], json!("view"));
		assert_eq!(props["url"], json!("/posts/3"));
		assert_eq!(props["recordKey"], json!(3));
	}
}
