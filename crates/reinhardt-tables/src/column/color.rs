//! Color swatch column

use super::base::{Column, ColumnBuilder, ColumnCore};
use serde_json::{Map, Value, json};

/// Column rendering color values as swatches
#[derive(Debug, Clone)]
pub struct ColorColumn {
	core: ColumnCore,
	copyable: bool,
	copy_message: Option<String>,
	copy_message_duration: Option<u32>,
	wrap: bool,
	max_visible: u32,
}

impl ColorColumn {
	/// Color column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			copyable: false,
			copy_message: None,
			copy_message_duration: None,
			wrap: false,
			max_visible: 4,
		}
	}

	/// Show a copy button
	pub fn copyable(mut self, copyable: bool) -> Self {
		self.copyable = copyable;
		self
	}

	/// Message shown after copying, for `duration_ms`
	pub fn copy_message(mut self, message: impl Into<String>, duration_ms: Option<u32>) -> Self {
		self.copy_message = Some(message.into());
		self.copy_message_duration = duration_ms;
		self
	}

	/// Wrap swatches onto several lines
	pub fn wrap(mut self, wrap: bool) -> Self {
		self.wrap = wrap;
		self
	}

	/// Swatches shown before collapsing
	pub fn max_visible(mut self, count: u32) -> Self {
		self.max_visible = count;
		self
	}
}

impl ColumnBuilder for ColorColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for ColorColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"ColorColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		let mut props = Map::new();
		props.insert("copyable".to_string(), json!(self.copyable));
		props.insert("copyMessage".to_string(), json!(self.copy_message));
		props.insert(
			"copyMessageDuration".to_string(),
			json!(self.copy_message_duration),
		);
		props.insert("wrap".to_string(), json!(self.wrap));
		props.insert("maxVisible".to_string(), json!(self.max_visible));
		props
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_props() {
		let props = ColorColumn::make("brand_color")
			.copyable(true)
			.copy_message("Copied", Some(1500))
			.to_props();

		assert_eq!(props["component"], json!("ColorColumn"));
		assert_eq!(props["copyable"], json!(true));
		assert_eq!(props["copyMessageDuration"], json!(1500));
		assert_eq!(props["maxVisible"], json!(4));
	}
}
