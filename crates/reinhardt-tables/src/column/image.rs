//! Image column

use super::base::{Column, ColumnBuilder, ColumnCore};
use serde_json::{Map, Value, json};

/// Column rendering its state as one or more images
#[derive(Debug, Clone)]
pub struct ImageColumn {
	core: ColumnCore,
	width: Option<Value>,
	height: Option<Value>,
	square: bool,
	circular: bool,
	stacked: bool,
	ring: u32,
	overlap: u32,
	limit: Option<u32>,
	limited_remaining_text: bool,
	limited_remaining_text_size: String,
	wrap: bool,
	disk: Option<String>,
	visibility: Option<String>,
	default_image_url: Option<String>,
	check_file_existence: bool,
	extra_img_attributes: Map<String, Value>,
}

impl ImageColumn {
	/// Image column named `name`
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			core: ColumnCore::new(name),
			width: None,
			height: None,
			square: false,
			circular: false,
			stacked: false,
			ring: 3,
			overlap: 4,
			limit: None,
			limited_remaining_text: false,
			limited_remaining_text_size: "sm".to_string(),
			wrap: false,
			disk: None,
			visibility: None,
			default_image_url: None,
			check_file_existence: true,
			extra_img_attributes: Map::new(),
		}
	}

	/// Image width (`40` or `"2.5rem"`)
	pub fn image_width(mut self, width: impl Into<Value>) -> Self {
		self.width = Some(width.into());
		self
	}

	/// Image height
	pub fn image_height(mut self, height: impl Into<Value>) -> Self {
		self.height = Some(height.into());
		self
	}

	/// Same width and height
	pub fn image_size(self, size: impl Into<Value>) -> Self {
		let size = size.into();
		self.image_width(size.clone()).image_height(size)
	}

	/// Square crop
	pub fn square(mut self, square: bool) -> Self {
		self.square = square;
		self
	}

	/// Circular crop
	pub fn circular(mut self, circular: bool) -> Self {
		self.circular = circular;
		self
	}

	/// Overlap multiple images with a ring of `ring` pixels
	pub fn stacked(mut self, stacked: bool, ring: u32, overlap: u32) -> Self {
		self.stacked = stacked;
		self.ring = ring;
		self.overlap = overlap;
		self
	}

	/// Show at most `limit` images
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}

	/// Show a "+N" counter for images over the limit
	pub fn limited_remaining_text(mut self, enabled: bool, size: impl Into<String>) -> Self {
		self.limited_remaining_text = enabled;
		self.limited_remaining_text_size = size.into();
		self
	}

	/// Wrap images onto several lines
	pub fn wrap(mut self, wrap: bool) -> Self {
		self.wrap = wrap;
		self
	}

	/// Storage disk the paths refer to
	pub fn disk(mut self, disk: impl Into<String>) -> Self {
		self.disk = Some(disk.into());
		self
	}

	/// File visibility (`public` or `private`)
	pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
		self.visibility = Some(visibility.into());
		self
	}

	/// Image shown when the state is empty
	pub fn default_image_url(mut self, url: impl Into<String>) -> Self {
		self.default_image_url = Some(url.into());
		self
	}

	/// Skip images whose file does not exist
	pub fn check_file_existence(mut self, check: bool) -> Self {
		self.check_file_existence = check;
		self
	}

	/// Extra attributes for the `<img>` element
	pub fn extra_img_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra_img_attributes.insert(name.into(), value.into());
		self
	}
}

impl ColumnBuilder for ImageColumn {
	fn core_mut(&mut self) -> &mut ColumnCore {
		&mut self.core
	}
}

impl Column for ImageColumn {
	fn core(&self) -> &ColumnCore {
		&self.core
	}

	fn component(&self) -> &'static str {
		"ImageColumn"
	}

	fn extra_props(&self) -> Map<String, Value> {
		let props = json!({
			"imageWidth": self.width,
			"imageHeight": self.height,
			"square": self.square,
			"circular": self.circular,
			"stacked": self.stacked,
			"ring": self.ring,
			"overlap": self.overlap,
			"limit": self.limit,
			"limitedRemainingText": self.limited_remaining_text,
			"limitedRemainingTextSize": self.limited_remaining_text_size,
			"wrap": self.wrap,
			"disk": self.disk,
			"visibility": self.visibility,
			"defaultImageUrl": self.default_image_url,
			"checkFileExistence": self.check_file_existence,
			"extraImgAttributes": self.extra_img_attributes,
		});
		match props {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}
}
