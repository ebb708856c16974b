//! Card layout for grid views

use crate::column::Column;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Badge color computed from the badge field's value
pub type BadgeColorFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Card descriptor used when a table renders as a grid
///
/// # Examples
///
/// ```
/// use reinhardt_tables::card::Card;
/// use serde_json::json;
///
/// let card = Card::product()
///     .badge_color_using(|status| match status.as_str() {
///         Some("in_stock") => Some("success".to_string()),
///         _ => Some("gray".to_string()),
///     });
///
/// assert_eq!(card.badge_field_name(), Some("status"));
/// assert_eq!(card.evaluate_badge_color(&json!("in_stock")).as_deref(), Some("success"));
/// ```
#[derive(Clone)]
pub struct Card {
	columns: Vec<Arc<dyn Column>>,
	image: Option<String>,
	hoverable: bool,
	aspect_ratio: Option<String>,
	image_field: Option<String>,
	title_field: Option<String>,
	description_field: Option<String>,
	price_field: Option<String>,
	badge_field: Option<String>,
	badge_color: Option<BadgeColorFn>,
	show_image: bool,
	image_position: String,
	padding: Option<String>,
	gap: Option<String>,
	actions_position: String,
	style: String,
}

impl Card {
	/// Empty card in the `simple` style
	pub fn make() -> Self {
		Self {
			columns: Vec::new(),
			image: None,
			hoverable: true,
			aspect_ratio: None,
			image_field: None,
			title_field: None,
			description_field: None,
			price_field: None,
			badge_field: None,
			badge_color: None,
			show_image: true,
			image_position: "top".to_string(),
			padding: None,
			gap: None,
			actions_position: "top-right".to_string(),
			style: "simple".to_string(),
		}
	}

	/// Product card: image, name, price, description and `status` badge
	pub fn product() -> Self {
		Self::make()
			.style("product")
			.image_field("image")
			.title_field("name")
			.price_field("price")
			.description_field("description")
			.badge_field("status")
			.aspect_ratio("4/3")
			.padding("md")
			.gap("sm")
	}

	/// Minimal card: title and description, no image
	pub fn simple() -> Self {
		Self::make()
			.style("simple")
			.title_field("name")
			.description_field("description")
			.show_image(false)
			.padding("md")
			.gap("sm")
	}

	/// Media card: full-bleed background image with overlay text
	pub fn media() -> Self {
		Self::make()
			.style("media")
			.image_field("image")
			.title_field("name")
			.description_field("description")
			.aspect_ratio("16/9")
			.image_position("background")
			.padding("md")
			.gap("sm")
	}

	/// Layout style (`simple`, `media`, `product`)
	pub fn style(mut self, style: impl Into<String>) -> Self {
		self.style = style.into();
		self
	}

	/// Columns rendered in the card body
	pub fn column(mut self, column: impl Column + 'static) -> Self {
		self.columns.push(Arc::new(column));
		self
	}

	/// Static image URL
	pub fn image(mut self, image: impl Into<String>) -> Self {
		self.image = Some(image.into());
		self
	}

	/// Hover effect
	pub fn hoverable(mut self, hoverable: bool) -> Self {
		self.hoverable = hoverable;
		self
	}

	/// Image aspect ratio (`4/3`, `16/9`)
	pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
		self.aspect_ratio = Some(ratio.into());
		self
	}

	/// Record field holding the image URL
	pub fn image_field(mut self, field: impl Into<String>) -> Self {
		self.image_field = Some(field.into());
		self
	}

	/// Record field holding the title
	pub fn title_field(mut self, field: impl Into<String>) -> Self {
		self.title_field = Some(field.into());
		self
	}

	/// Record field holding the description
	pub fn description_field(mut self, field: impl Into<String>) -> Self {
		self.description_field = Some(field.into());
		self
	}

	/// Record field holding the price
	pub fn price_field(mut self, field: impl Into<String>) -> Self {
		self.price_field = Some(field.into());
		self
	}

	/// Record field rendered as a badge
	pub fn badge_field(mut self, field: impl Into<String>) -> Self {
		self.badge_field = Some(field.into());
		self
	}

	/// Badge color from the badge field's value
	pub fn badge_color_using<F>(mut self, color: F) -> Self
	where
		F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
	{
		self.badge_color = Some(Arc::new(color));
		self
	}

	/// Show the image
	pub fn show_image(mut self, show: bool) -> Self {
		self.show_image = show;
		self
	}

	/// Image placement (`top`, `left`, `right`, `background`)
	pub fn image_position(mut self, position: impl Into<String>) -> Self {
		self.image_position = position.into();
		self
	}

	/// Inner padding (`sm`, `md`, `lg`, `xl`)
	pub fn padding(mut self, padding: impl Into<String>) -> Self {
		self.padding = Some(padding.into());
		self
	}

	/// Spacing between card sections
	pub fn gap(mut self, gap: impl Into<String>) -> Self {
		self.gap = Some(gap.into());
		self
	}

	/// Placement of record actions
	pub fn actions_position(mut self, position: impl Into<String>) -> Self {
		self.actions_position = position.into();
		self
	}

	/// Configured badge field
	pub fn badge_field_name(&self) -> Option<&str> {
		self.badge_field.as_deref()
	}

	/// Whether a badge color evaluator is configured
	pub fn has_badge_color(&self) -> bool {
		self.badge_color.is_some()
	}

	/// Badge color for a badge field value
	pub fn evaluate_badge_color(&self, value: &Value) -> Option<String> {
		self.badge_color.as_ref().and_then(|color| color(value))
	}

	/// Serialized card configuration
	pub fn to_props(&self) -> Value {
		json!({
			"component": "Card",
			"columns": self.columns.iter().map(|column| column.to_props()).collect::<Vec<_>>(),
			"image": self.image,
			"hoverable": self.hoverable,
			"aspectRatio": self.aspect_ratio,
			"imageField": self.image_field,
			"titleField": self.title_field,
			"descriptionField": self.description_field,
			"priceField": self.price_field,
			"badgeField": self.badge_field,
			"showImage": self.show_image,
			"imagePosition": self.image_position,
			"padding": self.padding,
			"gap": self.gap,
			"actionsPosition": self.actions_position,
			"style": self.style,
		})
	}
}

impl fmt::Debug for Card {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Card")
			.field("style", &self.style)
			.field("badge_field", &self.badge_field)
			.field("has_badge_color", &self.badge_color.is_some())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::column::TextColumn;
	use rstest::rstest;

	#[rstest]
	#[case(Card::product(), "product", true, Some("4/3"))]
	#[case(Card::simple(), "simple", false, None)]
	#[case(Card::media(), "media", true, Some("16/9"))]
	fn test_presets(
		#[case] card: Card,
		#[case] style: &str,
		#[case] show_image: bool,
		#[case] aspect_ratio: Option<&str>,
	) {
		let props = card.to_props();
		assert_eq!(props["style"], json!(style));
		assert_eq!(props["showImage"], json!(show_image));
		assert_eq!(props["aspectRatio"], json!(aspect_ratio));
	}

	#[test]
	fn test_badge_color() {
		let card = Card::make();
		assert!(!card.has_badge_color());
		assert_eq!(card.evaluate_badge_color(&json!("x")), None);

		let card = card
			.badge_field("status")
			.badge_color_using(|value| value.as_str().map(|s| format!("{}-color", s)));
		assert_eq!(card.badge_field_name(), Some("status"));
		assert_eq!(
			card.evaluate_badge_color(&json!("new")).as_deref(),
			Some("new-color")
		);
	}

	#[test]
	fn test_columns_serialized() {
		let props = Card::simple().column(TextColumn::make("sku")).to_props();
		assert_eq!(props["columns"][0]["name"], json!("sku"));
	}
}
