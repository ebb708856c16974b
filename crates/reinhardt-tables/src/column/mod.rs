//! Column definitions
//!
//! Every column variant implements [`Column`] (read side, used by the query
//! executor and the record processor) and [`ColumnBuilder`] (fluent
//! configuration of the shared [`ColumnCore`]).

pub mod badge;
pub mod base;
pub mod color;
pub mod editable;
pub mod icon;
pub mod image;
pub mod select;
pub mod summarizer;
pub mod text;

pub use badge::{BadgeColor, BadgeColumn};
pub use base::{Alignment, Column, ColumnBuilder, ColumnCore, Evaluator, Formatter, StateGetter};
pub use color::ColorColumn;
pub use editable::{CheckboxColumn, TextInputColumn, ToggleColumn};
pub use icon::{BooleanColumn, IconColumn};
pub use image::ImageColumn;
pub use select::SelectColumn;
pub use summarizer::{Summarizer, SummaryKind};
pub use text::{NumericFormat, TextColumn};
