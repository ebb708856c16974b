//! Table filters
//!
//! Filters map request values to query mutations. They are applied by the
//! executor in declaration order, only for names present in the request.

pub mod base;
pub mod query_filter;
pub mod select;
pub mod ternary;
pub mod trashed;

pub use base::{BaseFilter, Filter, FilterBuilder, FilterCore, FilterQuery, Indicator, IndicatorFn};
pub use query_filter::QueryFilter;
pub use select::SelectFilter;
pub use ternary::{StateQuery, TernaryFilter};
pub use trashed::TrashedFilter;
