//! Query conditions
//!
//! Composite conditions mirror the admin filter system: a tree of single
//! predicates combined with AND/OR/NOT.

use crate::value::{Record, compare_values, like_matches, loose_eq};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator for [`Predicate::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
	/// `=`
	Eq,
	/// `<>`
	Ne,
	/// `>`
	Gt,
	/// `>=`
	Gte,
	/// `<`
	Lt,
	/// `<=`
	Lte,
}

impl Operator {
	/// SQL spelling of the operator
	pub fn as_sql(&self) -> &'static str {
		match self {
			Operator::Eq => "=",
			Operator::Ne => "<>",
			Operator::Gt => ">",
			Operator::Gte => ">=",
			Operator::Lt => "<",
			Operator::Lte => "<=",
		}
	}
}

/// A single predicate on one column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// `column <op> value`
	Compare {
		/// Column name, optionally `table.column`
		column: String,
		/// Comparison operator
		operator: Operator,
		/// Right-hand operand
		value: Value,
	},
	/// `column LIKE pattern`, case-insensitive
	Like {
		/// Column name
		column: String,
		/// Pattern with `%`/`_` wildcards
		pattern: String,
	},
	/// `column IN (values)`
	In {
		/// Column name
		column: String,
		/// Accepted values
		values: Vec<Value>,
	},
	/// `column IS NULL`
	IsNull(String),
	/// `column IS NOT NULL`
	IsNotNull(String),
}

impl Predicate {
	/// Column this predicate reads
	pub fn column(&self) -> &str {
		match self {
			Predicate::Compare { column, .. }
			| Predicate::Like { column, .. }
			| Predicate::In { column, .. } => column,
			Predicate::IsNull(column) | Predicate::IsNotNull(column) => column,
		}
	}

	/// Evaluate against a resolved column value (`None` when absent)
	pub fn matches(&self, value: Option<&Value>) -> bool {
		let null = Value::Null;
		let value = value.unwrap_or(&null);
		match self {
			Predicate::Compare {
				operator, value: operand, ..
			} => {
				if value.is_null() || operand.is_null() {
					// SQL three-valued logic: comparisons with NULL are never true
					return false;
				}
				match operator {
					Operator::Eq => loose_eq(value, operand),
					Operator::Ne => !loose_eq(value, operand),
					Operator::Gt => compare_values(value, operand) == Ordering::Greater,
					Operator::Gte => compare_values(value, operand) != Ordering::Less,
					Operator::Lt => compare_values(value, operand) == Ordering::Less,
					Operator::Lte => compare_values(value, operand) != Ordering::Greater,
				}
			}
			Predicate::Like { pattern, .. } => like_matches(value, pattern),
			Predicate::In { values, .. } => {
				!value.is_null() && values.iter().any(|candidate| loose_eq(value, candidate))
			}
			Predicate::IsNull(_) => value.is_null(),
			Predicate::IsNotNull(_) => !value.is_null(),
		}
	}
}

/// Composite condition supporting AND/OR/NOT
///
/// # Examples
///
/// ```
/// use reinhardt_tables::query::{Condition, Predicate};
///
/// // name LIKE '%ann%' OR email LIKE '%ann%'
/// let search = Condition::Or(vec![
///     Condition::like("name", "%ann%"),
///     Condition::like("email", "%ann%"),
/// ]);
/// assert!(!search.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
	/// A single predicate
	Where(Predicate),
	/// All conditions must match
	And(Vec<Condition>),
	/// Any condition must match
	Or(Vec<Condition>),
	/// Negates the inner condition
	Not(Box<Condition>),
}

impl Condition {
	/// `column = value`
	pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::compare(column, Operator::Eq, value)
	}

	/// `column <op> value`
	pub fn compare(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
		Self::Where(Predicate::Compare {
			column: column.into(),
			operator,
			value: value.into(),
		})
	}

	/// `column LIKE pattern`
	pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
		Self::Where(Predicate::Like {
			column: column.into(),
			pattern: pattern.into(),
		})
	}

	/// `column IN (values)`
	pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
		Self::Where(Predicate::In {
			column: column.into(),
			values,
		})
	}

	/// `column IS NULL`
	pub fn is_null(column: impl Into<String>) -> Self {
		Self::Where(Predicate::IsNull(column.into()))
	}

	/// `column IS NOT NULL`
	pub fn is_not_null(column: impl Into<String>) -> Self {
		Self::Where(Predicate::IsNotNull(column.into()))
	}

	/// Negate a condition
	#[allow(clippy::should_implement_trait)]
	pub fn not(condition: Condition) -> Self {
		Self::Not(Box::new(condition))
	}

	/// Whether the condition holds no predicates at all
	pub fn is_empty(&self) -> bool {
		match self {
			Condition::Where(_) => false,
			Condition::And(conditions) | Condition::Or(conditions) => {
				conditions.iter().all(Condition::is_empty)
			}
			Condition::Not(inner) => inner.is_empty(),
		}
	}

	/// Evaluate against a row, resolving columns with `resolve`
	///
	/// Empty AND groups are true, empty OR groups are false.
	pub fn evaluate<F>(&self, record: &Record, resolve: &F) -> bool
	where
		F: Fn(&Record, &str) -> Option<Value>,
	{
		match self {
			Condition::Where(predicate) => {
				predicate.matches(resolve(record, predicate.column()).as_ref())
			}
			Condition::And(conditions) => conditions.iter().all(|c| c.evaluate(record, resolve)),
			Condition::Or(conditions) => conditions.iter().any(|c| c.evaluate(record, resolve)),
			Condition::Not(inner) => !inner.evaluate(record, resolve),
		}
	}
}
