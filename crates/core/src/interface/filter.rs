// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{error::CoreError, interface::Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
	Eq,
	Neq,
	Lt,
	Lte,
	Gt,
	Gte,
	In,
}

impl FilterOp {
	pub fn as_str(&self) -> &'static str {
		match self {
			FilterOp::Eq => "eq",
			FilterOp::Neq => "neq",
			FilterOp::Lt => "lt",
			FilterOp::Lte => "lte",
			FilterOp::Gt => "gt",
			FilterOp::Gte => "gte",
			FilterOp::In => "in",
		}
	}

	fn parse(op: &str) -> Option<Self> {
		match op {
			"eq" => Some(FilterOp::Eq),
			"neq" => Some(FilterOp::Neq),
			"lt" => Some(FilterOp::Lt),
			"lte" => Some(FilterOp::Lte),
			"gt" => Some(FilterOp::Gt),
			"gte" => Some(FilterOp::Gte),
			"in" => Some(FilterOp::In),
			_ => None,
		}
	}
}

/// Row predicate of the form `column=op.value`.
///
/// The backend evaluates the predicate server side; [`Filter::matches`]
/// evaluates it locally so in-process feeds route events the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
	column: String,
	op: FilterOp,
	/// Exactly one value unless `op` is [`FilterOp::In`].
	values: Vec<String>,
}

impl Filter {
	pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
		Self {
			column: column.into(),
			op: FilterOp::Eq,
			values: vec![value.to_string()],
		}
	}

	pub fn column(&self) -> &str {
		&self.column
	}

	pub fn op(&self) -> FilterOp {
		self.op
	}

	pub fn values(&self) -> &[String] {
		&self.values
	}

	/// The compared value when this is an equality filter.
	pub fn eq_value(&self) -> Option<&str> {
		match self.op {
			FilterOp::Eq => self.values.first().map(String::as_str),
			_ => None,
		}
	}

	/// Parse an optional filter. Empty input and `*` mean no filter.
	pub fn parse_optional(filter: Option<&str>) -> Result<Option<Filter>, CoreError> {
		match filter.map(str::trim) {
			None | Some("") | Some("*") => Ok(None),
			Some(filter) => filter.parse().map(Some),
		}
	}

	pub fn matches(&self, row: &Row) -> bool {
		let Some(actual) = row.get(&self.column) else {
			return false;
		};

		match self.op {
			FilterOp::Eq => compare(actual, &self.values[0]) == Some(Ordering::Equal),
			FilterOp::Neq => matches!(compare(actual, &self.values[0]), Some(ord) if ord != Ordering::Equal),
			FilterOp::Lt => compare(actual, &self.values[0]) == Some(Ordering::Less),
			FilterOp::Lte => matches!(compare(actual, &self.values[0]), Some(Ordering::Less | Ordering::Equal)),
			FilterOp::Gt => compare(actual, &self.values[0]) == Some(Ordering::Greater),
			FilterOp::Gte => {
				matches!(compare(actual, &self.values[0]), Some(Ordering::Greater | Ordering::Equal))
			}
			FilterOp::In => {
				self.values.iter().any(|expected| compare(actual, expected) == Some(Ordering::Equal))
			}
		}
	}
}

fn compare(actual: &Value, expected: &str) -> Option<Ordering> {
	match actual {
		Value::Number(number) => match (number.as_f64(), expected.parse::<f64>()) {
			(Some(a), Ok(b)) => a.partial_cmp(&b),
			_ => Some(number.to_string().as_str().cmp(expected)),
		},
		Value::String(text) => Some(text.as_str().cmp(expected)),
		Value::Bool(flag) => Some(flag.to_string().as_str().cmp(expected)),
		Value::Null => Some("null".cmp(expected)),
		Value::Array(_) | Value::Object(_) => None,
	}
}

impl Display for Filter {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.op {
			FilterOp::In => write!(f, "{}=in.({})", self.column, self.values.join(",")),
			op => write!(f, "{}={}.{}", self.column, op.as_str(), self.values[0]),
		}
	}
}

impl FromStr for Filter {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let filter = s.trim();
		let (column, predicate) =
			filter.split_once('=').ok_or_else(|| CoreError::invalid_filter(filter, "missing '='"))?;

		let column = column.trim();
		if column.is_empty() {
			return Err(CoreError::invalid_filter(filter, "missing column"));
		}
		if !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return Err(CoreError::invalid_filter(filter, "column may only contain letters, digits and '_'"));
		}

		let (op, value) = predicate
			.trim()
			.split_once('.')
			.ok_or_else(|| CoreError::invalid_filter(filter, "missing operator, expected op.value"))?;
		let op = FilterOp::parse(op)
			.ok_or_else(|| CoreError::invalid_filter(filter, format!("unsupported operator '{}'", op)))?;

		let value = value.trim();
		let values = match op {
			FilterOp::In => {
				let list = value
					.strip_prefix('(')
					.and_then(|v| v.strip_suffix(')'))
					.ok_or_else(|| CoreError::invalid_filter(filter, "in expects a list like in.(a,b)"))?;
				let values: Vec<String> = list
					.split(',')
					.map(|v| v.trim().trim_matches('"').to_string())
					.filter(|v| !v.is_empty())
					.collect();
				if values.is_empty() {
					return Err(CoreError::invalid_filter(filter, "in list is empty"));
				}
				values
			}
			_ => {
				if value.is_empty() {
					return Err(CoreError::invalid_filter(filter, "missing value"));
				}
				vec![value.to_string()]
			}
		};

		Ok(Filter {
			column: column.to_string(),
			op,
			values,
		})
	}
}

impl Serialize for Filter {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Filter {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		text.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn row(value: Value) -> Row {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_parse_equality_filter() {
		let filter: Filter = "user_id=eq.42".parse().unwrap();
		assert_eq!(filter.column(), "user_id");
		assert_eq!(filter.op(), FilterOp::Eq);
		assert_eq!(filter.eq_value(), Some("42"));
		assert_eq!(filter.to_string(), "user_id=eq.42");
	}

	#[test]
	fn test_parse_trims_into_canonical_form() {
		let filter: Filter = "  user_id = eq.abc ".parse().unwrap();
		assert_eq!(filter.to_string(), "user_id=eq.abc");
		assert_eq!(filter, Filter::eq("user_id", "abc"));
	}

	#[test]
	fn test_parse_in_list() {
		let filter: Filter = "status=in.(pending, \"in_progress\")".parse().unwrap();
		assert_eq!(filter.values(), &["pending".to_string(), "in_progress".to_string()]);
		assert_eq!(filter.to_string(), "status=in.(pending,in_progress)");
	}

	#[test]
	fn test_parse_rejects_malformed_filters() {
		for bad in ["user_id", "=eq.1", "user_id=42", "user_id=like.a%", "user-id=eq.1", "user_id=eq.", "s=in.()"] {
			assert!(bad.parse::<Filter>().is_err(), "expected '{}' to be rejected", bad);
		}
	}

	#[test]
	fn test_parse_optional_wildcard() {
		assert_eq!(Filter::parse_optional(None).unwrap(), None);
		assert_eq!(Filter::parse_optional(Some("*")).unwrap(), None);
		assert_eq!(Filter::parse_optional(Some("  ")).unwrap(), None);
		assert!(Filter::parse_optional(Some("user_id=eq.1")).unwrap().is_some());
	}

	#[test]
	fn test_matches_strings_and_numbers() {
		let r = row(json!({"user_id": "a1", "quantity": 5, "urgent": true, "area_id": null}));

		assert!("user_id=eq.a1".parse::<Filter>().unwrap().matches(&r));
		assert!(!"user_id=eq.b2".parse::<Filter>().unwrap().matches(&r));
		assert!("user_id=neq.b2".parse::<Filter>().unwrap().matches(&r));
		assert!("quantity=eq.5".parse::<Filter>().unwrap().matches(&r));
		assert!("quantity=eq.5.0".parse::<Filter>().unwrap().matches(&r));
		assert!("quantity=lt.10".parse::<Filter>().unwrap().matches(&r));
		assert!("quantity=gte.5".parse::<Filter>().unwrap().matches(&r));
		assert!(!"quantity=gt.5".parse::<Filter>().unwrap().matches(&r));
		assert!("urgent=eq.true".parse::<Filter>().unwrap().matches(&r));
		assert!("area_id=eq.null".parse::<Filter>().unwrap().matches(&r));
		assert!("quantity=in.(1,5,9)".parse::<Filter>().unwrap().matches(&r));
	}

	#[test]
	fn test_missing_column_never_matches() {
		let r = row(json!({"id": 1}));
		assert!(!"user_id=neq.1".parse::<Filter>().unwrap().matches(&r));
	}

	#[test]
	fn test_serde_round_trips_through_text() {
		let filter: Filter = serde_json::from_str("\"user_id=eq.7\"").unwrap();
		assert_eq!(serde_json::to_string(&filter).unwrap(), "\"user_id=eq.7\"");
	}
}
