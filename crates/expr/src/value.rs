// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
	temporal::{Date, DateTime, Time},
	types::{ElementType, FieldDef},
};

/// A scalar value, represented as a native Rust type. Rows are `Record`
/// values whose positions follow the declared field order of their type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (think null in common programming languages)
	Undefined,
	Bool(bool),
	Int(i64),
	Float(f64),
	Utf8(String),
	Date(Date),
	Time(Time),
	DateTime(DateTime),
	Record(Vec<Value>),
}

impl Value {
	pub fn ty(&self) -> ElementType {
		match self {
			Value::Undefined => ElementType::Undefined,
			Value::Bool(_) => ElementType::Bool,
			Value::Int(_) => ElementType::Int,
			Value::Float(_) => ElementType::Float,
			Value::Utf8(_) => ElementType::Utf8,
			Value::Date(_) => ElementType::Date,
			Value::Time(_) => ElementType::Time,
			Value::DateTime(_) => ElementType::DateTime,
			Value::Record(values) => ElementType::Record(
				values.iter()
					.enumerate()
					.map(|(i, v)| FieldDef::new(format!("_{i}"), v.ty()))
					.collect(),
			),
		}
	}

	/// Date, time and datetime values require datetime support in the
	/// scope of generated code.
	pub fn is_temporal(&self) -> bool {
		matches!(self, Value::Date(_) | Value::Time(_) | Value::DateTime(_))
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Undefined => f.write_str("undefined"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::Int(v) => write!(f, "{v}"),
			Value::Float(v) => write!(f, "{v:?}"),
			Value::Utf8(v) => write!(f, "'{v}'"),
			Value::Date(v) => write!(f, "{v}"),
			Value::Time(v) => write!(f, "{v}"),
			Value::DateTime(v) => write!(f, "{v}"),
			Value::Record(values) => {
				f.write_str("(")?;
				for (i, value) in values.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{value}")?;
				}
				f.write_str(")")
			}
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(i64::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Utf8(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Utf8(v)
	}
}

impl From<Date> for Value {
	fn from(v: Date) -> Self {
		Value::Date(v)
	}
}

impl From<Time> for Value {
	fn from(v: Time) -> Self {
		Value::Time(v)
	}
}

impl From<DateTime> for Value {
	fn from(v: DateTime) -> Self {
		Value::DateTime(v)
	}
}
