// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Element type of an expression result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
	/// Type is not known (e.g. access to a field that does not exist)
	Undefined,
	Bool,
	Int,
	Float,
	Utf8,
	Date,
	Time,
	DateTime,
	/// A record with named, ordered fields
	Record(Vec<FieldDef>),
}

/// A named field inside a record type. Field order is significant: the
/// compiler renders field access as a positional index into this list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
	pub name: String,
	pub ty: ElementType,
}

impl FieldDef {
	pub fn new(name: impl Into<String>, ty: ElementType) -> Self {
		Self {
			name: name.into(),
			ty,
		}
	}
}

impl ElementType {
	/// Ordered field list of a record type, `None` for scalar types.
	pub fn fields(&self) -> Option<&[FieldDef]> {
		match self {
			ElementType::Record(fields) => Some(fields),
			_ => None,
		}
	}

	/// Position of a field within a record type.
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields()?.iter().position(|f| f.name == name)
	}

	/// Declared type of a field within a record type.
	pub fn field_ty(&self, name: &str) -> Option<&ElementType> {
		self.fields()?.iter().find(|f| f.name == name).map(|f| &f.ty)
	}

	/// Convenience constructor for record types.
	pub fn record(fields: impl IntoIterator<Item = (&'static str, ElementType)>) -> Self {
		ElementType::Record(fields.into_iter().map(|(name, ty)| FieldDef::new(name, ty)).collect())
	}
}

impl Display for ElementType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ElementType::Undefined => f.write_str("undefined"),
			ElementType::Bool => f.write_str("bool"),
			ElementType::Int => f.write_str("int"),
			ElementType::Float => f.write_str("float"),
			ElementType::Utf8 => f.write_str("utf8"),
			ElementType::Date => f.write_str("date"),
			ElementType::Time => f.write_str("time"),
			ElementType::DateTime => f.write_str("datetime"),
			ElementType::Record(fields) => {
				f.write_str("{")?;
				for (i, field) in fields.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}: {}", field.name, field.ty)?;
				}
				f.write_str("}")
			}
		}
	}
}

/// Whether an expression yields one value or a column of values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
	Scalar,
	Collection,
}

impl Shape {
	pub fn is_collection(&self) -> bool {
		matches!(self, Shape::Collection)
	}
}
