// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

//! Scalar operations shared by the compiled kernel closures. Integer
//! operands promote to float whenever either side is float, and integer
//! arithmetic is checked so overflow fails with a typed error instead of
//! wrapping. Division is always float division, a zero divisor fails for
//! every division form, and floor division and modulo follow floored
//! semantics (remainder takes the sign of the divisor).

use std::cmp::Ordering;

use rowcast_expr::{BinaryOp, DatePart, MathFunc, Value};

use crate::error::{Error, Result};

pub(crate) fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
	if op.is_logical() {
		return logical(op, lhs, rhs);
	}
	if op.is_comparison() {
		return comparison(op, lhs, rhs);
	}
	arithmetic(op, lhs, rhs)
}

fn logical(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
	match (lhs, rhs) {
		(Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
			BinaryOp::And => a && b,
			_ => a || b,
		})),
		(lhs, rhs) => Err(type_mismatch(op, &lhs, &rhs)),
	}
}

fn comparison(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
	let ordering = compare(&lhs, &rhs);
	let result = match (op, ordering) {
		// equality falls back to structural comparison for values
		// without an ordering (booleans, rows)
		(BinaryOp::Eq, ordering) => ordering.map_or(lhs == rhs, |o| o == Ordering::Equal),
		(BinaryOp::Ne, ordering) => ordering.map_or(lhs != rhs, |o| o != Ordering::Equal),
		(BinaryOp::Lt, Some(o)) => o == Ordering::Less,
		(BinaryOp::Le, Some(o)) => o != Ordering::Greater,
		(BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
		(BinaryOp::Ge, Some(o)) => o != Ordering::Less,
		(op, None) => return Err(type_mismatch(op, &lhs, &rhs)),
		_ => unreachable!("comparison handles comparison ops only"),
	};
	Ok(Value::Bool(result))
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
	match (lhs, rhs) {
		(Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
		(Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
		(Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
		(Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
		(Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
		(lhs, rhs) => as_float(lhs)?.partial_cmp(&as_float(rhs)?),
	}
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
	match (op, lhs, rhs) {
		(BinaryOp::Add, Value::Int(a), Value::Int(b)) => {
			a.checked_add(b).map(Value::Int).ok_or_else(|| overflow(BinaryOp::Add, a, b))
		}
		(BinaryOp::Sub, Value::Int(a), Value::Int(b)) => {
			a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow(BinaryOp::Sub, a, b))
		}
		(BinaryOp::Mul, Value::Int(a), Value::Int(b)) => {
			a.checked_mul(b).map(Value::Int).ok_or_else(|| overflow(BinaryOp::Mul, a, b))
		}
		(BinaryOp::Add, Value::Utf8(a), Value::Utf8(b)) => Ok(Value::Utf8(a + &b)),
		(BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod, lhs, rhs) if is_zero(&rhs) => {
			Err(type_mismatch(op, &lhs, &rhs))
		}
		(BinaryOp::FloorDiv, Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_div(a, b))),
		(BinaryOp::Mod, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a - b * floor_div(a, b))),
		(BinaryOp::Pow, Value::Int(a), Value::Int(b)) if b >= 0 => match a.checked_pow(b.min(u32::MAX as i64) as u32) {
			Some(value) => Ok(Value::Int(value)),
			None => Ok(Value::Float((a as f64).powf(b as f64))),
		},
		(op, lhs, rhs) => {
			let (a, b) = match (as_float(&lhs), as_float(&rhs)) {
				(Some(a), Some(b)) => (a, b),
				_ => return Err(type_mismatch(op, &lhs, &rhs)),
			};
			let result = match op {
				BinaryOp::Add => a + b,
				BinaryOp::Sub => a - b,
				BinaryOp::Mul => a * b,
				BinaryOp::Div => a / b,
				BinaryOp::FloorDiv => (a / b).floor(),
				BinaryOp::Mod => a - b * (a / b).floor(),
				BinaryOp::Pow => a.powf(b),
				op => return Err(type_mismatch(op, &lhs, &rhs)),
			};
			Ok(Value::Float(result))
		}
	}
}

pub(crate) fn math(func: MathFunc, value: Value) -> Result<Value> {
	let x = as_float(&value).ok_or_else(|| Error::TypeMismatch {
		op: func.name(),
		value: value.to_string(),
	})?;
	Ok(match func {
		MathFunc::Sin => Value::Float(x.sin()),
		MathFunc::Cos => Value::Float(x.cos()),
		MathFunc::Tan => Value::Float(x.tan()),
		MathFunc::Sqrt => Value::Float(x.sqrt()),
		MathFunc::Exp => Value::Float(x.exp()),
		MathFunc::Log => Value::Float(x.ln()),
		MathFunc::Floor => Value::Int(x.floor() as i64),
		MathFunc::Ceil => Value::Int(x.ceil() as i64),
		MathFunc::Abs => Value::Float(x.abs()),
	})
}

pub(crate) fn date_part(part: DatePart, value: Value) -> Result<Value> {
	let result = match (part, &value) {
		(DatePart::Date, Value::DateTime(dt)) => Value::Date(dt.date()),
		(DatePart::Time, Value::DateTime(dt)) => Value::Time(dt.time()),
		(DatePart::Year, Value::DateTime(dt)) => Value::Int(i64::from(dt.year())),
		(DatePart::Month, Value::DateTime(dt)) => Value::Int(i64::from(dt.month())),
		(DatePart::Day, Value::DateTime(dt)) => Value::Int(i64::from(dt.day())),
		(DatePart::Hour, Value::DateTime(dt)) => Value::Int(i64::from(dt.hour())),
		(DatePart::Minute, Value::DateTime(dt)) => Value::Int(i64::from(dt.minute())),
		(DatePart::Second, Value::DateTime(dt)) => Value::Int(i64::from(dt.second())),
		(DatePart::Millisecond, Value::DateTime(dt)) => Value::Int(i64::from(dt.millisecond())),
		(DatePart::Microsecond, Value::DateTime(dt)) => Value::Int(i64::from(dt.microsecond())),
		(DatePart::Year, Value::Date(d)) => Value::Int(i64::from(d.year())),
		(DatePart::Month, Value::Date(d)) => Value::Int(i64::from(d.month())),
		(DatePart::Day, Value::Date(d)) => Value::Int(i64::from(d.day())),
		(DatePart::Hour, Value::Time(t)) => Value::Int(i64::from(t.hour())),
		(DatePart::Minute, Value::Time(t)) => Value::Int(i64::from(t.minute())),
		(DatePart::Second, Value::Time(t)) => Value::Int(i64::from(t.second())),
		(DatePart::Millisecond, Value::Time(t)) => Value::Int(i64::from(t.millisecond())),
		(DatePart::Microsecond, Value::Time(t)) => Value::Int(i64::from(t.microsecond())),
		(part, _) => {
			return Err(Error::TypeMismatch {
				op: part.attr(),
				value: value.to_string(),
			});
		}
	};
	Ok(result)
}

fn as_float(value: &Value) -> Option<f64> {
	match value {
		Value::Int(i) => Some(*i as f64),
		Value::Float(f) => Some(*f),
		_ => None,
	}
}

fn is_zero(value: &Value) -> bool {
	match value {
		Value::Int(i) => *i == 0,
		Value::Float(f) => *f == 0.0,
		_ => false,
	}
}

fn floor_div(a: i64, b: i64) -> i64 {
	let q = a / b;
	if a % b != 0 && (a < 0) != (b < 0) {
		q - 1
	} else {
		q
	}
}

fn type_mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> Error {
	Error::TypeMismatch {
		op: op.symbol(),
		value: format!("{lhs} and {rhs}"),
	}
}

fn overflow(op: BinaryOp, a: i64, b: i64) -> Error {
	Error::Overflow {
		op: op.symbol(),
		value: format!("{a} and {b}"),
	}
}
