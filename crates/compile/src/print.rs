// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use rowcast_expr::{DatePart, Expr};
use tracing::instrument;

use crate::{
	error::{Error, Result},
	scope::{Scope, ScopeValue, fresh_name},
};

/// Render an expression as portable scalar source text, stopping at the
/// designated `leaves`, which terminate recursion and are rendered by their
/// stable names. Returns the text together with the scope of free names the
/// text requires.
///
/// The case order is significant: a node that structurally equals one of
/// the leaves is rendered as that leaf regardless of its own category, and
/// this check precedes every per-category case except literals (a constant
/// is never a leaf).
#[instrument(name = "compile::print", level = "trace", skip_all)]
pub fn print_expr(leaves: &[Expr], expr: &Expr) -> Result<(String, Scope)> {
	if let Expr::Literal(value) = expr {
		// temporal literals need datetime support at realization time
		if value.is_temporal() {
			return Ok((value.to_string(), Scope::with("datetime", ScopeValue::DateTimeLib)));
		}
		return Ok((value.to_string(), Scope::new()));
	}
	if leaves.contains(expr) {
		let name = expr.name().ok_or_else(|| Error::UnnamedLeaf {
			expr: expr.to_string(),
		})?;
		return Ok((name.to_string(), Scope::new()));
	}
	match expr {
		Expr::Symbol(symbol) => Ok((symbol.name.clone(), Scope::new())),
		Expr::Field(field) => {
			let (child, scope) = print_expr(leaves, &field.child)?;
			let index = field.child.ty().field_index(&field.name).ok_or_else(|| Error::UnknownField {
				name: field.name.clone(),
				available: field
					.child
					.record_fields()
					.map(|fields| fields.iter().map(|f| f.name.clone()).collect())
					.unwrap_or_default(),
			})?;
			Ok((format!("{}[{}]", parenthesize(&child), index), scope))
		}
		Expr::Binary(binary) => {
			let (lhs, left_scope) = print_expr(leaves, &binary.lhs)?;
			let (rhs, right_scope) = print_expr(leaves, &binary.rhs)?;
			let text = format!("{} {} {}", parenthesize(&lhs), binary.op, parenthesize(&rhs));
			Ok((text, left_scope.merge(right_scope)?))
		}
		Expr::Math(math) => {
			let (child, mut scope) = print_expr(leaves, &math.child)?;
			scope.bind("math", ScopeValue::MathLib)?;
			Ok((format!("math.{}({})", math.func, child), scope))
		}
		Expr::DatePart(date_part) => {
			let (child, scope) = print_expr(leaves, &date_part.child)?;
			let text = match date_part.part {
				DatePart::Date | DatePart::Time => {
					format!("{}.{}()", parenthesize(&child), date_part.part.attr())
				}
				// rendered as the microsecond-to-millisecond
				// conversion; see DESIGN.md on the original's
				// trailing `()`
				DatePart::Millisecond => {
					format!("{}.microsecond // 1000", parenthesize(&child))
				}
				part => format!("{}.{}", parenthesize(&child), part.attr()),
			};
			Ok((text, scope))
		}
		Expr::Map(map) => {
			let (child, mut scope) = print_expr(leaves, &map.child)?;
			let placeholder = fresh_name();
			let text = format!("{placeholder}({child})");
			scope.bind(placeholder, ScopeValue::Function(map.func.clone()))?;
			Ok((text, scope))
		}
		// the grammar is closed; broadcast nodes expose their captured
		// scalar expression for compilation instead
		expr => Err(Error::unsupported(expr)),
	}
}

/// Wrap compound text in parentheses so it stays one operand when embedded
/// in a larger rendering. Simple tokens pass through untouched.
fn parenthesize(text: &str) -> String {
	if text.contains(' ') {
		format!("({text})")
	} else {
		text.to_string()
	}
}
