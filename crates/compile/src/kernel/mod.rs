// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

mod ops;

use std::fmt::{self, Debug, Formatter};

use rowcast_expr::{Expr, Value};
use tracing::{debug, instrument};

use crate::{
	error::{Error, Result},
	print::print_expr,
	scope::Scope,
};

/// A compiled scalar function over one row.
///
/// Each expression node compiles to a boxed closure composed from its
/// children's closures; `RowKernel` wraps the root. Argument order matches
/// the leaf order the kernel was built with.
pub struct RowKernel {
	arity: usize,
	root: CompiledScalar,
}

type CompiledScalar = Box<dyn Fn(&EvalContext) -> Result<Value> + Send + Sync>;

struct EvalContext<'a> {
	args: &'a [Value],
}

impl RowKernel {
	pub fn arity(&self) -> usize {
		self.arity
	}

	/// Evaluate against one row. `row` positions must match the declared
	/// layout of the leaves the kernel was built against.
	pub fn call(&self, row: &[Value]) -> Result<Value> {
		if row.len() != self.arity {
			return Err(Error::ArityMismatch {
				expected: self.arity,
				got: row.len(),
			});
		}
		(self.root)(&EvalContext {
			args: row,
		})
	}
}

impl Debug for RowKernel {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RowKernel").field("arity", &self.arity).finish_non_exhaustive()
	}
}

/// Render a full function literal `fn(<params>) -> <body>` for the
/// expression. Parameter names are derived by printing each leaf against
/// the singleton leaf set containing only itself.
#[instrument(name = "compile::kernel_source", level = "trace", skip_all)]
pub fn kernel_source(leaves: &[Expr], expr: &Expr) -> Result<(String, Scope)> {
	let (body, scope) = print_expr(leaves, expr)?;
	let mut params = Vec::with_capacity(leaves.len());
	for leaf in leaves {
		let (name, _) = print_expr(std::slice::from_ref(leaf), leaf)?;
		params.push(name);
	}
	Ok((format!("fn({}) -> {}", params.join(", "), body), scope))
}

/// Realize the expression as a directly invocable [`RowKernel`], together
/// with the scope its generated source would require. Free names resolve
/// through the scope; mapped functions are captured by identity.
#[instrument(name = "compile::build_kernel", level = "trace", skip_all)]
pub fn build_kernel(leaves: &[Expr], expr: &Expr) -> Result<(RowKernel, Scope)> {
	let (_, scope) = print_expr(leaves, expr)?;
	let root = compile_scalar(leaves, expr)?;
	debug!(arity = leaves.len(), scope = %scope, "kernel realized");
	Ok((
		RowKernel {
			arity: leaves.len(),
			root,
		},
		scope,
	))
}

fn compile_scalar(leaves: &[Expr], expr: &Expr) -> Result<CompiledScalar> {
	if let Expr::Literal(value) = expr {
		let value = value.clone();
		return Ok(Box::new(move |_| Ok(value.clone())));
	}
	if let Some(position) = leaves.iter().position(|leaf| leaf == expr) {
		return Ok(Box::new(move |ctx| Ok(ctx.args[position].clone())));
	}
	match expr {
		Expr::Symbol(symbol) => Err(Error::UnboundSymbol {
			name: symbol.name.clone(),
		}),
		Expr::Field(field) => {
			let index = field.child.ty().field_index(&field.name).ok_or_else(|| Error::UnknownField {
				name: field.name.clone(),
				available: field
					.child
					.record_fields()
					.map(|fields| fields.iter().map(|f| f.name.clone()).collect())
					.unwrap_or_default(),
			})?;
			let child = compile_scalar(leaves, &field.child)?;
			Ok(Box::new(move |ctx| match child(ctx)? {
				Value::Record(values) => values.get(index).cloned().ok_or_else(|| Error::TypeMismatch {
					op: "field access",
					value: format!("row of {} values", values.len()),
				}),
				other => Err(Error::TypeMismatch {
					op: "field access",
					value: other.to_string(),
				}),
			}))
		}
		Expr::Binary(binary) => {
			let op = binary.op;
			let lhs = compile_scalar(leaves, &binary.lhs)?;
			let rhs = compile_scalar(leaves, &binary.rhs)?;
			Ok(Box::new(move |ctx| ops::binary(op, lhs(ctx)?, rhs(ctx)?)))
		}
		Expr::Math(math) => {
			let func = math.func;
			let child = compile_scalar(leaves, &math.child)?;
			Ok(Box::new(move |ctx| ops::math(func, child(ctx)?)))
		}
		Expr::DatePart(date_part) => {
			let part = date_part.part;
			let child = compile_scalar(leaves, &date_part.child)?;
			Ok(Box::new(move |ctx| ops::date_part(part, child(ctx)?)))
		}
		Expr::Map(map) => {
			let func = map.func.clone();
			let child = compile_scalar(leaves, &map.child)?;
			Ok(Box::new(move |ctx| Ok(func.call(child(ctx)?))))
		}
		expr => Err(Error::unsupported(expr)),
	}
}

#[cfg(test)]
mod tests {
	use rowcast_expr::{ElementType, MappedFn, Shape};

	use super::*;

	fn table() -> Expr {
		Expr::symbol(
			"t",
			ElementType::record([
				("x", ElementType::Int),
				("y", ElementType::Int),
				("z", ElementType::Int),
				("when", ElementType::DateTime),
			]),
			Shape::Collection,
		)
	}

	fn row(x: i64, y: i64, z: i64) -> Value {
		Value::Record(vec![Value::Int(x), Value::Int(y), Value::Int(z), Value::Utf8(String::new())])
	}

	#[test]
	fn test_kernel_source_whole_table() {
		let t = table();
		let (source, scope) = kernel_source(&[t.clone()], &t.field("x").add(t.field("y"))).unwrap();
		assert_eq!(source, "fn(t) -> t[0] + t[1]");
		assert!(scope.is_empty());
	}

	#[test]
	fn test_kernel_source_column_leaves() {
		let t = table();
		let leaves = [t.field("x"), t.field("y")];
		let (source, _) = kernel_source(&leaves, &t.field("x").add(t.field("y"))).unwrap();
		assert_eq!(source, "fn(x, y) -> x + y");
	}

	#[test]
	fn test_call_with_record_row() {
		let t = table();
		let (kernel, scope) = build_kernel(&[t.clone()], &t.field("x").add(t.field("y"))).unwrap();
		assert!(scope.is_empty());
		assert_eq!(kernel.arity(), 1);
		assert_eq!(kernel.call(&[row(1, 10, 100)]).unwrap(), Value::Int(11));
	}

	#[test]
	fn test_call_with_exploded_columns() {
		let t = table();
		let leaves = [t.field("x"), t.field("y"), t.field("z"), t.field("when")];
		let (kernel, _) = build_kernel(&leaves, &t.field("x").add(t.field("y").cos())).unwrap();
		assert_eq!(
			kernel.call(&[Value::Int(1), Value::Int(0), Value::Int(100), Value::Utf8(String::new())])
				.unwrap(),
			Value::Float(2.0)
		);
	}

	#[test]
	fn test_arity_is_checked() {
		let t = table();
		let (kernel, _) = build_kernel(&[t.field("x"), t.field("y")], &t.field("x").add(t.field("y"))).unwrap();
		assert_eq!(
			kernel.call(&[Value::Int(1)]),
			Err(Error::ArityMismatch {
				expected: 2,
				got: 1
			})
		);
	}

	#[test]
	fn test_unbound_symbol_fails_at_build() {
		let t = table();
		let u = Expr::symbol("u", ElementType::Int, Shape::Scalar);
		let err = build_kernel(&[t.clone()], &t.field("x").add(u)).unwrap_err();
		assert_eq!(
			err,
			Error::UnboundSymbol {
				name: "u".to_string()
			}
		);
	}

	#[test]
	fn test_mapped_function_resolves_by_identity() {
		let t = table();
		let double = MappedFn::new("double", ElementType::Int, |v| match v {
			Value::Int(i) => Value::Int(i * 2),
			other => other,
		});
		let expr = t.field("x").map(double).add(t.field("y"));
		let (kernel, scope) = build_kernel(&[t.clone()], &expr).unwrap();
		assert_eq!(scope.len(), 1);
		assert_eq!(kernel.call(&[row(3, 4, 0)]).unwrap(), Value::Int(10));
	}

	#[test]
	fn test_arithmetic_overflow_returns_error() {
		let t = table();
		let (kernel, _) = build_kernel(&[t.clone()], &t.field("x").add(t.field("y"))).unwrap();
		let out = kernel.call(&[row(i64::MAX, 1, 0)]);
		assert!(matches!(out, Err(Error::Overflow { .. })));
	}

	#[test]
	fn test_division_by_zero_returns_error() {
		let t = table();
		let (kernel, _) = build_kernel(&[t.clone()], &t.field("x").div(t.field("y"))).unwrap();
		assert!(matches!(kernel.call(&[row(7, 0, 0)]), Err(Error::TypeMismatch { .. })));
	}

	#[test]
	fn test_field_access_on_non_record_row_fails() {
		let t = table();
		let (kernel, _) = build_kernel(&[t.clone()], &t.field("x")).unwrap();
		assert!(matches!(kernel.call(&[Value::Int(1)]), Err(Error::TypeMismatch { .. })));
	}
}
