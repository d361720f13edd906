// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

//! Ground-truth tests: a realized kernel must agree with direct structural
//! evaluation of the expression tree on the same row.

use rowcast_compile::build_kernel;
use rowcast_expr::{
	BinaryOp, DatePart, DateTime, ElementType, Expr, MappedFn, MathFunc, Shape, Value,
};

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

fn row(x: i64, y: i64, z: i64, when: DateTime) -> Value {
	Value::Record(vec![Value::Int(x), Value::Int(y), Value::Int(z), Value::DateTime(when)])
}

/// Direct structural evaluation, written independently of the kernel
/// builder to serve as the test oracle.
fn eval_direct(leaves: &[Expr], args: &[Value], expr: &Expr) -> Value {
	if let Expr::Literal(value) = expr {
		return value.clone();
	}
	if let Some(position) = leaves.iter().position(|leaf| leaf == expr) {
		return args[position].clone();
	}
	match expr {
		Expr::Field(field) => {
			let index = field.child.ty().field_index(&field.name).expect("known field");
			match eval_direct(leaves, args, &field.child) {
				Value::Record(values) => values[index].clone(),
				other => panic!("field access on {other}"),
			}
		}
		Expr::Binary(binary) => {
			let lhs = eval_direct(leaves, args, &binary.lhs);
			let rhs = eval_direct(leaves, args, &binary.rhs);
			match (binary.op, lhs, rhs) {
				(BinaryOp::Add, Value::Int(a), Value::Int(b)) => Value::Int(a + b),
				(BinaryOp::Sub, Value::Int(a), Value::Int(b)) => Value::Int(a - b),
				(BinaryOp::Mul, Value::Int(a), Value::Int(b)) => Value::Int(a * b),
				(op, lhs, rhs) => {
					let a = as_float(&lhs);
					let b = as_float(&rhs);
					match op {
						BinaryOp::Add => Value::Float(a + b),
						BinaryOp::Sub => Value::Float(a - b),
						BinaryOp::Mul => Value::Float(a * b),
						BinaryOp::Div => Value::Float(a / b),
						BinaryOp::Gt => Value::Bool(a > b),
						BinaryOp::Lt => Value::Bool(a < b),
						BinaryOp::Ge => Value::Bool(a >= b),
						BinaryOp::Le => Value::Bool(a <= b),
						BinaryOp::Eq => Value::Bool(a == b),
						BinaryOp::Ne => Value::Bool(a != b),
						op => panic!("oracle does not model {op}"),
					}
				}
			}
		}
		Expr::Math(math) => {
			let x = as_float(&eval_direct(leaves, args, &math.child));
			match math.func {
				MathFunc::Sin => Value::Float(x.sin()),
				MathFunc::Cos => Value::Float(x.cos()),
				MathFunc::Sqrt => Value::Float(x.sqrt()),
				MathFunc::Ceil => Value::Int(x.ceil() as i64),
				MathFunc::Floor => Value::Int(x.floor() as i64),
				func => panic!("oracle does not model {func}"),
			}
		}
		Expr::DatePart(date_part) => {
			let value = eval_direct(leaves, args, &date_part.child);
			let dt = match value {
				Value::DateTime(dt) => dt,
				other => panic!("date part of {other}"),
			};
			match date_part.part {
				DatePart::Date => Value::Date(dt.date()),
				DatePart::Time => Value::Time(dt.time()),
				DatePart::Year => Value::Int(i64::from(dt.year())),
				DatePart::Month => Value::Int(i64::from(dt.month())),
				DatePart::Day => Value::Int(i64::from(dt.day())),
				DatePart::Hour => Value::Int(i64::from(dt.hour())),
				DatePart::Minute => Value::Int(i64::from(dt.minute())),
				DatePart::Second => Value::Int(i64::from(dt.second())),
				DatePart::Millisecond => Value::Int(i64::from(dt.millisecond())),
				DatePart::Microsecond => Value::Int(i64::from(dt.microsecond())),
			}
		}
		Expr::Map(map) => map.func.call(eval_direct(leaves, args, &map.child)),
		other => panic!("oracle does not model {other}"),
	}
}

fn as_float(value: &Value) -> f64 {
	match value {
		Value::Int(i) => *i as f64,
		Value::Float(f) => *f,
		other => panic!("not numeric: {other}"),
	}
}

fn assert_kernel_matches_oracle(leaves: &[Expr], args: &[Value], expr: &Expr) {
	let (kernel, _) = build_kernel(leaves, expr).expect("kernel builds");
	assert_eq!(kernel.call(args).expect("kernel evaluates"), eval_direct(leaves, args, expr), "{expr}");
}

fn noon() -> DateTime {
	DateTime::from_parts(2020, 6, 15, 12, 30, 45).unwrap()
}

#[test]
fn test_whole_table_field_sum() {
	let t = table();
	let (kernel, scope) = build_kernel(&[t.clone()], &t.field("x").add(t.field("y"))).unwrap();
	assert!(scope.is_empty());
	let out = kernel
		.call(&[Value::Record(vec![
			Value::Int(1),
			Value::Int(10),
			Value::Int(100),
			Value::Utf8(String::new()),
		])])
		.unwrap();
	assert_eq!(out, Value::Int(11));
}

#[test]
fn test_arithmetic_against_oracle() {
	let t = table();
	let args = [row(7, -3, 12, noon())];
	for expr in [
		t.field("x").add(t.field("y")),
		t.field("x").sub(t.field("y").mul(t.field("z"))),
		t.field("x").div(t.field("y")),
		t.field("x").add(Expr::literal(2).mul(t.field("y"))),
	] {
		assert_kernel_matches_oracle(&[t.clone()], &args, &expr);
	}
}

#[test]
fn test_math_and_comparison_against_oracle() {
	let t = table();
	let args = [row(1, 2, 3, noon())];
	for expr in [
		t.field("x").sin().gt(t.field("y").ceil()),
		t.field("z").sqrt().le(t.field("y")),
		t.field("x").cos().add(t.field("y")),
	] {
		assert_kernel_matches_oracle(&[t.clone()], &args, &expr);
	}
}

#[test]
fn test_date_parts_against_oracle() {
	let t = table();
	let args = [row(1, 2, 3, noon())];
	for expr in [
		t.field("when").year(),
		t.field("when").day().add(Expr::literal(1)),
		t.field("when").hour().mul(t.field("x")),
		t.field("when").date(),
		t.field("when").millisecond(),
	] {
		assert_kernel_matches_oracle(&[t.clone()], &args, &expr);
	}
}

#[test]
fn test_exploded_leaves_against_oracle() {
	let t = table();
	let leaves = [t.field("x"), t.field("y"), t.field("z"), t.field("when")];
	let args = [Value::Int(1), Value::Int(0), Value::Int(100), Value::DateTime(noon())];
	for expr in [
		t.field("x").add(t.field("y").cos()),
		t.field("x").add(t.field("y")),
		t.field("when").minute().add(t.field("z")),
	] {
		assert_kernel_matches_oracle(&leaves, &args, &expr);
	}
}

#[test]
fn test_mapped_function_against_oracle() {
	let t = table();
	let square = MappedFn::new("square", ElementType::Int, |v| match v {
		Value::Int(i) => Value::Int(i * i),
		other => other,
	});
	let expr = t.field("x").map(square).add(t.field("y"));
	let args = [row(5, 2, 0, noon())];
	assert_kernel_matches_oracle(&[t.clone()], &args, &expr);

	let (kernel, _) = build_kernel(&[t.clone()], &expr).unwrap();
	assert_eq!(kernel.call(&args).unwrap(), Value::Int(27));
}
