// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::{
	fmt,
	fmt::{Debug, Display, Formatter},
	sync::Arc,
};

use crate::{
	types::{ElementType, FieldDef, Shape},
	value::Value,
};

/// A symbolic expression over tabular data.
///
/// Nodes are immutable; equality is deep structural comparison, independent
/// of allocation identity. The rendered [`Display`] text doubles as the
/// canonical string key used for deterministic ordering of node sets.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
	/// An embedded constant value
	Literal(Value),

	/// A named leaf with a declared element type and shape
	Symbol(SymbolExpr),

	/// Access to a named field of a record-typed expression
	Field(FieldExpr),

	/// Elementwise binary operation (arithmetic, comparison, logic)
	Binary(BinaryExpr),

	/// Elementwise unary math function
	Math(MathExpr),

	/// Date/time component accessor or extraction
	DatePart(DatePartExpr),

	/// Elementwise application of an opaque user function
	Map(MapExpr),

	/// Fused elementwise subtree produced by the broadcast pass
	Broadcast(BroadcastExpr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolExpr {
	pub name: String,
	pub ty: ElementType,
	pub shape: Shape,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldExpr {
	pub child: Box<Expr>,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
	pub op: BinaryOp,
	pub lhs: Box<Expr>,
	pub rhs: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MathExpr {
	pub func: MathFunc,
	pub child: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatePartExpr {
	pub part: DatePart,
	pub child: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapExpr {
	pub func: MappedFn,
	pub child: Box<Expr>,
}

/// Synthesized by the broadcast fuser: `children` are the source
/// expressions consumed (the node's dependency list), `scalars` the ordered
/// leaf expressions referenced by `scalar_expr`, and `scalar_expr` the
/// captured elementwise expression, stored unchanged for later compilation.
#[derive(Clone, Debug, PartialEq)]
pub struct BroadcastExpr {
	pub children: Vec<Expr>,
	pub scalars: Vec<Expr>,
	pub scalar_expr: Box<Expr>,
}

/// Node discriminant, used by the fuser to decide which categories are
/// transparent during leaf collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Literal,
	Symbol,
	Field,
	Binary,
	Math,
	DatePart,
	Map,
	Broadcast,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	FloorDiv,
	Mod,
	Pow,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	And,
	Or,
}

impl BinaryOp {
	/// The rendered operator symbol.
	pub fn symbol(&self) -> &'static str {
		match self {
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Div => "/",
			BinaryOp::FloorDiv => "//",
			BinaryOp::Mod => "%",
			BinaryOp::Pow => "**",
			BinaryOp::Eq => "==",
			BinaryOp::Ne => "!=",
			BinaryOp::Lt => "<",
			BinaryOp::Le => "<=",
			BinaryOp::Gt => ">",
			BinaryOp::Ge => ">=",
			BinaryOp::And => "and",
			BinaryOp::Or => "or",
		}
	}

	pub fn is_comparison(&self) -> bool {
		matches!(
			self,
			BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
		)
	}

	pub fn is_logical(&self) -> bool {
		matches!(self, BinaryOp::And | BinaryOp::Or)
	}
}

impl Display for BinaryOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MathFunc {
	Sin,
	Cos,
	Tan,
	Sqrt,
	Exp,
	Log,
	Floor,
	Ceil,
	Abs,
}

impl MathFunc {
	/// Lowercase function name as rendered in generated code.
	pub fn name(&self) -> &'static str {
		match self {
			MathFunc::Sin => "sin",
			MathFunc::Cos => "cos",
			MathFunc::Tan => "tan",
			MathFunc::Sqrt => "sqrt",
			MathFunc::Exp => "exp",
			MathFunc::Log => "log",
			MathFunc::Floor => "floor",
			MathFunc::Ceil => "ceil",
			MathFunc::Abs => "abs",
		}
	}
}

impl Display for MathFunc {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DatePart {
	/// Extract the calendar date of a datetime
	Date,
	/// Extract the time of day of a datetime
	Time,
	Year,
	Month,
	Day,
	Hour,
	Minute,
	Second,
	Millisecond,
	Microsecond,
}

impl DatePart {
	/// Lowercase attribute name for component accessors. The extraction
	/// forms `Date` and `Time` render as calls instead.
	pub fn attr(&self) -> &'static str {
		match self {
			DatePart::Date => "date",
			DatePart::Time => "time",
			DatePart::Year => "year",
			DatePart::Month => "month",
			DatePart::Day => "day",
			DatePart::Hour => "hour",
			DatePart::Minute => "minute",
			DatePart::Second => "second",
			DatePart::Millisecond => "millisecond",
			DatePart::Microsecond => "microsecond",
		}
	}
}

/// An opaque elementwise function supplied by the caller.
///
/// The wrapped callable is never introspected; equality is pointer identity,
/// so two `MappedFn` values compare equal only when they share the same
/// underlying function object.
#[derive(Clone)]
pub struct MappedFn {
	label: String,
	ty: ElementType,
	func: Arc<dyn Fn(Value) -> Value + Send + Sync>,
}

impl MappedFn {
	pub fn new(
		label: impl Into<String>,
		ty: ElementType,
		func: impl Fn(Value) -> Value + Send + Sync + 'static,
	) -> Self {
		Self {
			label: label.into(),
			ty,
			func: Arc::new(func),
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn ty(&self) -> &ElementType {
		&self.ty
	}

	pub fn call(&self, value: Value) -> Value {
		(self.func)(value)
	}
}

impl PartialEq for MappedFn {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.func, &other.func)
	}
}

impl Debug for MappedFn {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappedFn").field("label", &self.label).field("ty", &self.ty).finish_non_exhaustive()
	}
}

impl Display for MappedFn {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label)
	}
}

impl Expr {
	pub fn symbol(name: impl Into<String>, ty: ElementType, shape: Shape) -> Self {
		Expr::Symbol(SymbolExpr {
			name: name.into(),
			ty,
			shape,
		})
	}

	pub fn literal(value: impl Into<Value>) -> Self {
		Expr::Literal(value.into())
	}

	pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
		Expr::Binary(BinaryExpr {
			op,
			lhs: Box::new(lhs),
			rhs: Box::new(rhs),
		})
	}

	pub fn math(func: MathFunc, child: Expr) -> Self {
		Expr::Math(MathExpr {
			func,
			child: Box::new(child),
		})
	}

	pub fn date_part(part: DatePart, child: Expr) -> Self {
		Expr::DatePart(DatePartExpr {
			part,
			child: Box::new(child),
		})
	}

	pub fn broadcast(children: Vec<Expr>, scalars: Vec<Expr>, scalar_expr: Expr) -> Self {
		Expr::Broadcast(BroadcastExpr {
			children,
			scalars,
			scalar_expr: Box::new(scalar_expr),
		})
	}

	pub fn field(&self, name: impl Into<String>) -> Self {
		Expr::Field(FieldExpr {
			child: Box::new(self.clone()),
			name: name.into(),
		})
	}

	pub fn map(&self, func: MappedFn) -> Self {
		Expr::Map(MapExpr {
			func,
			child: Box::new(self.clone()),
		})
	}

	pub fn category(&self) -> Category {
		match self {
			Expr::Literal(_) => Category::Literal,
			Expr::Symbol(_) => Category::Symbol,
			Expr::Field(_) => Category::Field,
			Expr::Binary(_) => Category::Binary,
			Expr::Math(_) => Category::Math,
			Expr::DatePart(_) => Category::DatePart,
			Expr::Map(_) => Category::Map,
			Expr::Broadcast(_) => Category::Broadcast,
		}
	}

	/// Declared element type of the expression result. Resolves to
	/// [`ElementType::Undefined`] where the tree references a field that
	/// its child type does not declare.
	pub fn ty(&self) -> ElementType {
		match self {
			Expr::Literal(value) => value.ty(),
			Expr::Symbol(symbol) => symbol.ty.clone(),
			Expr::Field(field) => {
				field.child.ty().field_ty(&field.name).cloned().unwrap_or(ElementType::Undefined)
			}
			Expr::Binary(binary) => binary_ty(binary),
			Expr::Math(math) => match math.func {
				MathFunc::Floor | MathFunc::Ceil => ElementType::Int,
				_ => ElementType::Float,
			},
			Expr::DatePart(date_part) => match date_part.part {
				DatePart::Date => ElementType::Date,
				DatePart::Time => ElementType::Time,
				_ => ElementType::Int,
			},
			Expr::Map(map) => map.func.ty().clone(),
			Expr::Broadcast(broadcast) => broadcast.scalar_expr.ty(),
		}
	}

	/// Declared shape: elementwise operations yield a collection whenever
	/// any of their inputs does.
	pub fn shape(&self) -> Shape {
		match self {
			Expr::Literal(_) => Shape::Scalar,
			Expr::Symbol(symbol) => symbol.shape,
			Expr::Broadcast(_) => Shape::Collection,
			_ => {
				if self.inputs().iter().any(|input| input.shape().is_collection()) {
					Shape::Collection
				} else {
					Shape::Scalar
				}
			}
		}
	}

	/// Stable name for symbol-like nodes; the compiler renders a
	/// designated leaf by this name.
	pub fn name(&self) -> Option<&str> {
		match self {
			Expr::Symbol(symbol) => Some(&symbol.name),
			Expr::Field(field) => Some(&field.name),
			_ => None,
		}
	}

	/// Ordered field list of a record-typed result, `None` otherwise.
	pub fn record_fields(&self) -> Option<Vec<FieldDef>> {
		match self.ty() {
			ElementType::Record(fields) => Some(fields),
			_ => None,
		}
	}

	/// Child nodes in construction order. For a broadcast node these are
	/// its consumed sources, not its captured scalar expression.
	pub fn inputs(&self) -> Vec<&Expr> {
		match self {
			Expr::Literal(_) | Expr::Symbol(_) => Vec::new(),
			Expr::Field(field) => vec![&field.child],
			Expr::Binary(binary) => vec![&binary.lhs, &binary.rhs],
			Expr::Math(math) => vec![&math.child],
			Expr::DatePart(date_part) => vec![&date_part.child],
			Expr::Map(map) => vec![&map.child],
			Expr::Broadcast(broadcast) => broadcast.children.iter().collect(),
		}
	}

	/// Structural substitution: rebuild this node with its children
	/// replaced, all other attributes preserved. `inputs` must line up
	/// with [`Expr::inputs`]; the node is returned unchanged otherwise.
	pub fn with_inputs(&self, inputs: &[Expr]) -> Expr {
		debug_assert_eq!(inputs.len(), self.inputs().len());
		match (self, inputs) {
			(Expr::Field(field), [child]) => Expr::Field(FieldExpr {
				child: Box::new(child.clone()),
				name: field.name.clone(),
			}),
			(Expr::Binary(binary), [lhs, rhs]) => Expr::Binary(BinaryExpr {
				op: binary.op,
				lhs: Box::new(lhs.clone()),
				rhs: Box::new(rhs.clone()),
			}),
			(Expr::Math(math), [child]) => Expr::Math(MathExpr {
				func: math.func,
				child: Box::new(child.clone()),
			}),
			(Expr::DatePart(date_part), [child]) => Expr::DatePart(DatePartExpr {
				part: date_part.part,
				child: Box::new(child.clone()),
			}),
			(Expr::Map(map), [child]) => Expr::Map(MapExpr {
				func: map.func.clone(),
				child: Box::new(child.clone()),
			}),
			(Expr::Broadcast(broadcast), children) if children.len() == broadcast.children.len() => {
				Expr::Broadcast(BroadcastExpr {
					children: children.to_vec(),
					scalars: broadcast.scalars.clone(),
					scalar_expr: broadcast.scalar_expr.clone(),
				})
			}
			_ => self.clone(),
		}
	}
}

fn binary_ty(binary: &BinaryExpr) -> ElementType {
	if binary.op.is_comparison() || binary.op.is_logical() {
		return ElementType::Bool;
	}
	if binary.op == BinaryOp::Div {
		return ElementType::Float;
	}
	match (binary.lhs.ty(), binary.rhs.ty()) {
		(ElementType::Int, ElementType::Int) => ElementType::Int,
		(ElementType::Int | ElementType::Float, ElementType::Int | ElementType::Float) => ElementType::Float,
		_ => ElementType::Undefined,
	}
}

// Arithmetic and comparison builders
impl Expr {
	pub fn add(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Add, self.clone(), rhs)
	}

	pub fn sub(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Sub, self.clone(), rhs)
	}

	pub fn mul(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Mul, self.clone(), rhs)
	}

	pub fn div(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Div, self.clone(), rhs)
	}

	pub fn floor_div(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::FloorDiv, self.clone(), rhs)
	}

	pub fn rem(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Mod, self.clone(), rhs)
	}

	pub fn pow(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Pow, self.clone(), rhs)
	}

	pub fn equals(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Eq, self.clone(), rhs)
	}

	pub fn not_equals(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Ne, self.clone(), rhs)
	}

	pub fn lt(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Lt, self.clone(), rhs)
	}

	pub fn le(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Le, self.clone(), rhs)
	}

	pub fn gt(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Gt, self.clone(), rhs)
	}

	pub fn ge(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Ge, self.clone(), rhs)
	}

	pub fn and(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::And, self.clone(), rhs)
	}

	pub fn or(&self, rhs: Expr) -> Expr {
		Expr::binary(BinaryOp::Or, self.clone(), rhs)
	}
}

// Math builders
impl Expr {
	pub fn sin(&self) -> Expr {
		Expr::math(MathFunc::Sin, self.clone())
	}

	pub fn cos(&self) -> Expr {
		Expr::math(MathFunc::Cos, self.clone())
	}

	pub fn tan(&self) -> Expr {
		Expr::math(MathFunc::Tan, self.clone())
	}

	pub fn sqrt(&self) -> Expr {
		Expr::math(MathFunc::Sqrt, self.clone())
	}

	pub fn exp(&self) -> Expr {
		Expr::math(MathFunc::Exp, self.clone())
	}

	pub fn log(&self) -> Expr {
		Expr::math(MathFunc::Log, self.clone())
	}

	pub fn floor(&self) -> Expr {
		Expr::math(MathFunc::Floor, self.clone())
	}

	pub fn ceil(&self) -> Expr {
		Expr::math(MathFunc::Ceil, self.clone())
	}

	pub fn abs(&self) -> Expr {
		Expr::math(MathFunc::Abs, self.clone())
	}
}

// Date/time builders
impl Expr {
	pub fn date(&self) -> Expr {
		Expr::date_part(DatePart::Date, self.clone())
	}

	pub fn time(&self) -> Expr {
		Expr::date_part(DatePart::Time, self.clone())
	}

	pub fn year(&self) -> Expr {
		Expr::date_part(DatePart::Year, self.clone())
	}

	pub fn month(&self) -> Expr {
		Expr::date_part(DatePart::Month, self.clone())
	}

	pub fn day(&self) -> Expr {
		Expr::date_part(DatePart::Day, self.clone())
	}

	pub fn hour(&self) -> Expr {
		Expr::date_part(DatePart::Hour, self.clone())
	}

	pub fn minute(&self) -> Expr {
		Expr::date_part(DatePart::Minute, self.clone())
	}

	pub fn second(&self) -> Expr {
		Expr::date_part(DatePart::Second, self.clone())
	}

	pub fn millisecond(&self) -> Expr {
		Expr::date_part(DatePart::Millisecond, self.clone())
	}

	pub fn microsecond(&self) -> Expr {
		Expr::date_part(DatePart::Microsecond, self.clone())
	}
}

impl Display for Expr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Expr::Literal(value) => write!(f, "{value}"),
			Expr::Symbol(symbol) => f.write_str(&symbol.name),
			Expr::Field(field) => write!(f, "{}.{}", field.child, field.name),
			Expr::Binary(binary) => write!(f, "({} {} {})", binary.lhs, binary.op, binary.rhs),
			Expr::Math(math) => write!(f, "{}({})", math.func, math.child),
			Expr::DatePart(date_part) => match date_part.part {
				DatePart::Date | DatePart::Time => {
					write!(f, "{}.{}()", date_part.child, date_part.part.attr())
				}
				part => write!(f, "{}.{}", date_part.child, part.attr()),
			},
			Expr::Map(map) => write!(f, "{}({})", map.func, map.child),
			Expr::Broadcast(broadcast) => {
				f.write_str("broadcast([")?;
				for (i, child) in broadcast.children.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{child}")?;
				}
				write!(f, "], {})", broadcast.scalar_expr)
			}
		}
	}
}
