// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

//! Symbolic expression trees over tabular data.
//!
//! An [`Expr`] describes column arithmetic, date/time accessors and
//! elementwise function mapping without executing anything. Nodes are
//! immutable and structurally comparable; rewrites produce new trees via
//! [`Expr::with_inputs`]. The `rowcast-compile` crate turns these trees into
//! portable source text and invocable row kernels.

mod node;
mod temporal;
mod types;
mod value;

pub use node::{
	BinaryExpr, BinaryOp, BroadcastExpr, Category, DatePart, DatePartExpr, Expr, FieldExpr, MapExpr, MappedFn,
	MathExpr, MathFunc, SymbolExpr,
};
pub use temporal::{Date, DateTime, Time};
pub use types::{ElementType, FieldDef, Shape};
pub use value::Value;
