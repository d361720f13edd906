// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Compiler error types.
///
/// All failures are synchronous and total: no retries, no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// The grammar is closed: a node category outside it cannot be
	/// compiled without extending the compiler itself.
	#[error("unsupported expression: {expr}")]
	UnsupportedExpression {
		expr: String,
	},

	#[error("unknown field '{name}' (available: {available:?})")]
	UnknownField {
		name: String,
		available: Vec<String>,
	},

	/// Merging two scopes would overwrite '{key}' with a different value.
	#[error("scope collision on '{key}'")]
	ScopeCollision {
		key: String,
	},

	/// A collection-shaped fusable node collected zero data leaves,
	/// which signals a defect in the caller's tree construction.
	#[error("broadcast candidate references no data: {expr}")]
	EmptyBroadcast {
		expr: String,
	},

	#[error("unbound symbol '{name}'")]
	UnboundSymbol {
		name: String,
	},

	/// A designated leaf must carry a stable name to become a function
	/// parameter; only symbols and field accesses do.
	#[error("leaf has no stable name: {expr}")]
	UnnamedLeaf {
		expr: String,
	},

	#[error("{op} overflows for {value}")]
	Overflow {
		op: &'static str,
		value: String,
	},

	#[error("{op} not defined for {value}")]
	TypeMismatch {
		op: &'static str,
		value: String,
	},

	#[error("kernel expects {expected} arguments, got {got}")]
	ArityMismatch {
		expected: usize,
		got: usize,
	},
}

impl Error {
	pub(crate) fn unsupported(expr: &impl std::fmt::Display) -> Self {
		Error::UnsupportedExpression {
			expr: expr.to_string(),
		}
	}
}
