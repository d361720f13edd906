// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::collections::BTreeMap;

use rowcast_expr::{Category, Expr};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Categories that are worth collapsing into a broadcast when they appear
/// in a collection-producing context.
pub const FUSE_WORTHY: &[Category] = &[Category::Binary, Category::Math, Category::Map, Category::DatePart];

/// Categories the leaf collection descends through. Field access is
/// transparent here but is not itself worth broadcasting.
pub const FUSABLE: &[Category] =
	&[Category::Binary, Category::Math, Category::Map, Category::Field, Category::DatePart];

/// Collapse elementwise subtrees into fused broadcast nodes so a downstream
/// engine can evaluate them in a single pass over the data.
///
/// Pure whole-tree rewrite: the input is never mutated, unchanged subtrees
/// are reused in the result.
#[instrument(name = "compile::broadcast_collect", level = "trace", skip_all)]
pub fn broadcast_collect(expr: &Expr) -> Result<Expr> {
	broadcast_collect_with(expr, FUSABLE, FUSE_WORTHY)
}

/// [`broadcast_collect`] with caller-supplied category sets.
pub fn broadcast_collect_with(expr: &Expr, fusable: &[Category], fuse_worthy: &[Category]) -> Result<Expr> {
	let expr = if fuse_worthy.contains(&expr.category()) && expr.shape().is_collection() {
		let leaves = fusable_leaves(fusable, expr);
		if leaves.is_empty() {
			return Err(Error::EmptyBroadcast {
				expr: expr.to_string(),
			});
		}
		debug!(expr = %expr, leaves = leaves.len(), "fusing broadcast subtree");
		Expr::broadcast(leaves.clone(), leaves, expr.clone())
	} else {
		expr.clone()
	};

	// Recurse into the (possibly just-replaced) node's children. For a
	// fused node these are its collected sources; the captured scalar
	// expression is never re-descended and is compiled later as-is.
	let inputs = expr.inputs();
	let mut fused = Vec::with_capacity(inputs.len());
	let mut changed = false;
	for &input in &inputs {
		let next = broadcast_collect_with(input, fusable, fuse_worthy)?;
		changed |= next != *input;
		fused.push(next);
	}
	if changed {
		Ok(expr.with_inputs(&fused))
	} else {
		Ok(expr)
	}
}

/// The leaves of an expression, recursing through nodes of the given
/// categories and treating every other node as an opaque leaf. The result
/// is deduplicated and ordered by the canonical display string.
pub fn fusable_leaves(kinds: &[Category], expr: &Expr) -> Vec<Expr> {
	let mut leaves = BTreeMap::new();
	collect_leaves(kinds, expr, &mut leaves);
	leaves.into_values().collect()
}

fn collect_leaves(kinds: &[Category], expr: &Expr, leaves: &mut BTreeMap<String, Expr>) {
	// constants reference no data and are neither leaves nor barriers
	if matches!(expr, Expr::Literal(_)) {
		return;
	}
	if !kinds.contains(&expr.category()) {
		leaves.entry(expr.to_string()).or_insert_with(|| expr.clone());
		return;
	}
	for input in expr.inputs() {
		collect_leaves(kinds, input, leaves);
	}
}
