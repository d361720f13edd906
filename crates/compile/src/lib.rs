// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

//! Compiles symbolic tabular expressions into executable form.
//!
//! Three cooperating pieces, leaves-first:
//! - [`print_expr`] renders an expression as portable scalar source text
//!   plus the [`Scope`] of free names the text requires, stopping at a
//!   designated set of leaf nodes that become function parameters.
//! - [`kernel_source`] / [`build_kernel`] wrap that output into a named
//!   function literal and realize it as an invocable [`RowKernel`] built
//!   from composed closures.
//! - [`broadcast_collect`] rewrites a tree so that elementwise subtrees in
//!   collection-producing positions collapse into single fused broadcast
//!   nodes, ready for one-pass evaluation downstream.

mod error;
mod fuse;
mod kernel;
mod print;
mod scope;

pub use error::{Error, Result};
pub use fuse::{FUSABLE, FUSE_WORTHY, broadcast_collect, broadcast_collect_with, fusable_leaves};
pub use kernel::{RowKernel, build_kernel, kernel_source};
pub use print::print_expr;
pub use scope::{Scope, ScopeValue, fresh_name};
