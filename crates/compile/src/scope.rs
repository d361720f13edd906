// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::{
	collections::BTreeMap,
	fmt,
	fmt::{Display, Formatter},
	sync::atomic::{AtomicU64, Ordering},
};

use rowcast_expr::MappedFn;

use crate::error::{Error, Result};

/// A binding required by generated code.
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeValue {
	/// The math library alias referenced by `math.<func>(..)` renderings
	MathLib,
	/// Date/time support required by temporal literals
	DateTimeLib,
	/// A user-supplied mapped function bound to a generated placeholder
	Function(MappedFn),
}

/// The mapping of free names in generated code to the runtime values they
/// must resolve to. Iteration order is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
	bindings: BTreeMap<String, ScopeValue>,
}

impl Scope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(key: impl Into<String>, value: ScopeValue) -> Self {
		let mut scope = Self::new();
		scope.bindings.insert(key.into(), value);
		scope
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn get(&self, key: &str) -> Option<&ScopeValue> {
		self.bindings.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeValue)> {
		self.bindings.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Bind a name. Rebinding a name to an identical value is fine (the
	/// math/datetime alias case); rebinding to a different value is a
	/// collision and fails loudly.
	pub fn bind(&mut self, key: impl Into<String>, value: ScopeValue) -> Result<()> {
		let key = key.into();
		match self.bindings.get(&key) {
			Some(existing) if *existing != value => Err(Error::ScopeCollision {
				key,
			}),
			_ => {
				self.bindings.insert(key, value);
				Ok(())
			}
		}
	}

	/// Merge another scope into this one under the same collision rule
	/// as [`Scope::bind`].
	pub fn merge(mut self, other: Scope) -> Result<Scope> {
		for (key, value) in other.bindings {
			self.bind(key, value)?;
		}
		Ok(self)
	}
}

impl Display for Scope {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("{")?;
		for (i, (key, value)) in self.bindings.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			match value {
				ScopeValue::MathLib => write!(f, "{key}: <math>")?,
				ScopeValue::DateTimeLib => write!(f, "{key}: <datetime>")?,
				ScopeValue::Function(func) => write!(f, "{key}: {func}")?,
			}
		}
		f.write_str("}")
	}
}

static PLACEHOLDER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A process-wide unique placeholder name for a mapped function binding.
/// The counter never repeats within the process lifetime, so concurrent
/// compilations cannot corrupt each other's scopes.
pub fn fresh_name() -> String {
	format!("fn_{}", PLACEHOLDER_COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
	use rowcast_expr::{ElementType, Value};

	use super::*;

	#[test]
	fn test_merge_identical_bindings() {
		let a = Scope::with("math", ScopeValue::MathLib);
		let b = Scope::with("math", ScopeValue::MathLib);
		let merged = a.merge(b).unwrap();
		assert_eq!(merged.len(), 1);
		assert_eq!(merged.get("math"), Some(&ScopeValue::MathLib));
	}

	#[test]
	fn test_merge_diverging_bindings_collide() {
		let f = MappedFn::new("f", ElementType::Int, |v| v);
		let g = MappedFn::new("g", ElementType::Int, |v| v);
		let a = Scope::with("fn_0", ScopeValue::Function(f));
		let b = Scope::with("fn_0", ScopeValue::Function(g));
		assert_eq!(
			a.merge(b),
			Err(Error::ScopeCollision {
				key: "fn_0".to_string()
			})
		);
	}

	#[test]
	fn test_bind_same_function_twice() {
		let f = MappedFn::new("f", ElementType::Int, |v| v);
		let mut scope = Scope::new();
		scope.bind("fn_1", ScopeValue::Function(f.clone())).unwrap();
		scope.bind("fn_1", ScopeValue::Function(f)).unwrap();
		assert_eq!(scope.len(), 1);
	}

	#[test]
	fn test_fresh_names_never_repeat() {
		let names: Vec<String> = (0..64).map(|_| fresh_name()).collect();
		let mut deduped = names.clone();
		deduped.sort();
		deduped.dedup();
		assert_eq!(deduped.len(), names.len());
	}

	#[test]
	fn test_scope_value_function_identity() {
		let f = MappedFn::new("f", ElementType::Int, |_| Value::Int(0));
		assert_eq!(ScopeValue::Function(f.clone()), ScopeValue::Function(f));
	}
}
