//! Variable assignments: the values free variables take during evaluation.

use crate::expression::Variable;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maps each [`Variable`] to the value it takes during evaluation.
///
/// Keys are unique; inserting an existing variable overwrites its value.
/// Equality and hashing cover the full mapping, values compared by their
/// bit pattern so that assignments can live in hash sets even when they
/// hold NaN.
#[derive(Debug, Clone, Default)]
pub struct VariableAssignment {
    values: BTreeMap<Variable, f64>,
}

impl VariableAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `value`, returning the previous value if any.
    pub fn insert(&mut self, variable: impl Into<Variable>, value: f64) -> Option<f64> {
        self.values.insert(variable.into(), value)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, variable: impl Into<Variable>, value: f64) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn get(&self, variable: &Variable) -> Option<f64> {
        self.values.get(variable).copied()
    }

    /// Lookup by name, for callers that do not hold a `Variable`.
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(var, _)| var.name() == name)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn remove(&mut self, variable: &Variable) -> Option<f64> {
        self.values.remove(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, f64)> {
        self.values.iter().map(|(var, value)| (var, *value))
    }
}

impl PartialEq for VariableAssignment {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((va, a), (vb, b))| va == vb && a.to_bits() == b.to_bits())
    }
}

impl Eq for VariableAssignment {}

impl Hash for VariableAssignment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.len().hash(state);
        for (var, value) in &self.values {
            var.hash(state);
            value.to_bits().hash(state);
        }
    }
}

impl<V: Into<Variable>> FromIterator<(V, f64)> for VariableAssignment {
    fn from_iter<I: IntoIterator<Item = (V, f64)>>(iter: I) -> Self {
        let mut assignment = VariableAssignment::new();
        assignment.extend(iter);
        assignment
    }
}

impl<V: Into<Variable>> Extend<(V, f64)> for VariableAssignment {
    fn extend<I: IntoIterator<Item = (V, f64)>>(&mut self, iter: I) {
        for (var, value) in iter {
            self.insert(var, value);
        }
    }
}

impl fmt::Display for VariableAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", var, value)?;
        }
        write!(f, "}}")
    }
}
