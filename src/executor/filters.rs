//! Predicate filtering
//!
//! A predicate is a conjunction of `column = value` conditions. The same
//! matcher drives select, update and delete.
//!
//! Equality is strict on type and value, with one exception: when the stored
//! value is an integer and the expected value is a string, the string is
//! parsed as an integer first. A string that does not parse never matches.
//! The rule is one-directional; a stored string never matches an expected
//! integer.

use crate::schema::{Column, Value};
use crate::storage::Record;

/// Conjunction of equality conditions, one per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<(String, Value)>,
}

impl Predicate {
    /// A predicate with no conditions; it matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-condition predicate.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(column, value)
    }

    /// Adds a condition, replacing any existing one on the same column.
    pub fn and(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.conditions.push((column, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions sorted by column name.
    pub fn normalized(&self) -> Vec<(String, Value)> {
        let mut conditions = self.conditions.clone();
        conditions.sort_by(|a, b| a.0.cmp(&b.0));
        conditions
    }
}

impl FromIterator<(String, Value)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut predicate = Predicate::new();
        for (column, value) in iter {
            predicate.insert(column, value);
        }
        predicate
    }
}

/// Evaluates predicates against records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a record satisfies every condition (AND semantics)
    pub fn matches(record: &Record, predicate: &Predicate) -> bool {
        predicate.iter().all(|(column, expected)| match record.get(column) {
            Some(stored) => Self::value_matches(stored, expected),
            None => false,
        })
    }

    /// Equality with the integer/string tie-break
    pub fn value_matches(stored: &Value, expected: &Value) -> bool {
        match (stored, expected) {
            (Value::Int(actual), Value::Str(s)) => s.trim().parse::<i64>().map_or(false, |n| n == *actual),
            _ => stored == expected,
        }
    }

    /// Filters records, keeping their order.
    ///
    /// With no predicate every record is returned. Returned records are
    /// projected onto `columns` in declared order; an empty `columns` keeps
    /// every field.
    pub fn select(records: &[Record], columns: &[Column], predicate: Option<&Predicate>) -> Vec<Record> {
        records
            .iter()
            .filter(|record| predicate.map_or(true, |p| Self::matches(record, p)))
            .map(|record| project(record, columns))
            .collect()
    }
}

fn project(record: &Record, columns: &[Column]) -> Record {
    if columns.is_empty() {
        return record.clone();
    }

    let mut projected = Record::default();
    for column in columns {
        if let Some(value) = record.get(&column.name) {
            projected.set(column.name.clone(), value.clone());
        }
    }
    projected
}
