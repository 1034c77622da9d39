//! Record store seam.
//!
//! [`Record`] is the only storage interface the resolver needs: read and
//! write one column. [`Row`] and [`MemoryTable`] are a minimal in-memory
//! implementation that applies an [`AugmentedSchema`] and evaluates the
//! rewritten predicates and assignments the resolver produces.

use crate::error::StoreError;
use crate::schema::AugmentedSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column-level access to a stored record.
pub trait Record {
    /// Stored value of `column`, `None` if the column was never written.
    fn read(&self, column: &str) -> Option<&Value>;

    fn write(&mut self, column: &str, value: Value);
}

/// A record as a column → value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column write.
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Written columns, in name order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Record for Row {
    fn read(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    fn write(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }
}

/// Row filter over concrete column names.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Eq { column: String, value: Value },
    IsNull(String),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Predicate::Eq {
            column: column.into(),
            value,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut all) => {
                all.push(other);
                Predicate::And(all)
            }
            single => Predicate::And(vec![single, other]),
        }
    }

    pub fn matches(&self, record: &impl Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq { column, value } => record.read(column) == Some(value),
            Predicate::IsNull(column) => record.read(column).map_or(true, Value::is_null),
            Predicate::And(all) => all.iter().all(|p| p.matches(record)),
        }
    }
}

/// `column = value` in a bulk update.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// In-memory table enforcing an augmented schema.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    schema: AugmentedSchema,
    rows: Vec<Row>,
}

impl MemoryTable {
    pub fn new(schema: AugmentedSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &AugmentedSchema {
        &self.schema
    }

    /// Insert a row and return its position.
    ///
    /// Every written column must be storage-backed, and every non-nullable
    /// column must hold a non-null value.
    pub fn insert(&mut self, row: Row) -> Result<usize, StoreError> {
        for column in row.columns() {
            self.check_stored(column)?;
        }
        if let Some(missing) = self
            .schema
            .required_columns()
            .find(|c| row.read(&c.name).map_or(true, Value::is_null))
        {
            return Err(StoreError::MissingRequired {
                model: self.schema.name().to_string(),
                column: missing.name.clone(),
            });
        }

        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    pub fn select(&self, predicate: &Predicate) -> Vec<&Row> {
        self.rows.iter().filter(|row| predicate.matches(*row)).collect()
    }

    /// Apply `assignments` to every matching row and return how many changed.
    pub fn update(
        &mut self,
        predicate: &Predicate,
        assignments: &[Assignment],
    ) -> Result<usize, StoreError> {
        for assignment in assignments {
            self.check_stored(&assignment.column)?;
        }

        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|row| predicate.matches(&**row)) {
            for assignment in assignments {
                row.write(&assignment.column, assignment.value.clone());
            }
            updated += 1;
        }
        Ok(updated)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_stored(&self, column: &str) -> Result<(), StoreError> {
        match self.schema.column(column) {
            Some(c) if c.is_stored() => Ok(()),
            _ => Err(StoreError::UnknownColumn {
                model: self.schema.name().to_string(),
                column: column.to_string(),
            }),
        }
    }
}
