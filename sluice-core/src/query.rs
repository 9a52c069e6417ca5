use crate::{AsValue, Bindings, Error, Result, Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Typed access to a column by name.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self.get_column(name).ok_or_else(|| {
            Error::msg(format!(
                "Column `{}` is not present in the row (columns: {})",
                name,
                self.labels.join(", ")
            ))
        })?;
        T::try_from_value(value.clone())
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// One executed statement, as recorded in a connection's query log.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLogEntry {
    pub query: String,
    pub bindings: Bindings,
    /// Elapsed time in milliseconds.
    pub time: f64,
}

impl Display for QueryLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.3}ms] {} {}",
            self.time,
            truncate_long!(self.query),
            self.bindings
        )
    }
}
