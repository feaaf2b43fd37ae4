//! Query results

use std::collections::BTreeMap;
use std::ops::Index;

use crate::value::{Record, SqlValue};
use crate::{ConnectorError, Result};

/// Column names plus row tuples, as returned by a query.
///
/// Every row has exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbRows {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl DbRows {
    /// Build a result set, checking row arity.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ConnectorError::RowArity {
                index,
                expected: columns.len(),
                actual: row.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// No columns, no rows
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` zipped with the column names
    pub fn record(&self, index: usize) -> Option<Record> {
        self.rows.get(index).map(|row| self.zip(row))
    }

    /// Iterate rows as records
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows.iter().map(|row| self.zip(row))
    }

    pub fn into_records(self) -> Vec<Record> {
        let Self { columns, rows } = self;
        rows.into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }

    /// All values of one column, in row order
    pub fn column_values(&self, column: &str) -> Option<Vec<SqlValue>> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Transpose into column name -> values
    pub fn by_column(&self) -> BTreeMap<String, Vec<SqlValue>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                (
                    name.clone(),
                    self.rows.iter().map(|row| row[idx].clone()).collect(),
                )
            })
            .collect()
    }

    fn zip(&self, row: &[SqlValue]) -> Record {
        self.columns.iter().cloned().zip(row.iter().cloned()).collect()
    }
}

impl Index<usize> for DbRows {
    type Output = [SqlValue];

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DbRows {
        DbRows::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![SqlValue::from("A"), SqlValue::from("foo")],
                vec![SqlValue::from("B"), SqlValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_arity() {
        let err = DbRows::new(vec!["id".into()], vec![vec![SqlValue::Null, SqlValue::Null]])
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::RowArity {
                index: 0,
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn records_zip_columns_with_values() {
        let rows = sample();
        let records: Vec<Record> = rows.records().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(records[0]["id"], SqlValue::from("A"));
        assert_eq!(records[1]["name"], SqlValue::Null);
        assert_eq!(rows.record(1), Some(records[1].clone()));
        assert_eq!(rows.into_records(), records);
    }

    #[test]
    fn index_returns_row_tuple() {
        let rows = sample();
        assert_eq!(rows[0][1], SqlValue::from("foo"));
    }

    #[test]
    fn by_column_transposes() {
        let cols = sample().by_column();
        assert_eq!(
            cols["id"],
            vec![SqlValue::from("A"), SqlValue::from("B")]
        );
        assert_eq!(sample().column_values("missing"), None);
    }
}
