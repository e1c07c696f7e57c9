use std::fmt::Formatter;

use thiserror::Error;

/// A single scalar cell as it travels from the workbook to the remote tab.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            CellValue::Number(number) => write!(f, "{}", number),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

pub type Row = Vec<CellValue>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {row} has {actual} cells but the header has {expected} columns")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Header plus data rows. Every row is exactly as wide as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Result<Self, TableError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != header.len())
        {
            return Err(TableError::RowWidthMismatch {
                row: index,
                expected: header.len(),
                actual: row.len(),
            });
        }

        Ok(Table { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Header row followed by every data row, as written to the destination.
    pub fn to_matrix(&self) -> Vec<Row> {
        let header = self
            .header
            .iter()
            .map(|name| CellValue::Text(name.clone()))
            .collect::<Row>();

        std::iter::once(header)
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_table_accepts_rows_matching_header() {
        let table = Table::new(
            header(&["Name", "Age"]),
            vec![vec!["Alice".into(), 30.into()], vec!["Bob".into(), 25.into()]],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_table_rejects_short_row() {
        let result = Table::new(
            header(&["Name", "Age"]),
            vec![vec!["Alice".into(), 30.into()], vec!["Bob".into()]],
        );

        assert_eq!(
            result,
            Err(TableError::RowWidthMismatch {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_to_matrix_puts_header_first() {
        let table = Table::new(
            header(&["Name", "Note", "Age"]),
            vec![vec!["Alice".into(), CellValue::Empty, 30.into()]],
        )
        .unwrap();

        assert_eq!(
            table.to_matrix(),
            vec![
                vec!["Name".into(), "Note".into(), "Age".into()],
                vec!["Alice".into(), CellValue::Empty, 30.into()],
            ]
        );
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(30.0).to_string(), "30");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
