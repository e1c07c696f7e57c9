use google_sheets4::api::ValueRange;
use serde_json::{Number, Value};

use crate::domain::{
    sheets::a1_notation::A1Notation,
    table::{CellValue, Table},
};

/// Largest magnitude at which every integer is still exact in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub trait ValueRangeFactory {
    fn from_table(table: &Table, range: &A1Notation) -> Self;
}

pub fn wrap_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Text(text) => Value::String(text.clone()),
        CellValue::Number(number)
            if number.fract() == 0.0 && number.abs() <= MAX_EXACT_INTEGER =>
        {
            Value::Number(Number::from(*number as i64))
        }
        CellValue::Number(number) => Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(number.to_string())),
        CellValue::Bool(value) => Value::Bool(*value),
        CellValue::Empty => Value::String(String::new()),
    }
}

impl ValueRangeFactory for ValueRange {
    fn from_table(table: &Table, range: &A1Notation) -> Self {
        let values = table
            .to_matrix()
            .iter()
            .map(|row| row.iter().map(wrap_value).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        Self {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.to_string()),
            values: Some(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_value() {
        assert_eq!(wrap_value(&"Alice".into()), json!("Alice"));
        assert_eq!(wrap_value(&30.into()), json!(30));
        assert_eq!(wrap_value(&CellValue::Number(2.5)), json!(2.5));
        assert_eq!(wrap_value(&true.into()), json!(true));
        assert_eq!(wrap_value(&CellValue::Empty), json!(""));
    }

    #[test]
    fn test_non_finite_numbers_become_text() {
        assert_eq!(wrap_value(&CellValue::Number(f64::NAN)), json!("NaN"));
        assert_eq!(wrap_value(&CellValue::Number(f64::INFINITY)), json!("inf"));
    }

    #[test]
    fn test_from_table_writes_header_then_rows() {
        let table = Table::new(
            vec!["Name".to_owned(), "Age".to_owned()],
            vec![vec!["Alice".into(), 30.into()], vec!["Bob".into(), 25.into()]],
        )
        .unwrap();
        let range = A1Notation::whole_sheet("Import");

        let value_range = ValueRange::from_table(&table, &range);

        assert_eq!(value_range.major_dimension, Some("ROWS".to_string()));
        assert_eq!(value_range.range, Some("'Import'".to_string()));
        assert_eq!(
            value_range.values,
            Some(vec![
                vec![json!("Name"), json!("Age")],
                vec![json!("Alice"), json!(30)],
                vec![json!("Bob"), json!(25)],
            ])
        );
    }

    #[test]
    fn test_empty_cells_keep_row_width() {
        let table = Table::new(
            vec!["Name".to_owned(), "Note".to_owned(), "Age".to_owned()],
            vec![vec!["Alice".into(), CellValue::Empty, 30.into()]],
        )
        .unwrap();

        let values = ValueRange::from_table(&table, &A1Notation::whole_sheet("Import"))
            .values
            .unwrap();

        assert_eq!(values[1], vec![json!("Alice"), json!(""), json!(30)]);
    }
}
