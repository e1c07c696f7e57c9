use calamine::{Data, DataType};
use chrono::NaiveDateTime;

use crate::domain::table::CellValue;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Coerces a workbook cell into one of the four scalar kinds the destination understands.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) if text.is_empty() => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(_) => match data.as_datetime() {
            Some(datetime) => CellValue::Text(format_datetime(&datetime)),
            None => CellValue::Text(data.to_string()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}
