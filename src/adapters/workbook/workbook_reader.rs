use calamine::{open_workbook_auto, Data, Range, Reader};
use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::{
    domain::table::{CellValue, Row, Table},
    ports::table_source::{SourceSelection, TableSource, TableSourceError},
};

use super::cell_conversion::cell_value;

/// Reads tables from any workbook format calamine understands (xlsx, xlsm, xlsb, xls, ods).
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookReader;

impl TableSource for WorkbookReader {
    #[instrument(skip(self), fields(path = %selection.path.display()))]
    fn read(&self, selection: &SourceSelection) -> error_stack::Result<Table, TableSourceError> {
        if !selection.path.is_file() {
            return Err(report!(TableSourceError::SourceMissing))
                .attach_printable_lazy(|| {
                    format!("Excel file not found: {}", selection.path.display())
                });
        }

        let mut workbook = open_workbook_auto(&selection.path)
            .change_context(TableSourceError::Unreadable)
            .attach_printable_lazy(|| format!("Failed to open {}", selection.path.display()))?;

        let sheet_names = workbook.sheet_names().to_owned();
        let sheet_name = match &selection.sheet {
            Some(name) if sheet_names.contains(name) => name.clone(),
            Some(name) => {
                return Err(report!(TableSourceError::SheetNotFound(name.clone())))
                    .attach_printable_lazy(|| format!("Available sheets: {:?}", sheet_names));
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or(report!(TableSourceError::NoSheets))?,
        };

        tracing::debug!("Reading sheet '{}'", sheet_name);

        let range = workbook
            .worksheet_range(&sheet_name)
            .change_context(TableSourceError::Unreadable)
            .attach_printable_lazy(|| format!("Failed to read sheet '{}'", sheet_name))?;

        let table = table_from_range(&range, &selection.columns)?;

        if table.row_count() == 0 {
            tracing::warn!(
                "Sheet '{}' of {} has a header but no data rows",
                sheet_name,
                selection.path.display()
            );
        }
        tracing::info!(
            "Loaded {} rows and {} columns from {}",
            table.row_count(),
            table.column_count(),
            selection.path.display()
        );

        Ok(table)
    }
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| cell_value(cell).is_empty())
}

/// Blank header cells get a positional name, so data under them is still labelled.
fn header_name(index: usize, cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Empty => format!("Unnamed: {}", index),
        value => value.to_string(),
    }
}

/// Maps each requested column name to its header position, keeping the requested order.
fn resolve_columns(
    header: &[String],
    requested: &[String],
) -> error_stack::Result<Vec<usize>, TableSourceError> {
    if requested.is_empty() {
        return Ok((0..header.len()).collect());
    }

    let mut positions = Vec::with_capacity(requested.len());
    let mut missing = Vec::new();
    for name in requested {
        match header.iter().position(|column| column == name) {
            Some(position) => positions.push(position),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(report!(TableSourceError::ColumnsNotFound(missing)))
            .attach_printable_lazy(|| format!("Header row: {:?}", header));
    }

    Ok(positions)
}

/// Builds a table from a worksheet range.
///
/// The first non-empty row is the header. Every following row up to the last non-empty one
/// is kept, with empty cells preserved so columns never shift.
pub fn table_from_range(
    range: &Range<Data>,
    columns: &[String],
) -> error_stack::Result<Table, TableSourceError> {
    let rows = range.rows().collect::<Vec<_>>();

    let header_index = rows
        .iter()
        .position(|row| !is_blank(row))
        .ok_or(report!(TableSourceError::NoHeaderRow))?;
    let last_index = rows
        .iter()
        .rposition(|row| !is_blank(row))
        .unwrap_or(header_index);

    let header = rows[header_index]
        .iter()
        .enumerate()
        .map(|(index, cell)| header_name(index, cell))
        .collect::<Vec<_>>();

    let positions = resolve_columns(&header, columns)?;

    let selected_header = positions
        .iter()
        .map(|&position| header[position].clone())
        .collect::<Vec<_>>();

    let data = rows[header_index + 1..=last_index]
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|&position| row.get(position).map(cell_value).unwrap_or(CellValue::Empty))
                .collect::<Row>()
        })
        .collect::<Vec<_>>();

    Table::new(selected_header, data).change_context(TableSourceError::MalformedTable)
}
