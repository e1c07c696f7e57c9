pub mod cell_conversion;
pub mod workbook_reader;
