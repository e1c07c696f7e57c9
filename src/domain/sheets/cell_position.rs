use super::column::Column;

/// A cell address; `row` is 1-based like the A1 notation it renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub col: Column,
    pub row: u32,
}

impl CellPosition {
    pub fn origin() -> Self {
        CellPosition {
            col: Column::from_index(0),
            row: 1,
        }
    }

    /// Position of the zero-based `(row, col)` offset from `A1`.
    pub fn from_offset(row: usize, col: usize) -> Self {
        CellPosition {
            col: Column::from_index(col),
            row: u32::try_from(row).unwrap_or(u32::MAX - 1).saturating_add(1),
        }
    }
}
