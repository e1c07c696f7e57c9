use super::cell_position::CellPosition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl CellRange {
    /// The block of `row_count` x `column_count` cells anchored at `A1`.
    /// An empty block collapses to the single origin cell.
    pub fn anchored_block(row_count: usize, column_count: usize) -> Self {
        CellRange {
            start: CellPosition::origin(),
            end: CellPosition::from_offset(
                row_count.saturating_sub(1),
                column_count.saturating_sub(1),
            ),
        }
    }

    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn column_count(&self) -> u32 {
        self.end.col.value() - self.start.col.value() + 1
    }
}
