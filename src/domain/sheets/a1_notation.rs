use std::fmt::Formatter;

use super::{cell_position::CellPosition, cell_range::CellRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl A1Notation {
    /// Every cell of the tab, e.g. `'Sales 2024'`.
    pub fn whole_sheet(sheet_title: &str) -> Self {
        A1Notation(quote_sheet_title(sheet_title))
    }
}

/// Sheet titles are always quoted; embedded quotes are doubled (`Bob's` -> `'Bob''s'`).
pub fn quote_sheet_title(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_title: Option<&str>) -> A1Notation;
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_title: Option<&str>) -> A1Notation {
        match sheet_title {
            Some(sheet_title) => A1Notation(format!(
                "{}!{}{}",
                quote_sheet_title(sheet_title),
                self.col,
                self.row
            )),
            None => A1Notation(format!("{}{}", self.col, self.row)),
        }
    }
}

impl ToA1Notation for CellRange {
    fn to_a1_notation(&self, sheet_title: Option<&str>) -> A1Notation {
        let start = self.start.to_a1_notation(None);
        if self.start == self.end {
            return self.start.to_a1_notation(sheet_title);
        }
        let end = self.end.to_a1_notation(None);

        match sheet_title {
            Some(sheet_title) => A1Notation(format!(
                "{}!{}:{}",
                quote_sheet_title(sheet_title),
                start,
                end
            )),
            None => A1Notation(format!("{}:{}", start, end)),
        }
    }
}
