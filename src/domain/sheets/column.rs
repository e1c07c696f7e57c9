use std::fmt::Formatter;

/// 1-based spreadsheet column, displayed as letters (`1 -> A`, `27 -> AA`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column(u32);

impl Column {
    /// Column from a zero-based offset, so an empty block still starts at `A`.
    pub fn from_index(index: usize) -> Self {
        Column(u32::try_from(index).unwrap_or(u32::MAX - 1).saturating_add(1))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

fn number_to_letters(number: u32) -> String {
    let mut number = number.max(1);
    let mut result = Vec::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        result.push((remainder as u8 + b'A') as char);
        number = (number - remainder - 1) / 26;
    }
    result.iter().rev().collect()
}
