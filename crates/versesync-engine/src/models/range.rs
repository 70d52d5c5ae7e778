use serde::{Deserialize, Serialize};

/// A span of document positions, expressed the way editing surfaces report
/// selections: a start index and a length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub index: usize,
    pub length: usize,
}

impl TextRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// A zero-length cursor position
    pub fn cursor(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.index..self.end()
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{}]", self.index, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_std_range() {
        assert_eq!(TextRange::from(3..8), TextRange::new(3, 5));
        assert_eq!(TextRange::new(3, 5).as_range(), 3..8);
        assert_eq!(TextRange::new(3, 5).to_string(), "[3..8]");
    }
}
