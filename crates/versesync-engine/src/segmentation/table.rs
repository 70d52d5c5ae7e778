use indexmap::IndexMap;

use crate::models::TextRange;
use crate::segmentation::resolver;

/// Segment ref -> range, in document order.
///
/// Rebuilt from scratch on every segmentation pass and never patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentTable {
    ranges: IndexMap<String, TextRange>,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, segment_ref: String, range: TextRange) {
        self.ranges.insert(segment_ref, range);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, segment_ref: &str) -> bool {
        self.ranges.contains_key(segment_ref)
    }

    pub fn lookup_range(&self, segment_ref: &str) -> Option<TextRange> {
        self.ranges.get(segment_ref).copied()
    }

    /// `(ref, range)` pairs in document order
    pub fn segments(&self) -> impl Iterator<Item = (&str, TextRange)> + '_ {
        self.ranges.iter().map(|(r, range)| (r.as_str(), *range))
    }

    pub fn refs(&self) -> impl Iterator<Item = &str> + '_ {
        self.ranges.keys().map(String::as_str)
    }

    pub fn resolve_ref(&self, range: impl Into<Option<TextRange>>) -> Option<&str> {
        resolver::resolve(self.segments(), range.into()?)
    }

    pub fn next_ref(&self, segment_ref: &str) -> Option<&str> {
        let index = self.ranges.get_index_of(segment_ref)?;
        self.ranges.get_index(index + 1).map(|(r, _)| r.as_str())
    }

    pub fn prev_ref(&self, segment_ref: &str) -> Option<&str> {
        let index = self.ranges.get_index_of(segment_ref)?;
        let prev = index.checked_sub(1)?;
        self.ranges.get_index(prev).map(|(r, _)| r.as_str())
    }

    /// Refs disambiguated from `segment_ref`, i.e. its continuations into later
    /// paragraphs.
    pub fn related_refs(&self, segment_ref: &str) -> Vec<&str> {
        let prefix = format!("{segment_ref}/");
        self.refs().filter(|r| r.starts_with(&prefix)).collect()
    }
}

impl<'a> IntoIterator for &'a SegmentTable {
    type Item = (&'a String, &'a TextRange);
    type IntoIter = indexmap::map::Iter<'a, String, TextRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
