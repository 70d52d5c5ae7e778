use std::ops::Range;

use crate::delta::{Delta, Op};

/// Result of applying an edit to a surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    /// Ranges of the new content touched by the edit; a deletion leaves an
    /// empty range where the removed text was
    pub changed: Vec<Range<usize>>,
    pub version: u64,
}

impl Patch {
    /// Describe `edit` against the content it was applied to.
    pub fn from_edit(edit: &Delta, version: u64) -> Self {
        let mut changed: Vec<Range<usize>> = Vec::new();
        let mut cursor = 0;
        for op in &edit.ops {
            let touched = match op {
                Op::Retain { retain, attributes } => {
                    let start = cursor;
                    cursor += retain;
                    if attributes.is_empty() {
                        continue;
                    }
                    start..cursor
                }
                Op::Insert { .. } => {
                    let start = cursor;
                    cursor += op.len();
                    start..cursor
                }
                Op::Delete { .. } => cursor..cursor,
            };
            match changed.last_mut() {
                Some(last) if last.end == touched.start => last.end = touched.end,
                _ => changed.push(touched),
            }
        }
        Self { changed, version }
    }

    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}
