use std::cell::OnceCell;
use std::collections::HashMap;

use crate::models::TextRange;

/// CRC-32 (IEEE) of the UTF-8 bytes of `text`
pub fn checksum(text: &str) -> u32 {
    crc32fast::hash(text.as_bytes())
}

/// One addressable unit of text (a verse or paragraph fragment) bound to a ref.
///
/// The ref never changes; text, range and embed offsets are replaced through
/// [`Segment::update`]. The first update (or [`Segment::with_initial_checksum`])
/// fixes the baseline that [`Segment::is_changed`] and
/// [`Segment::productive_character_count`] are measured against, so a segment
/// freshly loaded from a snapshot does not look dirty.
#[derive(Debug, Clone)]
pub struct Segment {
    segment_ref: String,
    text: String,
    range: TextRange,
    /// Embedded element id -> offset within the segment
    embeds: HashMap<String, usize>,
    checksum: OnceCell<u32>,
    initial_checksum: Option<u32>,
    initial_text_len: Option<usize>,
}

impl Segment {
    pub fn new(segment_ref: impl Into<String>) -> Self {
        Self {
            segment_ref: segment_ref.into(),
            text: String::new(),
            range: TextRange::default(),
            embeds: HashMap::new(),
            checksum: OnceCell::new(),
            initial_checksum: None,
            initial_text_len: None,
        }
    }

    /// Seed the dirty baseline with a checksum recorded earlier.
    pub fn with_initial_checksum(mut self, checksum: u32) -> Self {
        self.initial_checksum = Some(checksum);
        self
    }

    pub fn segment_ref(&self) -> &str {
        &self.segment_ref
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn embeds(&self) -> &HashMap<String, usize> {
        &self.embeds
    }

    pub fn update(
        &mut self,
        text: impl Into<String>,
        range: TextRange,
        embeds: HashMap<String, usize>,
    ) {
        self.text = text.into();
        self.range = range;
        self.embeds = embeds;
        self.checksum = OnceCell::new();

        if self.initial_text_len.is_none() {
            self.initial_text_len = Some(self.text_len());
            if self.initial_checksum.is_none() {
                self.initial_checksum = Some(self.checksum());
            }
        }
    }

    pub fn checksum(&self) -> u32 {
        *self.checksum.get_or_init(|| checksum(&self.text))
    }

    /// Baseline to persist and later hand back to [`Segment::with_initial_checksum`]
    pub fn initial_checksum(&self) -> Option<u32> {
        self.initial_checksum
    }

    pub fn is_changed(&self) -> bool {
        self.initial_checksum != Some(self.checksum())
    }

    /// Characters added since the baseline; negative after net deletions.
    pub fn productive_character_count(&self) -> isize {
        self.text_len() as isize - self.initial_text_len.unwrap_or(0) as isize
    }

    /// Make the current state the new baseline.
    pub fn accept_changes(&mut self) {
        self.initial_text_len = Some(self.text_len());
        self.initial_checksum = Some(self.checksum());
    }

    /// True for a placeholder-only segment, which has no text to act on.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}
