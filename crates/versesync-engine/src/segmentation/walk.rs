/// An in-progress segment gathered during the walk
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SegmentInfo {
    pub segment_ref: String,
    pub index: usize,
    pub length: usize,
    /// The `segment` attribute the content already carries; empty when the
    /// ops disagree or carry none.
    pub original_ref: Option<String>,
    /// Offsets of blank placeholders within the segment, ascending
    pub blank_offsets: Vec<usize>,
    pub notes_count: usize,
    /// Closed by a verse marker rather than by a paragraph break
    pub verse_next: bool,
    pub has_initial_format: bool,
}

impl SegmentInfo {
    pub fn new(segment_ref: impl Into<String>, index: usize) -> Self {
        Self {
            segment_ref: segment_ref.into(),
            index,
            ..Self::default()
        }
    }

    pub fn original_ref(&self) -> &str {
        self.original_ref.as_deref().unwrap_or("")
    }

    pub fn observe_ref(&mut self, op_ref: &str) {
        match &self.original_ref {
            None => self.original_ref = Some(op_ref.to_string()),
            Some(existing) if existing != op_ref => self.original_ref = Some(String::new()),
            Some(_) => {}
        }
    }

    /// Positions holding something other than annotation embeds
    pub fn content_len(&self) -> usize {
        self.length.saturating_sub(self.notes_count)
    }

    /// Opens a paragraph: it sits before a verse and is either a paragraph ref
    /// or a disambiguated continuation.
    pub fn is_initial(&self) -> bool {
        self.verse_next
            && (!self.segment_ref.starts_with("verse") || self.segment_ref.contains('/'))
    }
}

/// Segments gathered since the last paragraph break
#[derive(Debug, Default)]
pub(crate) struct ParagraphRun {
    /// Closed segments waiting for the paragraph style
    pub queued: Vec<SegmentInfo>,
    /// The segment currently accumulating content
    pub open: Option<SegmentInfo>,
}

impl ParagraphRun {
    pub fn into_state(self) -> WalkState {
        if self.queued.is_empty() && self.open.is_none() {
            WalkState::Outside
        } else {
            WalkState::InParagraph(self)
        }
    }
}

#[derive(Debug, Default)]
pub(crate) enum WalkState {
    /// Nothing pending: start of text, or just after a header, stanza break or chapter
    #[default]
    Outside,
    InParagraph(ParagraphRun),
}

impl WalkState {
    pub fn take_run(&mut self) -> ParagraphRun {
        match std::mem::take(self) {
            WalkState::Outside => ParagraphRun::default(),
            WalkState::InParagraph(run) => run,
        }
    }
}
