//! # Segmentation
//!
//! Derives the segment table from the structural markers in a text's content
//! and works out the edit that makes the content agree with it.
//!
//! A pass walks every op once:
//!
//! - a **verse** marker closes the segment in progress and opens
//!   `verse_<chapter>_<number>` right after itself;
//! - a **paragraph break** (`\n`, or any op with a `para` attribute) finalizes
//!   the segments of the paragraph it ends. Body styles keep the refs they have,
//!   header styles turn the paragraph into a `<style>_<n>` segment and the stanza
//!   break style `b` produces nothing;
//! - **annotation embeds** belong to the segment around them but are not text;
//! - everything else is segment text.
//!
//! Finalized segments are checked for the inconsistencies editing leaves behind
//! (missing or stale `segment` tags, empty segments, leftover blanks) and the
//! corrections are gathered into the fix delta. Applying it and running a second
//! pass produces an empty fix delta.

mod fix;
pub mod resolver;
pub mod styles;
pub mod table;
mod walk;

use indexmap::IndexMap;
use serde_json::Value;

use crate::delta::{Attributes, Delta, Embed, InsertValue, Op, attr, kinds};
use crate::models::TextRange;
use fix::FixBuilder;
use styles::{DEFAULT_PARA_STYLE, RefCounters, STANZA_BREAK_STYLE};
use walk::{ParagraphRun, SegmentInfo, WalkState};

pub use styles::{DEFAULT_PARA_STYLES, SegmentationOptions, verse_ref};
pub use table::SegmentTable;

/// Result of one segmentation pass
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub table: SegmentTable,
    /// Annotation embed id -> position of the embed
    pub embedded_elements: IndexMap<String, usize>,
    /// Correction to apply to the content; empty when it is already consistent
    pub fix_delta: Delta,
}

/// Run a full segmentation pass over `content`.
pub fn update_segments(content: &Delta, options: &SegmentationOptions) -> Segmentation {
    let mut walker = Walker::new(options);
    for op in &content.ops {
        walker.visit(op);
    }
    walker.finish()
}

enum OpRole<'a> {
    ParagraphBreak { style: Option<&'a str>, count: usize },
    Chapter(&'a Embed),
    Verse(&'a Embed),
    Annotation,
    Content,
}

/// A run of newlines, or any op carrying a `para` attribute
pub fn is_paragraph_break(op: &Op) -> bool {
    op.attribute(attr::PARA).is_some()
        || op
            .insert_value()
            .and_then(InsertValue::as_text)
            .is_some_and(|text| !text.is_empty() && text.chars().all(|c| c == '\n'))
}

fn classify<'a>(op: &'a Op, options: &SegmentationOptions) -> OpRole<'a> {
    if is_paragraph_break(op) {
        return OpRole::ParagraphBreak {
            style: op
                .attribute(attr::PARA)
                .and_then(|para| para.get("style"))
                .and_then(Value::as_str),
            count: op.len(),
        };
    }
    // anything unrecognised, including retains and deletes, counts as content
    match op.embed_value() {
        Some(embed) if embed.is(kinds::CHAPTER) => OpRole::Chapter(embed),
        Some(embed) if embed.is(kinds::VERSE) => OpRole::Verse(embed),
        Some(embed) if options.is_annotation(embed) => OpRole::Annotation,
        _ => OpRole::Content,
    }
}

fn text_attribute(op: &Op, name: &str) -> Option<String> {
    match op.attribute(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

struct Walker<'a> {
    options: &'a SegmentationOptions,
    table: SegmentTable,
    embedded_elements: IndexMap<String, usize>,
    counters: RefCounters,
    chapter: String,
    cur_index: usize,
    state: WalkState,
    convert: Delta,
    fix: FixBuilder,
}

impl<'a> Walker<'a> {
    fn new(options: &'a SegmentationOptions) -> Self {
        Self {
            options,
            table: SegmentTable::new(),
            embedded_elements: IndexMap::new(),
            counters: RefCounters::default(),
            chapter: String::new(),
            cur_index: 0,
            state: WalkState::Outside,
            convert: Delta::new(),
            fix: FixBuilder::default(),
        }
    }

    fn visit(&mut self, op: &Op) {
        let len = op.len();
        if len == 0 {
            return;
        }

        let mut correction = None;
        match classify(op, self.options) {
            OpRole::ParagraphBreak { style, count } => match style {
                Some(STANZA_BREAK_STYLE) => self.stanza_break(len),
                Some(style) if !self.options.can_contain_verse_text(style) => {
                    self.header_break(style, len)
                }
                _ => {
                    for _ in 0..count {
                        self.paragraph_break(style);
                        self.cur_index += 1;
                    }
                }
            },
            OpRole::Chapter(embed) => {
                self.chapter = embed.number().unwrap_or_default();
                self.chapter_marker();
            }
            OpRole::Verse(embed) => {
                correction = para_contents_correction(op);
                self.verse_marker(&embed.number().unwrap_or_default());
            }
            OpRole::Annotation => self.annotation(op),
            OpRole::Content => {
                correction = para_contents_correction(op);
                self.content(op);
            }
        }
        self.convert.retain(len, correction);
    }

    fn open_segment(&mut self) -> &mut SegmentInfo {
        let index = self.cur_index;
        if let WalkState::Outside = self.state {
            self.state = WalkState::InParagraph(ParagraphRun::default());
        }
        let WalkState::InParagraph(run) = &mut self.state else {
            unreachable!("state was just set to InParagraph");
        };
        run.open.get_or_insert_with(|| SegmentInfo::new("", index))
    }

    fn content(&mut self, op: &Op) {
        let is_blank = op.is_embed(kinds::BLANK);
        let initial = op.attribute(attr::INITIAL) == Some(&Value::Bool(true));
        let op_ref = text_attribute(op, attr::SEGMENT).unwrap_or_default();

        let segment = self.open_segment();
        segment.observe_ref(&op_ref);
        if is_blank {
            if segment.blank_offsets.is_empty() && initial {
                segment.has_initial_format = true;
            }
            segment.blank_offsets.push(segment.length);
        }
        segment.length += op.len();
    }

    fn annotation(&mut self, op: &Op) {
        let id = text_attribute(op, attr::EMBED_ID);
        let segment = self.open_segment();
        let position = segment.index + segment.length;
        segment.notes_count += 1;
        segment.length += 1;

        match id {
            Some(id) => {
                self.embedded_elements.insert(id, position);
            }
            None => log::debug!("annotation embed at {position} has no id"),
        }
    }

    fn verse_marker(&mut self, number: &str) {
        let mut run = self.state.take_run();
        if let Some(mut open) = run.open.take() {
            open.verse_next = true;
            self.cur_index += open.length;
            run.queued.push(open);
        } else if run.queued.is_empty() {
            // paragraph start before the first verse
            let mut placeholder = SegmentInfo::new("", self.cur_index);
            placeholder.verse_next = true;
            run.queued.push(placeholder);
        }
        self.cur_index += 1;
        run.open = Some(SegmentInfo::new(
            verse_ref(&self.chapter, number),
            self.cur_index,
        ));
        self.state = WalkState::InParagraph(run);
    }

    fn chapter_marker(&mut self) {
        let mut run = self.state.take_run();
        if let Some(open) = run.open.take()
            && open.length > 0
        {
            self.cur_index += open.length;
            run.queued.push(open);
        }
        self.cur_index += 1;
        self.state = run.into_state();
    }

    /// One newline ending a body paragraph. Leaves `cur_index` on the newline.
    fn paragraph_break(&mut self, style: Option<&str>) {
        let mut run = self.state.take_run();
        let mut next_open = None;
        if let Some(open) = run.open.take() {
            self.cur_index += open.length;
            next_open = Some(SegmentInfo::new(
                open.segment_ref.clone(),
                self.cur_index + 1,
            ));
            run.queued.push(open);
        }

        match style {
            Some(style) => {
                if run.queued.is_empty() {
                    let para_ref = self.counters.next_ref(style, style);
                    run.queued.push(SegmentInfo::new(para_ref, self.cur_index));
                } else if run.queued[0].segment_ref.is_empty() {
                    run.queued[0].segment_ref = self.counters.next_ref(style, style);
                }
            }
            None if !run.queued.is_empty() => {
                // an implicit paragraph has no segment of its own
                run.queued.remove(0);
            }
            None => {}
        }

        let style = style.unwrap_or(DEFAULT_PARA_STYLE);
        for mut segment in run.queued {
            while self.table.contains(&segment.segment_ref) {
                let parent = segment.segment_ref.clone();
                let prefix = format!("{parent}/{style}");
                let renamed = self.counters.next_ref(&parent, &prefix);
                log::trace!("{parent} already used, continuing as {renamed}");
                segment.segment_ref = renamed;
            }
            self.record(segment);
        }

        self.state = ParagraphRun {
            queued: Vec::new(),
            open: next_open,
        }
        .into_state();
    }

    fn header_break(&mut self, style: &str, len: usize) {
        let run = self.state.take_run();
        if !run.queued.is_empty() {
            log::debug!(
                "{} pending segment(s) dropped by {style} header",
                run.queued.len()
            );
        }
        let mut segment = run
            .open
            .unwrap_or_else(|| SegmentInfo::new("", self.cur_index));
        segment.segment_ref = self.counters.next_ref(style, style);
        self.cur_index += segment.length + len;
        self.record(segment);
    }

    fn stanza_break(&mut self, len: usize) {
        let run = self.state.take_run();
        if let Some(open) = run.open {
            self.cur_index += open.length;
        }
        self.cur_index += len;
    }

    fn record(&mut self, segment: SegmentInfo) {
        if segment.segment_ref.is_empty() {
            return;
        }
        self.fix.fix_segment(&segment);
        self.table.insert(
            segment.segment_ref,
            TextRange::new(segment.index, segment.length),
        );
    }

    fn finish(mut self) -> Segmentation {
        if let WalkState::InParagraph(_) = self.state {
            self.paragraph_break(None);
        }

        let mut fix_delta = self.convert.compose(&self.fix.into_delta());
        fix_delta.chop();
        log::debug!(
            "segmented {} position(s) into {} segment(s), {} correction op(s)",
            self.cur_index,
            self.table.len(),
            fix_delta.ops.len()
        );
        Segmentation {
            table: self.table,
            embedded_elements: self.embedded_elements,
            fix_delta,
        }
    }
}

fn para_contents_correction(op: &Op) -> Option<Attributes> {
    if op.attribute(attr::PARA_CONTENTS) == Some(&Value::Bool(true)) {
        return None;
    }
    let mut attrs = Attributes::new();
    attrs.insert(attr::PARA_CONTENTS.to_string(), Value::Bool(true));
    Some(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::attrs;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn para(style: &str) -> Option<Attributes> {
        Some(attrs(json!({ "para": { "style": style } })))
    }

    fn tagged(segment_ref: &str) -> Option<Attributes> {
        Some(attrs(json!({ "segment": segment_ref, "para-contents": true })))
    }

    fn segment(content: &Delta) -> Segmentation {
        update_segments(content, &SegmentationOptions::default())
    }

    fn refs(segmentation: &Segmentation) -> Vec<(String, usize, usize)> {
        segmentation
            .table
            .segments()
            .map(|(r, range)| (r.to_string(), range.index, range.length))
            .collect()
    }

    #[test]
    fn test_tagged_verse_needs_no_fix() {
        let mut content = Delta::new();
        content
            .insert_embed(Embed::chapter("1"), None)
            .insert_embed(Embed::verse("1"), Some(attrs(json!({ "para-contents": true }))))
            .insert("Hello", tagged("verse_1_1"));

        let result = segment(&content);
        assert_eq!(refs(&result), vec![("verse_1_1".to_string(), 2, 5)]);
        assert!(result.fix_delta.is_empty());
    }

    #[test]
    fn test_untagged_text_is_tagged() {
        let mut content = Delta::new();
        content.insert_embed(Embed::verse("1"), None).insert("Hello", None);

        let result = segment(&content);
        assert_eq!(refs(&result), vec![("verse__1".to_string(), 1, 5)]);
        assert_eq!(
            result.fix_delta.ops,
            vec![
                Op::retain(1, Some(attrs(json!({ "para-contents": true })))),
                Op::retain(5, tagged("verse__1")),
            ]
        );
    }

    #[test]
    fn test_styled_paragraph_gets_leading_segment() {
        let mut content = Delta::new();
        content
            .insert_embed(Embed::chapter("1"), None)
            .insert_embed(Embed::verse("1"), None)
            .insert("Hi", None)
            .insert("\n", para("p"));

        let result = segment(&content);
        assert_eq!(
            refs(&result),
            vec![
                ("p_1".to_string(), 1, 0),
                ("verse_1_1".to_string(), 2, 2),
            ]
        );
        // blank inserted before the verse marker, marked as a paragraph opener
        let blank = result
            .fix_delta
            .ops
            .iter()
            .find(|op| op.is_embed(kinds::BLANK))
            .expect("blank inserted");
        assert_eq!(blank.attribute(attr::SEGMENT), Some(&json!("p_1")));
        assert_eq!(blank.attribute(attr::INITIAL), Some(&json!(true)));
    }

    #[test]
    fn test_verse_continuing_into_next_paragraph_is_disambiguated() {
        let mut content = Delta::new();
        content
            .insert_embed(Embed::chapter("2"), None)
            .insert_embed(Embed::verse("1"), None)
            .insert("First line", None)
            .insert("\n", para("q1"))
            .insert("second line", None)
            .insert("\n", para("q2"));

        let result = segment(&content);
        let names: Vec<_> = result.table.refs().collect();
        assert_eq!(names, ["q1_1", "verse_2_1", "verse_2_1/q2_1"]);
        assert_eq!(result.table.lookup_range("verse_2_1/q2_1"), Some(TextRange::new(13, 11)));
    }

    #[test]
    fn test_header_paragraphs_count_per_style() {
        let mut content = Delta::new();
        content
            .insert("Title one", None)
            .insert("\n", para("s"))
            .insert("Title two", None)
            .insert("\n", para("s"))
            .insert("Book", None)
            .insert("\n", para("mt1"));

        let result = segment(&content);
        let names: Vec<_> = result.table.refs().collect();
        assert_eq!(names, ["s_1", "s_2", "mt1_1"]);
    }

    #[test]
    fn test_stanza_break_records_nothing() {
        let mut content = Delta::new();
        content.insert("\n", para("b"));

        let result = segment(&content);
        assert!(result.table.is_empty());
        assert!(result.fix_delta.is_empty());
    }

    #[test]
    fn test_annotation_is_recorded_and_counted() {
        let note = Embed::new(kinds::NOTE_THREAD, json!({ "iconsource": "--icon-file" }));
        let mut content = Delta::new();
        content
            .insert_embed(Embed::verse("1"), Some(attrs(json!({ "para-contents": true }))))
            .insert("In", tagged("verse__1"))
            .insert_embed(note, Some(attrs(json!({ "embedid": "thread01" }))))
            .insert(" the beginning", tagged("verse__1"));

        let result = segment(&content);
        assert_eq!(result.embedded_elements.get("thread01"), Some(&3));
        assert_eq!(result.table.lookup_range("verse__1"), Some(TextRange::new(1, 17)));
        assert!(result.fix_delta.is_empty());
    }

    #[test]
    fn test_repeated_verse_number_is_disambiguated_with_default_style() {
        let mut content = Delta::new();
        content
            .insert_embed(Embed::verse("1"), None)
            .insert("a", None)
            .insert_embed(Embed::verse("1"), None)
            .insert("b", None);

        let result = segment(&content);
        let names: Vec<_> = result.table.refs().collect();
        assert_eq!(names, ["verse__1", "verse__1/p_1"]);
    }
}
