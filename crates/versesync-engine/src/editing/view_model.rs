use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use serde_json::Value;

use crate::delta::{Attributes, Delta, Op, attr};
use crate::editing::{ChangeSource, EditorSurface, Patch, RangeRemapper};
use crate::models::{Segment, TextRange};
use crate::segmentation::{
    Segmentation, SegmentTable, SegmentationOptions, is_paragraph_break, update_segments,
};

/// Corrective passes [`TextViewModel::run_deferred`] applies before giving up
pub const MAX_CORRECTION_PASSES: usize = 8;

/// Attributes that only exist for display and never reach the document model
pub const VIEW_ONLY_ATTRIBUTES: &[&str] = &[
    attr::HIGHLIGHT_SEGMENT,
    attr::HIGHLIGHT_PARA,
    attr::PARA_CONTENTS,
    "question-segment",
    "question-count",
    "note-thread-segment",
    "note-thread-count",
    "note-thread",
    "note-icon-source",
    "note-preview",
    attr::INITIAL,
    "direction-segment",
    "direction-block",
    "style-description",
];

/// A fix delta waiting to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredEdit {
    pub delta: Delta,
    /// Source of the change the correction was computed for
    pub source: ChangeSource,
    /// Surface version the correction was computed against
    pub version: u64,
}

/// Keeps the segment table of an [`EditorSurface`] in step with its content.
///
/// Every change to the surface re-runs segmentation over the whole content.
/// Corrections are queued rather than applied on the spot; the owner drains
/// the queue with [`TextViewModel::run_deferred`] once the edit that caused
/// them has been fully handled.
pub struct TextViewModel<S: EditorSurface> {
    surface: S,
    options: SegmentationOptions,
    table: SegmentTable,
    embedded_elements: IndexMap<String, usize>,
    remapper: RangeRemapper,
    deferred: VecDeque<DeferredEdit>,
}

impl<S: EditorSurface> TextViewModel<S> {
    /// Bind to `surface` and segment its current content.
    pub fn new(surface: S, options: SegmentationOptions) -> Self {
        let mut model = Self {
            surface,
            options,
            table: SegmentTable::new(),
            embedded_elements: IndexMap::new(),
            remapper: RangeRemapper::default(),
            deferred: VecDeque::new(),
        };
        model.content_changed(ChangeSource::Api);
        model
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn options(&self) -> &SegmentationOptions {
        &self.options
    }

    /// Content-changed notification: re-segment and queue any correction.
    pub fn content_changed(&mut self, source: ChangeSource) {
        let contents = self.surface.contents();
        let Segmentation {
            table,
            embedded_elements,
            fix_delta,
        } = update_segments(&contents, &self.options);

        self.table = table;
        self.embedded_elements = embedded_elements;
        self.remapper = RangeRemapper::from_surface(&contents, &self.options);

        if !fix_delta.is_empty() {
            let version = self.surface.version();
            log::debug!(
                "queueing {} correction op(s) against v{version}",
                fix_delta.ops.len()
            );
            self.deferred.push_back(DeferredEdit {
                delta: fix_delta,
                source,
                version,
            });
        }
    }

    /// Apply an edit typed on the surface.
    ///
    /// Returns the same edit in document-model terms, ready to submit upstream;
    /// it is empty when the edit only touched view-only formatting.
    pub fn apply_local_edit(&mut self, delta: &Delta) -> Delta {
        let model_delta = self.view_to_data(delta);
        self.surface.update_contents(delta, ChangeSource::User);
        self.content_changed(ChangeSource::User);
        model_delta
    }

    /// Apply operations that arrived from collaborators.
    pub fn apply_remote_edit(&mut self, delta: &Delta) -> Patch {
        let patch = self.surface.update_contents(delta, ChangeSource::Api);
        self.content_changed(ChangeSource::Api);
        patch
    }

    pub fn pending_corrections(&self) -> impl Iterator<Item = &DeferredEdit> + '_ {
        self.deferred.iter()
    }

    /// Apply queued corrections until the content is consistent.
    ///
    /// A correction computed against an older surface version is dropped; if
    /// nothing newer is queued the content is segmented again. Returns how many
    /// corrections were applied.
    pub fn run_deferred(&mut self) -> usize {
        let mut applied = 0;
        while let Some(edit) = self.deferred.pop_front() {
            let current = self.surface.version();
            if edit.version != current {
                log::debug!(
                    "dropping correction for v{}, surface is at v{current}",
                    edit.version
                );
                if self.deferred.is_empty() {
                    self.content_changed(edit.source);
                }
                continue;
            }
            if applied == MAX_CORRECTION_PASSES {
                log::warn!(
                    "segment corrections still pending after {MAX_CORRECTION_PASSES} passes, giving up"
                );
                self.deferred.clear();
                break;
            }

            self.surface.update_contents(&edit.delta, ChangeSource::Silent);
            applied += 1;
            self.content_changed(edit.source);
        }
        applied
    }

    pub fn table(&self) -> &SegmentTable {
        &self.table
    }

    pub fn segments(&self) -> impl Iterator<Item = (&str, TextRange)> + '_ {
        self.table.segments()
    }

    pub fn lookup_range(&self, segment_ref: &str) -> Option<TextRange> {
        self.table.lookup_range(segment_ref)
    }

    pub fn resolve_ref(&self, range: impl Into<Option<TextRange>>) -> Option<&str> {
        self.table.resolve_ref(range)
    }

    /// Annotation embed id -> surface position
    pub fn embedded_elements(&self) -> &IndexMap<String, usize> {
        &self.embedded_elements
    }

    /// Range of `segment_ref` without the annotation embeds
    pub fn model_range(&self, segment_ref: &str) -> Option<TextRange> {
        self.lookup_range(segment_ref)
            .map(|range| self.remapper.to_model_range(range))
    }

    pub fn remapper(&self) -> &RangeRemapper {
        &self.remapper
    }

    pub fn segment_text(&self, segment_ref: &str) -> String {
        self.lookup_range(segment_ref)
            .map(|range| self.surface.contents().text_in(range.as_range()))
            .unwrap_or_default()
    }

    pub fn segment(&self, segment_ref: &str) -> Option<Segment> {
        let mut segment = Segment::new(segment_ref);
        self.refresh_segment(&mut segment).then_some(segment)
    }

    /// Bring `segment` up to date with the current content. Returns `false`
    /// when its ref is no longer in the table.
    pub fn refresh_segment(&self, segment: &mut Segment) -> bool {
        let Some(range) = self.lookup_range(segment.segment_ref()) else {
            return false;
        };
        let text = self.surface.contents().text_in(range.as_range());
        let embeds: HashMap<String, usize> = self
            .embedded_elements
            .iter()
            .filter(|&(_, &position)| range.as_range().contains(&position))
            .map(|(id, position)| (id.clone(), position - range.index))
            .collect();
        segment.update(text, range, embeds);
        true
    }

    /// Highlight exactly the segments in `refs`, and the paragraph break that
    /// follows each, clearing any earlier highlight.
    pub fn highlight(&mut self, refs: &[&str]) -> Patch {
        let refs: HashSet<&str> = refs.iter().copied().collect();
        let contents = self.surface.contents();
        let mut delta = Delta::new();
        let mut highlight_para = false;

        for op in &contents.ops {
            let mut change = None;
            if let Some(segment_ref) = op.attribute(attr::SEGMENT).and_then(Value::as_str) {
                if refs.contains(segment_ref) {
                    change = Some(single(attr::HIGHLIGHT_SEGMENT, Value::Bool(true)));
                    highlight_para = true;
                } else if op.attribute(attr::HIGHLIGHT_SEGMENT).is_some() {
                    change = Some(single(attr::HIGHLIGHT_SEGMENT, Value::Null));
                }
            } else if is_paragraph_break(op) {
                if highlight_para {
                    change = Some(single(attr::HIGHLIGHT_PARA, Value::Bool(true)));
                    highlight_para = false;
                } else if op.attribute(attr::HIGHLIGHT_PARA).is_some() {
                    change = Some(single(attr::HIGHLIGHT_PARA, Value::Null));
                }
            }
            delta.retain(op.len(), change);
        }
        delta.chop();
        self.surface.update_contents(&delta, ChangeSource::Silent)
    }

    /// Set a presentation attribute over a whole segment.
    pub fn format_segment(&mut self, segment_ref: &str, name: &str, value: Value) -> Option<Patch> {
        let range = self.lookup_range(segment_ref)?;
        Some(
            self.surface
                .format_text(range.index, range.length, name, value, ChangeSource::Silent),
        )
    }

    /// Translate a surface edit into a document-model edit: view-only
    /// attributes are dropped and annotation embeds are stepped over.
    pub fn view_to_data(&self, delta: &Delta) -> Delta {
        let mut embeds = self.remapper.surface_positions().peekable();

        let mut model = Delta::new();
        let mut cursor = 0;
        for op in &delta.ops {
            let mut op = op.clone();
            match &mut op {
                Op::Insert { attributes, .. } => strip_view_only(attributes),
                Op::Retain { retain, attributes } => {
                    strip_view_only(attributes);
                    cursor += *retain;
                    while embeds.next_if(|&position| position < cursor).is_some() {
                        *retain = retain.saturating_sub(1);
                    }
                }
                Op::Delete { delete } => {
                    cursor += *delete;
                    while embeds.next_if(|&position| position < cursor).is_some() {
                        *delete = delete.saturating_sub(1);
                    }
                }
            }
            model.push(op);
        }
        model.chop();
        model
    }
}

fn single(name: &str, value: Value) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(name.to_string(), value);
    attrs
}

fn strip_view_only(attributes: &mut Attributes) {
    for name in VIEW_ONLY_ATTRIBUTES {
        attributes.remove(*name);
    }
}
