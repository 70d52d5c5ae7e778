use serde_json::Value;

use crate::delta::{Attributes, Delta, Embed, attr};
use crate::segmentation::walk::SegmentInfo;

fn segment_tag(segment_ref: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(attr::SEGMENT.to_string(), Value::from(segment_ref));
    attrs.insert(attr::PARA_CONTENTS.to_string(), Value::Bool(true));
    attrs
}

/// Accumulates the corrective edit for one pass.
///
/// Each segment's correction is expressed against the content as already
/// corrected by the segments before it, so `offset` tracks the net length the
/// fix has added so far.
#[derive(Debug, Default)]
pub(crate) struct FixBuilder {
    delta: Delta,
    offset: isize,
}

impl FixBuilder {
    pub fn into_delta(self) -> Delta {
        self.delta
    }

    fn at(&self, position: usize) -> usize {
        (position as isize + self.offset).max(0) as usize
    }

    fn compose(&mut self, correction: Delta) {
        self.delta = self.delta.compose(&correction);
    }

    pub fn fix_segment(&mut self, segment: &SegmentInfo) {
        let stale = segment.segment_ref != segment.original_ref();
        let tag = stale.then(|| segment_tag(&segment.segment_ref));
        let blanks = segment.blank_offsets.len();
        let has_text = segment.content_len() > blanks;

        if segment.content_len() == 0 {
            let mut attrs = segment_tag(&segment.segment_ref);
            if segment.is_initial() {
                attrs.insert(attr::INITIAL.to_string(), Value::Bool(true));
            }
            let mut correction = Delta::new();
            correction
                .retain(self.at(segment.index + segment.notes_count), None)
                .insert_embed(Embed::blank(), Some(attrs));
            log::trace!("{}: inserting blank", segment.segment_ref);
            self.compose(correction);
            self.offset += 1;
        } else if blanks > 0 && (has_text || blanks > 1) {
            // only a lone blank with nothing else beside it survives
            let (keep, stale_blanks) = if has_text {
                (None, &segment.blank_offsets[..])
            } else {
                (Some(segment.blank_offsets[0]), &segment.blank_offsets[1..])
            };
            let kept_attrs = keep.map(|_| {
                let mut attrs = tag.clone().unwrap_or_default();
                if segment.is_initial() && !segment.has_initial_format {
                    attrs.insert(attr::INITIAL.to_string(), Value::Bool(true));
                }
                attrs
            });

            let mut correction = Delta::new();
            correction.retain(self.at(segment.index), None);
            let mut pos = 0;
            if let (Some(kept), Some(attrs)) = (keep, kept_attrs) {
                correction
                    .retain(kept, tag.clone())
                    .retain(1, (!attrs.is_empty()).then_some(attrs));
                pos = kept + 1;
            }
            for &offset in stale_blanks {
                correction.retain(offset - pos, tag.clone()).delete(1);
                pos = offset + 1;
            }
            correction.retain(segment.length - pos, tag);
            log::trace!(
                "{}: deleting {} stale blank(s)",
                segment.segment_ref,
                stale_blanks.len()
            );
            self.compose(correction);
            self.offset -= stale_blanks.len() as isize;
        } else if blanks == 1 && segment.is_initial() && !segment.has_initial_format {
            let blank = segment.blank_offsets[0];
            let mut initial = tag.clone().unwrap_or_default();
            initial.insert(attr::INITIAL.to_string(), Value::Bool(true));

            let mut correction = Delta::new();
            correction
                .retain(self.at(segment.index), None)
                .retain(blank, tag.clone())
                .retain(1, Some(initial))
                .retain(segment.length - blank - 1, tag);
            log::trace!("{}: marking blank as initial", segment.segment_ref);
            self.compose(correction);
        } else if stale {
            let mut correction = Delta::new();
            correction
                .retain(self.at(segment.index), None)
                .retain(segment.length, tag);
            log::trace!(
                "{}: retagging (was {:?})",
                segment.segment_ref,
                segment.original_ref()
            );
            self.compose(correction);
        }
    }
}
