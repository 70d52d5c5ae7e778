use crate::models::TextRange;

/// Pick the segment that best matches `range`: the one sharing the most
/// positions with it, the left-most on a tie.
///
/// `segments` must be in ascending, disjoint order; the scan stops at the first
/// segment reaching the end of `range`. A cursor inside a segment, or touching
/// its end, overlaps by zero and still resolves to it.
pub fn resolve<'a>(
    segments: impl IntoIterator<Item = (&'a str, TextRange)>,
    range: TextRange,
) -> Option<&'a str> {
    let range_end = range.end() as isize;
    let mut best = None;
    let mut max_overlap = -1isize;

    for (segment_ref, segment_range) in segments {
        let seg_end = segment_range.end() as isize;
        if (range.index as isize) > seg_end {
            continue;
        }
        let overlap = range_end.min(seg_end) - (range.index.max(segment_range.index) as isize);
        if overlap > max_overlap {
            best = Some(segment_ref);
            max_overlap = overlap;
        }
        if range_end <= seg_end {
            break;
        }
    }
    best
}
