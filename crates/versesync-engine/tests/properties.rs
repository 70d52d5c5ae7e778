use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use versesync_engine::delta::{Attributes, Delta, Embed, attrs, kinds};
use versesync_engine::segmentation::{SegmentationOptions, is_paragraph_break, update_segments};
use versesync_engine::{Segment, TextRange};

#[derive(Debug, Clone)]
enum Token {
    Chapter(u8),
    Verse(u8),
    Text(String, Option<&'static str>),
    Blank { initial: bool },
    Note,
    Break(Option<&'static str>),
}

const STYLES: &[Option<&str>] = &[
    None,
    Some("p"),
    Some("m"),
    Some("q1"),
    Some("q2"),
    Some("s"),
    Some("mt1"),
    Some("b"),
];

const TAGS: &[Option<&str>] = &[
    None,
    Some("verse_1_1"),
    Some("verse_1_2"),
    Some("p_1"),
    Some("s_1"),
];

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        1 => (1u8..3).prop_map(Token::Chapter),
        3 => (1u8..4).prop_map(Token::Verse),
        4 => ("[a-z ]{1,6}", prop::sample::select(TAGS)).prop_map(|(t, tag)| Token::Text(t, tag)),
        2 => any::<bool>().prop_map(|initial| Token::Blank { initial }),
        1 => Just(Token::Note),
        3 => prop::sample::select(STYLES).prop_map(Token::Break),
    ]
}

fn build(tokens: &[Token]) -> Delta {
    let mut delta = Delta::new();
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Chapter(n) => {
                delta.insert_embed(Embed::chapter(&n.to_string()), None);
            }
            Token::Verse(n) => {
                delta.insert_embed(Embed::verse(&n.to_string()), None);
            }
            Token::Text(text, tag) => {
                delta.insert(text.clone(), tag.map(|t| attrs(json!({ "segment": t }))));
            }
            Token::Blank { initial } => {
                let attributes: Option<Attributes> =
                    initial.then(|| attrs(json!({ "initial": true })));
                delta.insert_embed(Embed::blank(), attributes);
            }
            Token::Note => {
                delta.insert_embed(
                    Embed::new(kinds::NOTE_THREAD, json!({})),
                    Some(attrs(json!({ "embedid": format!("note{i}") }))),
                );
            }
            Token::Break(style) => {
                delta.insert(
                    "\n",
                    style.map(|s| attrs(json!({ "para": { "style": s } }))),
                );
            }
        }
    }
    delta
}

fn document() -> impl Strategy<Value = Delta> {
    prop::collection::vec(token(), 0..24).prop_map(|tokens| build(&tokens))
}

/// A paragraph of well-formed content: body paragraphs hold verses, headers never do
#[derive(Debug, Clone)]
enum Paragraph {
    Chapter(u8),
    Body {
        runs: Vec<(Option<u8>, String)>,
        style: &'static str,
    },
    Header {
        text: String,
        style: &'static str,
    },
}

fn paragraph() -> impl Strategy<Value = Paragraph> {
    let run = (prop::option::of(1u8..6), "[a-z]{1,5}");
    prop_oneof![
        1 => (1u8..3).prop_map(Paragraph::Chapter),
        4 => (
            prop::collection::vec(run, 1..4),
            prop::sample::select(&["p", "m", "q1", "q2", "li1"][..]),
        )
            .prop_map(|(runs, style)| Paragraph::Body { runs, style }),
        1 => ("[a-z]{1,5}", prop::sample::select(&["s", "s1", "mt1", "ms"][..]))
            .prop_map(|(text, style)| Paragraph::Header { text, style }),
    ]
}

fn well_formed() -> impl Strategy<Value = Delta> {
    prop::collection::vec(paragraph(), 0..10).prop_map(|paragraphs| {
        let mut delta = Delta::new();
        for paragraph in paragraphs {
            match paragraph {
                Paragraph::Chapter(n) => {
                    delta.insert_embed(Embed::chapter(&n.to_string()), None);
                }
                Paragraph::Body { runs, style } => {
                    for (verse, text) in runs {
                        if let Some(n) = verse {
                            delta.insert_embed(Embed::verse(&n.to_string()), None);
                        }
                        delta.insert(text, None);
                    }
                    delta.insert("\n", Some(attrs(json!({ "para": { "style": style } }))));
                }
                Paragraph::Header { text, style } => {
                    delta
                        .insert(text, None)
                        .insert("\n", Some(attrs(json!({ "para": { "style": style } }))));
                }
            }
        }
        delta
    })
}

proptest! {
    #[test]
    fn corrected_content_needs_no_further_fix(content in document()) {
        let options = SegmentationOptions::default();
        let first = update_segments(&content, &options);
        let corrected = content.compose(&first.fix_delta);

        let second = update_segments(&corrected, &options);
        prop_assert!(second.fix_delta.is_empty(), "second pass fix: {:?}", second.fix_delta);
        prop_assert_eq!(
            first.table.refs().collect::<Vec<_>>(),
            second.table.refs().collect::<Vec<_>>()
        );
    }

    #[test]
    fn segments_are_ordered_and_disjoint(content in document()) {
        let result = update_segments(&content, &SegmentationOptions::default());
        let length = content.length();

        let mut previous_end = 0;
        let mut covered = 0;
        for (segment_ref, range) in result.table.segments() {
            prop_assert!(!segment_ref.is_empty());
            prop_assert!(range.index >= previous_end, "{segment_ref} overlaps its predecessor");
            prop_assert!(range.end() <= length);
            previous_end = range.end();
            covered += range.length;
        }
        prop_assert!(covered <= length);
    }

    #[test]
    fn only_markers_and_breaks_fall_outside_segments(content in well_formed()) {
        let options = SegmentationOptions::default();
        let first = update_segments(&content, &options);
        let corrected = content.compose(&first.fix_delta);
        let second = update_segments(&corrected, &options);

        let mut covered = vec![false; corrected.length()];
        for (_, range) in second.table.segments() {
            covered[range.as_range()].fill(true);
        }

        let mut position = 0;
        for op in &corrected.ops {
            let structural = op.is_embed(kinds::CHAPTER)
                || op.is_embed(kinds::VERSE)
                || is_paragraph_break(op);
            for offset in 0..op.len() {
                prop_assert!(
                    structural || covered[position + offset],
                    "position {} ({:?}) is outside every segment",
                    position + offset,
                    op
                );
            }
            position += op.len();
        }
    }

    #[test]
    fn empty_segments_converge_to_one_blank(content in document()) {
        let options = SegmentationOptions::default();
        let first = update_segments(&content, &options);
        let corrected = content.compose(&first.fix_delta);
        let second = update_segments(&corrected, &options);

        for (segment_ref, range) in first.table.segments().filter(|(_, r)| r.is_empty()) {
            let after = second.table.lookup_range(segment_ref);
            prop_assert!(after.is_some(), "{segment_ref} disappeared");
            let after = after.unwrap_or_default();
            prop_assert_eq!(after.length, 1, "{} was {}", segment_ref, range);
            let slice = corrected.slice(after.index, after.end());
            prop_assert!(slice.ops[0].is_embed(kinds::BLANK));
        }
    }

    #[test]
    fn checksum_follows_text(text in "\\PC{0,40}", other in "\\PC{0,40}") {
        let mut segment = Segment::new("verse_1_1");
        segment.update(text.clone(), TextRange::new(0, text.chars().count()), HashMap::new());
        let first = segment.checksum();
        prop_assert_eq!(segment.checksum(), first);

        segment.update(other.clone(), TextRange::new(0, other.chars().count()), HashMap::new());
        prop_assert_eq!(segment.checksum(), versesync_engine::checksum(&other));
        prop_assert_eq!(segment.is_changed(), first != segment.checksum());
        if text == other {
            prop_assert!(!segment.is_changed());
        }
    }
}
