use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::delta::{Embed, kinds};

/// Paragraph styles whose contents are body text that can hold verses
pub const DEFAULT_PARA_STYLES: &[&str] = &[
    // paragraphs
    "p", "m", "po", "pr", "cls", "pmo", "pm", "pmc", "pmr", "pi", "mi", "pc", "ph", "lit",
    // poetry
    "q", "qr", "qc", "qa", "qm", "qd", // lists
    "lh", "li", "lf", "lim",
];

/// Style used to disambiguate a segment closed by a paragraph break with no style
pub const DEFAULT_PARA_STYLE: &str = "p";

/// Style of a stanza break: no text, no segment
pub const STANZA_BREAK_STYLE: &str = "b";

/// Which paragraph styles are body text and which embeds exist only on the
/// editing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOptions {
    pub para_styles: HashSet<String>,
    pub annotation_embeds: HashSet<String>,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            para_styles: DEFAULT_PARA_STYLES.iter().map(|s| s.to_string()).collect(),
            annotation_embeds: HashSet::from([kinds::NOTE_THREAD.to_string()]),
        }
    }
}

impl SegmentationOptions {
    /// Whether a paragraph of `style` holds verse text. Trailing level digits are
    /// ignored, so `q1` and `q2` both count as `q`; the empty style always does.
    pub fn can_contain_verse_text(&self, style: &str) -> bool {
        use std::sync::OnceLock;

        if style.is_empty() {
            return true;
        }
        static DIGITS: OnceLock<Regex> = OnceLock::new();
        let digits = DIGITS.get_or_init(|| Regex::new("[0-9]").expect("Invalid digits regex"));
        self.para_styles
            .contains(digits.replace_all(style, "").as_ref())
    }

    pub fn is_annotation(&self, embed: &Embed) -> bool {
        self.annotation_embeds.contains(&embed.kind)
    }
}

pub fn verse_ref(chapter: &str, verse: &str) -> String {
    format!("verse_{chapter}_{verse}")
}

/// Per-key counters producing `<prefix>_<n>` refs, starting at 1
#[derive(Debug, Default)]
pub(crate) struct RefCounters(HashMap<String, usize>);

impl RefCounters {
    pub(crate) fn next_ref(&mut self, key: &str, prefix: &str) -> String {
        let next = self.0.entry(key.to_string()).or_insert(1);
        let id = *next;
        *next += 1;
        format!("{prefix}_{id}")
    }
}
