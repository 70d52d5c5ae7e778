// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use serde_json::json;
use versesync_engine::delta::{Delta, Embed, attrs, kinds};

const VERSE_TEXT: &str = "And God saw the light, that it was good: and God divided the light from the darkness.";

fn para(style: &str) -> Option<versesync_engine::Attributes> {
    Some(attrs(json!({ "para": { "style": style } })))
}

/// Untagged chapters of prose paragraphs with a poetry block and a note now and then
#[allow(dead_code)]
pub fn generate_book(chapters: usize, verses_per_chapter: usize) -> Delta {
    let mut content = Delta::new();

    for chapter in 1..=chapters {
        content.insert_embed(Embed::chapter(&chapter.to_string()), None);
        content.insert(format!("Chapter {chapter}"), None);
        content.insert("\n", para("s1"));

        for verse in 1..=verses_per_chapter {
            content.insert_embed(Embed::verse(&verse.to_string()), None);
            content.insert(VERSE_TEXT, None);

            if verse % 7 == 0 {
                content.insert_embed(
                    Embed::new(kinds::NOTE_THREAD, json!({})),
                    Some(attrs(json!({ "embedid": format!("thread_{chapter}_{verse}") }))),
                );
            }

            match verse % 5 {
                3 => {
                    content.insert("\n", para("q1"));
                }
                4 => {
                    content.insert("\n", para("q2"));
                }
                0 => {
                    content.insert("\n", para("p"));
                }
                _ => {}
            }
        }
        content.insert("\n", para("p"));
    }

    content
}

/// Chapter markers followed by verses that have no text yet
#[allow(dead_code)]
pub fn generate_empty_verses(chapters: usize, verses_per_chapter: usize) -> Delta {
    let mut content = Delta::new();

    for chapter in 1..=chapters {
        content.insert_embed(Embed::chapter(&chapter.to_string()), None);
        for verse in 1..=verses_per_chapter {
            content.insert_embed(Embed::verse(&verse.to_string()), None);
        }
        content.insert("\n", para("p"));
    }

    content
}
