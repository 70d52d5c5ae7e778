use serde_json::Value;

use crate::delta::{Attributes, Delta};
use crate::editing::Patch;

/// Where a change to the surface came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Typed by the local user
    User,
    /// Applied programmatically, e.g. remote operations
    Api,
    /// Bookkeeping that listeners should not react to
    Silent,
}

/// The live rich-text editing surface a [`TextViewModel`] keeps in order.
///
/// The surface owns the content; the view model only reads snapshots and
/// pushes edits through it.
///
/// [`TextViewModel`]: crate::editing::TextViewModel
pub trait EditorSurface {
    /// Full current content
    fn contents(&self) -> Delta;

    /// Increases on every content change
    fn version(&self) -> u64;

    fn update_contents(&mut self, delta: &Delta, source: ChangeSource) -> Patch;

    /// Set (or with `Value::Null`, clear) one attribute over a range.
    fn format_text(
        &mut self,
        index: usize,
        length: usize,
        name: &str,
        value: Value,
        source: ChangeSource,
    ) -> Patch {
        let mut attrs = Attributes::new();
        attrs.insert(name.to_string(), value);
        let mut delta = Delta::new();
        delta.retain(index, None).retain(length, Some(attrs));
        self.update_contents(&delta, source)
    }
}

/// In-process surface holding the content as a delta
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    content: Delta,
    version: u64,
}

impl MemorySurface {
    pub fn new(content: Delta) -> Self {
        Self {
            content,
            version: 0,
        }
    }

    pub fn content(&self) -> &Delta {
        &self.content
    }

    /// Visible text: text inserts only, embeds skipped
    pub fn text(&self) -> String {
        self.content.text()
    }
}

impl EditorSurface for MemorySurface {
    fn contents(&self) -> Delta {
        self.content.clone()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn update_contents(&mut self, delta: &Delta, source: ChangeSource) -> Patch {
        if delta.is_empty() {
            return Patch {
                changed: Vec::new(),
                version: self.version,
            };
        }
        self.content = self.content.compose(delta);
        self.version += 1;
        log::trace!("surface v{} updated ({source:?})", self.version);
        Patch::from_edit(delta, self.version)
    }
}
