/*!
 * # Editing Core
 *
 * Keeps a live editing surface and its segment table consistent while the
 * content changes underneath it.
 *
 * ## Architecture Overview
 *
 * ### 1. The Surface Owns the Content
 * - The host rich-text editor is modelled by the **`EditorSurface`** trait
 * - It exposes a content snapshot, a version counter and low-level mutation
 * - **`MemorySurface`** is the in-process implementation used by the CLI and tests
 *
 * ### 2. Full Re-segmentation on Every Change
 * - Local edits, remote operations and applied corrections all end in
 *   `TextViewModel::content_changed`
 * - The whole content is segmented again; the table is replaced, never patched
 * - Bursts of edits cause redundant passes, not divergent state
 *
 * ### 3. Deferred Self-Correction
 * - A pass that finds inconsistencies produces a **fix delta**
 * - The fix is queued as a `DeferredEdit`, tagged with the surface version it
 *   was computed against, and only applied by `TextViewModel::run_deferred`
 * - A correction whose version no longer matches the surface is dropped and
 *   recomputed from the current content
 *
 * ### 4. Two Coordinate Spaces
 * - The surface shows annotation embeds (note markers) the document model
 *   never stores
 * - **`RangeRemapper`** converts ranges between the two
 * - `TextViewModel::view_to_data` converts whole edits before they are
 *   submitted upstream
 *
 * ## Module Structure
 *
 * - **`surface`**: `EditorSurface`, `MemorySurface` and `ChangeSource`
 * - **`view_model`**: `TextViewModel`, the deferred correction queue and segment reads
 * - **`remap`**: model/surface range translation
 * - **`patch`**: changed ranges and version reported by a surface update
 *
 * ## Usage Pattern
 *
 * ```rust
 * use versesync_engine::delta::{Delta, Embed};
 * use versesync_engine::editing::{MemorySurface, TextViewModel};
 * use versesync_engine::segmentation::SegmentationOptions;
 *
 * let mut content = Delta::new();
 * content.insert_embed(Embed::chapter("1"), None)
 *     .insert_embed(Embed::verse("1"), None)
 *     .insert("In the beginning", None);
 *
 * let mut model = TextViewModel::new(MemorySurface::new(content), SegmentationOptions::default());
 * model.run_deferred();
 *
 * assert_eq!(model.segment_text("verse_1_1"), "In the beginning");
 * ```
 */

pub mod patch;
pub mod remap;
pub mod surface;
pub mod view_model;

pub use patch::Patch;
pub use remap::RangeRemapper;
pub use surface::{ChangeSource, EditorSurface, MemorySurface};
pub use view_model::{DeferredEdit, MAX_CORRECTION_PASSES, TextViewModel, VIEW_ONLY_ATTRIBUTES};
