pub mod delta;
pub mod editing;
pub mod io;
pub mod models;
pub mod segmentation;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use delta::{Attributes, Delta, Embed, InsertValue, Op};
pub use editing::{ChangeSource, EditorSurface, MemorySurface, Patch, RangeRemapper, TextViewModel};
pub use io::*;
pub use models::{Segment, TextRange, checksum};
pub use segmentation::{Segmentation, SegmentTable, SegmentationOptions, update_segments};
