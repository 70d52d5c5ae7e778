pub mod range;
pub mod segment;

pub use range::TextRange;
pub use segment::{Segment, checksum};
