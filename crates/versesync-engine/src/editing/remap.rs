use crate::delta::Delta;
use crate::models::TextRange;
use crate::segmentation::SegmentationOptions;

/// Translates ranges between document-model coordinates and editing-surface
/// coordinates.
///
/// The surface holds annotation embeds that the model never stores. Each one is
/// identified by its model index: the model position of the first character
/// after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeRemapper {
    /// Model index of each annotation embed, ascending
    model_positions: Vec<usize>,
}

impl RangeRemapper {
    pub fn new(mut model_positions: Vec<usize>) -> Self {
        model_positions.sort_unstable();
        Self { model_positions }
    }

    /// Collect the annotation embeds of surface `content`.
    pub fn from_surface(content: &Delta, options: &SegmentationOptions) -> Self {
        let mut model_index = 0;
        let mut model_positions = Vec::new();
        for op in &content.ops {
            match op.embed_value() {
                Some(embed) if options.is_annotation(embed) => model_positions.push(model_index),
                _ => model_index += op.len(),
            }
        }
        Self { model_positions }
    }

    pub fn embed_count(&self) -> usize {
        self.model_positions.len()
    }

    /// Surface position of each annotation embed, ascending
    pub fn surface_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.model_positions
            .iter()
            .enumerate()
            .map(|(seen, model)| model + seen)
    }

    pub fn to_surface_range(&self, range: TextRange) -> TextRange {
        let mut surface = range;
        for &m in &self.model_positions {
            if m < range.index {
                surface.index += 1;
            } else if range.length > 0 && m < range.end() {
                surface.length += 1;
            } else {
                break;
            }
        }
        surface
    }

    pub fn to_model_range(&self, range: TextRange) -> TextRange {
        let mut model = range;
        for s in self.surface_positions() {
            if s < range.index {
                model.index -= 1;
            } else if s < range.end() {
                model.length -= 1;
            } else {
                break;
            }
        }
        model
    }
}
