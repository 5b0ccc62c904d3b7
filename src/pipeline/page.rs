//! Page-level input and output types.

use crate::config::ColumnConfig;
use crate::geometry::Rect;
use crate::layout::column_assigner::FULL_WIDTH;
use crate::layout::{
    ColumnLayout, FontRef, FragmentArena, FragmentId, MergedFragment, RawFragment, ScriptType,
};
use serde::{Deserialize, Serialize};

/// One page as delivered by the ingestion tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// Page number (informational)
    #[serde(default)]
    pub number: u32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Unordered text fragments
    #[serde(default)]
    pub fragments: Vec<RawFragment>,
}

impl PageInput {
    /// Create a page input.
    pub fn new(number: u32, width: f32, height: f32, fragments: Vec<RawFragment>) -> Self {
        Self {
            number,
            width,
            height,
            fragments,
        }
    }
}

/// Reconstructed layout of one page.
///
/// Owns the page's fragment arena; merged fragments refer back into it.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub(crate) number: u32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) arena: FragmentArena,
    pub(crate) fragments: Vec<MergedFragment>,
    pub(crate) columns: ColumnLayout,
    pub(crate) column_config: ColumnConfig,
}

impl PageLayout {
    /// Page number from the input.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Page size as `(width, height)`.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Source fragments with their annotations.
    pub fn arena(&self) -> &FragmentArena {
        &self.arena
    }

    /// Detected columns.
    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    /// Merged fragments sorted by `(reading_order_block, reading_order_index)`.
    pub fn fragments_in_order(&self) -> &[MergedFragment] {
        &self.fragments
    }

    /// Number of reading-order blocks.
    pub fn block_count(&self) -> u32 {
        self.fragments.last().map_or(0, |f| f.reading_order_block)
    }

    /// Work out where a media region (figure, table) belongs in reading order.
    ///
    /// The region must already be in this page's coordinate space. Its column
    /// follows the same geometric rule as text: wide regions that cross a
    /// gutter are full-width, everything else takes the column whose start
    /// is nearest its left edge. The region is then anchored after the last
    /// fragment of that column whose baseline lies above the region's top.
    pub fn place_media(&self, region: Rect) -> MediaPlacement {
        let col_id = self.media_col_id(&region);
        let top = region.top();

        let anchor = self
            .fragments
            .iter()
            .rev()
            .find(|f| f.col_id == col_id && f.baseline <= top);
        if let Some(f) = anchor {
            return MediaPlacement::Within {
                block: f.reading_order_block,
                col_id,
                after_index: f.reading_order_index,
            };
        }

        let after_block = self
            .fragments
            .iter()
            .filter(|f| f.baseline <= top)
            .map(|f| f.reading_order_block)
            .max()
            .unwrap_or(0);
        MediaPlacement::BetweenBlocks { after_block, col_id }
    }

    fn media_col_id(&self, region: &Rect) -> u32 {
        if self.columns.single_column {
            return 1;
        }
        let tolerance = self.column_config.gutter_tolerance;
        let col = self.columns.column_for(region.left());
        let wide = region.width >= self.column_config.full_width_fraction * self.width;
        if wide && self.columns.crosses_gutter(col, region.right(), tolerance) {
            FULL_WIDTH
        } else {
            col
        }
    }

    /// Serializable view for downstream markup generators.
    pub fn to_record(&self) -> PageRecord {
        PageRecord {
            page: self.number,
            width: self.width,
            height: self.height,
            single_column: self.columns.single_column,
            column_starts: self.columns.starts.clone(),
            fragments: self
                .fragments
                .iter()
                .map(|f| FragmentRecord::new(f, &self.arena))
                .collect(),
        }
    }
}

/// Where a media region goes in the reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaPlacement {
    /// Inside an existing block of the same column, after the given index
    Within {
        /// Block to insert into
        block: u32,
        /// Column of the media
        col_id: u32,
        /// Fragment index the media follows
        after_index: u32,
    },
    /// As a new block following `after_block` (0 = before the first block)
    BetweenBlocks {
        /// Block the media follows
        after_block: u32,
        /// Column of the media
        col_id: u32,
    },
}

/// Serializable page output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number
    pub page: u32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Whether the page was read as one column
    pub single_column: bool,
    /// Column start positions
    pub column_starts: Vec<f32>,
    /// Merged fragments in reading order
    pub fragments: Vec<FragmentRecord>,
}

/// Serializable merged fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Merged text
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Baseline
    pub baseline: f32,
    /// Font of the first source
    pub font_ref: FontRef,
    /// Column id
    pub col_id: u32,
    /// Reading-order block
    pub reading_order_block: u32,
    /// Index inside the block
    pub reading_order_index: u32,
    /// Inline runs sharing font and script type
    pub runs: Vec<RunRecord>,
    /// Every source fragment, in merge order
    pub original_fragments: Vec<OriginalRecord>,
}

impl FragmentRecord {
    fn new(merged: &MergedFragment, arena: &FragmentArena) -> Self {
        Self {
            text: merged.text.clone(),
            left: merged.bbox.left(),
            top: merged.bbox.top(),
            width: merged.bbox.width,
            height: merged.bbox.height,
            baseline: merged.baseline,
            font_ref: merged.font_ref,
            col_id: merged.col_id,
            reading_order_block: merged.reading_order_block,
            reading_order_index: merged.reading_order_index,
            runs: merged
                .runs(arena)
                .into_iter()
                .map(|run| RunRecord {
                    text: run.text,
                    font_ref: run.font_ref,
                    script_type: run.script_type,
                    space_before: run.space_before,
                })
                .collect(),
            original_fragments: merged
                .originals(arena)
                .map(|f| OriginalRecord {
                    id: f.id,
                    text: f.text.clone(),
                    left: f.bbox.left(),
                    top: f.bbox.top(),
                    width: f.bbox.width,
                    height: f.bbox.height,
                    baseline: f.baseline,
                    font_ref: f.font_ref,
                    script_type: f.script_type(),
                })
                .collect(),
        }
    }
}

/// Serializable inline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run text without script markers
    pub text: String,
    /// Font reference
    pub font_ref: FontRef,
    /// Script classification
    pub script_type: ScriptType,
    /// Whether a space precedes the run
    pub space_before: bool,
}

/// Serializable source fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalRecord {
    /// Position in the page input
    pub id: FragmentId,
    /// Source text
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Baseline
    pub baseline: f32,
    /// Font reference
    pub font_ref: FontRef,
    /// Script classification
    pub script_type: ScriptType,
}
