//! Reading order assignment.
//!
//! Fragments are first put into reading sequence by an [`OrderingStrategy`],
//! then one linear pass numbers them: the block counter advances exactly when
//! `col_id` differs from the previous fragment's, and the index restarts at 1
//! in every block. Full-width content interleaved between columns therefore
//! gets its own block wherever it sits, instead of being pooled into a single
//! trailing block.

use crate::config::{ReadingOrderConfig, ReadingOrderMode};
use crate::layout::column_assigner::FULL_WIDTH;
use crate::layout::fragment::MergedFragment;
use std::cmp::Ordering;

/// Puts a page's merged fragments into reading sequence.
pub trait OrderingStrategy: Send + Sync {
    /// Reorder `fragments` in place. Implementations must be deterministic.
    fn order(&self, fragments: &mut [MergedFragment]);

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Top-to-bottom scan of the whole page by `(baseline, left)`.
pub struct VerticalScanStrategy;

impl OrderingStrategy for VerticalScanStrategy {
    fn order(&self, fragments: &mut [MergedFragment]) {
        // Stable sort: exact ties keep their merge order.
        fragments.sort_by(by_baseline_then_left);
    }

    fn name(&self) -> &'static str {
        "VerticalScanStrategy"
    }
}

/// Reads each column to the end of its band before moving to the next.
///
/// Bands alternate between full-width and columnar content along the
/// vertical scan; inside a columnar band fragments are grouped by column.
pub struct ColumnBandsStrategy;

impl OrderingStrategy for ColumnBandsStrategy {
    fn order(&self, fragments: &mut [MergedFragment]) {
        fragments.sort_by(by_baseline_then_left);

        let mut bands = Vec::with_capacity(fragments.len());
        let mut band = 0u32;
        let mut previous_spanning: Option<bool> = None;
        for fragment in fragments.iter() {
            let spanning = fragment.col_id == FULL_WIDTH;
            if previous_spanning.is_some_and(|p| p != spanning) {
                band += 1;
            }
            previous_spanning = Some(spanning);
            bands.push(band);
        }

        let mut keyed: Vec<(u32, MergedFragment)> = bands.into_iter().zip(fragments.iter().cloned()).collect();
        keyed.sort_by(|(band_a, a), (band_b, b)| {
            band_a
                .cmp(band_b)
                .then(a.col_id.cmp(&b.col_id))
                .then_with(|| by_baseline_then_left(a, b))
        });
        for (slot, (_, fragment)) in fragments.iter_mut().zip(keyed) {
            *slot = fragment;
        }
    }

    fn name(&self) -> &'static str {
        "ColumnBandsStrategy"
    }
}

fn by_baseline_then_left(a: &MergedFragment, b: &MergedFragment) -> Ordering {
    a.baseline
        .total_cmp(&b.baseline)
        .then(a.bbox.left().total_cmp(&b.bbox.left()))
}

/// Numbers merged fragments with block and index.
pub struct ReadingOrderAssigner {
    strategy: Box<dyn OrderingStrategy>,
}

impl ReadingOrderAssigner {
    /// Create an assigner for the configured mode.
    pub fn new(config: &ReadingOrderConfig) -> Self {
        let strategy: Box<dyn OrderingStrategy> = match config.mode {
            ReadingOrderMode::VerticalScan => Box::new(VerticalScanStrategy),
            ReadingOrderMode::ColumnBands => Box::new(ColumnBandsStrategy),
        };
        Self { strategy }
    }

    /// Create an assigner around a custom strategy.
    pub fn with_strategy(strategy: Box<dyn OrderingStrategy>) -> Self {
        Self { strategy }
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Order the fragments and assign `reading_order_block`/`reading_order_index`.
    ///
    /// Returns the number of blocks.
    pub fn assign(&self, fragments: &mut [MergedFragment]) -> u32 {
        self.strategy.order(fragments);
        let blocks = number_blocks(fragments);
        log::debug!(
            "Reading order ({}): {} fragments in {} blocks",
            self.strategy.name(),
            fragments.len(),
            blocks
        );
        blocks
    }
}

/// One pass over ordered fragments: a new block starts whenever `col_id` changes.
pub fn number_blocks(fragments: &mut [MergedFragment]) -> u32 {
    let mut block = 0u32;
    let mut index = 0u32;
    let mut previous: Option<u32> = None;
    for fragment in fragments.iter_mut() {
        if previous != Some(fragment.col_id) {
            block += 1;
            index = 0;
            previous = Some(fragment.col_id);
        }
        index += 1;
        fragment.reading_order_block = block;
        fragment.reading_order_index = index;
    }
    block
}
