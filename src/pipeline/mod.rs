//! Page layout reconstruction pipeline.
//!
//! ```text
//! PageInput (unordered RawFragment[])
//!     ↓
//! [ScriptDetector]        annotate superscripts/subscripts
//!     ↓
//! [BaselineGrouper]       physical lines
//!     ↓
//! [ColumnClusterer]       column starts, single-column signals
//! [ColumnAssigner]        col_id per fragment
//!     ↓
//! [ScriptMerger]          scripts folded into parents
//!     ↓
//! [InlineMerger]          run-level MergedFragment[]
//!     ↓
//! [ReadingOrderAssigner]  block / index
//!     ↓
//! PageLayout (conservation checked)
//! ```
//!
//! Pages are independent: [`LayoutEngine`] holds configuration only, so one
//! engine can be shared across threads.

pub mod document;
pub mod page;

pub use document::{DocumentProcessor, DocumentSummary, JsonLinesSink, PageReader, PageSink};
pub use page::{FragmentRecord, MediaPlacement, OriginalRecord, PageInput, PageLayout, PageRecord, RunRecord};

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::layout::{
    BaselineGrouper, ColumnAssigner, ColumnClusterer, ColumnLayout, FragmentArena, FragmentId,
    InlineMerger, MergedFragment, ReadingOrderAssigner, ScriptDetector, ScriptMerger,
};

/// Runs the reconstruction stages on one page at a time.
pub struct LayoutEngine {
    config: LayoutConfig,
    reading_order: ReadingOrderAssigner,
}

impl LayoutEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        let config = LayoutConfig::default();
        let reading_order = ReadingOrderAssigner::new(&config.reading_order);
        Self {
            config,
            reading_order,
        }
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let reading_order = ReadingOrderAssigner::new(&config.reading_order);
        Ok(Self {
            config,
            reading_order,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Reconstruct the reading order of one page.
    ///
    /// Fails on unusable page or fragment geometry, and if a merge stage
    /// ever loses or duplicates a source fragment.
    pub fn process_page(&self, page: PageInput) -> Result<PageLayout> {
        if !(page.width.is_finite() && page.width > 0.0 && page.height.is_finite() && page.height > 0.0) {
            return Err(Error::InvalidPage(format!(
                "page {} has size {}x{}",
                page.number, page.width, page.height
            )));
        }

        let mut arena = FragmentArena::from_raw(page.fragments)?;
        let mut layout = PageLayout {
            number: page.number,
            width: page.width,
            height: page.height,
            arena: FragmentArena::default(),
            fragments: Vec::new(),
            columns: ColumnLayout::single(),
            column_config: self.config.columns.clone(),
        };
        if arena.is_empty() {
            log::debug!("Page {}: no fragments", page.number);
            layout.arena = arena;
            return Ok(layout);
        }

        let config = &self.config;
        ScriptDetector::new(&config.script).detect(&mut arena);
        let lines = BaselineGrouper::new(&config.baseline).group(&arena);
        let columns = ColumnClusterer::new(&config.columns).cluster(&arena, &lines, page.width);
        ColumnAssigner::new(&config.columns).assign(&mut arena, &lines, &columns, page.width, page.height);

        let runs = ScriptMerger::new(&config.script).merge(&arena, &lines);
        let mut fragments = InlineMerger::new(&config.inline).merge(&arena, runs);
        self.reading_order.assign(&mut fragments);

        check_conservation(&arena, &fragments)?;
        log::debug!(
            "Page {}: {} fragments -> {} merged, {} column(s)",
            page.number,
            arena.len(),
            fragments.len(),
            columns.column_count()
        );

        layout.arena = arena;
        layout.fragments = fragments;
        layout.columns = columns;
        Ok(layout)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Every source fragment must be owned by exactly one merged fragment.
pub fn check_conservation(arena: &FragmentArena, fragments: &[MergedFragment]) -> Result<()> {
    let mut seen = vec![false; arena.len()];
    for merged in fragments {
        for &id in merged.original_fragments() {
            match seen.get_mut(id.0) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(Error::DuplicateFragment { id }),
                None => {
                    return Err(Error::InvalidFragment {
                        index: id.0,
                        reason: format!("id outside the page's {} fragments", arena.len()),
                    })
                },
            }
        }
    }
    match seen.iter().position(|&s| !s) {
        Some(index) => Err(Error::FragmentDropped {
            id: FragmentId(index),
        }),
        None => Ok(()),
    }
}
