//! Column id assignment.
//!
//! Every fragment receives a `col_id`: 0 for full-width content, 1..N for
//! the detected columns. The initial geometric rule is refined by
//! line-level post-passes so that one physical line never weaves between
//! full-width and columnar ids.

use crate::config::ColumnConfig;
use crate::layout::baseline_grouper::BaselineGrouping;
use crate::layout::column_clusterer::ColumnLayout;
use crate::layout::fragment::{FragmentArena, FragmentId};

/// Column id reserved for full-width content.
pub const FULL_WIDTH: u32 = 0;

/// Writes `col_id` on every fragment of a page.
pub struct ColumnAssigner<'a> {
    config: &'a ColumnConfig,
}

impl<'a> ColumnAssigner<'a> {
    /// Create an assigner using the given thresholds.
    pub fn new(config: &'a ColumnConfig) -> Self {
        Self { config }
    }

    /// Initial column id for a box, before any line-level correction.
    pub fn initial_col_id(&self, layout: &ColumnLayout, left: f32, width: f32, page_width: f32) -> u32 {
        if width >= self.config.full_width_fraction * page_width {
            FULL_WIDTH
        } else {
            layout.column_for(left)
        }
    }

    /// Assign column ids to every fragment.
    pub fn assign(
        &self,
        arena: &mut FragmentArena,
        lines: &BaselineGrouping,
        layout: &ColumnLayout,
        page_width: f32,
        page_height: f32,
    ) {
        let mut col_ids: Vec<u32> = if layout.single_column {
            vec![1; arena.len()]
        } else {
            self.columnar_pass(arena, lines, layout, page_width)
        };

        let footnote_lines = self.apply_footnote_zone(arena, lines, &mut col_ids, page_height);

        if layout.single_column {
            self.smooth_transitions(arena, lines, &mut col_ids, page_width);
        }

        for (index, col_id) in col_ids.into_iter().enumerate() {
            arena.set_col_id(FragmentId(index), col_id);
        }

        log::debug!(
            "Column assignment: {} fragments, {} footnote lines, {} column(s)",
            arena.len(),
            footnote_lines,
            layout.column_count()
        );
    }

    /// Initial rule, full-width reclassification and baseline consistency.
    fn columnar_pass(
        &self,
        arena: &FragmentArena,
        lines: &BaselineGrouping,
        layout: &ColumnLayout,
        page_width: f32,
    ) -> Vec<u32> {
        let tolerance = self.config.gutter_tolerance;
        let mut col_ids: Vec<u32> = arena
            .iter()
            .map(|f| self.initial_col_id(layout, f.bbox.left(), f.bbox.width, page_width))
            .collect();

        // Wide fragments that stay inside their column's extent belong to it.
        for fragment in arena.iter() {
            if col_ids[fragment.id.0] != FULL_WIDTH {
                continue;
            }
            let col = layout.column_for(fragment.bbox.left());
            if !layout.crosses_gutter(col, fragment.bbox.right(), tolerance) {
                log::trace!("{} reclassified from full-width to column {}", fragment.id, col);
                col_ids[fragment.id.0] = col;
            }
        }

        for line in &lines.lines {
            if line.members.iter().any(|id| col_ids[id.0] == FULL_WIDTH) {
                for id in &line.members {
                    col_ids[id.0] = FULL_WIDTH;
                }
            }
        }
        col_ids
    }

    /// Force multi-fragment lines in the bottom band to full width.
    fn apply_footnote_zone(
        &self,
        arena: &FragmentArena,
        lines: &BaselineGrouping,
        col_ids: &mut [u32],
        page_height: f32,
    ) -> usize {
        let zone_top = page_height * (1.0 - self.config.footnote_zone_fraction);
        let mut count = 0;
        for line in &lines.lines {
            if line.baseline < zone_top {
                continue;
            }
            let text_fragments = line.members.iter().filter(|&&id| !arena[id].is_script()).count();
            if text_fragments >= 2 {
                count += 1;
                for id in &line.members {
                    col_ids[id.0] = FULL_WIDTH;
                }
            }
        }
        count
    }

    /// Return isolated short full-width runs on a single-column page to column 1.
    fn smooth_transitions(
        &self,
        arena: &FragmentArena,
        lines: &BaselineGrouping,
        col_ids: &mut [u32],
        page_width: f32,
    ) {
        let strong = self.config.strong_full_width_fraction * page_width;
        let count = lines.lines.len();
        let mut start = 0;
        while start < count {
            if !line_is_full(lines, col_ids, start) {
                start += 1;
                continue;
            }
            let mut end = start;
            while end < count && line_is_full(lines, col_ids, end) {
                end += 1;
            }

            let bounded = start > 0 && end < count;
            let short = end - start < self.config.min_run_length;
            let strong_content = lines.lines[start..end]
                .iter()
                .flat_map(|line| line.members.iter())
                .any(|&id| arena[id].bbox.width >= strong);

            if bounded && short && !strong_content {
                log::trace!("Smoothing full-width lines {}..{} back to column 1", start, end);
                for line in &lines.lines[start..end] {
                    for id in &line.members {
                        col_ids[id.0] = 1;
                    }
                }
            }
            start = end;
        }
    }
}

fn line_is_full(lines: &BaselineGrouping, col_ids: &[u32], index: usize) -> bool {
    lines.lines[index]
        .members
        .first()
        .is_some_and(|id| col_ids[id.0] == FULL_WIDTH)
}
