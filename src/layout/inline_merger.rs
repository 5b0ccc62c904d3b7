//! Same-line run merging.
//!
//! Adjacent runs on one line are coalesced when the horizontal gap between
//! them is small relative to an inferred space width. Every absorbed run
//! carries its source ids along, so font and script attribution of each
//! piece survives the merge (see [`MergedFragment::runs`]).

use crate::config::InlineConfig;
use crate::layout::fragment::{FragmentArena, MergedFragment};

/// Coalesces adjacent same-line runs.
pub struct InlineMerger<'a> {
    config: &'a InlineConfig,
}

impl<'a> InlineMerger<'a> {
    /// Create a merger using the given gap thresholds.
    pub fn new(config: &'a InlineConfig) -> Self {
        Self { config }
    }

    /// Inferred width of a space on this page.
    ///
    /// Median per-character width of non-script fragments, scaled by
    /// `space_width_ratio`. Zero when the page has no measurable text.
    pub fn space_width(&self, arena: &FragmentArena) -> f32 {
        let mut widths: Vec<f32> = arena
            .iter()
            .filter(|f| !f.is_script())
            .filter_map(|f| {
                let chars = f.char_count();
                (chars > 0).then(|| f.bbox.width / chars as f32)
            })
            .collect();
        if widths.is_empty() {
            return 0.0;
        }
        let mid = widths.len() / 2;
        let (_, median, _) = widths.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        *median * self.config.space_width_ratio
    }

    /// Merge each line's runs left to right and flatten the result.
    pub fn merge(&self, arena: &FragmentArena, lines: Vec<Vec<MergedFragment>>) -> Vec<MergedFragment> {
        let space = self.space_width(arena);
        let max_gap = self.config.max_gap_spaces * space;
        let insert_at = self.config.space_insert_fraction * space;

        let input: usize = lines.iter().map(Vec::len).sum();
        let mut output = Vec::with_capacity(input);
        for line in lines {
            let mut iter = line.into_iter();
            let Some(mut current) = iter.next() else {
                continue;
            };
            for next in iter {
                let gap = current.bbox.horizontal_gap(&next.bbox);
                if current.col_id == next.col_id && gap >= -self.config.max_overlap && gap <= max_gap {
                    let separated = current.text.ends_with(char::is_whitespace)
                        || next.text.starts_with(char::is_whitespace);
                    current.absorb(next, gap >= insert_at && !separated);
                } else {
                    output.push(std::mem::replace(&mut current, next));
                }
            }
            output.push(current);
        }

        log::debug!(
            "Inline merging: {} runs into {} fragments (space width {:.2})",
            input,
            output.len(),
            space
        );
        output
    }
}
