//! Baseline grouping.
//!
//! Fragments are sorted by baseline and swept once; a fragment joins the
//! current line while its baseline stays within tolerance of the line's
//! anchor (the first baseline of the line). Anchoring on the first member
//! rather than the previous one keeps a slow drift of baselines from
//! chaining two real lines together.

use crate::config::BaselineConfig;
use crate::layout::fragment::{FragmentArena, FragmentId};

/// One line of fragments sharing a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    /// Baseline of the fragment that opened the line
    pub baseline: f32,
    /// Members sorted by left edge
    pub members: Vec<FragmentId>,
}

/// Result of grouping a page into lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineGrouping {
    /// Lines sorted by baseline
    pub lines: Vec<LineGroup>,
    /// Line index of every fragment, indexed by [`FragmentId`]
    pub line_of: Vec<usize>,
    /// Tolerance used for this page
    pub tolerance: f32,
}

impl BaselineGrouping {
    /// The line a fragment belongs to.
    pub fn line_index(&self, id: FragmentId) -> usize {
        self.line_of[id.0]
    }
}

/// Groups fragments into lines.
pub struct BaselineGrouper<'a> {
    config: &'a BaselineConfig,
}

impl<'a> BaselineGrouper<'a> {
    /// Create a grouper using the given tolerance settings.
    pub fn new(config: &'a BaselineConfig) -> Self {
        Self { config }
    }

    /// Tolerance derived from the median fragment height, clamped.
    pub fn tolerance(&self, arena: &FragmentArena) -> f32 {
        let mut heights: Vec<f32> = arena.iter().map(|f| f.bbox.height).collect();
        if heights.is_empty() {
            return self.config.min_tolerance;
        }
        let mid = heights.len() / 2;
        let (_, median, _) = heights.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        (*median * self.config.tolerance_ratio)
            .clamp(self.config.min_tolerance, self.config.max_tolerance)
    }

    /// Group every fragment of the page into lines.
    pub fn group(&self, arena: &FragmentArena) -> BaselineGrouping {
        if arena.is_empty() {
            return BaselineGrouping::default();
        }
        let tolerance = self.tolerance(arena);

        let mut sorted: Vec<FragmentId> = arena.iter().map(|f| f.id).collect();
        sorted.sort_by(|&a, &b| {
            arena[a]
                .baseline
                .total_cmp(&arena[b].baseline)
                .then(arena[a].bbox.left().total_cmp(&arena[b].bbox.left()))
                .then(a.cmp(&b))
        });

        let mut lines: Vec<LineGroup> = Vec::new();
        let mut current = LineGroup {
            baseline: arena[sorted[0]].baseline,
            members: vec![sorted[0]],
        };

        for &id in &sorted[1..] {
            let baseline = arena[id].baseline;
            if baseline - current.baseline <= tolerance {
                current.members.push(id);
            } else {
                let next = LineGroup {
                    baseline,
                    members: vec![id],
                };
                lines.push(std::mem::replace(&mut current, next));
            }
        }
        lines.push(current);

        let mut line_of = vec![0; arena.len()];
        for (index, line) in lines.iter_mut().enumerate() {
            line.members.sort_by(|&a, &b| {
                arena[a]
                    .bbox
                    .left()
                    .total_cmp(&arena[b].bbox.left())
                    .then(a.cmp(&b))
            });
            for &id in &line.members {
                line_of[id.0] = index;
            }
        }

        log::debug!(
            "Baseline grouping: {} fragments into {} lines (tolerance {:.2})",
            arena.len(),
            lines.len(),
            tolerance
        );

        BaselineGrouping {
            lines,
            line_of,
            tolerance,
        }
    }
}
