//! Column start detection.
//!
//! Left edges are clustered in one dimension. A cluster only becomes a
//! column when it spans enough distinct lines: short runs of fragments at
//! an unusual x offset (a caption, a hanging continuation, a two-line
//! heading) otherwise show up as a spurious extra column.
//!
//! The page is classified as single-column when any one of three signals
//! fires:
//!
//! 1. at most one cluster survives validation;
//! 2. most fragments are left-aligned on the dominant edge;
//! 3. too many non-wide fragments run from their column into the next one
//!    (there is no gutter, so the "columns" are indentation levels).

use crate::config::ColumnConfig;
use crate::layout::baseline_grouper::BaselineGrouping;
use crate::layout::fragment::{FragmentArena, FragmentId};
use serde::Serialize;

/// A group of fragments sharing (roughly) the same left edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCluster {
    /// Left edge of the first member; all members lie within tolerance of it
    pub start: f32,
    /// Member fragments, sorted by left edge
    pub members: Vec<FragmentId>,
    /// Number of distinct lines the members touch
    pub line_count: usize,
}

/// Measurements behind the single-column decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SingleColumnSignals {
    /// Clusters that passed validation
    pub valid_clusters: usize,
    /// Fraction of fragments aligned on the most populated cluster
    pub alignment_ratio: f32,
    /// Fraction of non-wide fragments crossing into the next column
    pub transition_ratio: f32,
}

/// Column structure of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnLayout {
    /// Column start x-positions, ascending; empty for single-column pages
    pub starts: Vec<f32>,
    /// The surviving clusters, ascending by start
    pub clusters: Vec<ColumnCluster>,
    /// Whether the page reads as a single column
    pub single_column: bool,
    /// Raw signal values
    pub signals: SingleColumnSignals,
}

impl ColumnLayout {
    /// Layout of a page with no detectable columns.
    pub fn single() -> Self {
        Self {
            single_column: true,
            ..Self::default()
        }
    }

    /// Number of columns (at least 1).
    pub fn column_count(&self) -> usize {
        self.starts.len().max(1)
    }

    /// Column id (1-based) of the start nearest to `left`.
    ///
    /// Ties go to the lower column. Single-column pages always give 1.
    pub fn column_for(&self, left: f32) -> u32 {
        if self.single_column {
            return 1;
        }
        let mut best: Option<(usize, f32)> = None;
        for (i, &start) in self.starts.iter().enumerate() {
            let distance = (left - start).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map_or(1, |(i, _)| i as u32 + 1)
    }

    /// Whether an extent starting in `col_id` runs past the next column's start.
    pub fn crosses_gutter(&self, col_id: u32, right: f32, tolerance: f32) -> bool {
        // starts[col_id] is the start of column col_id + 1
        match self.starts.get(col_id as usize) {
            Some(&next) if col_id > 0 => right > next + tolerance,
            _ => false,
        }
    }
}

/// Derives column starts from fragment left edges.
pub struct ColumnClusterer<'a> {
    config: &'a ColumnConfig,
}

impl<'a> ColumnClusterer<'a> {
    /// Create a clusterer using the given thresholds.
    pub fn new(config: &'a ColumnConfig) -> Self {
        Self { config }
    }

    /// Detect the column layout of a page.
    pub fn cluster(
        &self,
        arena: &FragmentArena,
        lines: &BaselineGrouping,
        page_width: f32,
    ) -> ColumnLayout {
        let n = arena.len();
        if n == 0 {
            return ColumnLayout::single();
        }

        let raw = self.raw_clusters(arena, lines);
        let alignment_ratio = self.alignment_ratio(arena, &raw);

        let min_members = self
            .config
            .min_members
            .max((self.config.min_member_fraction * n as f32).ceil() as usize);
        let mut valid: Vec<ColumnCluster> = raw
            .into_iter()
            .filter(|c| {
                let keep = c.line_count >= self.config.min_lines && c.members.len() >= min_members;
                if !keep {
                    log::trace!(
                        "Rejected cluster at x={:.1}: {} members over {} lines",
                        c.start,
                        c.members.len(),
                        c.line_count
                    );
                }
                keep
            })
            .collect();

        // Keep the most populated clusters, then restore x order.
        valid.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then(a.start.total_cmp(&b.start))
        });
        valid.truncate(self.config.max_cols);
        valid.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut layout = ColumnLayout {
            starts: valid.iter().map(|c| c.start).collect(),
            clusters: valid,
            single_column: false,
            signals: SingleColumnSignals::default(),
        };
        let transition_ratio = self.transition_ratio(arena, &layout, page_width);

        layout.signals = SingleColumnSignals {
            valid_clusters: layout.clusters.len(),
            alignment_ratio,
            transition_ratio,
        };
        layout.single_column = layout.signals.valid_clusters <= 1
            || alignment_ratio >= self.config.single_column_alignment_ratio
            || transition_ratio > self.config.max_transition_ratio;
        if layout.single_column {
            layout.starts.clear();
        }

        log::debug!(
            "Column clustering: {} columns (single={}, clusters={}, aligned={:.2}, transitions={:.2})",
            layout.column_count(),
            layout.single_column,
            layout.signals.valid_clusters,
            alignment_ratio,
            transition_ratio
        );
        layout
    }

    /// Leader clustering of the sorted left edges.
    fn raw_clusters(&self, arena: &FragmentArena, lines: &BaselineGrouping) -> Vec<ColumnCluster> {
        let mut by_left: Vec<FragmentId> = arena.iter().map(|f| f.id).collect();
        by_left.sort_by(|&a, &b| {
            arena[a]
                .bbox
                .left()
                .total_cmp(&arena[b].bbox.left())
                .then(a.cmp(&b))
        });

        let mut clusters: Vec<ColumnCluster> = Vec::new();
        for id in by_left {
            let left = arena[id].bbox.left();
            match clusters.last_mut() {
                Some(cluster) if left - cluster.start <= self.config.cluster_tolerance => {
                    cluster.members.push(id);
                },
                _ => clusters.push(ColumnCluster {
                    start: left,
                    members: vec![id],
                    line_count: 0,
                }),
            }
        }

        for cluster in &mut clusters {
            let mut line_ids: Vec<usize> = cluster
                .members
                .iter()
                .map(|&id| lines.line_index(id))
                .collect();
            line_ids.sort_unstable();
            line_ids.dedup();
            cluster.line_count = line_ids.len();
        }
        clusters
    }

    fn alignment_ratio(&self, arena: &FragmentArena, raw: &[ColumnCluster]) -> f32 {
        let Some(dominant) = raw.iter().max_by(|a, b| {
            a.members
                .len()
                .cmp(&b.members.len())
                .then(b.start.total_cmp(&a.start))
        }) else {
            return 0.0;
        };
        let aligned = arena
            .iter()
            .filter(|f| (f.bbox.left() - dominant.start).abs() <= self.config.alignment_tolerance)
            .count();
        aligned as f32 / arena.len() as f32
    }

    fn transition_ratio(&self, arena: &FragmentArena, layout: &ColumnLayout, page_width: f32) -> f32 {
        if layout.starts.len() < 2 {
            return 0.0;
        }
        let wide = self.config.full_width_fraction * page_width;
        let tolerance = self.config.gutter_tolerance;

        let mut narrow = 0usize;
        let mut crossing = 0usize;
        for fragment in arena.iter().filter(|f| f.bbox.width < wide) {
            narrow += 1;
            let col = layout.column_for(fragment.bbox.left());
            if layout.crosses_gutter(col, fragment.bbox.right(), tolerance) {
                crossing += 1;
            }
        }
        if narrow == 0 {
            0.0
        } else {
            crossing as f32 / narrow as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaselineConfig;
    use crate::layout::baseline_grouper::BaselineGrouper;
    use crate::layout::fragment::{FontRef, RawFragment};

    const PAGE_WIDTH: f32 = 612.0;

    fn line(left: f32, top: f32, width: f32) -> RawFragment {
        RawFragment::new("text", left, top, width, 10.0, FontRef(0))
    }

    fn two_columns(lines: usize) -> Vec<RawFragment> {
        let mut raw = Vec::new();
        for i in 0..lines {
            let top = 100.0 + i as f32 * 14.0;
            raw.push(line(50.0, top, 230.0));
            raw.push(line(320.0, top, 230.0));
        }
        raw
    }

    fn cluster(raw: Vec<RawFragment>) -> ColumnLayout {
        let arena = FragmentArena::from_raw(raw).unwrap();
        let baseline = BaselineConfig::default();
        let lines = BaselineGrouper::new(&baseline).group(&arena);
        let config = ColumnConfig::default();
        ColumnClusterer::new(&config).cluster(&arena, &lines, PAGE_WIDTH)
    }

    #[test]
    fn test_empty_page_is_single_column() {
        let layout = cluster(Vec::new());
        assert!(layout.single_column);
        assert_eq!(layout.column_count(), 1);
    }

    #[test]
    fn test_two_column_page() {
        let layout = cluster(two_columns(20));
        assert!(!layout.single_column);
        assert_eq!(layout.starts, vec![50.0, 320.0]);
        assert_eq!(layout.clusters[0].line_count, 20);
        assert_eq!(layout.signals.transition_ratio, 0.0);
    }

    #[test]
    fn test_short_cluster_rejected_for_line_span() {
        let mut raw = two_columns(14);
        // A short caption-like run at an unusual offset over two lines.
        raw.push(line(180.0, 400.0, 60.0));
        raw.push(line(182.0, 400.0, 40.0));
        raw.push(line(181.0, 414.0, 80.0));

        let layout = cluster(raw);
        assert!(!layout.single_column);
        assert_eq!(layout.starts.len(), 2);
        assert_eq!(layout.starts, vec![50.0, 320.0]);
    }

    #[test]
    fn test_left_aligned_page_is_single_column() {
        let raw: Vec<RawFragment> = (0..30)
            .map(|i| line(72.0 + (i % 3) as f32, 100.0 + i as f32 * 14.0, 400.0))
            .collect();
        let layout = cluster(raw);
        assert!(layout.single_column);
        assert!(layout.starts.is_empty());
        assert!(layout.signals.alignment_ratio >= 0.8);
    }

    #[test]
    fn test_indentation_without_gutter_is_single_column() {
        // Two indentation levels, each over many lines, but the text runs
        // straight through where a gutter would be.
        let mut raw = Vec::new();
        for i in 0..20 {
            let top = 100.0 + i as f32 * 14.0;
            raw.push(line(72.0, top, 200.0));
            raw.push(line(200.0, top + 7.0, 200.0));
        }
        let layout = cluster(raw);
        assert_eq!(layout.signals.valid_clusters, 2);
        assert!(layout.signals.transition_ratio > 0.2);
        assert!(layout.single_column);
    }

    #[test]
    fn test_max_cols_keeps_largest() {
        let mut raw = Vec::new();
        for i in 0..15 {
            let top = 100.0 + i as f32 * 14.0;
            for x in [20.0, 140.0, 260.0, 380.0, 500.0] {
                raw.push(line(x, top, 100.0));
            }
        }
        // Extra members in the last column make it strictly more populated.
        for i in 0..5 {
            raw.push(line(500.0, 400.0 + i as f32 * 14.0, 100.0));
        }
        let layout = cluster(raw);
        assert_eq!(layout.starts.len(), 4);
        assert!(layout.starts.contains(&500.0));
        assert!(layout.starts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_column_for_picks_nearest_start() {
        let layout = ColumnLayout {
            starts: vec![50.0, 320.0],
            ..ColumnLayout::default()
        };
        assert_eq!(layout.column_for(10.0), 1);
        assert_eq!(layout.column_for(60.0), 1);
        assert_eq!(layout.column_for(184.0), 1);
        // equidistant from both starts
        assert_eq!(layout.column_for(185.0), 1);
        assert_eq!(layout.column_for(186.0), 2);
        // outdented from column 2
        assert_eq!(layout.column_for(305.0), 2);
        assert_eq!(layout.column_for(500.0), 2);
        assert!(layout.crosses_gutter(1, 330.0, 4.0));
        assert!(!layout.crosses_gutter(2, 900.0, 4.0));
    }

    #[test]
    fn test_single_column_layout_maps_everything_to_one() {
        let layout = ColumnLayout::single();
        assert_eq!(layout.column_for(400.0), 1);
    }
}
