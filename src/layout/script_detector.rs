//! Superscript and subscript detection.
//!
//! Scripts sit on a different baseline than the text they belong to, so
//! adjacency is computed on raw `top` positions. A fragment is a candidate
//! when it is small (width, height and character count below the configured
//! ceilings) and not a bullet-like symbol; it is marked when a larger fragment
//! ends just before it (a trailing script) or starts just after it (a leading
//! script, as in `⁴He`) and the vertical offset between the two tops falls in
//! the superscript or subscript window.
//!
//! The height ceiling has to sit between the tallest real subscript glyphs
//! (about 13-14 units) and the shortest decorative drop caps (30+ units), which
//! is why [`ScriptConfig::max_height`] is validated against
//! [`ScriptConfig::drop_cap_min_height`].

use crate::config::ScriptConfig;
use crate::layout::fragment::{
    Fragment, FragmentArena, FragmentId, ScriptMark, ScriptSide, ScriptType,
};
use phf::phf_set;

/// Symbols that look like scripts by size but never are.
static EXCLUDED_SYMBOLS: phf::Set<&'static str> = phf_set! {
    "•", "◦", "▪", "▫", "■", "□", "●", "○", "‣", "⁃", "∙", "·",
    "-", "–", "—", "‒", "―", "|", "¶", "§",
};

/// Marks script fragments in place.
pub struct ScriptDetector<'a> {
    config: &'a ScriptConfig,
}

impl<'a> ScriptDetector<'a> {
    /// Create a detector using the given thresholds.
    pub fn new(config: &'a ScriptConfig) -> Self {
        Self { config }
    }

    /// Annotate script fragments and return how many were marked.
    ///
    /// Nothing is removed; unmatched candidates stay unmarked.
    pub fn detect(&self, arena: &mut FragmentArena) -> usize {
        let n = arena.len();
        if n < 2 {
            return 0;
        }

        let mut by_top: Vec<FragmentId> = arena.iter().map(|f| f.id).collect();
        by_top.sort_by(|&a, &b| {
            arena[a]
                .bbox
                .top()
                .total_cmp(&arena[b].bbox.top())
                .then(a.cmp(&b))
        });
        let tops: Vec<f32> = by_top.iter().map(|&id| arena[id].bbox.top()).collect();

        let mut marked = vec![false; n];
        let mut is_parent = vec![false; n];
        let mut marks: Vec<(FragmentId, ScriptMark)> = Vec::new();

        for &cid in &by_top {
            if is_parent[cid.0] {
                continue;
            }
            let candidate = &arena[cid];
            if !self.is_candidate(candidate) {
                continue;
            }

            // offset = candidate.top - parent.top, so the parent's top lies in
            // [candidate.top - max offset, candidate.top - min offset].
            let top = candidate.bbox.top();
            let lo = top - self.config.subscript_offset.max;
            let hi = top - self.config.superscript_offset.min;
            let start = tops.partition_point(|&t| t < lo);
            let end = tops.partition_point(|&t| t <= hi);

            // Ranked by horizontal gap, then vertical offset: in justified
            // text the line above ends at the same x as the script's own line.
            let mut best: Option<(Placement, f32, FragmentId)> = None;
            for &pid in &by_top[start..end] {
                if pid == cid || marked[pid.0] {
                    continue;
                }
                let parent = &arena[pid];
                let Some(placement) = self.classify(candidate, parent) else {
                    continue;
                };
                let offset = (top - parent.bbox.top()).abs();
                let better = match &best {
                    None => true,
                    Some((current, best_offset, best_id)) => placement
                        .gap
                        .total_cmp(&current.gap)
                        .then(offset.total_cmp(best_offset))
                        .then(placement.side.cmp(&current.side))
                        .then(pid.cmp(best_id))
                        .is_lt(),
                };
                if better {
                    best = Some((placement, offset, pid));
                }
            }

            if let Some((placement, _, parent)) = best {
                log::trace!(
                    "script {} '{}' -> {:?} ({:?}) of {} '{}'",
                    cid,
                    candidate.text,
                    placement.script_type,
                    placement.side,
                    parent,
                    arena[parent].text
                );
                marked[cid.0] = true;
                is_parent[parent.0] = true;
                marks.push((
                    cid,
                    ScriptMark {
                        script_type: placement.script_type,
                        parent,
                        side: placement.side,
                    },
                ));
            }
        }

        let count = marks.len();
        for (id, mark) in marks {
            arena.mark_script(id, mark);
        }
        log::debug!("Script detection: {} of {} fragments marked", count, n);
        count
    }

    /// Size, length and symbol test, independent of any neighbour.
    pub fn is_candidate(&self, fragment: &Fragment) -> bool {
        let text = fragment.text.trim();
        let chars = text.chars().count();
        fragment.bbox.width < self.config.max_width
            && fragment.bbox.height < self.config.max_height
            && chars > 0
            && chars <= self.config.max_text_len
            && !self.is_excluded(text)
    }

    fn is_excluded(&self, text: &str) -> bool {
        EXCLUDED_SYMBOLS.contains(text)
            || self.config.extra_excluded_symbols.iter().any(|s| s == text)
    }

    /// Decide whether `candidate` is a script of `parent`.
    fn classify(&self, candidate: &Fragment, parent: &Fragment) -> Option<Placement> {
        if parent.text.trim().is_empty() {
            return None;
        }

        let ch = candidate.bbox.height;
        let ph = parent.bbox.height;
        if ph < ch * self.config.min_parent_height_ratio
            || ph > ch * self.config.max_parent_height_ratio
        {
            return None;
        }

        let in_reach = |gap: f32| gap >= -self.config.max_overlap && gap <= self.config.max_gap;
        let trailing = parent.bbox.horizontal_gap(&candidate.bbox);
        let leading = candidate.bbox.horizontal_gap(&parent.bbox);
        let (side, gap) = match (in_reach(trailing), in_reach(leading)) {
            (true, true) if leading.abs() < trailing.abs() => (ScriptSide::Leading, leading.abs()),
            (true, _) => (ScriptSide::Trailing, trailing.abs()),
            (false, true) => (ScriptSide::Leading, leading.abs()),
            (false, false) => return None,
        };

        let offset = candidate.bbox.top() - parent.bbox.top();
        let script_type = if self.config.superscript_offset.contains(offset) {
            ScriptType::Superscript
        } else if self.config.subscript_offset.contains(offset) {
            ScriptType::Subscript
        } else {
            return None;
        };
        Some(Placement {
            script_type,
            side,
            gap,
        })
    }
}

/// A candidate's fit against one possible parent.
struct Placement {
    script_type: ScriptType,
    side: ScriptSide,
    gap: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::fragment::{FontRef, RawFragment};

    fn raw(text: &str, left: f32, top: f32, width: f32, height: f32) -> RawFragment {
        RawFragment::new(text, left, top, width, height, FontRef(0))
    }

    fn detect(fragments: Vec<RawFragment>) -> FragmentArena {
        let mut arena = FragmentArena::from_raw(fragments).unwrap();
        let config = ScriptConfig::default();
        ScriptDetector::new(&config).detect(&mut arena);
        arena
    }

    #[test]
    fn test_subscript_after_parent() {
        let arena = detect(vec![
            raw("H", 100.0, 100.0, 20.0, 18.0),
            raw("2", 121.0, 108.0, 6.0, 10.0),
        ]);

        let script = &arena[FragmentId(1)];
        assert!(script.is_script());
        assert_eq!(script.script_type(), ScriptType::Subscript);
        assert_eq!(script.script_parent(), Some(FragmentId(0)));
        assert!(!arena[FragmentId(0)].is_script());
    }

    #[test]
    fn test_superscript_after_parent() {
        let arena = detect(vec![
            raw("x", 100.0, 100.0, 16.0, 18.0),
            raw("2", 116.5, 95.0, 6.0, 10.0),
        ]);
        assert_eq!(arena[FragmentId(1)].script_type(), ScriptType::Superscript);
    }

    #[test]
    fn test_drop_cap_never_marked() {
        let arena = detect(vec![
            raw("T", 50.0, 100.0, 28.0, 40.0),
            raw("he", 80.0, 100.0, 12.0, 12.0),
            raw("quick brown fox", 95.0, 100.0, 90.0, 12.0),
        ]);
        assert!(arena.iter().all(|f| !f.is_script()));
    }

    #[test]
    fn test_candidate_needs_nearby_parent() {
        let arena = detect(vec![
            raw("H", 100.0, 100.0, 20.0, 18.0),
            raw("2", 131.0, 108.0, 6.0, 10.0), // 11 units away
        ]);
        assert!(!arena[FragmentId(1)].is_script());
    }

    #[test]
    fn test_same_height_neighbour_is_not_a_parent() {
        let arena = detect(vec![
            raw("a", 100.0, 100.0, 6.0, 10.0),
            raw("b", 107.0, 100.0, 6.0, 10.0),
        ]);
        assert!(arena.iter().all(|f| !f.is_script()));
    }

    #[test]
    fn test_bullets_excluded() {
        let arena = detect(vec![
            raw("Item", 100.0, 100.0, 30.0, 18.0),
            raw("•", 131.0, 104.0, 5.0, 10.0),
        ]);
        assert!(!arena[FragmentId(1)].is_script());
    }

    #[test]
    fn test_extra_excluded_symbols() {
        let mut arena = FragmentArena::from_raw(vec![
            raw("Item", 100.0, 100.0, 30.0, 18.0),
            raw("†", 131.0, 96.0, 5.0, 10.0),
        ])
        .unwrap();
        let config = ScriptConfig {
            extra_excluded_symbols: vec!["†".to_string()],
            ..ScriptConfig::default()
        };
        assert_eq!(ScriptDetector::new(&config).detect(&mut arena), 0);
    }

    #[test]
    fn test_offset_between_windows_is_ignored() {
        // offset 2.5 lies between the superscript (<= 2) and subscript (>= 3) windows
        let arena = detect(vec![
            raw("H", 100.0, 100.0, 20.0, 18.0),
            raw("2", 121.0, 102.5, 6.0, 10.0),
        ]);
        assert!(!arena[FragmentId(1)].is_script());
    }

    #[test]
    fn test_nearest_parent_wins() {
        let arena = detect(vec![
            raw("A", 100.0, 100.0, 20.0, 18.0),
            raw("B", 104.0, 101.0, 20.0, 18.0),
            raw("2", 125.0, 108.0, 6.0, 10.0),
        ]);
        assert_eq!(arena[FragmentId(2)].script_parent(), Some(FragmentId(1)));
    }

    #[test]
    fn test_equal_gap_prefers_own_line() {
        // Justified lines share a right edge; the marker belongs to the lower one.
        let arena = detect(vec![
            raw("previous line", 50.0, 114.0, 230.0, 10.0),
            raw("current line", 50.0, 128.0, 230.0, 10.0),
            raw("1", 280.5, 125.0, 4.0, 7.0),
        ]);
        let marker = &arena[FragmentId(2)];
        assert_eq!(marker.script_parent(), Some(FragmentId(1)));
        assert_eq!(marker.script_type(), ScriptType::Superscript);
    }

    #[test]
    fn test_parent_is_never_marked_later() {
        // "x" is small enough to be a candidate, but it already owns the "2".
        let arena = detect(vec![
            raw("x", 100.0, 100.0, 8.0, 12.5),
            raw("2", 108.5, 96.0, 5.0, 8.0),
            raw("WORD", 60.0, 97.0, 39.0, 20.0),
        ]);
        assert!(arena[FragmentId(1)].is_script());
        assert!(!arena[FragmentId(0)].is_script());
        assert!(!arena[FragmentId(2)].is_script());
    }

    #[test]
    fn test_leading_superscript_before_parent() {
        // An isotope mass number set just before the element symbol.
        let arena = detect(vec![
            raw("He", 100.0, 100.0, 30.0, 18.0),
            raw("4", 94.0, 95.0, 5.0, 10.0),
        ]);

        let script = &arena[FragmentId(1)];
        assert_eq!(script.script_type(), ScriptType::Superscript);
        assert_eq!(script.script_parent(), Some(FragmentId(0)));
        assert_eq!(script.script_side(), Some(ScriptSide::Leading));
    }

    #[test]
    fn test_equal_reach_prefers_trailing_parent() {
        // "2" ends 1 unit before "O" and starts 1 unit after "H".
        let arena = detect(vec![
            raw("H", 100.0, 100.0, 20.0, 18.0),
            raw("2", 121.0, 108.0, 6.0, 10.0),
            raw("O", 128.0, 100.0, 20.0, 18.0),
        ]);
        let script = &arena[FragmentId(1)];
        assert_eq!(script.script_parent(), Some(FragmentId(0)));
        assert_eq!(script.script_side(), Some(ScriptSide::Trailing));
    }
}
