//! Folding marked scripts into their parents.
//!
//! Scripts sit on a different baseline than their parent by definition, so
//! the baseline grouper often files them under a separate line. Merging
//! therefore works on the whole page: every source fragment's run location
//! is tracked, and each script is attached to whichever run currently owns
//! its parent: appended when it trails the parent, prepended when it leads.

use crate::config::ScriptConfig;
use crate::layout::baseline_grouper::BaselineGrouping;
use crate::layout::fragment::{FragmentArena, FragmentId, MergedFragment, ScriptSide, ScriptType};
use indexmap::IndexMap;

/// Folds script fragments into the runs of their parents.
pub struct ScriptMerger<'a> {
    config: &'a ScriptConfig,
}

impl<'a> ScriptMerger<'a> {
    /// Create a merger using the configured markers.
    pub fn new(config: &'a ScriptConfig) -> Self {
        Self { config }
    }

    /// Build per-line runs with every resolvable script folded into its parent.
    ///
    /// Lines are returned in baseline order, runs within a line by left edge.
    /// Lines whose fragments were all absorbed elsewhere are dropped.
    pub fn merge(&self, arena: &FragmentArena, lines: &BaselineGrouping) -> Vec<Vec<MergedFragment>> {
        let mut runs: Vec<Vec<MergedFragment>> = Vec::with_capacity(lines.lines.len());
        let mut location: IndexMap<FragmentId, (usize, usize)> = IndexMap::with_capacity(arena.len());

        for (line_index, line) in lines.lines.iter().enumerate() {
            let mut line_runs = Vec::with_capacity(line.members.len());
            for &id in &line.members {
                let fragment = &arena[id];
                if fragment.is_script() {
                    continue;
                }
                location.insert(id, (line_index, line_runs.len()));
                line_runs.push(MergedFragment::from_source(fragment));
            }
            runs.push(line_runs);
        }

        let mut scripts: Vec<FragmentId> = arena.iter().filter(|f| f.is_script()).map(|f| f.id).collect();
        scripts.sort_by(|&a, &b| {
            let (fa, fb) = (&arena[a], &arena[b]);
            fa.bbox
                .left()
                .total_cmp(&fb.bbox.left())
                .then(fa.bbox.top().total_cmp(&fb.bbox.top()))
                .then(a.cmp(&b))
        });

        // Leading scripts are prepended, so they go in from the parent outward.
        let (leading, trailing): (Vec<FragmentId>, Vec<FragmentId>) = scripts
            .into_iter()
            .partition(|&id| arena[id].script_side() == Some(ScriptSide::Leading));

        let mut merged = 0usize;
        let mut touched_lines: Vec<usize> = Vec::new();
        for id in leading.into_iter().rev().chain(trailing) {
            let script = &arena[id];
            match Self::resolve_parent(arena, id).and_then(|p| location.get(&p).copied()) {
                Some((line, item)) => {
                    let marker = match script.script_type() {
                        ScriptType::Subscript => &self.config.subscript_marker,
                        _ => &self.config.superscript_marker,
                    };
                    let run = &mut runs[line][item];
                    match script.script_side() {
                        Some(ScriptSide::Leading) => run.prepend_script(script, marker),
                        _ => run.append_script(script, marker),
                    }
                    location.insert(id, (line, item));
                    merged += 1;
                },
                None => {
                    log::warn!(
                        "Script {} '{}' has no resolvable parent; kept as its own run",
                        id,
                        script.text
                    );
                    let line = lines.line_index(id);
                    location.insert(id, (line, runs[line].len()));
                    runs[line].push(MergedFragment::from_source(script));
                    touched_lines.push(line);
                },
            }
        }

        // Unresolved scripts were appended at the end of their line.
        for line in touched_lines {
            runs[line].sort_by(|a, b| a.bbox.left().total_cmp(&b.bbox.left()));
        }

        let before = runs.len();
        runs.retain(|line| !line.is_empty());
        log::debug!(
            "Script merging: {} scripts folded, {} emptied lines removed",
            merged,
            before - runs.len()
        );
        runs
    }

    /// Follow parent links to the first fragment that is not itself a script.
    fn resolve_parent(arena: &FragmentArena, script: FragmentId) -> Option<FragmentId> {
        let mut current = arena[script].script_parent()?;
        // A chain can never be longer than the page.
        for _ in 0..arena.len() {
            let fragment = arena.get(current)?;
            match fragment.script_parent() {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
        None
    }
}
