//! Fragment representation for layout analysis.
//!
//! Source fragments are stored once per page in a [`FragmentArena`] and are
//! referred to everywhere else by [`FragmentId`]. Merging stages build
//! [`MergedFragment`]s that own an append-only list of those ids, so a merged
//! fragment can only ever reference true source fragments: merging the same
//! run twice cannot nest one merge inside another.

use crate::config::ScriptMarker;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Opaque font reference supplied by the ingestion tool.
///
/// Size and family resolution belong to the font table, not to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontRef(pub u32);

impl fmt::Display for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font{}", self.0)
    }
}

/// Index of a source fragment inside its page's [`FragmentArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(pub usize);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Script classification of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Regular text
    #[default]
    None,
    /// Raised above the parent's baseline
    Superscript,
    /// Lowered relative to the parent's top
    Subscript,
}

/// Which side of its parent a script sits on.
///
/// Ordered so that a trailing script wins ties against a leading one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSide {
    /// After the parent (`mc^2`, `H_2`, footnote markers)
    #[default]
    Trailing,
    /// Before the parent (isotopes such as `^4He`)
    Leading,
}

/// Annotation written by the script detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptMark {
    /// Superscript or subscript
    pub script_type: ScriptType,
    /// The larger fragment this script belongs to
    pub parent: FragmentId,
    /// Position relative to the parent
    pub side: ScriptSide,
}

/// A fragment as delivered by the ingestion tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFragment {
    /// Text content
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Baseline; defaults to `top + height` when the tool does not report one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f32>,
    /// Font reference
    #[serde(default)]
    pub font_ref: FontRef,
}

impl RawFragment {
    /// Create a raw fragment without an explicit baseline.
    pub fn new(
        text: impl Into<String>,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        font_ref: FontRef,
    ) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
            baseline: None,
            font_ref,
        }
    }

    /// Set an explicit baseline.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = Some(baseline);
        self
    }
}

/// A positioned source fragment plus the annotations the engine assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Position in the arena
    pub id: FragmentId,
    /// Text content
    pub text: String,
    /// Bounding box
    pub bbox: Rect,
    /// Baseline y-coordinate
    pub baseline: f32,
    /// Font reference
    pub font_ref: FontRef,
    /// Column id: 0 is full-width, 1..N are columns
    pub col_id: u32,
    script: Option<ScriptMark>,
}

impl Fragment {
    /// Whether the script detector marked this fragment.
    pub fn is_script(&self) -> bool {
        self.script.is_some()
    }

    /// Script classification ([`ScriptType::None`] for regular text).
    pub fn script_type(&self) -> ScriptType {
        self.script.map_or(ScriptType::None, |m| m.script_type)
    }

    /// The parent fragment of a script.
    pub fn script_parent(&self) -> Option<FragmentId> {
        self.script.map(|m| m.parent)
    }

    /// Side of the parent a script sits on.
    pub fn script_side(&self) -> Option<ScriptSide> {
        self.script.map(|m| m.side)
    }

    /// Number of characters in the trimmed text.
    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Flat storage for one page's source fragments.
#[derive(Debug, Clone, Default)]
pub struct FragmentArena {
    fragments: Vec<Fragment>,
}

impl FragmentArena {
    /// Build an arena from ingested fragments, rejecting unusable geometry.
    pub fn from_raw(raw: Vec<RawFragment>) -> Result<Self> {
        let mut fragments = Vec::with_capacity(raw.len());
        for (index, r) in raw.into_iter().enumerate() {
            let bbox = Rect::new(r.left, r.top, r.width, r.height);
            if !bbox.is_well_formed() {
                return Err(Error::InvalidFragment {
                    index,
                    reason: format!(
                        "bad box left={} top={} width={} height={}",
                        r.left, r.top, r.width, r.height
                    ),
                });
            }
            let baseline = r.baseline.unwrap_or_else(|| bbox.bottom());
            if !baseline.is_finite() {
                return Err(Error::InvalidFragment {
                    index,
                    reason: format!("baseline is {}", baseline),
                });
            }
            fragments.push(Fragment {
                id: FragmentId(index),
                text: r.text,
                bbox,
                baseline,
                font_ref: r.font_ref,
                col_id: 0,
                script: None,
            });
        }
        Ok(Self { fragments })
    }

    /// Number of source fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the page has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Look up a fragment.
    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.0)
    }

    /// Iterate over all fragments in ingestion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    pub(crate) fn mark_script(&mut self, id: FragmentId, mark: ScriptMark) {
        self.fragments[id.0].script = Some(mark);
    }

    pub(crate) fn set_col_id(&mut self, id: FragmentId, col_id: u32) {
        self.fragments[id.0].col_id = col_id;
    }
}

impl Index<FragmentId> for FragmentArena {
    type Output = Fragment;

    fn index(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.0]
    }
}

/// An output fragment owning one or more source fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFragment {
    /// Merged text, with script markers and inferred spaces
    pub text: String,
    /// Union of the source boxes
    pub bbox: Rect,
    /// Baseline of the source the fragment was started from
    pub baseline: f32,
    /// Font of the source the fragment was started from
    pub font_ref: FontRef,
    /// Column id
    pub col_id: u32,
    /// Reading-order block, starting at 1
    pub reading_order_block: u32,
    /// Position inside the block, starting at 1
    pub reading_order_index: u32,
    original_fragments: Vec<FragmentId>,
    space_before: Vec<bool>,
}

impl MergedFragment {
    /// Start a merged fragment from a single source.
    pub fn from_source(fragment: &Fragment) -> Self {
        Self {
            text: fragment.text.clone(),
            bbox: fragment.bbox,
            baseline: fragment.baseline,
            font_ref: fragment.font_ref,
            col_id: fragment.col_id,
            reading_order_block: 0,
            reading_order_index: 0,
            original_fragments: vec![fragment.id],
            space_before: vec![false],
        }
    }

    /// Ids of the source fragments, in merge order.
    pub fn original_fragments(&self) -> &[FragmentId] {
        &self.original_fragments
    }

    /// Full source records, in merge order.
    pub fn originals<'a>(&'a self, arena: &'a FragmentArena) -> impl Iterator<Item = &'a Fragment> + 'a {
        self.original_fragments.iter().map(move |&id| &arena[id])
    }

    /// Fold a script fragment into this one.
    pub(crate) fn append_script(&mut self, script: &Fragment, marker: &ScriptMarker) {
        self.text.push_str(&marker.wrap(script.text.trim()));
        self.bbox = self.bbox.union(&script.bbox);
        self.original_fragments.push(script.id);
        self.space_before.push(false);
    }

    /// Put a leading script in front of this fragment.
    pub(crate) fn prepend_script(&mut self, script: &Fragment, marker: &ScriptMarker) {
        let mut text = marker.wrap(script.text.trim());
        text.push_str(&self.text);
        self.text = text;
        self.bbox = self.bbox.union(&script.bbox);
        self.original_fragments.insert(0, script.id);
        self.space_before.insert(0, false);
    }

    /// Absorb the next run on the same line.
    pub(crate) fn absorb(&mut self, next: MergedFragment, insert_space: bool) {
        if insert_space {
            self.text.push(' ');
        }
        self.text.push_str(&next.text);
        self.bbox = self.bbox.union(&next.bbox);

        // The separator belongs to the first absorbed source.
        let mut spaces = next.space_before;
        if let Some(first) = spaces.first_mut() {
            *first = insert_space;
        }
        self.space_before.extend(spaces);
        self.original_fragments.extend(next.original_fragments);
    }

    /// Regroup the sources into inline runs sharing font and script type.
    ///
    /// Markup generators use this to emit attribute-accurate inline elements,
    /// e.g. a bold page number inside an otherwise plain index entry.
    pub fn runs(&self, arena: &FragmentArena) -> Vec<InlineRun> {
        let mut runs: Vec<InlineRun> = Vec::new();
        for (&id, &space) in self.original_fragments.iter().zip(&self.space_before) {
            let source = &arena[id];
            let script_type = source.script_type();
            let text = if script_type == ScriptType::None {
                source.text.as_str()
            } else {
                source.text.trim()
            };
            match runs.last_mut() {
                Some(run) if run.font_ref == source.font_ref && run.script_type == script_type => {
                    if space {
                        run.text.push(' ');
                    }
                    run.text.push_str(text);
                    run.bbox = run.bbox.union(&source.bbox);
                },
                _ => runs.push(InlineRun {
                    text: text.to_string(),
                    font_ref: source.font_ref,
                    script_type,
                    bbox: source.bbox,
                    space_before: space,
                }),
            }
        }
        runs
    }
}

/// A maximal sequence of sources inside a merged fragment sharing font and script type.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRun {
    /// Concatenated source text, without script markers
    pub text: String,
    /// Shared font reference
    pub font_ref: FontRef,
    /// Shared script classification
    pub script_type: ScriptType,
    /// Union of the sources' boxes
    pub bbox: Rect,
    /// Whether a space separates this run from the previous one
    pub space_before: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, left: f32, top: f32, width: f32, height: f32, font: u32) -> RawFragment {
        RawFragment::new(text, left, top, width, height, FontRef(font))
    }

    #[test]
    fn test_arena_defaults_baseline_to_bottom() {
        let arena = FragmentArena::from_raw(vec![
            raw("Hello", 10.0, 100.0, 40.0, 12.0, 0),
            raw("world", 55.0, 100.0, 40.0, 12.0, 0).with_baseline(109.5),
        ])
        .unwrap();

        assert_eq!(arena.len(), 2);
        assert_eq!(arena[FragmentId(0)].baseline, 112.0);
        assert_eq!(arena[FragmentId(1)].baseline, 109.5);
        assert_eq!(arena[FragmentId(1)].id, FragmentId(1));
        assert!(!arena[FragmentId(0)].is_script());
        assert_eq!(arena[FragmentId(0)].script_type(), ScriptType::None);
    }

    #[test]
    fn test_arena_rejects_bad_geometry() {
        let err = FragmentArena::from_raw(vec![
            raw("ok", 0.0, 0.0, 10.0, 10.0, 0),
            raw("bad", 0.0, 0.0, f32::NAN, 10.0, 0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFragment { index: 1, .. }));
    }

    #[test]
    fn test_raw_fragment_json_without_baseline() {
        let fragment: RawFragment = serde_json::from_str(
            r#"{"text": "x", "left": 1, "top": 2, "width": 3, "height": 4, "font_ref": 7}"#,
        )
        .unwrap();
        assert_eq!(fragment.baseline, None);
        assert_eq!(fragment.font_ref, FontRef(7));
    }

    #[test]
    fn test_absorb_keeps_sources_flat() {
        let arena = FragmentArena::from_raw(vec![
            raw("a", 0.0, 0.0, 5.0, 10.0, 0),
            raw("b", 5.0, 0.0, 5.0, 10.0, 0),
            raw("c", 13.0, 0.0, 5.0, 10.0, 0),
        ])
        .unwrap();

        let mut bc = MergedFragment::from_source(&arena[FragmentId(1)]);
        bc.absorb(MergedFragment::from_source(&arena[FragmentId(2)]), true);
        let mut abc = MergedFragment::from_source(&arena[FragmentId(0)]);
        abc.absorb(bc, false);

        assert_eq!(abc.text, "ab c");
        assert_eq!(
            abc.original_fragments(),
            &[FragmentId(0), FragmentId(1), FragmentId(2)]
        );
        assert_eq!(abc.bbox, Rect::new(0.0, 0.0, 18.0, 10.0));
        let texts: Vec<&str> = abc.originals(&arena).map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_runs_split_on_font_change() {
        // An index entry whose page number is set in bold (font 2).
        let arena = FragmentArena::from_raw(vec![
            raw("Entropy,", 50.0, 100.0, 40.0, 12.0, 1),
            raw("12,", 93.0, 100.0, 12.0, 12.0, 1),
            raw("47", 108.0, 100.0, 10.0, 12.0, 2),
        ])
        .unwrap();

        let mut entry = MergedFragment::from_source(&arena[FragmentId(0)]);
        entry.absorb(MergedFragment::from_source(&arena[FragmentId(1)]), true);
        entry.absorb(MergedFragment::from_source(&arena[FragmentId(2)]), true);

        let runs = entry.runs(&arena);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Entropy, 12,");
        assert_eq!(runs[0].font_ref, FontRef(1));
        assert_eq!(runs[1].text, "47");
        assert_eq!(runs[1].font_ref, FontRef(2));
        assert!(runs[1].space_before);
    }

    #[test]
    fn test_append_script_records_raw_source() {
        let mut arena = FragmentArena::from_raw(vec![
            raw("H", 100.0, 100.0, 20.0, 18.0, 0),
            raw("2", 121.0, 108.0, 6.0, 10.0, 3),
        ])
        .unwrap();
        arena.mark_script(
            FragmentId(1),
            ScriptMark {
                script_type: ScriptType::Subscript,
                parent: FragmentId(0),
                side: ScriptSide::Trailing,
            },
        );

        let mut parent = MergedFragment::from_source(&arena[FragmentId(0)]);
        parent.append_script(&arena[FragmentId(1)], &ScriptMarker::new("_", ""));

        assert_eq!(parent.text, "H_2");
        assert_eq!(parent.original_fragments(), &[FragmentId(0), FragmentId(1)]);
        let runs = parent.runs(&arena);
        assert_eq!(runs[1].script_type, ScriptType::Subscript);
        assert_eq!(runs[1].font_ref, FontRef(3));
        assert_eq!(runs[1].text, "2");
    }

    #[test]
    fn test_prepend_script_leads_text_and_sources() {
        let mut arena = FragmentArena::from_raw(vec![
            raw("He", 100.0, 100.0, 30.0, 18.0, 0),
            raw("4", 94.0, 95.0, 5.0, 10.0, 3),
        ])
        .unwrap();
        arena.mark_script(
            FragmentId(1),
            ScriptMark {
                script_type: ScriptType::Superscript,
                parent: FragmentId(0),
                side: ScriptSide::Leading,
            },
        );

        let mut parent = MergedFragment::from_source(&arena[FragmentId(0)]);
        parent.prepend_script(&arena[FragmentId(1)], &ScriptMarker::new("^", ""));

        assert_eq!(parent.text, "^4He");
        assert_eq!(parent.original_fragments(), &[FragmentId(1), FragmentId(0)]);
        assert_eq!(parent.bbox, Rect::from_points(94.0, 95.0, 130.0, 118.0));
        assert_eq!(parent.font_ref, FontRef(0));
        let runs = parent.runs(&arena);
        assert_eq!(runs[0].text, "4");
        assert_eq!(runs[0].script_type, ScriptType::Superscript);
        assert_eq!(runs[1].text, "He");
        assert!(!runs[1].space_before);
    }
}
