//! Configuration for layout reconstruction.
//!
//! Every tunable heuristic of the engine lives here, in one structure, so the
//! thresholds can be recalibrated per corpus without touching the algorithms.
//! Defaults were tuned on typeset books and journal articles extracted with a
//! `pdftohtml`-style tool (units are page-space points).
//!
//! | Section | Field | Default | Used by |
//! |---|---|---|---|
//! | `script` | `max_width` | 15.0 | script candidate width ceiling (exclusive) |
//! | `script` | `max_height` | 14.0 | script candidate height ceiling (exclusive) |
//! | `script` | `drop_cap_min_height` | 30.0 | lower bound of decorative drop caps; `max_height` must stay below it |
//! | `script` | `max_text_len` | 3 | script candidate character count ceiling |
//! | `script` | `max_gap` | 5.0 | largest horizontal gap between parent and script |
//! | `script` | `max_overlap` | 1.0 | largest horizontal overlap between parent and script |
//! | `script` | `min_parent_height_ratio` | 1.2 | parent must be at least this much taller |
//! | `script` | `max_parent_height_ratio` | 2.5 | parent must be at most this much taller |
//! | `script` | `superscript_offset` | [-8, 2] | `script.top - parent.top` window for superscripts |
//! | `script` | `subscript_offset` | [3, 12] | `script.top - parent.top` window for subscripts |
//! | `script` | `superscript_marker` / `subscript_marker` | `^` / `_` | text markers inserted on merge |
//! | `script` | `extra_excluded_symbols` | [] | symbols never treated as scripts, added to the bullet set |
//! | `columns` | `max_cols` | 4 | most columns kept per page |
//! | `columns` | `cluster_tolerance` | 10.0 | left-edge clustering radius |
//! | `columns` | `min_lines` | 12 | distinct lines a column cluster must span |
//! | `columns` | `min_members` | 3 | absolute member minimum per cluster |
//! | `columns` | `min_member_fraction` | 0.05 | member minimum as a fraction of page fragments |
//! | `columns` | `alignment_tolerance` | 5.0 | left-alignment radius for the alignment signal |
//! | `columns` | `single_column_alignment_ratio` | 0.8 | aligned fraction that forces single-column |
//! | `columns` | `max_transition_ratio` | 0.2 | boundary-crossing fraction that forces single-column |
//! | `columns` | `full_width_fraction` | 0.45 | width fraction marking a fragment full-width |
//! | `columns` | `gutter_tolerance` | 4.0 | slack when matching edges against column starts |
//! | `columns` | `footnote_zone_fraction` | 0.07 | bottom band of the page treated as footnote zone |
//! | `columns` | `min_run_length` | 2 | full-width line runs shorter than this are smoothed |
//! | `columns` | `strong_full_width_fraction` | 0.75 | width fraction that survives smoothing |
//! | `baseline` | `tolerance_ratio` | 0.3 | baseline tolerance as a fraction of median height |
//! | `baseline` | `min_tolerance` / `max_tolerance` | 1.0 / 6.0 | tolerance clamp |
//! | `inline` | `space_width_ratio` | 0.5 | inferred space width as a fraction of median char width |
//! | `inline` | `max_gap_spaces` | 3.0 | largest mergeable gap, in space widths |
//! | `inline` | `space_insert_fraction` | 0.5 | gap (in space widths) at which a space is inserted |
//! | `inline` | `max_overlap` | 2.0 | largest mergeable horizontal overlap |
//! | `reading_order` | `mode` | `vertical_scan` | block assignment ordering |
//! | `document` | `checkpoint_interval` | 50 | pages between memory checkpoints |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An inclusive window of vertical offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetWindow {
    /// Smallest accepted offset
    pub min: f32,
    /// Largest accepted offset
    pub max: f32,
}

impl OffsetWindow {
    /// Create a new window.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `offset` falls inside the window.
    pub fn contains(&self, offset: f32) -> bool {
        offset >= self.min && offset <= self.max
    }
}

/// Text inserted around a script when it is folded into its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMarker {
    /// Inserted before the script text
    pub open: String,
    /// Inserted after the script text
    pub close: String,
}

impl ScriptMarker {
    /// Create a marker from open/close strings.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Wrap `text` in the marker.
    pub fn wrap(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.open.len() + text.len() + self.close.len());
        out.push_str(&self.open);
        out.push_str(text);
        out.push_str(&self.close);
        out
    }
}

/// Superscript/subscript detection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    /// Candidates must be narrower than this
    pub max_width: f32,
    /// Candidates must be shorter than this
    pub max_height: f32,
    /// Smallest height of a decorative drop cap
    pub drop_cap_min_height: f32,
    /// Candidates may hold at most this many characters
    pub max_text_len: usize,
    /// Largest gap between the parent's right edge and the script's left edge
    pub max_gap: f32,
    /// Largest horizontal overlap between parent and script
    pub max_overlap: f32,
    /// Parent height must be at least `candidate height × ratio`
    pub min_parent_height_ratio: f32,
    /// Parent height must be at most `candidate height × ratio`
    pub max_parent_height_ratio: f32,
    /// Offset window (`script.top - parent.top`) for superscripts
    pub superscript_offset: OffsetWindow,
    /// Offset window (`script.top - parent.top`) for subscripts
    pub subscript_offset: OffsetWindow,
    /// Marker used when folding superscripts
    pub superscript_marker: ScriptMarker,
    /// Marker used when folding subscripts
    pub subscript_marker: ScriptMarker,
    /// Symbols that are never scripts, on top of the built-in bullet set
    pub extra_excluded_symbols: Vec<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_width: 15.0,
            max_height: 14.0,
            drop_cap_min_height: 30.0,
            max_text_len: 3,
            max_gap: 5.0,
            max_overlap: 1.0,
            min_parent_height_ratio: 1.2,
            max_parent_height_ratio: 2.5,
            superscript_offset: OffsetWindow::new(-8.0, 2.0),
            subscript_offset: OffsetWindow::new(3.0, 12.0),
            superscript_marker: ScriptMarker::new("^", ""),
            subscript_marker: ScriptMarker::new("_", ""),
            extra_excluded_symbols: Vec::new(),
        }
    }
}

/// Column clustering and assignment thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    /// Most columns kept per page
    pub max_cols: usize,
    /// Left edges within this distance of a cluster's first edge join it
    pub cluster_tolerance: f32,
    /// Distinct lines a cluster must span to count as a column
    pub min_lines: usize,
    /// Absolute member minimum per cluster
    pub min_members: usize,
    /// Member minimum as a fraction of all page fragments
    pub min_member_fraction: f32,
    /// Radius used by the left-alignment signal
    pub alignment_tolerance: f32,
    /// Aligned fraction at or above which the page is single-column
    pub single_column_alignment_ratio: f32,
    /// Boundary-crossing fraction above which the page is single-column
    pub max_transition_ratio: f32,
    /// Fragments at least this fraction of page width are full-width
    pub full_width_fraction: f32,
    /// Slack when comparing edges with column starts
    pub gutter_tolerance: f32,
    /// Fraction of page height at the bottom treated as footnote zone
    pub footnote_zone_fraction: f32,
    /// Full-width line runs shorter than this are smoothed away
    pub min_run_length: usize,
    /// Fragments at least this fraction of page width are never smoothed
    pub strong_full_width_fraction: f32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            max_cols: 4,
            cluster_tolerance: 10.0,
            min_lines: 12,
            min_members: 3,
            min_member_fraction: 0.05,
            alignment_tolerance: 5.0,
            single_column_alignment_ratio: 0.8,
            max_transition_ratio: 0.2,
            full_width_fraction: 0.45,
            gutter_tolerance: 4.0,
            footnote_zone_fraction: 0.07,
            min_run_length: 2,
            strong_full_width_fraction: 0.75,
        }
    }
}

/// Baseline grouping tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaselineConfig {
    /// Tolerance as a fraction of the median fragment height
    pub tolerance_ratio: f32,
    /// Lower clamp for the tolerance
    pub min_tolerance: f32,
    /// Upper clamp for the tolerance
    pub max_tolerance: f32,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.3,
            min_tolerance: 1.0,
            max_tolerance: 6.0,
        }
    }
}

/// Inline (same-line) merging thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InlineConfig {
    /// Space width as a fraction of the median character width
    pub space_width_ratio: f32,
    /// Largest mergeable gap, in space widths
    pub max_gap_spaces: f32,
    /// Gap, in space widths, at which a space is inserted between runs
    pub space_insert_fraction: f32,
    /// Largest mergeable horizontal overlap
    pub max_overlap: f32,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            space_width_ratio: 0.5,
            max_gap_spaces: 3.0,
            space_insert_fraction: 0.5,
            max_overlap: 2.0,
        }
    }
}

/// Ordering used before block numbers are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingOrderMode {
    /// Sort by `(baseline, left)` over the whole page
    #[default]
    VerticalScan,
    /// Split into full-width/columnar bands, then read each column to the end of its band
    ColumnBands,
}

/// Reading order options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingOrderConfig {
    /// Ordering mode
    pub mode: ReadingOrderMode,
}

/// Multi-page processing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    /// Pages processed between memory checkpoints
    pub checkpoint_interval: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 50,
        }
    }
}

/// Complete layout engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Script detection
    pub script: ScriptConfig,
    /// Column clustering and assignment
    pub columns: ColumnConfig,
    /// Baseline grouping
    pub baseline: BaselineConfig,
    /// Inline merging
    pub inline: InlineConfig,
    /// Reading order
    pub reading_order: ReadingOrderConfig,
    /// Multi-page processing
    pub document: DocumentConfig,
}

impl LayoutConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Set the reading order mode.
    pub fn with_reading_order_mode(mut self, mode: ReadingOrderMode) -> Self {
        self.reading_order.mode = mode;
        self
    }

    /// Set the script size ceilings.
    pub fn with_script_size(mut self, max_width: f32, max_height: f32) -> Self {
        self.script.max_width = max_width;
        self.script.max_height = max_height;
        self
    }

    /// Set the minimum number of lines a column must span.
    pub fn with_min_column_lines(mut self, min_lines: usize) -> Self {
        self.columns.min_lines = min_lines;
        self
    }

    /// Set the page interval between memory checkpoints.
    pub fn with_checkpoint_interval(mut self, pages: usize) -> Self {
        self.document.checkpoint_interval = pages;
        self
    }

    /// Check every value against its documented range.
    pub fn validate(&self) -> Result<()> {
        let s = &self.script;
        positive("script.max_width", s.max_width)?;
        positive("script.max_height", s.max_height)?;
        if s.max_height >= s.drop_cap_min_height {
            return Err(Error::InvalidConfig(format!(
                "script.max_height ({}) must be below script.drop_cap_min_height ({})",
                s.max_height, s.drop_cap_min_height
            )));
        }
        if s.max_text_len == 0 {
            return Err(Error::InvalidConfig("script.max_text_len must be at least 1".into()));
        }
        non_negative("script.max_gap", s.max_gap)?;
        non_negative("script.max_overlap", s.max_overlap)?;
        if s.min_parent_height_ratio < 1.0 || s.max_parent_height_ratio < s.min_parent_height_ratio {
            return Err(Error::InvalidConfig(
                "script parent height ratios must satisfy 1 <= min <= max".into(),
            ));
        }
        for (name, w) in [
            ("script.superscript_offset", s.superscript_offset),
            ("script.subscript_offset", s.subscript_offset),
        ] {
            if !(w.min.is_finite() && w.max.is_finite()) || w.min > w.max {
                return Err(Error::InvalidConfig(format!("{} must satisfy min <= max", name)));
            }
        }
        if s.superscript_offset.max >= s.subscript_offset.min {
            return Err(Error::InvalidConfig(
                "script.superscript_offset must lie entirely above script.subscript_offset".into(),
            ));
        }

        let c = &self.columns;
        if c.max_cols == 0 {
            return Err(Error::InvalidConfig("columns.max_cols must be at least 1".into()));
        }
        positive("columns.cluster_tolerance", c.cluster_tolerance)?;
        non_negative("columns.alignment_tolerance", c.alignment_tolerance)?;
        non_negative("columns.gutter_tolerance", c.gutter_tolerance)?;
        fraction("columns.min_member_fraction", c.min_member_fraction)?;
        fraction("columns.single_column_alignment_ratio", c.single_column_alignment_ratio)?;
        fraction("columns.max_transition_ratio", c.max_transition_ratio)?;
        fraction("columns.full_width_fraction", c.full_width_fraction)?;
        fraction("columns.footnote_zone_fraction", c.footnote_zone_fraction)?;
        fraction("columns.strong_full_width_fraction", c.strong_full_width_fraction)?;
        if c.strong_full_width_fraction < c.full_width_fraction {
            return Err(Error::InvalidConfig(
                "columns.strong_full_width_fraction must not be below columns.full_width_fraction"
                    .into(),
            ));
        }

        let b = &self.baseline;
        positive("baseline.tolerance_ratio", b.tolerance_ratio)?;
        non_negative("baseline.min_tolerance", b.min_tolerance)?;
        if b.max_tolerance < b.min_tolerance {
            return Err(Error::InvalidConfig(
                "baseline.max_tolerance must not be below baseline.min_tolerance".into(),
            ));
        }

        let i = &self.inline;
        positive("inline.space_width_ratio", i.space_width_ratio)?;
        non_negative("inline.max_gap_spaces", i.max_gap_spaces)?;
        non_negative("inline.space_insert_fraction", i.space_insert_fraction)?;
        non_negative("inline.max_overlap", i.max_overlap)?;

        if self.document.checkpoint_interval == 0 {
            return Err(Error::InvalidConfig(
                "document.checkpoint_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must be non-negative, got {}", name, value)))
    }
}

fn fraction(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must be in (0, 1], got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_script_height_must_stay_below_drop_caps() {
        let config = LayoutConfig::new().with_script_size(15.0, 32.0);
        let err = config.validate().unwrap_err();
        assert!(format!("{}", err).contains("drop_cap_min_height"));
    }

    #[test]
    fn test_overlapping_offset_windows_rejected() {
        let mut config = LayoutConfig::default();
        config.script.superscript_offset = OffsetWindow::new(-8.0, 5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fraction_bounds() {
        let mut config = LayoutConfig::default();
        config.columns.full_width_fraction = 1.5;
        assert!(config.validate().is_err());

        config.columns.full_width_fraction = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{"columns": {"min_lines": 8}, "reading_order": {"mode": "column_bands"}}"#,
        )
        .unwrap();
        assert_eq!(config.columns.min_lines, 8);
        assert_eq!(config.columns.max_cols, 4);
        assert_eq!(config.reading_order.mode, ReadingOrderMode::ColumnBands);
        assert_eq!(config.script, ScriptConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = LayoutConfig::from_json_str(r#"{"columns": {"min_line": 8}}"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        let result = LayoutConfig::from_json_str(r#"{"document": {"checkpoint_interval": 0}}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"script": {{"max_height": 13.5}}}}"#).unwrap();

        let config = LayoutConfig::from_file(file.path()).unwrap();
        assert_eq!(config.script.max_height, 13.5);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = LayoutConfig::new()
            .with_min_column_lines(10)
            .with_checkpoint_interval(7);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LayoutConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_marker_wrap() {
        let marker = ScriptMarker::new("<sup>", "</sup>");
        assert_eq!(marker.wrap("2"), "<sup>2</sup>");
        assert_eq!(ScriptConfig::default().subscript_marker.wrap("2"), "_2");
    }
}
