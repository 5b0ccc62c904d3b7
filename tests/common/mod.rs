#![allow(dead_code)]
//! Shared page builders and invariant checks for integration tests.

use layout_oxide::layout::{FontRef, MergedFragment, RawFragment};
use layout_oxide::pipeline::{PageInput, PageLayout};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const LINE_HEIGHT: f32 = 10.0;
pub const LINE_PITCH: f32 = 14.0;

/// A line-level text fragment of standard height.
pub fn text(content: &str, left: f32, top: f32, width: f32) -> RawFragment {
    RawFragment::new(content, left, top, width, LINE_HEIGHT, FontRef(1))
}

/// Text whose character count matches a 5-unit character width.
pub fn filler(width: f32) -> String {
    "a".repeat(((width / 5.0) as usize).max(1))
}

/// A column line split into a plain part and an italic part at a varying x.
///
/// The split stays in the left half of the column so both parts sit
/// nearest the column's own start.
pub fn split_line(column_left: f32, top: f32, line: usize) -> Vec<RawFragment> {
    let first = 40.0 + ((line * 17) % 80) as f32;
    let second_left = column_left + first + 2.0;
    let second = column_left + 230.0 - second_left;
    vec![
        RawFragment::new(filler(first), column_left, top, first, LINE_HEIGHT, FontRef(1)),
        RawFragment::new(filler(second), second_left, top, second, LINE_HEIGHT, FontRef(2)),
    ]
}

/// A superscript footnote marker after a line ending at `right`.
pub fn footnote_marker(mark: &str, right: f32, line_top: f32) -> RawFragment {
    RawFragment::new(mark, right + 0.5, line_top - 3.0, 4.0, 7.0, FontRef(3))
}

/// A realistic two-column journal page.
///
/// - a spanning title
/// - two 16-line columns at x=50 and x=320, lines split across two fonts
/// - three superscript footnote markers
/// - a two-fragment footnote line in the bottom margin
pub fn journal_page(number: u32) -> PageInput {
    let mut fragments = vec![RawFragment::new(
        "On the Reconstruction of Reading Order",
        50.0,
        50.0,
        500.0,
        18.0,
        FontRef(0),
    )];
    for i in 0..16 {
        let top = 100.0 + i as f32 * LINE_PITCH;
        fragments.extend(split_line(50.0, top, i));
        fragments.extend(split_line(320.0, top, i + 3));
    }
    fragments.push(footnote_marker("1", 280.0, 100.0 + 2.0 * LINE_PITCH));
    fragments.push(footnote_marker("2", 550.0, 100.0 + 7.0 * LINE_PITCH));
    fragments.push(footnote_marker("3", 280.0, 100.0 + 11.0 * LINE_PITCH));

    fragments.push(RawFragment::new("1", 50.0, 745.0, 6.0, 8.0, FontRef(4)));
    fragments.push(RawFragment::new(
        "See the appendix for the complete derivation.",
        58.0,
        745.0,
        300.0,
        8.0,
        FontRef(4),
    ));
    PageInput::new(number, PAGE_WIDTH, PAGE_HEIGHT, fragments)
}

/// Blocks advance by exactly one on every col_id change; indices restart at 1.
pub fn assert_monotonic(fragments: &[MergedFragment]) {
    let mut previous: Option<&MergedFragment> = None;
    for fragment in fragments {
        match previous {
            None => {
                assert_eq!(fragment.reading_order_block, 1);
                assert_eq!(fragment.reading_order_index, 1);
            },
            Some(p) if p.col_id != fragment.col_id => {
                assert_eq!(fragment.reading_order_block, p.reading_order_block + 1);
                assert_eq!(fragment.reading_order_index, 1);
            },
            Some(p) => {
                assert_eq!(fragment.reading_order_block, p.reading_order_block);
                assert_eq!(fragment.reading_order_index, p.reading_order_index + 1);
            },
        }
        previous = Some(fragment);
    }
}

/// Every source fragment appears exactly once.
pub fn assert_conserved(layout: &PageLayout) {
    let mut ids: Vec<usize> = layout
        .fragments_in_order()
        .iter()
        .flat_map(|f| f.original_fragments().iter().map(|id| id.0))
        .collect();
    ids.sort_unstable();
    let expected: Vec<usize> = (0..layout.arena().len()).collect();
    assert_eq!(ids, expected);
}
