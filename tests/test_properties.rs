//! Property tests for page-level invariants on arbitrary fragment soups.

mod common;

use common::{assert_monotonic, PAGE_HEIGHT, PAGE_WIDTH};
use layout_oxide::layout::{FontRef, RawFragment};
use layout_oxide::pipeline::{LayoutEngine, PageInput};
use layout_oxide::{LayoutConfig, ReadingOrderMode};
use proptest::prelude::*;

fn fragment() -> impl Strategy<Value = RawFragment> {
    (
        "[a-z]{1,8}",
        0.0f32..560.0,
        0.0f32..760.0,
        1.0f32..300.0,
        4.0f32..30.0,
        0u32..4,
    )
        .prop_map(|(text, left, top, width, height, font)| {
            RawFragment::new(text, left, top, width, height, FontRef(font))
        })
}

/// Column-shaped pages: lines snapped to a few left edges, plus small fragments.
fn columnar_fragment() -> impl Strategy<Value = RawFragment> {
    (
        prop::sample::select(vec![50.0f32, 52.0, 320.0, 321.0, 180.0]),
        0usize..50,
        20.0f32..240.0,
        prop::bool::weighted(0.1),
    )
        .prop_map(|(left, line, width, small)| {
            let top = 60.0 + line as f32 * 14.0;
            if small {
                RawFragment::new("1", left + width + 0.5, top - 3.0, 4.0, 7.0, FontRef(3))
            } else {
                RawFragment::new("some words", left, top, width, 10.0, FontRef(1))
            }
        })
}

fn page(fragments: Vec<RawFragment>) -> PageInput {
    PageInput::new(1, PAGE_WIDTH, PAGE_HEIGHT, fragments)
}

proptest! {
    #[test]
    fn prop_every_fragment_kept_exactly_once(fragments in prop::collection::vec(fragment(), 0..120)) {
        let count = fragments.len();
        let layout = LayoutEngine::new().process_page(page(fragments)).unwrap();

        let total: usize = layout
            .fragments_in_order()
            .iter()
            .map(|f| f.original_fragments().len())
            .sum();
        prop_assert_eq!(total, count);
    }

    #[test]
    fn prop_blocks_are_monotonic(fragments in prop::collection::vec(columnar_fragment(), 0..150)) {
        for mode in [ReadingOrderMode::VerticalScan, ReadingOrderMode::ColumnBands] {
            let engine = LayoutEngine::with_config(LayoutConfig::new().with_reading_order_mode(mode)).unwrap();
            let layout = engine.process_page(page(fragments.clone())).unwrap();
            assert_monotonic(layout.fragments_in_order());
        }
    }

    #[test]
    fn prop_processing_is_deterministic(fragments in prop::collection::vec(columnar_fragment(), 0..150)) {
        let engine = LayoutEngine::new();
        let first = engine.process_page(page(fragments.clone())).unwrap().to_record();
        let second = engine.process_page(page(fragments)).unwrap().to_record();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_scripts_never_parent_scripts(fragments in prop::collection::vec(columnar_fragment(), 0..150)) {
        let layout = LayoutEngine::new().process_page(page(fragments)).unwrap();
        for fragment in layout.arena().iter() {
            if let Some(parent) = fragment.script_parent() {
                prop_assert!(!layout.arena()[parent].is_script());
            }
        }
    }
}
