//! Layout reconstruction stages.
//!
//! Each stage runs once per page, in this order:
//! - script detection (annotation only)
//! - baseline grouping into physical lines
//! - column clustering and column id assignment on the unmerged fragments
//! - script merging across lines
//! - inline merging within lines
//! - reading order assignment

pub mod baseline_grouper;
pub mod column_assigner;
pub mod column_clusterer;
pub mod fragment;
pub mod inline_merger;
pub mod reading_order;
pub mod script_detector;
pub mod script_merger;

// Re-export main types
pub use baseline_grouper::{BaselineGrouper, BaselineGrouping, LineGroup};
pub use column_assigner::{ColumnAssigner, FULL_WIDTH};
pub use column_clusterer::{ColumnCluster, ColumnClusterer, ColumnLayout, SingleColumnSignals};
pub use fragment::{
    FontRef, Fragment, FragmentArena, FragmentId, InlineRun, MergedFragment, RawFragment, ScriptSide,
    ScriptType,
};
pub use inline_merger::InlineMerger;
pub use reading_order::{
    ColumnBandsStrategy, OrderingStrategy, ReadingOrderAssigner, VerticalScanStrategy,
};
pub use script_detector::ScriptDetector;
pub use script_merger::ScriptMerger;
