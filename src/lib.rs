// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Layout Oxide
//!
//! Reading-order reconstruction for absolutely positioned PDF text fragments.
//!
//! Text extraction tools report each text fragment with its own box and
//! font, in no useful order. This crate rebuilds the structure a reader
//! sees:
//!
//! - **Scripts**: superscripts and subscripts are detected by size and
//!   offset and folded into their parent (`H_2`, `mc^2`), keeping the
//!   original fragments
//! - **Lines**: fragments sharing a baseline are grouped in one linear scan
//! - **Columns**: left-edge clusters that span enough lines become columns;
//!   every fragment gets a `col_id` (0 = full width)
//! - **Runs**: adjacent same-line fragments merge into runs that remember
//!   every source fragment, so inline markup keeps its font attribution
//! - **Reading order**: a block counter that advances whenever `col_id`
//!   changes, with a per-block index
//!
//! ## Quick Start
//!
//! ```
//! use layout_oxide::layout::{FontRef, RawFragment};
//! use layout_oxide::pipeline::{LayoutEngine, PageInput};
//!
//! # fn main() -> layout_oxide::Result<()> {
//! let page = PageInput::new(
//!     1,
//!     612.0,
//!     792.0,
//!     vec![
//!         RawFragment::new("H", 100.0, 100.0, 20.0, 18.0, FontRef(0)),
//!         RawFragment::new("2", 121.0, 108.0, 6.0, 10.0, FontRef(1)),
//!     ],
//! );
//!
//! let layout = LayoutEngine::new().process_page(page)?;
//! let first = &layout.fragments_in_order()[0];
//! assert_eq!(first.text, "H_2");
//! assert_eq!(first.original_fragments().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry
pub mod geometry;

// Layout reconstruction stages
pub mod layout;

// Page and document pipeline
pub mod pipeline;

// Re-exports
pub use config::{LayoutConfig, ReadingOrderMode};
pub use error::{Error, Result};
pub use pipeline::{DocumentProcessor, LayoutEngine, PageInput, PageLayout, PageRecord};
