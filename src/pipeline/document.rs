//! Multi-page processing.
//!
//! Pages are streamed: each one is reconstructed, handed to a [`PageSink`]
//! and dropped. Every `checkpoint_interval` pages the sink gets a chance to
//! release whatever per-page structures it has accumulated, which keeps the
//! peak memory of thousand-page documents bounded.

use super::{LayoutEngine, PageInput, PageLayout};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Receives reconstructed pages in input order.
pub trait PageSink {
    /// Consume one page.
    fn accept(&mut self, page: PageLayout) -> Result<()>;

    /// Called every `checkpoint_interval` pages with the running page count.
    fn checkpoint(&mut self, _pages_done: usize) -> Result<()> {
        Ok(())
    }

    /// Called once after the last page.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON [`PageRecord`](super::PageRecord) per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PageSink for JsonLinesSink<W> {
    fn accept(&mut self, page: PageLayout) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &page.to_record())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn checkpoint(&mut self, _pages_done: usize) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Counters over a processed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Pages processed
    pub pages: usize,
    /// Source fragments ingested
    pub fragments: usize,
    /// Merged fragments emitted
    pub merged_fragments: usize,
    /// Fragments marked as scripts
    pub scripts: usize,
    /// Pages read as more than one column
    pub multi_column_pages: usize,
    /// Checkpoints issued
    pub checkpoints: usize,
}

impl DocumentSummary {
    fn record(&mut self, page: &PageLayout) {
        self.pages += 1;
        self.fragments += page.arena().len();
        self.merged_fragments += page.fragments_in_order().len();
        self.scripts += page.arena().iter().filter(|f| f.is_script()).count();
        if !page.columns().single_column {
            self.multi_column_pages += 1;
        }
    }
}

/// Drives a [`LayoutEngine`] over a stream of pages.
pub struct DocumentProcessor {
    engine: LayoutEngine,
}

impl DocumentProcessor {
    /// Create a processor around an engine.
    pub fn new(engine: LayoutEngine) -> Self {
        Self { engine }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Process every page in order, streaming results into `sink`.
    ///
    /// Stops at the first failing page; the error names the page.
    pub fn run<I, S>(&self, pages: I, sink: &mut S) -> Result<DocumentSummary>
    where
        I: IntoIterator<Item = Result<PageInput>>,
        S: PageSink + ?Sized,
    {
        let interval = self.engine.config().document.checkpoint_interval.max(1);
        let mut summary = DocumentSummary::default();

        for page in pages {
            let page = page?;
            let number = page.number;
            let layout = self
                .engine
                .process_page(page)
                .map_err(|source| Error::PageFailed {
                    page: number,
                    source: Box::new(source),
                })?;
            summary.record(&layout);
            sink.accept(layout)?;

            if summary.pages % interval == 0 {
                log::info!(
                    "Checkpoint after {} pages ({} fragments so far)",
                    summary.pages,
                    summary.fragments
                );
                sink.checkpoint(summary.pages)?;
                summary.checkpoints += 1;
            }
        }
        sink.finish()?;

        log::info!(
            "Processed {} pages: {} fragments into {} merged fragments, {} multi-column pages",
            summary.pages,
            summary.fragments,
            summary.merged_fragments,
            summary.multi_column_pages
        );
        Ok(summary)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputItem {
    Document { pages: Vec<PageInput> },
    Page(PageInput),
}

/// Streams pages from JSON input.
///
/// Accepts a whole document (`{"pages": [...]}`), a sequence of page
/// objects (one per line or just whitespace separated), or a mix.
pub struct PageReader<R: Read> {
    stream: serde_json::StreamDeserializer<'static, serde_json::de::IoRead<R>, InputItem>,
    pending: std::vec::IntoIter<PageInput>,
    failed: bool,
}

impl<R: Read> PageReader<R> {
    /// Read pages from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
            pending: Vec::new().into_iter(),
            failed: false,
        }
    }
}

impl<R: Read> Iterator for PageReader<R> {
    type Item = Result<PageInput>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(page) = self.pending.next() {
                return Some(Ok(page));
            }
            if self.failed {
                return None;
            }
            match self.stream.next()? {
                Ok(InputItem::Document { pages }) => self.pending = pages.into_iter(),
                Ok(InputItem::Page(page)) => return Some(Ok(page)),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                },
            }
        }
    }
}
