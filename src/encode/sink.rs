use crate::foundation::core::PageSize;
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::surface::PageRGBA;

/// Configuration provided to a [`PageSink`] before the first page.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    /// Document title written to metadata where the format has one.
    pub title: String,
    /// Page size in points.
    pub page: PageSize,
    /// Raster pixels per point.
    pub scale: f64,
}

impl SinkConfig {
    pub fn validate(&self) -> StoryResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(StoryError::validation("sink scale must be finite and > 0"));
        }
        PageSize::new(self.page.width, self.page.height).map(|_| ())
    }
}

/// Consumer of rendered pages in post order.
///
/// `begin` is called once, `push_page` once per post (failed posts push a blank page), and
/// `end` once after the last page.
pub trait PageSink {
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()>;
    fn push_page(&mut self, index: usize, page: &PageRGBA) -> StoryResult<()>;
    fn end(&mut self) -> StoryResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pages: Vec<(usize, PageRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn pages(&self) -> &[(usize, PageRGBA)] {
        &self.pages
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl PageSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.pages.clear();
        self.ended = false;
        Ok(())
    }

    fn push_page(&mut self, index: usize, page: &PageRGBA) -> StoryResult<()> {
        if self.cfg.is_none() {
            return Err(StoryError::render("push_page called before begin"));
        }
        self.pages.push((index, page.clone()));
        Ok(())
    }

    fn end(&mut self) -> StoryResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
