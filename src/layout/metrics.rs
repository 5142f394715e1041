use crate::foundation::config::LayoutConfig;
use crate::foundation::error::{StoryError, StoryResult};
use crate::layout::chunker::chunk;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Explicit font selection for a metrics query or a draw call.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    pub weight: FontWeight,
    pub size: f32,
}

impl FontSpec {
    pub fn regular(size: f32) -> Self {
        Self {
            weight: FontWeight::Regular,
            size,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            weight: FontWeight::Bold,
            size,
        }
    }

    pub fn validate(self) -> StoryResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(StoryError::validation(
                "font size must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Stateless text measurement. Every query names its font; nothing is "current".
pub trait TextMetrics {
    /// Height of one line set in `font`.
    fn line_height(&mut self, font: FontSpec) -> StoryResult<f64>;

    /// Height of `text` word-wrapped at `max_width`. Empty text measures 0.
    fn text_height(&mut self, text: &str, font: FontSpec, max_width: f64) -> StoryResult<f64>;

    /// Advance width of `text` on a single unwrapped line.
    fn text_width(&mut self, text: &str, font: FontSpec) -> StoryResult<f64>;
}

/// Font-free metrics: fixed average glyph width and line height as multiples of the size.
///
/// Good enough for planning previews and deterministic tests; real output uses
/// [`TextLayoutEngine`](crate::TextLayoutEngine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxMetrics {
    pub char_width_em: f64,
    pub line_height_em: f64,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            char_width_em: 0.5,
            line_height_em: 1.2,
        }
    }
}

impl ApproxMetrics {
    fn char_width(&self, font: FontSpec) -> f64 {
        let bold_factor = match font.weight {
            FontWeight::Regular => 1.0,
            FontWeight::Bold => 1.1,
        };
        f64::from(font.size) * self.char_width_em * bold_factor
    }

    fn wrapped_lines(&self, text: &str, font: FontSpec, max_width: f64) -> usize {
        let char_w = self.char_width(font);
        let mut lines = 0usize;
        for hard_line in text.lines() {
            let mut line_w = 0.0f64;
            let mut has_words = false;
            for word in hard_line.split_whitespace() {
                let word_w = word.chars().count() as f64 * char_w;
                if has_words && line_w + char_w + word_w > max_width {
                    lines += 1;
                    line_w = word_w;
                } else if has_words {
                    line_w += char_w + word_w;
                } else {
                    line_w = word_w;
                    has_words = true;
                }
            }
            if has_words {
                lines += 1;
            }
        }
        lines
    }
}

impl TextMetrics for ApproxMetrics {
    fn line_height(&mut self, font: FontSpec) -> StoryResult<f64> {
        font.validate()?;
        Ok(f64::from(font.size) * self.line_height_em)
    }

    fn text_height(&mut self, text: &str, font: FontSpec, max_width: f64) -> StoryResult<f64> {
        let line = self.line_height(font)?;
        Ok(self.wrapped_lines(text, font, max_width) as f64 * line)
    }

    fn text_width(&mut self, text: &str, font: FontSpec) -> StoryResult<f64> {
        font.validate()?;
        Ok(text.chars().count() as f64 * self.char_width(font))
    }
}

/// Body text of one post, chunked and measured.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextBlock {
    pub chunks: Vec<String>,
    pub date: String,
    pub title_height: f64,
    pub post_title_gap: f64,
    pub chunk_heights: Vec<f64>,
    pub chunk_gap: f64,
    pub pre_date_gap: f64,
    pub date_height: f64,
    /// Space between the date and whatever follows it (an image band).
    pub gap_after_date: f64,
}

impl TextBlock {
    pub fn chunk_gaps(&self) -> f64 {
        self.chunk_gap * self.chunks.len().saturating_sub(1) as f64
    }

    /// Title through date, excluding `gap_after_date`.
    pub fn total_height(&self) -> f64 {
        self.title_height
            + self.post_title_gap
            + self.chunk_heights.iter().sum::<f64>()
            + self.chunk_gaps()
            + self.pre_date_gap
            + self.date_height
    }
}

pub fn title_font(config: &LayoutConfig) -> FontSpec {
    FontSpec::bold(config.title_size)
}

pub fn body_font(config: &LayoutConfig) -> FontSpec {
    FontSpec::regular(config.body_size)
}

/// Chunk `plain_body` and measure every text element of a post at the configured text width.
pub fn estimate_text_block(
    metrics: &mut dyn TextMetrics,
    config: &LayoutConfig,
    title: &str,
    plain_body: &str,
    date: String,
    char_limit: usize,
) -> StoryResult<TextBlock> {
    let width = config.text_width();
    let heading = title_font(config);
    let body = body_font(config);

    let title_height = metrics.text_height(title, heading, width)?;
    let body_line = metrics.line_height(body)?;

    let chunks = chunk(plain_body, char_limit);
    let mut chunk_heights = Vec::with_capacity(chunks.len());
    for c in &chunks {
        chunk_heights.push(metrics.text_height(c, body, width)?);
    }

    let pre_date_gap = metrics.line_height(FontSpec::regular(config.date_gap_probe_size))?;
    let date_height = metrics.text_height(&date, body, width)?;

    Ok(TextBlock {
        chunks,
        date,
        title_height,
        post_title_gap: body_line,
        chunk_heights,
        chunk_gap: body_line,
        pre_date_gap,
        date_height,
        gap_after_date: body_line,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/metrics.rs"]
mod tests;
