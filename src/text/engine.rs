use std::path::Path;
use std::sync::Arc;

use crate::foundation::config::FontPaths;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{StoryError, StoryResult};
use crate::layout::metrics::{FontSpec, FontWeight, TextMetrics};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGB8 brush color carried through Parley layouts.
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgb8> for TextBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// Horizontal alignment applied after line breaking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Justify,
}

impl TextAlign {
    fn to_parley(self) -> parley::Alignment {
        match self {
            Self::Left => parley::Alignment::Start,
            Self::Justify => parley::Alignment::Justify,
        }
    }
}

/// Raw bytes of the regular and bold faces used for every page.
#[derive(Clone)]
pub struct FontSet {
    pub regular: Arc<Vec<u8>>,
    pub bold: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular_len", &self.regular.len())
            .field("bold_len", &self.bold.len())
            .finish()
    }
}

impl FontSet {
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Self {
        Self {
            regular: Arc::new(regular),
            bold: Arc::new(bold),
        }
    }

    pub fn load(paths: &FontPaths) -> StoryResult<Self> {
        Ok(Self::from_bytes(
            read_font(&paths.regular)?,
            read_font(&paths.bold)?,
        ))
    }

    pub fn bytes(&self, weight: FontWeight) -> &Arc<Vec<u8>> {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

fn read_font(path: &Path) -> StoryResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| StoryError::missing_asset(format!("read font '{}': {e}", path.display())))
}

/// One registered face. Each weight gets its own font context so family lookup can only ever
/// resolve to that face.
struct FontSlot {
    font_ctx: parley::FontContext,
    family: String,
}

impl FontSlot {
    fn register(bytes: &[u8], weight: FontWeight) -> StoryResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::validation(format!(
                "no font families registered from {weight:?} font bytes"
            ))
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::validation("registered font family has no name"))?
            .to_string();
        Ok(Self { font_ctx, family })
    }
}

/// Parley-backed text shaping and measurement over a fixed [`FontSet`].
pub struct TextLayoutEngine {
    fonts: FontSet,
    regular: FontSlot,
    bold: FontSlot,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("regular", &self.regular.family)
            .field("bold", &self.bold.family)
            .finish()
    }
}

impl TextLayoutEngine {
    pub fn new(fonts: FontSet) -> StoryResult<Self> {
        let regular = FontSlot::register(&fonts.regular, FontWeight::Regular)?;
        let bold = FontSlot::register(&fonts.bold, FontWeight::Bold)?;
        tracing::debug!(regular = %regular.family, bold = %bold.family, "registered fonts");
        Ok(Self {
            fonts,
            regular,
            bold,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn family_name(&self, weight: FontWeight) -> &str {
        match weight {
            FontWeight::Regular => &self.regular.family,
            FontWeight::Bold => &self.bold.family,
        }
    }

    /// Shape and lay out plain text in `font`, broken at `max_width` when given.
    pub fn layout(
        &mut self,
        text: &str,
        font: FontSpec,
        brush: TextBrush,
        max_width: Option<f32>,
        align: TextAlign,
    ) -> StoryResult<parley::Layout<TextBrush>> {
        font.validate()?;
        let slot = match font.weight {
            FontWeight::Regular => &mut self.regular,
            FontWeight::Bold => &mut self.bold,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut slot.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(slot.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(max_width);
        if let Some(w) = max_width {
            layout.align(
                Some(w),
                align.to_parley(),
                parley::AlignmentOptions::default(),
            );
        }
        Ok(layout)
    }
}

impl TextMetrics for TextLayoutEngine {
    fn line_height(&mut self, font: FontSpec) -> StoryResult<f64> {
        let layout = self.layout("Hg", font, TextBrush::default(), None, TextAlign::Left)?;
        Ok(f64::from(layout.height()))
    }

    fn text_height(&mut self, text: &str, font: FontSpec, max_width: f64) -> StoryResult<f64> {
        if text.trim().is_empty() {
            font.validate()?;
            return Ok(0.0);
        }
        let layout = self.layout(
            text,
            font,
            TextBrush::default(),
            Some(max_width as f32),
            TextAlign::Left,
        )?;
        Ok(f64::from(layout.height()))
    }

    fn text_width(&mut self, text: &str, font: FontSpec) -> StoryResult<f64> {
        let layout = self.layout(text, font, TextBrush::default(), None, TextAlign::Left)?;
        Ok(f64::from(layout.full_width()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
