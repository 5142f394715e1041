use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{PageSize, Rgb8};
use crate::foundation::error::{StoryError, StoryResult};

/// Immutable page-layout constants consumed by the planner.
///
/// Lengths are in points. The defaults reproduce a US Letter page with 32 pt margins.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Bottom margin used instead of `margin_bottom` when the post carries a QR code.
    pub qr_bottom_margin: f64,
    pub char_limit_no_images: usize,
    pub char_limit_with_images: usize,
    pub max_images: usize,
    /// Upper bound for image widths and for the side of the 2x2 grid.
    pub max_image_width: f64,
    pub image_gap: f64,
    pub title_size: f32,
    pub body_size: f32,
    /// Body font size whose line height is used as the gap above the date.
    pub date_gap_probe_size: f32,
    pub date_color: Rgb8,
    pub text_color: Rgb8,
    pub qr_size: f64,
    pub qr_label: String,
    pub qr_label_size: f32,
    pub qr_label_gap: f64,
    pub html_wrap_column: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin_top: 32.0,
            margin_bottom: 32.0,
            margin_left: 32.0,
            margin_right: 32.0,
            qr_bottom_margin: 100.0,
            char_limit_no_images: 2500,
            char_limit_with_images: 1000,
            max_images: 4,
            max_image_width: 531.0,
            image_gap: 20.0,
            title_size: 24.0,
            body_size: 13.0,
            date_gap_probe_size: 6.0,
            date_color: Rgb8::new(0x80, 0x80, 0x80),
            text_color: Rgb8::BLACK,
            qr_size: 64.0,
            qr_label: "Scan to read online".to_string(),
            qr_label_size: 10.0,
            qr_label_gap: 8.0,
            html_wrap_column: 130,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> StoryResult<()> {
        PageSize::new(self.page_width, self.page_height)?;

        let lengths = [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
            ("qr_bottom_margin", self.qr_bottom_margin),
            ("image_gap", self.image_gap),
            ("qr_label_gap", self.qr_label_gap),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v < 0.0 {
                return Err(StoryError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }

        if self.text_width() <= 0.0 {
            return Err(StoryError::validation(
                "horizontal margins leave no room for text",
            ));
        }
        if self.page_height - self.margin_top - self.margin_bottom.max(self.qr_bottom_margin)
            <= 0.0
        {
            return Err(StoryError::validation(
                "vertical margins leave no room for content",
            ));
        }
        if self.char_limit_no_images == 0 || self.char_limit_with_images == 0 {
            return Err(StoryError::validation("character limits must be > 0"));
        }
        if !(1..=4).contains(&self.max_images) {
            return Err(StoryError::validation("max_images must be within 1..=4"));
        }
        if !self.max_image_width.is_finite() || self.max_image_width <= 0.0 {
            return Err(StoryError::validation(
                "max_image_width must be finite and > 0",
            ));
        }
        for (name, size) in [
            ("title_size", self.title_size),
            ("body_size", self.body_size),
            ("date_gap_probe_size", self.date_gap_probe_size),
            ("qr_label_size", self.qr_label_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(StoryError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.qr_size.is_finite() || self.qr_size <= 0.0 {
            return Err(StoryError::validation("qr_size must be finite and > 0"));
        }
        if self.qr_size > self.qr_bottom_margin {
            return Err(StoryError::validation(
                "qr_size must fit inside qr_bottom_margin",
            ));
        }
        if self.html_wrap_column == 0 {
            return Err(StoryError::validation("html_wrap_column must be > 0"));
        }
        Ok(())
    }

    pub fn page_size(&self) -> PageSize {
        PageSize {
            width: self.page_width,
            height: self.page_height,
        }
    }

    pub fn text_width(&self) -> f64 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Bottom margin for a page, enlarged when a QR badge needs the band.
    pub fn bottom_margin(&self, has_qr: bool) -> f64 {
        if has_qr {
            self.qr_bottom_margin
        } else {
            self.margin_bottom
        }
    }

    pub fn char_limit(&self, has_images: bool) -> usize {
        if has_images {
            self.char_limit_with_images
        } else {
            self.char_limit_no_images
        }
    }

    /// Widest an image may be drawn: the configured cap or the text column, whichever is smaller.
    pub fn image_width_cap(&self) -> f64 {
        self.max_image_width.min(self.text_width())
    }
}

/// Font files used for measuring and drawing text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontPaths {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Raster pixels per point.
    pub scale: f64,
    pub background: Rgb8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Rgb8::WHITE,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> StoryResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 16.0 {
            return Err(StoryError::validation("render scale must be within (0, 16]"));
        }
        Ok(())
    }
}

/// Top-level run configuration, usually loaded from a JSON file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoryConfig {
    pub layout: LayoutConfig,
    pub fonts: Option<FontPaths>,
    pub render: RenderSettings,
    pub output: PathBuf,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            fonts: None,
            render: RenderSettings::default(),
            output: PathBuf::from("res").join("output.pdf"),
        }
    }
}

impl StoryConfig {
    pub fn from_json_str(s: &str) -> StoryResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config file. Relative font paths are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg = Self::from_json_str(&text)?;
        if let (Some(fonts), Some(dir)) = (cfg.fonts.as_mut(), path.parent()) {
            if fonts.regular.is_relative() {
                fonts.regular = dir.join(&fonts.regular);
            }
            if fonts.bold.is_relative() {
                fonts.bold = dir.join(&fonts.bold);
            }
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> StoryResult<()> {
        self.layout.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
