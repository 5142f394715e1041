use crate::foundation::core::{PixelSize, Rect};
use crate::foundation::error::{StoryError, StoryResult};

/// Placement of a source image relative to the top-left corner of its target rectangle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitTransform {
    pub scale: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    /// Absolute rectangle the image is drawn into, given the target it was fitted to.
    pub fn draw_rect(&self, target: Rect) -> Rect {
        Rect::from_origin_size(
            (target.x0 + self.offset_x, target.y0 + self.offset_y),
            (self.draw_width, self.draw_height),
        )
    }

    /// Cover fits may spill past the target and need a clip.
    pub fn overflows(&self, target: Rect) -> bool {
        const EPS: f64 = 1e-6;
        self.draw_width > target.width() + EPS || self.draw_height > target.height() + EPS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Fill the target completely, cropping the overflow.
    Cover,
    /// Fit entirely inside the target, letterboxing if needed.
    Contain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upscale {
    Never,
    Allowed,
}

fn check_dims(sw: f64, sh: f64, tw: f64, th: f64) -> StoryResult<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !(ok(sw) && ok(sh)) {
        return Err(StoryError::validation(
            "source image dimensions must be finite and > 0",
        ));
    }
    if !(ok(tw) && ok(th)) {
        return Err(StoryError::validation(
            "fit target dimensions must be finite and > 0",
        ));
    }
    Ok(())
}

fn centered(sw: f64, sh: f64, tw: f64, th: f64, scale: f64) -> FitTransform {
    let draw_width = sw * scale;
    let draw_height = sh * scale;
    FitTransform {
        scale,
        draw_width,
        draw_height,
        offset_x: (tw - draw_width) / 2.0,
        offset_y: (th - draw_height) / 2.0,
    }
}

/// Scale so the image covers `tw x th` on both axes; offsets go negative on the overflowing axis.
pub fn fit_cover(sw: f64, sh: f64, tw: f64, th: f64) -> StoryResult<FitTransform> {
    check_dims(sw, sh, tw, th)?;
    let scale = (tw / sw).max(th / sh);
    Ok(centered(sw, sh, tw, th, scale))
}

/// Scale so the whole image fits inside `tw x th`, centered. Never clips.
pub fn fit_contain(
    sw: f64,
    sh: f64,
    tw: f64,
    th: f64,
    upscale: Upscale,
) -> StoryResult<FitTransform> {
    check_dims(sw, sh, tw, th)?;
    let mut scale = (tw / sw).min(th / sh);
    if upscale == Upscale::Never {
        scale = scale.min(1.0);
    }
    Ok(centered(sw, sh, tw, th, scale))
}

pub fn fit(source: PixelSize, target: Rect, mode: FitMode, upscale: Upscale) -> StoryResult<FitTransform> {
    let (sw, sh) = (f64::from(source.width), f64::from(source.height));
    match mode {
        FitMode::Cover => fit_cover(sw, sh, target.width(), target.height()),
        FitMode::Contain => fit_contain(sw, sh, target.width(), target.height(), upscale),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
