use crate::{
    foundation::core::PageSize,
    foundation::error::{StoryError, StoryResult},
    render::plan::{DrawOp, PagePlan},
};

#[derive(Clone, Debug)]
/// Rasterized page in row-major RGBA8.
pub struct PageRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl PageRGBA {
    /// Drop the alpha channel. Pages are cleared to an opaque background, so premultiplied and
    /// straight color agree.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Executes [`PagePlan`] ops against some raster target.
pub trait PageBackend {
    fn begin_page(&mut self, page: PageSize) -> StoryResult<()>;

    fn exec_op(&mut self, op: &DrawOp) -> StoryResult<()>;

    fn readback(&mut self) -> StoryResult<PageRGBA>;
}

/// Run every op of `plan` in order and read the page back.
///
/// An image that cannot be loaded is skipped with a warning; other op failures abort the page.
pub fn execute_page<B: PageBackend + ?Sized>(
    backend: &mut B,
    plan: &PagePlan,
) -> StoryResult<PageRGBA> {
    backend.begin_page(plan.page)?;

    let mut clip_depth = 0usize;
    for op in &plan.ops {
        match op {
            DrawOp::PushClip { .. } => clip_depth += 1,
            DrawOp::PopClip => {
                clip_depth = clip_depth
                    .checked_sub(1)
                    .ok_or_else(|| StoryError::render("clip stack underflow"))?;
            }
            _ => {}
        }
        match backend.exec_op(op) {
            Ok(()) => {}
            Err(err) if err.is_missing_asset() => {
                tracing::warn!(error = %err, "skipping draw op with missing asset");
            }
            Err(err) => return Err(err),
        }
    }
    if clip_depth != 0 {
        return Err(StoryError::render("unbalanced clip stack at end of page"));
    }

    backend.readback()
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
