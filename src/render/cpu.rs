use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    assets::decode::load_image_file,
    assets::probe::resolve_image_path,
    foundation::config::RenderSettings,
    foundation::core::{PageSize, Point, Rect, Rgb8},
    foundation::error::{StoryError, StoryResult},
    layout::metrics::{FontSpec, FontWeight},
    post::model::ImageRef,
    render::plan::DrawOp,
    render::surface::{PageBackend, PageRGBA},
    text::engine::{TextAlign, TextBrush, TextLayoutEngine},
};

/// Rasterizes page plans with `vello_cpu` at `settings.scale` pixels per point.
pub struct CpuPageBackend {
    settings: RenderSettings,
    image_root: PathBuf,
    text: Option<TextLayoutEngine>,
    image_cache: HashMap<ImageRef, vello_cpu::Image>,
    font_cache: HashMap<FontWeight, vello_cpu::peniko::FontData>,
    page: Option<CpuPage>,
}

struct CpuPage {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl CpuPageBackend {
    /// `text` may be `None` for plans that carry no text ops.
    pub fn new(
        settings: RenderSettings,
        image_root: impl Into<PathBuf>,
        text: Option<TextLayoutEngine>,
    ) -> Self {
        Self {
            settings,
            image_root: image_root.into(),
            text,
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
            page: None,
        }
    }

    fn base_transform(&self) -> vello_cpu::kurbo::Affine {
        vello_cpu::kurbo::Affine::scale(self.settings.scale)
    }
}

impl PageBackend for CpuPageBackend {
    fn begin_page(&mut self, page: PageSize) -> StoryResult<()> {
        let width = pixel_extent(page.width, self.settings.scale, "page width")?;
        let height = pixel_extent(page.height, self.settings.scale, "page height")?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let bg = self.settings.background;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        self.page = Some(CpuPage { width, height, ctx });
        Ok(())
    }

    fn exec_op(&mut self, op: &DrawOp) -> StoryResult<()> {
        let base = self.base_transform();
        match op {
            DrawOp::Text {
                text,
                font,
                color,
                align,
                origin,
                max_width,
            } => self.draw_text(text, *font, *color, *align, *origin, *max_width),
            DrawOp::Image { source, rect } => {
                let paint = self.image_paint_for(source)?;
                let (w, h) = image_paint_size(&paint)?;
                let page = self.page_mut()?;
                let place = vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0))
                    * vello_cpu::kurbo::Affine::scale_non_uniform(rect.width() / w, rect.height() / h);
                page.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                page.ctx.set_transform(base * place);
                page.ctx.set_paint(paint);
                page.ctx
                    .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                Ok(())
            }
            DrawOp::PushClip { rect } => {
                use vello_cpu::kurbo::Shape;

                let page = self.page_mut()?;
                page.ctx.set_transform(base);
                let clip = rect_to_cpu(*rect).to_path(0.1);
                page.ctx.push_clip_layer(&clip);
                Ok(())
            }
            DrawOp::PopClip => {
                self.page_mut()?.ctx.pop_layer();
                Ok(())
            }
        }
    }

    fn readback(&mut self) -> StoryResult<PageRGBA> {
        let mut page = self
            .page
            .take()
            .ok_or_else(|| StoryError::render("readback called before begin_page"))?;
        let mut pixmap = vello_cpu::Pixmap::new(page.width, page.height);
        page.ctx.flush();
        page.ctx.render_to_pixmap(&mut pixmap);

        Ok(PageRGBA {
            width: u32::from(page.width),
            height: u32::from(page.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuPageBackend {
    fn page_mut(&mut self) -> StoryResult<&mut CpuPage> {
        self.page
            .as_mut()
            .ok_or_else(|| StoryError::render("draw op issued outside of a page"))
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: FontSpec,
        color: Rgb8,
        align: TextAlign,
        origin: Point,
        max_width: f64,
    ) -> StoryResult<()> {
        let base = self.base_transform();
        let engine = self
            .text
            .as_mut()
            .ok_or_else(|| StoryError::render("text op requires a font set"))?;
        let layout = engine.layout(
            text,
            font,
            TextBrush::from(color),
            Some(max_width as f32),
            align,
        )?;
        let font_data = self.font_data_for(font.weight)?;

        let page = self.page_mut()?;
        page.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        page.ctx
            .set_transform(base * vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                page.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, 255,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                page.ctx
                    .glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn font_data_for(&mut self, weight: FontWeight) -> StoryResult<vello_cpu::peniko::FontData> {
        if let Some(font) = self.font_cache.get(&weight) {
            return Ok(font.clone());
        }
        let engine = self
            .text
            .as_ref()
            .ok_or_else(|| StoryError::render("text op requires a font set"))?;
        let bytes = engine.fonts().bytes(weight).as_ref().clone();
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.font_cache.insert(weight, font.clone());
        Ok(font)
    }

    fn image_paint_for(&mut self, source: &ImageRef) -> StoryResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(source) {
            return Ok(paint.clone());
        }

        let img = load_image_file(&resolve_image_path(&self.image_root, source))?;
        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(source.clone(), paint.clone());
        Ok(paint)
    }
}

fn pixel_extent(points: f64, scale: f64, what: &str) -> StoryResult<u16> {
    let px = (points * scale).round();
    if !px.is_finite() || px < 1.0 || px > f64::from(u16::MAX) {
        return Err(StoryError::render(format!(
            "{what} of {points}pt at scale {scale} does not fit a u16 pixel extent"
        )));
    }
    Ok(px as u16)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StoryError::render("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> StoryResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(StoryError::render(
            "cpu backend does not support opaque image ids",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
