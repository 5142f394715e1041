use crate::{
    assets::probe::ImageProbe,
    foundation::config::LayoutConfig,
    foundation::core::{PixelSize, Rect},
    foundation::error::StoryResult,
    layout::arrangement::ImageArrangement,
    layout::fit::{FitMode, FitTransform, Upscale, fit_contain, fit_cover},
    layout::geometry::{ImageSlot, LayoutNote, PageGeometry, QrBadge, TextElement, TextRole},
    layout::metrics::{FontSpec, TextBlock, TextMetrics, estimate_text_block},
    post::html::HtmlToText,
    post::model::{ImageRef, Post},
};

/// Vertical cursor owned by the planner for the duration of one page.
#[derive(Clone, Copy, Debug)]
struct PageCursor {
    y: f64,
}

impl PageCursor {
    fn new(y: f64) -> Self {
        Self { y }
    }

    /// Reserve `height` at the cursor and return where it starts.
    fn take(&mut self, height: f64) -> f64 {
        let y = self.y;
        self.y += height;
        y
    }

    fn advance(&mut self, height: f64) {
        self.y += height;
    }
}

/// Vertical frame of one page: top margin, bottom margin and what lies between.
#[derive(Clone, Copy, Debug)]
struct VerticalFrame {
    top: f64,
    span: f64,
    content_bottom: f64,
}

/// Computes [`PageGeometry`] for posts. Pure given its collaborators: planning the same post
/// twice yields identical geometry.
pub struct LayoutPlanner<'a> {
    config: &'a LayoutConfig,
    html: &'a dyn HtmlToText,
    probe: &'a dyn ImageProbe,
}

impl<'a> LayoutPlanner<'a> {
    pub fn new(config: &'a LayoutConfig, html: &'a dyn HtmlToText, probe: &'a dyn ImageProbe) -> Self {
        Self {
            config,
            html,
            probe,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    #[tracing::instrument(skip_all, fields(title = %post.title, pictures = post.pictures.len()))]
    pub fn plan(&self, post: &Post, metrics: &mut dyn TextMetrics) -> StoryResult<PageGeometry> {
        let cfg = self.config;
        let mut notes = Vec::new();

        let pictures = post.layout_pictures(cfg.max_images);
        if post.pictures.len() > pictures.len() {
            let ignored = post.pictures.len() - pictures.len();
            tracing::debug!(ignored, "ignoring pictures beyond the arrangement capacity");
            notes.push(LayoutNote::ExtraImagesIgnored { ignored });
        }
        let arrangement = ImageArrangement::for_count(pictures.len());
        let char_limit = cfg.char_limit(!pictures.is_empty());

        let plain_body = self.html.to_text(&post.body);
        let block = estimate_text_block(
            metrics,
            cfg,
            &post.title,
            &plain_body,
            post.date_label(),
            char_limit,
        )?;
        let text_height = block.total_height();

        let top = cfg.margin_top;
        let bottom = cfg.bottom_margin(post.qr_code.is_some());
        let frame = VerticalFrame {
            top,
            span: cfg.page_height - top - bottom,
            content_bottom: cfg.page_height - bottom,
        };
        if text_height > frame.span {
            tracing::warn!(text_height, span = frame.span, "text is taller than the page body");
            notes.push(LayoutNote::TextOverflow {
                text_height,
                span: frame.span,
            });
        }
        let centered_start = (top + (frame.span - text_height) / 2.0).max(top);

        let (start_y, images) = match arrangement {
            ImageArrangement::TextOnly => (centered_start, Vec::new()),
            ImageArrangement::Single => self.plan_single(
                &pictures[0],
                &block,
                frame,
                centered_start,
                &mut notes,
            )?,
            ImageArrangement::StackedPair
            | ImageArrangement::FeatureTrio
            | ImageArrangement::Grid2x2 => {
                let band_top = top + text_height + block.gap_after_date;
                let slots = self.plan_template(arrangement, pictures, band_top, frame, &mut notes)?;
                (top, slots)
            }
        };

        let (title, body, date) = self.place_text(&post.title, &block, start_y);

        let qr = match &post.qr_code {
            Some(source) => self.plan_qr(source, metrics, &mut notes)?,
            None => None,
        };

        Ok(PageGeometry {
            page: cfg.page_size(),
            arrangement,
            char_limit,
            start_y,
            text_height,
            title,
            body,
            date,
            images,
            qr,
            notes,
        })
    }

    fn place_text(
        &self,
        title: &str,
        block: &TextBlock,
        start_y: f64,
    ) -> (TextElement, Vec<TextElement>, TextElement) {
        let x = self.config.margin_left;
        let width = self.config.text_width();
        let element = |role, text: &str, y, h| TextElement {
            role,
            text: text.to_string(),
            rect: Rect::from_origin_size((x, y), (width, h)),
        };

        let mut cursor = PageCursor::new(start_y);
        let title = element(
            TextRole::Title,
            title,
            cursor.take(block.title_height),
            block.title_height,
        );
        cursor.advance(block.post_title_gap);

        let mut body = Vec::with_capacity(block.chunks.len());
        let last = block.chunks.len().saturating_sub(1);
        for (idx, (text, &h)) in block.chunks.iter().zip(&block.chunk_heights).enumerate() {
            body.push(element(TextRole::Body, text, cursor.take(h), h));
            if idx < last {
                cursor.advance(block.chunk_gap);
            }
        }

        cursor.advance(block.pre_date_gap);
        let date = element(
            TextRole::Date,
            &block.date,
            cursor.take(block.date_height),
            block.date_height,
        );
        (title, body, date)
    }

    fn probe_or_note(&self, image: &ImageRef, notes: &mut Vec<LayoutNote>) -> Option<PixelSize> {
        match self.probe.probe(image) {
            Ok(size) => Some(size),
            Err(err) => {
                tracing::warn!(image = %image, error = %err, "skipping unavailable image");
                notes.push(LayoutNote::MissingImage {
                    image: image.clone(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    fn plan_single(
        &self,
        image: &ImageRef,
        block: &TextBlock,
        frame: VerticalFrame,
        centered_start: f64,
        notes: &mut Vec<LayoutNote>,
    ) -> StoryResult<(f64, Vec<ImageSlot>)> {
        let cfg = self.config;
        let Some(size) = self.probe_or_note(image, notes) else {
            return Ok((centered_start, Vec::new()));
        };
        let (sw, sh) = (f64::from(size.width), f64::from(size.height));
        let cap = cfg.image_width_cap();
        let text_height = block.total_height();
        let gap = block.gap_after_date;

        if size.is_wide() {
            let fit = fit_contain(sw, sh, cap, frame.span, Upscale::Never)?;
            let stack = text_height + gap + fit.draw_height;
            if stack <= frame.span {
                let start_y = frame.top + (frame.span - stack) / 2.0;
                let cell = Rect::from_origin_size(
                    (
                        (cfg.page_width - fit.draw_width) / 2.0,
                        start_y + text_height + gap,
                    ),
                    (fit.draw_width, fit.draw_height),
                );
                let slot = ImageSlot {
                    source: image.clone(),
                    cell,
                    mode: FitMode::Contain,
                    fit: FitTransform {
                        offset_x: 0.0,
                        offset_y: 0.0,
                        ..fit
                    },
                };
                return Ok((start_y, vec![slot]));
            }
        }

        let band_top = frame.top + text_height + gap;
        let band_height = frame.content_bottom - band_top;
        if band_height <= 0.0 {
            tracing::warn!(image = %image, band_height, "no space left for image below text");
            notes.push(LayoutNote::NoSpace {
                band_height,
                skipped: 1,
            });
            return Ok((frame.top, Vec::new()));
        }

        let cell = Rect::new(
            (cfg.page_width - cap) / 2.0,
            band_top,
            (cfg.page_width + cap) / 2.0,
            frame.content_bottom,
        );
        let fit = fit_contain(sw, sh, cell.width(), cell.height(), Upscale::Allowed)?;
        Ok((
            frame.top,
            vec![ImageSlot {
                source: image.clone(),
                cell,
                mode: FitMode::Contain,
                fit,
            }],
        ))
    }

    fn plan_template(
        &self,
        arrangement: ImageArrangement,
        pictures: &[ImageRef],
        band_top: f64,
        frame: VerticalFrame,
        notes: &mut Vec<LayoutNote>,
    ) -> StoryResult<Vec<ImageSlot>> {
        let cfg = self.config;
        let band_height = frame.content_bottom - band_top;
        if band_height <= 0.0 {
            tracing::warn!(
                band_height,
                images = pictures.len(),
                "no space left for images below text"
            );
            notes.push(LayoutNote::NoSpace {
                band_height,
                skipped: pictures.len(),
            });
            return Ok(Vec::new());
        }

        let band = Rect::new(0.0, band_top, cfg.page_width, frame.content_bottom);
        let cells = arrangement
            .template()
            .materialize(band, cfg.image_width_cap(), cfg.image_gap);

        let mut slots = Vec::with_capacity(cells.len());
        for (image, cell) in pictures.iter().zip(cells) {
            if cell.width() <= 0.0 || cell.height() <= 0.0 {
                tracing::warn!(image = %image, "image cell collapsed after gaps");
                notes.push(LayoutNote::NoSpace {
                    band_height: cell.height(),
                    skipped: 1,
                });
                continue;
            }
            let Some(size) = self.probe_or_note(image, notes) else {
                continue;
            };
            let fit = fit_cover(
                f64::from(size.width),
                f64::from(size.height),
                cell.width(),
                cell.height(),
            )?;
            slots.push(ImageSlot {
                source: image.clone(),
                cell,
                mode: FitMode::Cover,
                fit,
            });
        }
        Ok(slots)
    }

    fn plan_qr(
        &self,
        source: &ImageRef,
        metrics: &mut dyn TextMetrics,
        notes: &mut Vec<LayoutNote>,
    ) -> StoryResult<Option<QrBadge>> {
        let cfg = self.config;
        let Some(size) = self.probe_or_note(source, notes) else {
            return Ok(None);
        };

        let side = cfg.qr_size;
        let band_top = cfg.page_height - cfg.qr_bottom_margin;
        let rect = Rect::from_origin_size(
            (
                cfg.page_width - cfg.margin_right - side,
                band_top + (cfg.qr_bottom_margin - side) / 2.0,
            ),
            (side, side),
        );
        let fit = fit_contain(
            f64::from(size.width),
            f64::from(size.height),
            side,
            side,
            Upscale::Allowed,
        )?;

        let label_font = FontSpec::regular(cfg.qr_label_size);
        let label_width = metrics.text_width(&cfg.qr_label, label_font)?;
        let label_height = metrics.line_height(label_font)?;
        let label = TextElement {
            role: TextRole::QrLabel,
            text: cfg.qr_label.clone(),
            rect: Rect::from_origin_size(
                (
                    rect.x0 - cfg.qr_label_gap - label_width,
                    rect.center().y - label_height / 2.0,
                ),
                (label_width, label_height),
            ),
        };

        Ok(Some(QrBadge {
            source: source.clone(),
            rect,
            fit,
            label,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/planner.rs"]
mod tests;
