use crate::{
    foundation::core::{PageSize, Point, Rect, Rgb8},
    layout::metrics::FontSpec,
    post::model::ImageRef,
    text::engine::TextAlign,
};

#[derive(Clone, Debug, PartialEq)]
/// Backend-agnostic drawing program for one page, in page points with a top-left origin.
///
/// Ops execute in order. Every [`DrawOp::PushClip`] is matched by a later [`DrawOp::PopClip`].
pub struct PagePlan {
    pub page: PageSize,
    pub ops: Vec<DrawOp>,
}

impl PagePlan {
    /// A page with nothing on it beyond the background.
    pub fn blank(page: PageSize) -> Self {
        Self {
            page,
            ops: Vec::new(),
        }
    }

    pub fn image_sources(&self) -> impl Iterator<Item = &ImageRef> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { source, .. } => Some(source),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by [`compile_page`](crate::compile_page).
pub enum DrawOp {
    /// Text wrapped at `max_width` with its first line box starting at `origin`.
    Text {
        text: String,
        font: FontSpec,
        color: Rgb8,
        align: TextAlign,
        origin: Point,
        max_width: f64,
    },
    /// Source image scaled to fill `rect` exactly.
    Image { source: ImageRef, rect: Rect },
    PushClip { rect: Rect },
    PopClip,
}
