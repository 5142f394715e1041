use crate::foundation::core::{PageSize, Rect};
use crate::layout::arrangement::ImageArrangement;
use crate::layout::fit::{FitMode, FitTransform};
use crate::post::model::ImageRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Title,
    Body,
    Date,
    QrLabel,
}

/// A positioned run of text. `rect.width()` is the wrap width.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextElement {
    pub role: TextRole,
    pub text: String,
    pub rect: Rect,
}

/// One image cell of an arrangement, with the fit of its source into `cell`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageSlot {
    pub source: ImageRef,
    pub cell: Rect,
    pub mode: FitMode,
    pub fit: FitTransform,
}

impl ImageSlot {
    pub fn draw_rect(&self) -> Rect {
        self.fit.draw_rect(self.cell)
    }

    pub fn needs_clip(&self) -> bool {
        self.mode == FitMode::Cover && self.fit.overflows(self.cell)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct QrBadge {
    pub source: ImageRef,
    pub rect: Rect,
    pub fit: FitTransform,
    pub label: TextElement,
}

impl QrBadge {
    pub fn draw_rect(&self) -> Rect {
        self.fit.draw_rect(self.rect)
    }
}

/// Degradations applied while planning a page. None of them is fatal.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNote {
    MissingImage { image: ImageRef, reason: String },
    NoSpace { band_height: f64, skipped: usize },
    ExtraImagesIgnored { ignored: usize },
    TextOverflow { text_height: f64, span: f64 },
}

/// Fully resolved layout of one post on one page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageGeometry {
    pub page: PageSize,
    pub arrangement: ImageArrangement,
    pub char_limit: usize,
    pub start_y: f64,
    pub text_height: f64,
    pub title: TextElement,
    pub body: Vec<TextElement>,
    pub date: TextElement,
    pub images: Vec<ImageSlot>,
    pub qr: Option<QrBadge>,
    pub notes: Vec<LayoutNote>,
}

impl PageGeometry {
    pub fn text_bottom(&self) -> f64 {
        self.date.rect.y1
    }

    /// Title, body chunks and date in drawing order.
    pub fn text_elements(&self) -> impl Iterator<Item = &TextElement> {
        std::iter::once(&self.title)
            .chain(self.body.iter())
            .chain(std::iter::once(&self.date))
    }

    /// Lowest y coordinate touched by text or images (the QR band is excluded).
    pub fn content_bottom(&self) -> f64 {
        self.images
            .iter()
            .map(|s| s.cell.y1)
            .fold(self.text_bottom(), f64::max)
    }
}
