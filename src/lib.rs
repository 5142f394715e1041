//! storypress lays out blog posts one per page and renders them into a single PDF.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: `Post -> PageGeometry` via [`LayoutPlanner`]. HTML bodies become plain text,
//!    text is chunked and measured, and images are arranged by count (0 to 4) and fitted.
//! 2. **Compile**: `PageGeometry -> PagePlan` via [`compile_page`], a backend-agnostic list of
//!    draw ops.
//! 3. **Render**: `PagePlan -> PageRGBA` via [`execute_page`] on a [`PageBackend`]
//!    ([`CpuPageBackend`] rasterizes with `vello_cpu`).
//! 4. **Encode**: pages stream into a [`PageSink`] ([`PdfSink`] writes the PDF).
//!
//! [`render_document`] drives all four steps for an ordered list of posts. Planning is pure given
//! its collaborators ([`HtmlToText`], [`ImageProbe`], [`TextMetrics`]), so the same post always
//! yields the same geometry.
#![forbid(unsafe_code)]

mod assets;
mod document;
mod encode;
mod foundation;
mod layout;
mod post;
mod render;
mod text;

pub use assets::decode::{DecodedImage, decode_image, load_image_file};
pub use assets::probe::{FsImageProbe, ImageProbe, resolve_image_path};
pub use document::assembler::{DocumentContext, DocumentStats, plan_document, render_document};
pub use encode::pdf::{PdfSink, ensure_parent_dir};
pub use encode::sink::{InMemorySink, PageSink, SinkConfig};
pub use foundation::config::{FontPaths, LayoutConfig, RenderSettings, StoryConfig};
pub use foundation::core::{PageSize, PixelSize, Point, Rect, Rgb8, Size};
pub use foundation::error::{StoryError, StoryResult};
pub use layout::arrangement::{ArrangementTemplate, ImageArrangement, UnitRect};
pub use layout::chunker::chunk;
pub use layout::fit::{FitMode, FitTransform, Upscale, fit, fit_contain, fit_cover};
pub use layout::geometry::{ImageSlot, LayoutNote, PageGeometry, QrBadge, TextElement, TextRole};
pub use layout::metrics::{
    ApproxMetrics, FontSpec, FontWeight, TextBlock, TextMetrics, body_font, estimate_text_block,
    title_font,
};
pub use layout::planner::LayoutPlanner;
pub use post::html::{HtmlToText, ScraperHtmlToText};
pub use post::model::{ImageRef, Post, load_posts, normalize_rel_path, posts_from_json_str};
pub use render::cpu::CpuPageBackend;
pub use render::page::compile_page;
pub use render::plan::{DrawOp, PagePlan};
pub use render::surface::{PageBackend, PageRGBA, execute_page};
pub use text::engine::{FontSet, TextAlign, TextBrush, TextLayoutEngine};
