use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

use crate::encode::sink::{PageSink, SinkConfig};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::surface::PageRGBA;

/// Writes each rendered page as a full-bleed raster image on its own PDF page.
///
/// The output file is created in `begin`, so an unwritable destination fails before any
/// rendering work. The document is serialized in `end`.
pub struct PdfSink {
    out_path: PathBuf,
    file: Option<File>,
    doc: Option<PdfDocument>,
    pages: Vec<PdfPage>,
    cfg: Option<SinkConfig>,
}

impl PdfSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            file: None,
            doc: None,
            pages: Vec::new(),
            cfg: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl PageSink for PdfSink {
    #[tracing::instrument(skip_all, fields(out = %self.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()> {
        cfg.validate()?;
        ensure_parent_dir(&self.out_path)?;
        let file = File::create(&self.out_path).with_context(|| {
            format!("failed to create output file '{}'", self.out_path.display())
        })?;

        self.file = Some(file);
        self.doc = Some(PdfDocument::new(&cfg.title));
        self.pages.clear();
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_page(&mut self, index: usize, page: &PageRGBA) -> StoryResult<()> {
        let (Some(doc), Some(cfg)) = (self.doc.as_mut(), self.cfg.as_ref()) else {
            return Err(StoryError::render("push_page called before begin"));
        };

        let raw = RawImage {
            pixels: RawImageData::U8(page.to_rgb8()),
            width: page.width as usize,
            height: page.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = doc.add_image(&raw);

        // At 72 * scale dpi the raster covers the page exactly.
        let ops = vec![Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some((72.0 * cfg.scale) as f32),
                rotate: None,
            },
        }];

        self.pages.push(PdfPage::new(
            pt_to_mm(cfg.page.width),
            pt_to_mm(cfg.page.height),
            ops,
        ));
        tracing::debug!(index, width = page.width, height = page.height, "queued pdf page");
        Ok(())
    }

    fn end(&mut self) -> StoryResult<()> {
        let (Some(mut doc), Some(mut file)) = (self.doc.take(), self.file.take()) else {
            return Err(StoryError::render("end called before begin"));
        };

        let page_count = self.pages.len();
        doc.with_pages(std::mem::take(&mut self.pages));
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            tracing::debug!(count = warnings.len(), "pdf serializer reported warnings");
        }

        file.write_all(&bytes)
            .with_context(|| format!("failed to write '{}'", self.out_path.display()))?;
        file.flush()?;
        tracing::info!(
            pages = page_count,
            bytes = bytes.len(),
            out = %self.out_path.display(),
            "wrote pdf"
        );
        Ok(())
    }
}

fn pt_to_mm(points: f64) -> Mm {
    Mm((points * 25.4 / 72.0) as f32)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StoryResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
