use std::collections::HashMap;

use super::*;
use crate::assets::probe::ImageProbe;
use crate::foundation::config::LayoutConfig;
use crate::foundation::core::{PageSize, PixelSize};
use crate::foundation::error::StoryError;
use crate::layout::metrics::{ApproxMetrics, FontSpec};
use crate::post::html::ScraperHtmlToText;
use crate::post::model::ImageRef;
use crate::render::plan::DrawOp;
use crate::encode::sink::InMemorySink;

struct StubProbe(HashMap<&'static str, PixelSize>);

impl ImageProbe for StubProbe {
    fn probe(&self, image: &ImageRef) -> StoryResult<PixelSize> {
        self.0
            .get(image.as_str())
            .copied()
            .ok_or_else(|| StoryError::missing_asset(format!("no such image: {image}")))
    }
}

/// Records the op count of every page and paints nothing.
#[derive(Default)]
struct CountingBackend {
    pages: Vec<usize>,
    current: usize,
}

impl PageBackend for CountingBackend {
    fn begin_page(&mut self, _page: PageSize) -> StoryResult<()> {
        self.current = 0;
        Ok(())
    }

    fn exec_op(&mut self, op: &DrawOp) -> StoryResult<()> {
        if let DrawOp::Image { source, .. } = op
            && source.as_str() == "explodes.png"
        {
            return Err(StoryError::render("backend failure"));
        }
        self.current += 1;
        Ok(())
    }

    fn readback(&mut self) -> StoryResult<PageRGBA> {
        self.pages.push(self.current);
        Ok(PageRGBA {
            width: 1,
            height: 1,
            data: vec![255, 255, 255, 255],
            premultiplied: true,
        })
    }
}

/// Metrics that refuse one specific title, to force a planning failure.
struct PickyMetrics(ApproxMetrics);

impl TextMetrics for PickyMetrics {
    fn line_height(&mut self, font: FontSpec) -> StoryResult<f64> {
        self.0.line_height(font)
    }

    fn text_height(&mut self, text: &str, font: FontSpec, max_width: f64) -> StoryResult<f64> {
        if text == "Unmeasurable" {
            return Err(StoryError::validation("cannot measure"));
        }
        self.0.text_height(text, font, max_width)
    }

    fn text_width(&mut self, text: &str, font: FontSpec) -> StoryResult<f64> {
        self.0.text_width(text, font)
    }
}

fn post(title: &str, pictures: &[&str], qr: Option<&str>) -> Post {
    Post {
        title: title.to_string(),
        body: "<p>Body text.</p>".to_string(),
        created_at: chrono::NaiveDate::from_ymd_opt(2024, 12, 3).unwrap(),
        pictures: pictures.iter().map(|p| ImageRef::new(p).unwrap()).collect(),
        qr_code: qr.map(|q| ImageRef::new(q).unwrap()),
    }
}

fn probe() -> StubProbe {
    StubProbe(HashMap::from([
        ("a.jpg", PixelSize { width: 800, height: 600 }),
        ("b.jpg", PixelSize { width: 600, height: 800 }),
        ("qr.png", PixelSize { width: 64, height: 64 }),
        ("explodes.png", PixelSize { width: 10, height: 10 }),
    ]))
}

#[test]
fn one_page_per_post_in_order() {
    let cfg = LayoutConfig::default();
    let html = ScraperHtmlToText::default();
    let probe = probe();
    let mut metrics = ApproxMetrics::default();
    let mut ctx = DocumentContext {
        planner: LayoutPlanner::new(&cfg, &html, &probe),
        metrics: &mut metrics,
        title: "digest".to_string(),
        scale: 1.0,
    };
    let posts = [
        post("Plain", &[], None),
        post("Pictures", &["a.jpg", "b.jpg", "missing.jpg"], None),
        post("With QR", &[], Some("qr.png")),
    ];

    let mut backend = CountingBackend::default();
    let mut sink = InMemorySink::new();
    let stats = render_document(&posts, &mut ctx, &mut backend, &mut sink).unwrap();

    assert_eq!(stats.posts, 3);
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.failed_posts, 0);
    assert_eq!(stats.images_placed, 3);
    assert_eq!(stats.images_skipped, 1);

    assert!(sink.is_ended());
    let sink_cfg = sink.config().unwrap();
    assert_eq!(sink_cfg.title, "digest");
    assert_eq!(sink_cfg.page, cfg.page_size());
    let indices: Vec<_> = sink.pages().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, [0, 1, 2]);

    // Plain: title, body, date. Pictures adds two images. QR adds the badge and its label.
    assert_eq!(backend.pages[0], 3);
    assert!(backend.pages[1] >= 5);
    assert_eq!(backend.pages[2], 5);
}

#[test]
fn failing_post_becomes_a_blank_page() {
    let cfg = LayoutConfig::default();
    let html = ScraperHtmlToText::default();
    let probe = probe();
    let mut metrics = PickyMetrics(ApproxMetrics::default());
    let mut ctx = DocumentContext {
        planner: LayoutPlanner::new(&cfg, &html, &probe),
        metrics: &mut metrics,
        title: "digest".to_string(),
        scale: 1.0,
    };
    let posts = [
        post("Fine", &[], None),
        post("Unmeasurable", &[], None),
        post("Draw fails", &["explodes.png"], None),
        post("Also fine", &[], None),
    ];

    let mut backend = CountingBackend::default();
    let mut sink = InMemorySink::new();
    let stats = render_document(&posts, &mut ctx, &mut backend, &mut sink).unwrap();

    assert_eq!(stats.pages, 4);
    assert_eq!(stats.failed_posts, 2);
    assert_eq!(sink.pages().len(), 4);
    assert_eq!(backend.pages[1], 0);
    assert_eq!(backend.pages[3], 3);
}

#[test]
fn empty_post_list_still_opens_and_closes_the_sink() {
    let cfg = LayoutConfig::default();
    let html = ScraperHtmlToText::default();
    let probe = probe();
    let mut metrics = ApproxMetrics::default();
    let mut ctx = DocumentContext {
        planner: LayoutPlanner::new(&cfg, &html, &probe),
        metrics: &mut metrics,
        title: "empty".to_string(),
        scale: 1.0,
    };
    let mut sink = InMemorySink::new();
    let stats = render_document(&[], &mut ctx, &mut CountingBackend::default(), &mut sink).unwrap();

    assert_eq!(stats, DocumentStats::default());
    assert!(sink.config().is_some());
    assert!(sink.is_ended());
}

#[test]
fn plan_document_reports_failures_in_place() {
    let cfg = LayoutConfig::default();
    let html = ScraperHtmlToText::default();
    let probe = probe();
    let planner = LayoutPlanner::new(&cfg, &html, &probe);
    let mut metrics = PickyMetrics(ApproxMetrics::default());

    let posts = [post("Ok", &[], None), post("Unmeasurable", &[], None)];
    let planned = plan_document(&posts, &planner, &mut metrics);
    assert_eq!(planned.len(), 2);
    assert_eq!(planned[0].as_ref().unwrap().date.text, "December 3, 2024");
    assert!(planned[1].is_err());
}
