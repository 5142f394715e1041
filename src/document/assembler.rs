use crate::{
    encode::sink::{PageSink, SinkConfig},
    foundation::error::StoryResult,
    layout::geometry::{LayoutNote, PageGeometry},
    layout::metrics::TextMetrics,
    layout::planner::LayoutPlanner,
    post::model::Post,
    render::page::compile_page,
    render::plan::PagePlan,
    render::surface::{PageBackend, PageRGBA, execute_page},
};

/// Everything a document render needs besides the drawing backend and the output sink.
pub struct DocumentContext<'a> {
    pub planner: LayoutPlanner<'a>,
    pub metrics: &'a mut dyn TextMetrics,
    /// Document title passed to the sink.
    pub title: String,
    /// Raster pixels per point used by the backend.
    pub scale: f64,
}

/// Summary of one document render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DocumentStats {
    pub posts: usize,
    pub pages: usize,
    pub images_placed: usize,
    pub images_skipped: usize,
    pub failed_posts: usize,
}

impl DocumentStats {
    fn record_geometry(&mut self, geometry: &PageGeometry) {
        self.images_placed += geometry.images.len() + usize::from(geometry.qr.is_some());
        for note in &geometry.notes {
            match note {
                LayoutNote::MissingImage { .. } => self.images_skipped += 1,
                LayoutNote::NoSpace { skipped, .. } => self.images_skipped += skipped,
                LayoutNote::ExtraImagesIgnored { ignored } => self.images_skipped += ignored,
                LayoutNote::TextOverflow { .. } => {}
            }
        }
    }
}

/// Render one page per post, in order, into `sink`.
///
/// A post whose planning or drawing fails still gets a page: it is left blank and counted in
/// [`DocumentStats::failed_posts`]. Sink errors abort the run.
#[tracing::instrument(skip_all, fields(posts = posts.len()))]
pub fn render_document(
    posts: &[Post],
    ctx: &mut DocumentContext<'_>,
    backend: &mut dyn PageBackend,
    sink: &mut dyn PageSink,
) -> StoryResult<DocumentStats> {
    let page_size = ctx.planner.config().page_size();
    sink.begin(SinkConfig {
        title: ctx.title.clone(),
        page: page_size,
        scale: ctx.scale,
    })?;

    let mut stats = DocumentStats {
        posts: posts.len(),
        ..DocumentStats::default()
    };

    for (index, post) in posts.iter().enumerate() {
        let page = match render_post(post, ctx, backend) {
            Ok((geometry, page)) => {
                stats.record_geometry(&geometry);
                tracing::debug!(
                    index,
                    arrangement = ?geometry.arrangement,
                    images = geometry.images.len(),
                    notes = geometry.notes.len(),
                    "rendered page"
                );
                page
            }
            Err(err) => {
                tracing::error!(index, title = %post.title, error = %err, "post failed; emitting blank page");
                stats.failed_posts += 1;
                execute_page(&mut *backend, &PagePlan::blank(page_size))?
            }
        };
        sink.push_page(index, &page)?;
        stats.pages += 1;
    }

    sink.end()?;
    tracing::info!(
        pages = stats.pages,
        images_placed = stats.images_placed,
        images_skipped = stats.images_skipped,
        failed_posts = stats.failed_posts,
        "document complete"
    );
    Ok(stats)
}

fn render_post(
    post: &Post,
    ctx: &mut DocumentContext<'_>,
    backend: &mut dyn PageBackend,
) -> StoryResult<(PageGeometry, PageRGBA)> {
    let geometry = ctx.planner.plan(post, &mut *ctx.metrics)?;
    let plan = compile_page(&geometry, ctx.planner.config());
    let page = execute_page(&mut *backend, &plan)?;
    Ok((geometry, page))
}

/// Plan every post without drawing. Posts that fail to plan are reported as errors in place.
pub fn plan_document(
    posts: &[Post],
    planner: &LayoutPlanner<'_>,
    metrics: &mut dyn TextMetrics,
) -> Vec<StoryResult<PageGeometry>> {
    posts.iter().map(|post| planner.plan(post, metrics)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/document/assembler.rs"]
mod tests;
