use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "storypress", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render posts into a PDF, one page per post.
    Render(RenderArgs),
    /// Print the planned page geometry of every post as JSON.
    Plan(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Posts JSON (an array of posts).
    #[arg(long)]
    posts: PathBuf,

    /// Configuration JSON. Every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory image references are resolved against. Defaults to the posts file directory.
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output PDF path. Overrides `output` from the configuration.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Document title. Defaults to the posts file stem.
    #[arg(long)]
    title: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct Loaded {
    config: storypress::StoryConfig,
    posts: Vec<storypress::Post>,
    assets_root: PathBuf,
}

fn load_inputs(args: &InputArgs) -> anyhow::Result<Loaded> {
    let config = match &args.config {
        Some(path) => storypress::StoryConfig::from_path(path)?,
        None => {
            let config = storypress::StoryConfig::default();
            config.validate()?;
            config
        }
    };

    let posts = storypress::load_posts(&args.posts)?;
    let assets_root = args.assets.clone().unwrap_or_else(|| {
        args.posts
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    tracing::debug!(posts = posts.len(), assets = %assets_root.display(), "loaded inputs");

    Ok(Loaded {
        config,
        posts,
        assets_root,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let Loaded {
        config,
        posts,
        assets_root,
    } = load_inputs(&args.input)?;

    let font_paths = config
        .fonts
        .as_ref()
        .context("rendering requires `fonts.regular` and `fonts.bold` in the configuration")?;
    let fonts = storypress::FontSet::load(font_paths)?;

    let html = storypress::ScraperHtmlToText::new(config.layout.html_wrap_column);
    let probe = storypress::FsImageProbe::new(&assets_root);
    let mut metrics = storypress::TextLayoutEngine::new(fonts.clone())?;
    let mut backend = storypress::CpuPageBackend::new(
        config.render.clone(),
        &assets_root,
        Some(storypress::TextLayoutEngine::new(fonts)?),
    );

    let out = args.out.unwrap_or_else(|| config.output.clone());
    let mut sink = storypress::PdfSink::new(&out);

    let title = args.title.unwrap_or_else(|| {
        args.input
            .posts
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "storypress".to_string())
    });
    let mut ctx = storypress::DocumentContext {
        planner: storypress::LayoutPlanner::new(&config.layout, &html, &probe),
        metrics: &mut metrics,
        title,
        scale: config.render.scale,
    };

    let stats = storypress::render_document(&posts, &mut ctx, &mut backend, &mut sink)?;
    eprintln!(
        "wrote {} ({} pages, {} images, {} skipped)",
        out.display(),
        stats.pages,
        stats.images_placed,
        stats.images_skipped
    );
    Ok(())
}

fn cmd_plan(args: InputArgs) -> anyhow::Result<()> {
    let Loaded {
        config,
        posts,
        assets_root,
    } = load_inputs(&args)?;

    let html = storypress::ScraperHtmlToText::new(config.layout.html_wrap_column);
    let probe = storypress::FsImageProbe::new(&assets_root);
    let planner = storypress::LayoutPlanner::new(&config.layout, &html, &probe);

    let mut metrics: Box<dyn storypress::TextMetrics> = match &config.fonts {
        Some(paths) => Box::new(storypress::TextLayoutEngine::new(
            storypress::FontSet::load(paths)?,
        )?),
        None => {
            tracing::info!("no fonts configured; planning with approximate metrics");
            Box::new(storypress::ApproxMetrics::default())
        }
    };

    let planned = storypress::plan_document(&posts, &planner, metrics.as_mut());
    let mut out = Vec::with_capacity(planned.len());
    for result in planned {
        out.push(match result {
            Ok(geometry) => serde_json::to_value(&geometry)?,
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        });
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
