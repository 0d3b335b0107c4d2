use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use wayfinder::{
    HighlightSurface, HighlightTreatment, LogFormat, Placement, Rect, ScrollOptions, Size,
    StaticLayout, TourEvent, TourRuntime, WayfinderConfig, place_popup,
};
use wayfinder_core::ElementId;

use crate::card::render_card;
use crate::error::{DemoError, Result};
use crate::logging;
use crate::script::{ScriptOp, parse_script};

#[derive(Debug, Parser)]
#[command(
    name = "wayfinder-demo",
    about = "Script guided tours against a fixture layout",
    version
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tour catalog replacing the bundled tours.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Log output format; overrides the configuration.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List available tours with their status.
    List(ListArgs),

    /// Start a tour and step through it.
    Run(RunArgs),

    /// Compute popup placement for a single anchor.
    Place(PlaceArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Group tours under category headings.
    #[arg(long)]
    pub grouped: bool,

    /// Completion file to read status from.
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Tour id.
    pub tour: String,

    /// Layout JSON mapping selectors to viewport rectangles.
    #[arg(long)]
    pub layout: PathBuf,

    /// Comma-separated ops: next, prev, goto:N, stop, skip, refresh.
    #[arg(long, default_value = "")]
    pub script: String,

    /// Completion file; progress is restored from and written to it.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Card width in columns.
    #[arg(long, default_value_t = 44)]
    pub width: usize,
}

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    pub viewport: Size,

    /// Anchor as X,Y,WIDTH,HEIGHT. Omit to get the fallback placement.
    #[arg(long, value_parser = parse_rect)]
    pub anchor: Option<Rect>,

    /// top, bottom, left, right or center.
    #[arg(long, default_value = "bottom", value_parser = parse_side)]
    pub side: Placement,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

fn parse_size(s: &str) -> std::result::Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse().map_err(|_| format!("bad width in {s:?}"))?;
    let h = h.trim().parse().map_err(|_| format!("bad height in {s:?}"))?;
    Ok(Size::new(w, h))
}

fn parse_side(s: &str) -> std::result::Result<Placement, String> {
    s.trim().parse()
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| format!("expected X,Y,WIDTH,HEIGHT, got {s:?}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected 4 numbers, got {}", parts.len())),
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => WayfinderConfig::load(path)?,
        None => WayfinderConfig::default(),
    };
    if let Some(path) = cli.catalog {
        config.catalog.path = Some(path);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    logging::init(&config.logging);

    match cli.command {
        Commands::List(args) => {
            if let Some(state) = args.state {
                config.storage.path = Some(state);
            }
            run_list(&config, args.grouped, out)
        }
        Commands::Run(args) => {
            if let Some(state) = args.state.clone() {
                config.storage.path = Some(state);
            }
            run_tour(&config, &args, out)
        }
        Commands::Place(args) => run_place(&args, out),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn write_tour_line(
    out: &mut dyn Write,
    runtime: &TourRuntime,
    tour: &wayfinder::Tour,
) -> Result<()> {
    let status = runtime.status(tour.id());
    writeln!(
        out,
        "  {:<20} {:<32} {} steps  {:>3}%  [{}]",
        tour.id(),
        tour.name(),
        tour.step_count(),
        status.percent(),
        status.call_to_action().label()
    )?;
    Ok(())
}

fn run_list(config: &WayfinderConfig, grouped: bool, out: &mut dyn Write) -> Result<()> {
    let runtime = wayfinder::open_runtime(config)?;
    let catalog = runtime.catalog();
    if grouped {
        for group in catalog.grouped() {
            writeln!(out, "{}", group.category.heading())?;
            for tour in &group.tours {
                write_tour_line(out, &runtime, tour)?;
            }
        }
    } else {
        for tour in catalog.list() {
            write_tour_line(out, &runtime, tour)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Surface that logs decoration changes for the transcript.
#[derive(Debug, Default)]
struct TranscriptSurface {
    pending: Vec<String>,
}

impl TranscriptSurface {
    fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl HighlightSurface for TranscriptSurface {
    fn apply(&mut self, element: ElementId, treatment: &HighlightTreatment) {
        self.pending
            .push(format!("highlight {element} (z-index {})", treatment.z_index));
    }

    fn clear(&mut self, element: ElementId) {
        self.pending.push(format!("clear {element}"));
    }

    fn scroll_into_view(&mut self, element: ElementId, _options: ScrollOptions) {
        self.pending.push(format!("scroll {element} into view"));
    }
}

pub fn load_layout(path: &Path) -> Result<StaticLayout> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DemoError::Layout {
        path: path.to_path_buf(),
        source,
    })
}

fn describe(event: &TourEvent) -> String {
    match event {
        TourEvent::Started { tour_id, replaced } => match replaced {
            Some(prev) => format!("started {tour_id} (replaced {prev})"),
            None => format!("started {tour_id}"),
        },
        TourEvent::StepChanged { from, to, .. } => format!("step {} → {}", from + 1, to + 1),
        TourEvent::Completed { tour_id } => format!("completed {tour_id}"),
        TourEvent::Ended { tour_id, reason } => format!("ended {tour_id} ({reason:?})"),
    }
}

fn run_tour(config: &WayfinderConfig, args: &RunArgs, out: &mut dyn Write) -> Result<()> {
    let script = parse_script(&args.script)?;
    let layout = load_layout(&args.layout)?;
    let mut guide = wayfinder::open_guide(config, layout, TranscriptSurface::default())?;

    if !guide.runtime().catalog().contains(&args.tour) {
        let available = guide
            .runtime()
            .catalog()
            .list()
            .iter()
            .map(|t| t.id())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(DemoError::UnknownTour {
            id: args.tour.clone(),
            available,
        });
    }

    let started = guide.start(&args.tour);
    emit(out, &mut guide, started.as_ref(), None, args.width)?;
    for op in script {
        let event = op.apply(&mut guide);
        emit(out, &mut guide, event.as_ref(), Some(op), args.width)?;
    }

    let status = guide.status(&args.tour);
    writeln!(
        out,
        "status: {} ({}%)",
        status.call_to_action().label(),
        status.percent()
    )?;
    Ok(())
}

fn emit(
    out: &mut dyn Write,
    guide: &mut wayfinder::TourGuide<StaticLayout, TranscriptSurface>,
    event: Option<&TourEvent>,
    op: Option<ScriptOp>,
    width: usize,
) -> Result<()> {
    if let Some(op) = op {
        match event {
            Some(event) => writeln!(out, "> {op}: {}", describe(event))?,
            None => writeln!(out, "> {op}: no change")?,
        }
    } else if let Some(event) = event {
        writeln!(out, "> {}", describe(event))?;
    }
    for line in guide.surface_mut().drain() {
        writeln!(out, "  {line}")?;
    }
    let changed = event.is_some() || matches!(op, Some(ScriptOp::Refresh));
    if changed && let Some(view) = guide.view() {
        for line in render_card(view, width) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// place
// ---------------------------------------------------------------------------

fn run_place(args: &PlaceArgs, out: &mut dyn Write) -> Result<()> {
    if args.viewport.is_empty() {
        return Err(DemoError::invalid("viewport must be non-empty"));
    }
    let config = wayfinder::PlacementConfig::default();
    let p = place_popup(args.anchor, args.side, args.viewport, &config);
    let arrow = p.arrow.map(|a| format!("{a:?}").to_lowercase());
    if args.json {
        let value = serde_json::json!({
            "side": p.side.as_str(),
            "x": p.origin.x,
            "y": p.origin.y,
            "width": p.size.width,
            "height": p.size.height,
            "anchored": p.anchored,
            "arrow": arrow,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        writeln!(out, "side:     {}", p.side)?;
        writeln!(out, "origin:   ({}, {})", p.origin.x, p.origin.y)?;
        writeln!(out, "size:     {}x{}", p.size.width, p.size.height)?;
        writeln!(out, "anchored: {}", p.anchored)?;
        writeln!(out, "arrow:    {}", arrow.as_deref().unwrap_or("none"))?;
    }
    Ok(())
}
