// src/cli.rs
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

use crate::config::consts::DEFAULT_OUT_DIR;
use crate::config::{ExportOptions, SessionOptions};
use crate::error::Error;
use crate::export::AssetFetcher;
use crate::file::{normalize_separators, write_bundle};
use crate::progress::Progress;
use crate::runner::{FileFrames, FrameSource, run_scroll_loop};
use crate::session::Session;
use crate::specs::{Platform, SelectorTable};

#[derive(Parser)]
#[command(name = "chat_export", about = "Export ChatGPT / Gemini conversations from saved page snapshots", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture one conversation from snapshots taken top to bottom, then export it.
    Capture(CaptureArgs),
    /// Print the selector table (built-in, or merged with overrides) as JSON.
    Selectors(SelectorsArgs),
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Snapshot files in scroll order.
    #[arg(value_name = "SNAPSHOT", required = true)]
    snapshots: Vec<PathBuf>,

    /// Platform to assume instead of detecting it from the page URL.
    #[arg(long, short = 'p', value_name = "NAME")]
    platform: Option<Platform>,

    /// Page URL, when the snapshots don't record one.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// JSON file with per-platform selector overrides.
    #[arg(long, value_name = "PATH")]
    selectors: Option<PathBuf>,

    /// Output directory.
    #[arg(long, short = 'o', value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    out: String,

    /// Output file stem (default: `<platform>-<counter>`).
    #[arg(long, value_name = "STEM")]
    stem: Option<String>,

    /// Also write a ZIP with the attachments bundled under `assets/`.
    #[arg(long)]
    zip: bool,

    /// Also write the printable HTML view.
    #[arg(long)]
    pdf: bool,

    /// Stop reading snapshots once the page end is detected.
    #[arg(long)]
    auto_scroll: bool,

    /// Skip `<stem>-log.txt`.
    #[arg(long)]
    no_log: bool,

    /// Print the captured records as JSON on stdout.
    #[arg(long)]
    handoff: bool,
}

#[derive(Args, Debug)]
struct SelectorsArgs {
    /// JSON file with per-platform selector overrides.
    #[arg(long, value_name = "PATH")]
    selectors: Option<PathBuf>,
}

/// Status lines on stderr.
struct CliProgress;

impl Progress for CliProgress {
    fn begin(&mut self) {
        eprintln!("Recording...");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn captured(&mut self, count: usize) {
        eprintln!("  {count} message(s) captured");
    }

    fn finish(&mut self, count: usize) {
        eprintln!("Exported {count} message(s).");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Capture(args) => capture(args),
        Command::Selectors(args) => {
            let table = load_table(args.selectors.as_deref())?;
            println!("{}", table.to_json_pretty()?);
            Ok(())
        }
    }
}

fn load_table(path: Option<&Path>) -> Result<SelectorTable> {
    match path {
        Some(p) => SelectorTable::load(p).wrap_err_with(|| format!("loading selectors from {}", p.display())),
        None => Ok(SelectorTable::builtin()),
    }
}

#[cfg(feature = "fetch")]
fn fetcher(root: Option<&Path>) -> Result<Box<dyn AssetFetcher>> {
    Ok(Box::new(crate::export::HttpAssetFetcher::new(root)?))
}

#[cfg(not(feature = "fetch"))]
fn fetcher(root: Option<&Path>) -> Result<Box<dyn AssetFetcher>> {
    Ok(Box::new(crate::export::LocalAssetFetcher::new(root)))
}

fn capture(args: CaptureArgs) -> Result<()> {
    let table = load_table(args.selectors.as_deref())?;
    let options = SessionOptions {
        auto_scroll: args.auto_scroll,
        zip_export: args.zip,
        pdf_export: args.pdf,
    };
    let root = args.snapshots.first().and_then(|p| p.parent()).map(Path::to_path_buf);
    let mut frames = FileFrames::new(args.snapshots).with_url(args.url);

    let mut progress = CliProgress;
    let mut session = Session::new(table).with_progress(&mut progress);
    if let Some(p) = args.platform {
        session = session.with_platform(p);
    }

    let first = frames.next_frame()?.ok_or(Error::NoSnapshots)?;
    session.start(options, &first)?;

    if options.auto_scroll {
        let summary = run_scroll_loop(&mut session, &mut frames)?;
        logf!(session.log(), "{} frame(s) read, stopped: {:?}", summary.frames + 1, summary.reason);
    } else {
        while let Some(frame) = frames.next_frame()? {
            session.capture_once(&frame);
        }
    }

    let bundle = session.stop_and_export(None)?;
    let export = ExportOptions {
        out_dir: PathBuf::from(normalize_separators(&args.out)),
        stem: args.stem,
        write_debug_log: !args.no_log,
    };
    let fetcher = fetcher(root.as_deref())?;
    let written = write_bundle(&bundle, &export, fetcher.as_ref(), session.log())?;

    for path in written.all() {
        println!("{}", path.display());
    }
    if let Some(stats) = written.archive.filter(|s| s.failed > 0) {
        eprintln!("warning: {} attachment(s) could not be bundled", stats.failed);
    }
    if args.handoff {
        println!("{}", bundle.handoff_json()?);
    }
    Ok(())
}
