use anyhow::{Context, Result};
use clap::Parser;
use html2deck::deck::inspect;
use html2deck::{Pipeline, PipelineConfig, RunOutcome};
use std::path::PathBuf;

/// Convert HTML slides to a PowerPoint deck via headless-browser screenshots.
///
/// With no arguments, reads slide1.txt and slide2.txt from the current
/// directory and writes CodeXBit_Proposal.pptx.
#[derive(Parser, Debug)]
#[command(name = "html2deck")]
#[command(author, version, about)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Working directory holding the slide sources
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Slide name without extension, in deck order (repeatable)
    #[arg(short, long = "slide")]
    slides: Vec<String>,

    /// Output presentation file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Settle delay before capture, in milliseconds
    #[arg(long = "settle-ms")]
    settle_ms: Option<u64>,

    /// Remove the .html and .png intermediates when the run ends
    #[arg(long)]
    clean: bool,

    /// Chrome/Chromium executable to use
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Print slide size and picture placement of the written deck
    #[arg(long)]
    verify: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = self.dir {
            cfg.work_dir = dir;
        }
        if !self.slides.is_empty() {
            cfg.slides = self.slides;
        }
        if let Some(output) = self.output {
            cfg.output = output;
        }
        if let Some(w) = self.width {
            cfg.viewport.width = w;
        }
        if let Some(h) = self.height {
            cfg.viewport.height = h;
        }
        if let Some(ms) = self.settle_ms {
            cfg.settle_delay_ms = ms;
        }
        if self.clean {
            cfg.keep_intermediates = false;
        }
        if self.chrome.is_some() {
            cfg.chrome_path = self.chrome;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let verify = args.verify;
    let config = args.into_config()?;

    println!("Converting HTML slides to PowerPoint...\n");
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let outcome = pipeline.run().context("pipeline aborted")?;

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::RenderingIncomplete { .. } => return Ok(()),
    };

    if verify {
        let summary = inspect(&report.output)
            .with_context(|| format!("reading back {}", report.output.display()))?;
        println!(
            "\nDeck: {} slide(s), {}in x {}in",
            summary.slide_count(),
            summary.size.width_inches(),
            summary.size.height_inches()
        );
        for (i, pictures) in summary.slides.iter().enumerate() {
            for pic in pictures {
                println!(
                    "  slide {}: picture at ({}, {}) size {}x{} EMU{}",
                    i + 1,
                    pic.x,
                    pic.y,
                    pic.cx,
                    pic.cy,
                    if pic.fills(summary.size) { " [full-bleed]" } else { "" }
                );
            }
        }
    }

    println!(
        "\n✅ Done! Open {} to view your presentation.",
        report.output.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    Ok(())
}
