use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use skin_vision::diagnostics;
use skin_vision::{AnalysisError, AnalysisOutcome, AnalysisPool, PipelineConfig, PixelBuffer, SkinReport};

/// Label skin condition attributes of facial photographs.
#[derive(Parser, Debug)]
#[command(name = "skin_vision", version, about)]
struct Cli {
    /// Print one JSON object per image instead of a text line.
    #[arg(long)]
    json: bool,

    /// Number of concurrent analysis workers [default: number of CPUs].
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Run the five classifiers of each image one after another.
    #[arg(long)]
    sequential_classifiers: bool,

    /// Write the intermediate masks of every analyzed image into DIR.
    #[arg(long, value_name = "DIR")]
    dump_masks: Option<PathBuf>,

    /// Images to analyze.
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "skin_vision=info".parse() {
        filter = filter.add_directive(d);
    }

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn load(path: &Path) -> skin_vision::Result<PixelBuffer> {
    let load_path = path.to_path_buf();
    let loaded = tokio::task::spawn_blocking(move || PixelBuffer::load(load_path))
        .await
        .map_err(|join_error| AnalysisError::Worker(join_error.to_string()))?;
    loaded.inspect_err(|error| warn!(path = %path.display(), %error, "image rejected"))
}

/// Decodes `image` once and hands the buffer to the pool. The buffer comes back
/// alongside the result so the mask dump reuses it.
async fn analyze_image(pool: &AnalysisPool, image: &Path) -> (skin_vision::Result<SkinReport>, Option<PixelBuffer>) {
    match load(image).await {
        Ok(buffer) => (pool.analyze_buffer(buffer.clone()).await, Some(buffer)),
        Err(error) => (Err(error), None),
    }
}

async fn dump(image: &Path, buffer: PixelBuffer, dir: &Path) -> anyhow::Result<()> {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let target = dir.to_path_buf();
    let written = tokio::task::spawn_blocking(move || diagnostics::dump_masks(&buffer, &target, &stem))
        .await?
        .with_context(|| format!("writing masks for {} into {}", image.display(), dir.display()))?;
    info!(image = %image.display(), files = written.len(), "masks written");
    Ok(())
}

fn write_outcome(out: &mut impl Write, image: &Path, outcome: AnalysisOutcome, json: bool) -> io::Result<()> {
    if json {
        return writeln!(out, "{}", json!({ "image": image, "result": outcome }));
    }
    match outcome {
        AnalysisOutcome::Report(report) => writeln!(out, "{}: {report}", image.display()),
        AnalysisOutcome::Error { error } => writeln!(out, "{}: error: {error}", image.display()),
    }
}

/// Analyzes every image of `cli`, writes one line per image to `out` in input
/// order, and returns the number of failures. A failed mask dump counts as a
/// failure but never suppresses an outcome line.
async fn run(cli: &Cli, pool: &AnalysisPool, out: &mut impl Write) -> anyhow::Result<usize> {
    let analyses = join_all(cli.images.iter().map(|image| analyze_image(pool, image))).await;

    let mut failures = 0usize;
    for (image, (result, buffer)) in cli.images.iter().zip(analyses) {
        let analyzed = result.is_ok();
        if !analyzed {
            failures += 1;
        }
        write_outcome(out, image, AnalysisOutcome::from(result), cli.json)?;

        if let (true, Some(buffer), Some(dir)) = (analyzed, buffer, &cli.dump_masks) {
            if let Err(error) = dump(image, buffer, dir).await {
                warn!(image = %image.display(), error = %format!("{error:#}"), "mask dump failed");
                failures += 1;
            }
        }
    }
    out.flush()?;
    Ok(failures)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let mut config = PipelineConfig::default();
    if let Some(workers) = cli.workers {
        config.worker_count = workers.max(1);
    }
    config.parallel_classifiers = !cli.sequential_classifiers;

    let pool = AnalysisPool::new(config);
    let result = run(&cli, &pool, &mut io::stdout()).await;
    pool.shutdown().await;

    let failures = result?;
    if failures > 0 {
        warn!(failures, total = cli.images.len(), "some images failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
