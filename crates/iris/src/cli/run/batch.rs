//! Batch mode: discover a directory, process it with a progress bar, and
//! print a summary table.

use std::path::Path;

use iris_core::{BatchSummary, Interrupt, TaskReport};

use super::setup::RunContext;

/// Process every image in `input_dir` and report the outcome on stderr.
pub async fn run_batch(
    ctx: &RunContext,
    input_dir: &Path,
    interrupt: &Interrupt,
) -> anyhow::Result<()> {
    let tasks = ctx.driver.discover(input_dir)?;
    if tasks.is_empty() {
        tracing::warn!("No supported images found in {:?}", input_dir);
        return Ok(());
    }

    let progress = create_progress_bar(tasks.len() as u64);
    let start_time = std::time::Instant::now();

    let summary = ctx
        .driver
        .run_tasks(tasks, &ctx.output_dir, interrupt, |report| {
            update_progress(&progress, report, start_time);
        })
        .await;

    progress.finish_and_clear();
    print_summary(&summary);

    if summary.stopped_early {
        tracing::warn!("Run interrupted; remaining images were not sent");
    }
    tracing::info!("Results written to {:?}", ctx.output_dir);

    Ok(())
}

fn update_progress(
    progress: &indicatif::ProgressBar,
    report: &TaskReport,
    start_time: std::time::Instant,
) {
    if report.is_interrupted() {
        progress.set_message("interrupted");
        return;
    }
    progress.inc(1);

    let elapsed = start_time.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        let rate = progress.position() as f64 * 60.0 / elapsed;
        progress.set_message(format!("{rate:.1} img/min"));
    }
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Images per minute over the whole run, counting only completed requests.
fn images_per_minute(summary: &BatchSummary) -> f64 {
    let secs = summary.elapsed.as_secs_f64();
    if secs > 0.0 {
        summary.succeeded as f64 * 60.0 / secs
    } else {
        0.0
    }
}

/// Print a formatted summary table after batch processing.
fn print_summary(summary: &BatchSummary) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.interrupted > 0 {
        eprintln!("    Interrupted:  {:>8}", summary.interrupted);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/min", images_per_minute(summary));
    eprintln!("  ====================================");

    let failures: Vec<_> = summary.failures().collect();
    if !failures.is_empty() {
        eprintln!();
        eprintln!("  Failed images:");
        for (task, cause) in failures {
            eprintln!("    {}: {cause}", task.file_name());
        }
    }
}
