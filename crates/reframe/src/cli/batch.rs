//! The `reframe batch` command: directory traversal with progress tracking
//! and per-file failure tolerance.

use clap::Args;
use console::Style;
use reframe_core::pipeline::{DiscoveredFile, FileDiscovery};
use reframe_core::Config;
use std::path::{Path, PathBuf};

use super::convert::{convert_file, resolve_plan, ConvertPlan};
use super::prompt;
use anyhow::Context;

/// Arguments for the `batch` command.
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Directory of images to convert (prompted for when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encode quality, 1-100
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Output format: png, jpg, webp, or avif
    #[arg(short, long)]
    pub format: Option<String>,

    /// Breakpoint preset (bootstrap, tailwind) or comma-separated widths
    #[arg(short, long)]
    pub breakpoints: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

/// Execute the batch command.
pub async fn execute(args: BatchArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let theme = prompt::reframe_theme();

    // ── Input directory and discovery ──────────────────────────────────────

    let (input, files) = match args.input {
        Some(path) if path.exists() => {
            let discovery = FileDiscovery::new(config.conversion.clone(), args.recursive);
            let found = discovery.discover(&path);
            if found.is_empty() {
                anyhow::bail!(
                    "No supported images found at {}\n\n  \
                     Hint: Supported extensions are {}.",
                    path.display(),
                    config.conversion.supported_formats.join(", ")
                );
            }
            let total_size = FileDiscovery::total_size(&found);
            let dim = Style::new().for_stderr().dim();
            eprintln!(
                "  {}",
                dim.apply_to(format!(
                    "Found {} image(s) ({:.1} MB)",
                    found.len(),
                    total_size as f64 / 1_000_000.0
                ))
            );
            (path, found)
        }
        other => {
            if let Some(path) = other {
                let warn = Style::new().for_stderr().yellow();
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Path not found: {}", path.display()))
                );
            }
            match prompt::prompt_input_dir(&theme, &config, args.recursive)? {
                Some(pair) => pair,
                None => return Ok(()),
            }
        }
    };

    let Some(plan) = resolve_plan(
        args.format.as_deref(),
        args.quality,
        args.breakpoints.as_deref(),
        &config,
        &theme,
    )?
    else {
        return Ok(());
    };

    // Batch output is always the directory the user named. The temp-dir
    // fallback is a single-convert affordance only.
    let output = match args.output {
        Some(path) => path,
        None => match prompt::prompt_output_dir(&theme, "./converted")? {
            Some(path) => path,
            None => return Ok(()),
        },
    };
    std::fs::create_dir_all(&output)
        .with_context(|| format!("Could not create output directory {}", output.display()))?;

    run_batch(&config, &plan, &input, &output, files).await
}

// ── Batch loop ─────────────────────────────────────────────────────────────

/// Convert every discovered file, mirroring the source directory layout
/// under `output`. A failed file is logged and skipped; the loop goes on.
async fn run_batch(
    config: &Config,
    plan: &ConvertPlan,
    input: &Path,
    output: &Path,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<()> {
    let total = files.len() as u64;
    let progress = create_progress_bar(total);

    let mut converted: u64 = 0;
    let mut failed: u64 = 0;
    let mut renditions: u64 = 0;
    let mut not_rendered: u64 = 0;
    let mut total_bytes: u64 = 0;
    let start_time = std::time::Instant::now();

    for file in &files {
        let target = output_dir_for(input, &file.path, output);
        if let Err(e) = std::fs::create_dir_all(&target) {
            failed += 1;
            tracing::error!("Failed: {:?} - {}", file.path, e);
            progress.inc(1);
            continue;
        }

        match convert_file(config, plan, &file.path, &target).await {
            Ok(outcome) => {
                converted += 1;
                total_bytes += file.size;
                renditions += outcome.written.len() as u64;
                not_rendered += outcome.failures.len() as u64;
                for failure in &outcome.failures {
                    tracing::warn!("{:?}: {}", file.path, failure);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, e);
            }
        }

        // Update progress bar with rate
        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let processed = converted + failed;
            let rate = processed as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }

    // Finish progress bar and show summary
    let elapsed = start_time.elapsed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        converted as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    progress.finish_and_clear();

    print_summary(
        converted,
        failed,
        renditions,
        not_rendered,
        total_bytes,
        elapsed,
        rate,
    );

    Ok(())
}

/// Mirror the source's directory layout under the output root so recursive
/// runs cannot collide on duplicate file stems.
fn output_dir_for(input_root: &Path, source: &Path, output_root: &Path) -> PathBuf {
    source
        .strip_prefix(input_root)
        .ok()
        .and_then(Path::parent)
        .map(|parent| output_root.join(parent))
        .unwrap_or_else(|| output_root.to_path_buf())
}

/// Create a progress bar for batch conversion.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch conversion.
fn print_summary(
    converted: u64,
    failed: u64,
    renditions: u64,
    not_rendered: u64,
    total_bytes: u64,
    elapsed: std::time::Duration,
    rate: f64,
) {
    let total = converted + failed;
    let mb_read = total_bytes as f64 / 1_000_000.0;
    let throughput = if elapsed.as_secs_f64() > 0.0 {
        mb_read / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Converted:    {:>8}", converted);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total files:  {:>8}", total);
    eprintln!("    Renditions:   {:>8}", renditions);
    if not_rendered > 0 {
        eprintln!("    Not rendered: {:>8}", not_rendered);
    }
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_core::ImageFormat;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_output_dir_for_top_level_file() {
        let target = output_dir_for(
            Path::new("/photos"),
            Path::new("/photos/a.jpg"),
            Path::new("/out"),
        );
        assert_eq!(target, Path::new("/out"));
    }

    #[test]
    fn test_output_dir_for_nested_file() {
        let target = output_dir_for(
            Path::new("/photos"),
            Path::new("/photos/2024/trip/a.jpg"),
            Path::new("/out"),
        );
        assert_eq!(target, Path::new("/out/2024/trip"));
    }

    #[test]
    fn test_output_dir_for_single_file_input() {
        // When the input "root" is the file itself there is no relative
        // layout to mirror.
        let target = output_dir_for(
            Path::new("/photos/a.jpg"),
            Path::new("/photos/a.jpg"),
            Path::new("/out"),
        );
        assert_eq!(target, Path::new("/out"));
    }

    #[test]
    fn test_output_dir_for_unrelated_source() {
        let target = output_dir_for(
            Path::new("/photos"),
            Path::new("/elsewhere/a.jpg"),
            Path::new("/out"),
        );
        assert_eq!(target, Path::new("/out"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_batch_mirrors_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("sub")).unwrap();
        write_png(&src.path().join("top.png"), 40, 20);
        write_png(&src.path().join("sub").join("nested.png"), 40, 20);

        let out = tempfile::tempdir().unwrap();
        let config = Config::default();
        let plan = ConvertPlan {
            format: ImageFormat::Png,
            quality: 0.9,
            breakpoints: vec![10],
        };
        let files = FileDiscovery::new(config.conversion.clone(), true).discover(src.path());
        assert_eq!(files.len(), 2);

        run_batch(&config, &plan, src.path(), out.path(), files)
            .await
            .unwrap();

        assert!(out.path().join("top-10.png").is_file());
        assert!(out.path().join("sub").join("nested-10.png").is_file());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_batch_survives_a_corrupt_file() {
        let src = tempfile::tempdir().unwrap();
        write_png(&src.path().join("good.png"), 40, 20);
        std::fs::write(src.path().join("bad.png"), b"not an image").unwrap();

        let out = tempfile::tempdir().unwrap();
        let config = Config::default();
        let plan = ConvertPlan {
            format: ImageFormat::Jpg,
            quality: 0.8,
            breakpoints: vec![20],
        };
        let files = FileDiscovery::new(config.conversion.clone(), false).discover(src.path());
        assert_eq!(files.len(), 2);

        run_batch(&config, &plan, src.path(), out.path(), files)
            .await
            .unwrap();

        assert!(out.path().join("good-20.jpg").is_file());
        assert!(!out.path().join("bad-20.jpg").exists());
    }
}
