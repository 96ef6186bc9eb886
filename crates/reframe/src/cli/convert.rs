//! The `reframe convert` command: one source image into breakpoint widths.

use clap::Args;
use console::Style;
use dialoguer::theme::ColorfulTheme;
use reframe_core::pipeline::{
    breakpoint_file_name, BatchOrchestrator, ImageHandle, RasterEngine, SourceDecoder,
};
use reframe_core::{parse_breakpoints, spec_for_breakpoint, Config, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::prompt;
use anyhow::Context;

/// Arguments for the `convert` command.
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Source image file (prompted for when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (a nonexistent path lands under the system temp dir)
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
}

/// Conversion settings shared by `convert` and `batch`, fully resolved from
/// flags and prompts.
pub(crate) struct ConvertPlan {
    pub format: ImageFormat,
    /// Encode quality on the engine's 0.0-1.0 scale.
    pub quality: f64,
    pub breakpoints: Vec<u32>,
}

/// What one source file produced: paths written and per-breakpoint failures.
pub(crate) struct FileOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<String>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let theme = prompt::reframe_theme();

    // ── Resolve inputs: flags first, prompts for whatever is missing ───────

    let input = match args.input {
        Some(path) if path.is_file() => path,
        other => {
            if let Some(path) = other {
                let warn = Style::new().for_stderr().yellow();
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a readable file: {}", path.display()))
                );
            }
            match prompt::prompt_source_file(&theme)? {
                Some(path) => path,
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
        return Ok(()); // interrupted mid-prompt
    };

    let given_output = match args.output {
        Some(path) => path,
        None => match prompt::prompt_output_dir(&theme, "./output")? {
            Some(path) => path,
            None => return Ok(()),
        },
    };
    let out_dir = resolve_output_dir(&given_output)?;

    // ── Convert ────────────────────────────────────────────────────────────

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(format!("Converting {}...", input.display()));
    let start = std::time::Instant::now();

    let result = convert_file(&config, &plan, &input, &out_dir).await;
    spinner.finish_and_clear();
    let outcome = result?;

    // ── Summary ────────────────────────────────────────────────────────────

    let elapsed = start.elapsed();
    let bold = Style::new().for_stderr().bold();
    let dim = Style::new().for_stderr().dim();
    let err = Style::new().for_stderr().red();

    eprintln!();
    eprintln!(
        "  {}",
        bold.apply_to(format!(
            "Wrote {} rendition(s) to {}",
            outcome.written.len(),
            out_dir.display()
        ))
    );
    eprintln!(
        "  {}",
        dim.apply_to(format!("{:.1}s elapsed", elapsed.as_secs_f64()))
    );
    for failure in &outcome.failures {
        eprintln!("  {} {}", err.apply_to("✗"), failure);
    }

    Ok(())
}

// ── Plan resolution ────────────────────────────────────────────────────────

/// Build a [`ConvertPlan`] from flags, prompting for anything missing or
/// unparseable. Returns `Ok(None)` if the user interrupts a prompt.
pub(crate) fn resolve_plan(
    format: Option<&str>,
    quality: Option<u8>,
    breakpoints: Option<&str>,
    config: &Config,
    theme: &ColorfulTheme,
) -> anyhow::Result<Option<ConvertPlan>> {
    let warn = Style::new().for_stderr().yellow();

    let default_format =
        ImageFormat::parse(&config.conversion.default_format).unwrap_or(ImageFormat::Webp);
    let format = match format {
        Some(raw) => match ImageFormat::parse(raw) {
            Some(f) => f,
            None => {
                eprintln!("  {}", warn.apply_to(format!("Unknown format: {raw}")));
                match prompt::prompt_format(theme, default_format)? {
                    Some(f) => f,
                    None => return Ok(None),
                }
            }
        },
        None => match prompt::prompt_format(theme, default_format)? {
            Some(f) => f,
            None => return Ok(None),
        },
    };

    let quality = match quality {
        Some(q) if (1..=100).contains(&q) => q,
        other => {
            if let Some(q) = other {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Quality {q} is out of the 1-100 range"))
                );
            }
            match prompt::prompt_quality(theme, config.conversion.default_quality)? {
                Some(q) => q,
                None => return Ok(None),
            }
        }
    };

    let breakpoints = match breakpoints.and_then(parse_breakpoints) {
        Some(widths) => widths,
        None => {
            if let Some(raw) = breakpoints {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Unrecognized breakpoints: {raw}"))
                );
            }
            match prompt::prompt_breakpoints(theme)? {
                Some(widths) => widths,
                None => return Ok(None),
            }
        }
    };

    Ok(Some(ConvertPlan {
        format,
        quality: f64::from(quality) / 100.0,
        breakpoints,
    }))
}

// ── Output directory ───────────────────────────────────────────────────────

/// Resolve where renditions land. An existing path is used as-is; a
/// nonexistent one resolves under the system temp dir so a typo'd flag
/// cannot scatter files in surprising places. Created if needed.
pub(crate) fn resolve_output_dir(given: &Path) -> anyhow::Result<PathBuf> {
    let target = if given.exists() {
        given.to_path_buf()
    } else {
        // Absolute paths keep their suffix under the fallback root.
        let suffix = given.strip_prefix("/").unwrap_or(given);
        std::env::temp_dir().join("reframe").join(suffix)
    };
    std::fs::create_dir_all(&target)
        .with_context(|| format!("Could not create output directory {}", target.display()))?;
    Ok(target)
}

// ── Conversion ─────────────────────────────────────────────────────────────

/// Render one source file at every planned breakpoint width and write the
/// results into `out_dir`.
///
/// An unreadable or undecodable source is fatal; per-breakpoint failures
/// are collected into the outcome so siblings still land on disk.
pub(crate) async fn convert_file(
    config: &Config,
    plan: &ConvertPlan,
    input: &Path,
    out_dir: &Path,
) -> anyhow::Result<FileOutcome> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .with_context(|| format!("Input file has no usable name: {}", input.display()))?;

    let bytes = std::fs::read(input)
        .with_context(|| format!("Could not read {}", input.display()))?;

    let decoder = SourceDecoder::new(Arc::new(RasterEngine::new()), config.limits.clone());
    let source = decoder.decode(bytes).await?;
    let size = source.size();

    let specs = plan
        .breakpoints
        .iter()
        .map(|w| spec_for_breakpoint(&stem, size, *w, plan.format, plan.quality))
        .collect();

    let orchestrator = BatchOrchestrator::new(RasterEngine::new(), config.limits.clone());
    let outcome = orchestrator.run_decoded(source, specs).await;

    let mut written = Vec::with_capacity(outcome.succeeded.len());
    for rendered in &outcome.succeeded {
        let name =
            breakpoint_file_name(&stem, rendered.spec.resize_to.width, rendered.spec.format);
        let path = out_dir.join(&name);
        std::fs::write(&path, &rendered.bytes)
            .with_context(|| format!("Could not write {}", path.display()))?;
        written.push(path);
    }

    let failures = outcome
        .failed
        .iter()
        .map(|f| {
            format!(
                "{}: {}",
                breakpoint_file_name(&stem, f.spec.resize_to.width, f.spec.format),
                f.reason
            )
        })
        .collect();

    Ok(FileOutcome { written, failures })
}
