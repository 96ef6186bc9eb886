//! Custom dialoguer theme and shared prompts for the conversion commands.
//!
//! `convert` and `batch` accept their settings as flags; every flag left out
//! (or given an unparseable value) falls back to one of these prompts, so a
//! bare `reframe convert` walks the user through the whole flow.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use reframe_core::pipeline::{DiscoveredFile, FileDiscovery};
use reframe_core::{parse_breakpoints, Config, ImageFormat, PRESETS};
use std::path::PathBuf;

/// Returns a `ColorfulTheme` configured with Reframe's visual identity.
///
/// - Prompt prefix: cyan `?`
/// - Active item indicator: cyan `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn reframe_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
pub fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Prompt for a source image file, re-prompting until the path exists and is
/// a regular file. Returns `Ok(None)` on interrupt.
pub fn prompt_source_file(theme: &ColorfulTheme) -> anyhow::Result<Option<PathBuf>> {
    loop {
        let Some(raw_path) = handle_interrupt(
            Input::<String>::with_theme(theme)
                .with_prompt("Path to source image")
                .interact_text(),
        )?
        else {
            return Ok(None);
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());

        if !path.exists() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to(format!("Path not found: {}", path.display()))
            );
            continue;
        }
        if !path.is_file() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to(format!("Not a file: {}", path.display()))
            );
            continue;
        }

        return Ok(Some(path));
    }
}

/// Prompt for an input directory and discover convertible images inside it.
///
/// Combined loop: re-prompts on both "path not found" and "no images found".
/// Returns `Ok(None)` on interrupt.
pub fn prompt_input_dir(
    theme: &ColorfulTheme,
    config: &Config,
    recursive: bool,
) -> anyhow::Result<Option<(PathBuf, Vec<DiscoveredFile>)>> {
    let (path, files) = loop {
        let Some(raw_path) = handle_interrupt(
            Input::<String>::with_theme(theme)
                .with_prompt("Path to image or folder")
                .interact_text(),
        )?
        else {
            return Ok(None);
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());

        if !path.exists() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to(format!("Path not found: {}", path.display()))
            );
            continue;
        }

        let discovery = FileDiscovery::new(config.conversion.clone(), recursive);
        let found = discovery.discover(&path);

        if found.is_empty() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to("No supported images found at that path.")
            );
            continue;
        }

        break (path, found);
    };

    let total_size = FileDiscovery::total_size(&files);
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Found {} image(s) ({:.1} MB)",
            files.len(),
            total_size as f64 / 1_000_000.0
        ))
    );

    Ok(Some((path, files)))
}

/// Prompt for an output directory with a default. Returns `Ok(None)` on
/// interrupt. The path is not created here; the caller decides where a
/// nonexistent directory lands.
pub fn prompt_output_dir(
    theme: &ColorfulTheme,
    default: &str,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Output directory")
            .default(default.to_string())
            .interact_text(),
    )?
    else {
        return Ok(None);
    };
    Ok(Some(PathBuf::from(shellexpand::tilde(&path).into_owned())))
}

/// Prompt for the output format, defaulting to the configured one.
/// Returns `Ok(None)` on Esc / Ctrl+C.
pub fn prompt_format(
    theme: &ColorfulTheme,
    default: ImageFormat,
) -> anyhow::Result<Option<ImageFormat>> {
    let items: Vec<&str> = ImageFormat::ALL.iter().map(|f| f.extension()).collect();
    let default_index = ImageFormat::ALL.iter().position(|f| *f == default).unwrap_or(0);

    let choice = Select::with_theme(theme)
        .with_prompt("Output format")
        .items(&items)
        .default(default_index)
        .interact_opt()?;

    Ok(choice.map(|i| ImageFormat::ALL[i]))
}

/// Prompt for encode quality on the 1-100 scale. Returns `Ok(None)` on
/// interrupt.
pub fn prompt_quality(theme: &ColorfulTheme, default: u8) -> anyhow::Result<Option<u8>> {
    handle_interrupt(
        Input::<u8>::with_theme(theme)
            .with_prompt("Quality (1-100)")
            .default(default)
            .validate_with(|q: &u8| -> Result<(), &str> {
                if (1..=100).contains(q) {
                    Ok(())
                } else {
                    Err("quality must be between 1 and 100")
                }
            })
            .interact_text(),
    )
}

/// Prompt for breakpoint widths: a named preset or custom comma-separated
/// widths. Returns `Ok(None)` on Esc / Ctrl+C.
pub fn prompt_breakpoints(theme: &ColorfulTheme) -> anyhow::Result<Option<Vec<u32>>> {
    let mut items: Vec<String> = PRESETS
        .iter()
        .map(|(name, widths)| {
            let list = widths
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{name} ({list})")
        })
        .collect();
    items.push("Custom widths...".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt("Breakpoint widths")
        .items(&items)
        .default(0)
        .interact_opt()?;

    match choice {
        Some(i) if i < PRESETS.len() => Ok(Some(PRESETS[i].1.to_vec())),
        Some(_) => loop {
            let Some(raw) = handle_interrupt(
                Input::<String>::with_theme(theme)
                    .with_prompt("Widths (comma-separated, e.g. 640,1024,1920)")
                    .interact_text(),
            )?
            else {
                return Ok(None);
            };

            match parse_breakpoints(&raw) {
                Some(widths) => return Ok(Some(widths)),
                None => {
                    let warn = Style::new().for_stderr().yellow();
                    eprintln!(
                        "  {}",
                        warn.apply_to("Enter positive pixel widths separated by commas.")
                    );
                }
            }
        },
        None => Ok(None),
    }
}
