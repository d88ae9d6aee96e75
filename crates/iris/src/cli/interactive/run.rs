//! Guided run flow.
//!
//! Walks the user through: mode → provider setup → prompt → input path →
//! output directory → confirmation. Builds a `RunArgs` and delegates to
//! `cli::run::execute()`.

use console::Style;
use dialoguer::{Confirm, Input, Select};
use iris_core::pipeline::FileDiscovery;
use iris_core::Config;
use std::path::PathBuf;

use crate::cli::run::{Mode, RunArgs};

use super::theme::iris_theme;

/// Walk the user through one run.
pub async fn guided_run(config: &Config) -> anyhow::Result<()> {
    let theme = iris_theme();
    let warn = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();

    // ── Step 1: Mode ──────────────────────────────────────────────────────

    let mode_items = &[
        "Single image (print the raw reply)",
        "Batch a folder (one JSON file per image)",
    ];
    let mode = match Select::with_theme(&theme)
        .with_prompt("Mode")
        .items(mode_items)
        .default(1)
        .interact_opt()?
    {
        Some(0) => Mode::Single,
        Some(1) => Mode::Batch,
        _ => return Ok(()),
    };

    // ── Step 2: Provider ──────────────────────────────────────────────────

    let Some(selection) = super::setup::select_provider(config)? else {
        return Ok(());
    };

    // ── Step 3: Prompt ────────────────────────────────────────────────────

    let Some(prompt) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Prompt")
            .default(config.request.prompt.clone())
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    // ── Step 4: Input path ────────────────────────────────────────────────
    // Re-prompts until the path fits the chosen mode.

    let input = loop {
        let label = match mode {
            Mode::Single => "Path to image",
            _ => "Path to image folder",
        };
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt(label)
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());

        match mode {
            Mode::Single if !path.is_file() => {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a file: {}", path.display()))
                );
                continue;
            }
            Mode::Single => break path,
            _ if !path.is_dir() => {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a directory: {}", path.display()))
                );
                continue;
            }
            _ => {}
        }

        let found = FileDiscovery::new(&config.processing).discover(&path)?;
        if found.is_empty() {
            eprintln!(
                "  {}",
                warn.apply_to("No supported images found in that folder.")
            );
            continue;
        }
        eprintln!(
            "  {}",
            dim.apply_to(format!("Found {} image(s)", found.len()))
        );
        break path;
    };

    // ── Step 5: Output directory (batch only) ─────────────────────────────

    let output = if matches!(mode, Mode::Batch) {
        let Some(dir) = prompt_output_dir(&theme, config)? else {
            return Ok(());
        };
        Some(dir)
    } else {
        None
    };

    // ── Step 6: Confirmation ──────────────────────────────────────────────

    eprintln!();
    let bold = Style::new().for_stderr().bold();
    eprintln!("  {}", bold.apply_to(format!("Ready to send {}", input.display())));
    let output_label = match &output {
        Some(p) => p.display().to_string(),
        None => "stdout".to_string(),
    };
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Provider: {} | Model: {} | Output: {output_label}",
            selection.provider, selection.model
        ))
    );
    eprintln!();

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Start?")
        .default(true)
        .interact_opt()?;

    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    // ── Step 7: Build RunArgs and delegate ────────────────────────────────

    let args = RunArgs {
        input,
        output,
        provider: Some(selection.provider),
        model: Some(selection.model),
        api_base: Some(selection.api_base),
        api_key: selection.api_key,
        prompt: Some(prompt),
        mode,
        ..RunArgs::default()
    };

    crate::cli::run::execute(args, config.clone()).await?;

    eprintln!();
    let post_items = &["Run again", "Back to main menu"];
    let post_choice = Select::with_theme(&theme)
        .with_prompt("What next?")
        .items(post_items)
        .default(1)
        .interact_opt()?;

    if matches!(post_choice, Some(0)) {
        Box::pin(guided_run(config)).await?;
    }

    Ok(())
}

/// Prompt for the output directory, defaulting to the configured one.
/// Returns `Ok(None)` if the user interrupts (Ctrl+C).
fn prompt_output_dir(
    theme: &dialoguer::theme::ColorfulTheme,
    config: &Config,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Output directory")
            .default(config.output.dir.display().to_string())
            .interact_text(),
    )?
    else {
        return Ok(None);
    };
    Ok(Some(PathBuf::from(shellexpand::tilde(&path).into_owned())))
}
