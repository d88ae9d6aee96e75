//! Dialoguer theme and entry banner for Iris interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

const TAGLINE: &str = "Rate-limited vision batches";

/// Magenta accents, green for confirmed values, red for errors.
pub fn iris_theme() -> ColorfulTheme {
    let accent = || Style::new().for_stderr().magenta();
    let faint = |s: &str| style(s.to_string()).for_stderr().bright().black();

    ColorfulTheme {
        prompt_prefix: style("◆".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: faint("›"),
        active_item_prefix: style("●".to_string()).for_stderr().magenta(),
        active_item_style: accent(),
        inactive_item_prefix: faint("○"),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: faint("·"),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the name, version, and tagline to stderr.
pub fn print_banner() {
    let accent = Style::new().for_stderr().magenta();
    let dim = Style::new().for_stderr().dim();

    let title = format!("iris {}", iris_core::VERSION);
    let rule = "─".repeat(TAGLINE.len().max(title.len()) + 2);

    eprintln!();
    eprintln!("  {}", accent.apply_to(&rule));
    eprintln!("   {}", accent.apply_to(&title).bold());
    eprintln!("   {}", dim.apply_to(TAGLINE));
    eprintln!("  {}", accent.apply_to(&rule));
    eprintln!();
}
