//! Interactive CLI mode: guided experience for bare `iris` invocation.
//!
//! When `iris` is invoked with no subcommand on a TTY, this module provides
//! a menu-driven interface that delegates to the same run logic as the
//! flag-based CLI.

pub mod run;
pub mod setup;
pub mod theme;

use console::Style;
use dialoguer::Select;
use iris_core::Config;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Main menu options presented to the user.
const MENU_ITEMS: &[&str] = &["Send images", "View settings", "Exit"];

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::iris_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => run::guided_run(&config).await?,
            Some(1) => show_config(&config)?,
            _ => break,
        }
    }

    Ok(())
}

/// Interactive config viewer: a summary of current settings, then the full
/// TOML or the config file path on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::iris_theme();
    let dim = Style::new().for_stderr().dim();
    let magenta = Style::new().for_stderr().magenta();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", magenta.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Provider:"),
            config.provider.default
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Output dir:"),
            config.output_dir().display()
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Throttle:"),
            throttle_summary(config)
        );
        eprintln!(
            "    {:<20} {} attempts, {}ms wait",
            label.apply_to("Retry:"),
            config.retry.max_attempts,
            config.retry.wait_ms
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}

fn throttle_summary(config: &Config) -> String {
    let throttle = &config.throttle;
    if throttle.enabled {
        format!(
            "{} per {}s, {}ms spacing",
            throttle.max_per_window, throttle.window_secs, throttle.min_spacing_ms
        )
    } else {
        "disabled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_summary_shows_defaults() {
        let config = Config::default();
        assert_eq!(throttle_summary(&config), "20 per 60s, 1000ms spacing");
    }

    #[test]
    fn throttle_summary_when_disabled() {
        let mut config = Config::default();
        config.throttle.enabled = false;
        assert_eq!(throttle_summary(&config), "disabled");
    }

    #[test]
    fn handle_interrupt_maps_interrupted_to_none() {
        let err = std::io::Error::new(std::io::ErrorKind::Interrupted, "ctrl-c");
        let result: dialoguer::Result<u8> = Err(dialoguer::Error::IO(err));
        assert!(handle_interrupt(result).unwrap().is_none());
    }
}
