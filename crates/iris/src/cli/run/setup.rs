//! Run setup: apply CLI overrides to the config, resolve the mode, and
//! build the driver.

use anyhow::Context;
use iris_core::{BatchDriver, Config, ProviderKind, ProviderOverrides};
use std::path::PathBuf;

use super::{Mode, RunArgs};

/// Driver and resolved settings, assembled by setup_driver().
pub(crate) struct RunContext {
    pub driver: BatchDriver,
    pub output_dir: PathBuf,
}

/// Resolve `--mode auto` from the input path and check the path fits the mode.
pub(crate) fn resolve_mode(args: &RunArgs) -> anyhow::Result<Mode> {
    let input = &args.input;
    if !input.exists() {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }
    match args.mode {
        Mode::Auto if input.is_file() => Ok(Mode::Single),
        Mode::Auto => Ok(Mode::Batch),
        Mode::Single if !input.is_file() => {
            anyhow::bail!("Single mode needs an image file, got: {}", input.display())
        }
        Mode::Batch if !input.is_dir() => {
            anyhow::bail!("Batch mode needs a directory, got: {}", input.display())
        }
        mode => Ok(mode),
    }
}

/// Fold CLI flags into the loaded config.
pub(crate) fn apply_overrides(args: &RunArgs, mut config: Config) -> anyhow::Result<Config> {
    if let Some(path) = &args.prompt_file {
        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
        config.request.prompt = prompt.trim().to_string();
    } else if let Some(prompt) = &args.prompt {
        config.request.prompt = prompt.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        if max_tokens == 0 {
            anyhow::bail!("--max-tokens must be > 0");
        }
        config.request.batch_max_tokens = max_tokens;
        config.request.single_max_tokens = max_tokens;
    }
    if let Some(temperature) = args.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            anyhow::bail!("--temperature must be between 0.0 and 2.0");
        }
        config.request.temperature = temperature;
    }
    if let Some(limit) = args.window_limit {
        if limit == 0 {
            anyhow::bail!("--window-limit must be > 0");
        }
        config.throttle.max_per_window = limit;
    }
    if args.no_throttle {
        config.throttle.enabled = false;
    }
    if let Some(output) = &args.output {
        config.output.dir = output.clone();
    }
    Ok(config)
}

/// Build the driver for this run.
pub(crate) fn setup_driver(args: &RunArgs, config: Config) -> anyhow::Result<RunContext> {
    let config = apply_overrides(args, config)?;
    let kind = args
        .provider
        .map(ProviderKind::from)
        .unwrap_or(config.provider.default);
    let overrides = ProviderOverrides {
        api_key: args.api_key.clone(),
        model: args.model.clone(),
        api_base: args.api_base.clone(),
    };

    let driver = BatchDriver::from_config(&config, kind, &overrides)?;
    tracing::debug!("Using provider {}", driver.provider_name());

    Ok(RunContext {
        driver,
        output_dir: config.output_dir(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_mode_picks_single_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();

        let args = RunArgs {
            input: file,
            ..Default::default()
        };
        assert_eq!(resolve_mode(&args).unwrap(), Mode::Single);
    }

    #[test]
    fn auto_mode_picks_batch_for_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            input: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(resolve_mode(&args).unwrap(), Mode::Batch);
    }

    #[test]
    fn batch_mode_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();
        let args = RunArgs {
            input: file,
            mode: Mode::Batch,
            ..Default::default()
        };
        assert!(resolve_mode(&args).is_err());
    }

    #[test]
    fn missing_input_is_rejected() {
        let args = RunArgs {
            input: "/definitely/not/here".into(),
            ..Default::default()
        };
        assert!(resolve_mode(&args).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let args = RunArgs {
            prompt: Some("Count the cars".to_string()),
            max_tokens: Some(120),
            window_limit: Some(5),
            no_throttle: true,
            output: Some("results".into()),
            ..Default::default()
        };
        let config = apply_overrides(&args, Config::default()).unwrap();
        assert_eq!(config.request.prompt, "Count the cars");
        assert_eq!(config.request.batch_max_tokens, 120);
        assert_eq!(config.throttle.max_per_window, 5);
        assert!(!config.throttle.enabled);
        assert_eq!(config.output.dir, PathBuf::from("results"));
    }

    #[test]
    fn prompt_file_is_read_and_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Is anyone wearing a helmet?\n").unwrap();
        let args = RunArgs {
            prompt_file: Some(path),
            ..Default::default()
        };
        let config = apply_overrides(&args, Config::default()).unwrap();
        assert_eq!(config.request.prompt, "Is anyone wearing a helmet?");
    }

    #[test]
    fn zero_window_limit_is_rejected() {
        let args = RunArgs {
            window_limit: Some(0),
            ..Default::default()
        };
        assert!(apply_overrides(&args, Config::default()).is_err());
    }

    #[test]
    fn setup_uses_cli_api_key() {
        let args = RunArgs {
            provider: Some(super::super::Provider::Azure),
            api_key: Some("azure-key".to_string()),
            ..Default::default()
        };
        let ctx = setup_driver(&args, Config::default()).unwrap();
        assert_eq!(ctx.driver.provider_name(), "azure");
    }
}
