//! The `iris config` command for configuration management.

use clap::{Args, Subcommand};
use iris_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (literal API keys are masked)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = redacted(Config::load()?);
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = Config::default().to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Mask API keys written literally into the file; `${VAR}` references are kept.
fn redacted(mut config: Config) -> Config {
    mask_key(&mut config.provider.openai.api_key);
    mask_key(&mut config.provider.azure.api_key);
    config
}

fn mask_key(key: &mut String) {
    if key.is_empty() || key.starts_with("${") {
        return;
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    *key = format!("****{tail}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_references_are_not_masked() {
        let mut key = "${OPENAI_API_KEY}".to_string();
        mask_key(&mut key);
        assert_eq!(key, "${OPENAI_API_KEY}");
    }

    #[test]
    fn literal_keys_keep_only_last_four() {
        let mut key = "sk-abcdef123456".to_string();
        mask_key(&mut key);
        assert_eq!(key, "****3456");
    }

    #[test]
    fn redacted_masks_both_providers() {
        let mut config = Config::default();
        config.provider.openai.api_key = "sk-openai-9999".to_string();
        config.provider.azure.api_key = "azurekey1234".to_string();
        let config = redacted(config);
        assert_eq!(config.provider.openai.api_key, "****9999");
        assert_eq!(config.provider.azure.api_key, "****1234");
    }
}
