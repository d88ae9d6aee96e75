//! Provider setup: provider choice, endpoint, model or deployment, and API key.

use console::Style;
use dialoguer::{Input, Password, Select};
use iris_core::{Config, ProviderKind};

use crate::cli::run::Provider;

use super::theme::iris_theme;

/// Result of the provider selection flow.
pub struct ProviderSelection {
    pub provider: Provider,
    /// OpenAI endpoint or Azure resource base URL
    pub api_base: String,
    /// Model (OpenAI) or deployment (Azure)
    pub model: String,
    /// API key entered during this session (not from env/config).
    pub api_key: Option<String>,
}

/// Guide the user through provider, endpoint, model, and key.
///
/// Returns `None` if the user cancels.
pub fn select_provider(config: &Config) -> anyhow::Result<Option<ProviderSelection>> {
    let theme = iris_theme();
    let dim = Style::new().for_stderr().dim();
    let warn = Style::new().for_stderr().yellow();

    let providers = &["OpenAI", "Azure OpenAI"];
    let default_index = match config.provider.default {
        ProviderKind::Openai => 0,
        ProviderKind::Azure => 1,
    };

    let selection = Select::with_theme(&theme)
        .with_prompt("Provider")
        .items(providers)
        .default(default_index)
        .interact_opt()?;

    let provider = match selection {
        Some(0) => Provider::Openai,
        Some(1) => Provider::Azure,
        _ => return Ok(None),
    };

    let (base_prompt, base_default, model_prompt, model_default) = match provider {
        Provider::Openai => (
            "API endpoint",
            config.provider.openai.endpoint.clone(),
            "Model",
            config.provider.openai.model.clone(),
        ),
        Provider::Azure => (
            "Azure resource base URL",
            config.provider.azure.api_base.clone(),
            "Deployment name",
            config.provider.azure.deployment.clone(),
        ),
    };

    let Some(api_base) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt(base_prompt)
            .default(base_default)
            .interact_text(),
    )?
    else {
        return Ok(None);
    };

    let Some(model) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt(model_prompt)
            .default(model_default)
            .interact_text(),
    )?
    else {
        return Ok(None);
    };

    let env_var = env_var_for(provider);
    let mut session_api_key = None;

    if std::env::var(env_var).is_ok() || config_has_key(config, provider) {
        eprintln!(
            "  {}",
            dim.apply_to(format!("Using existing API key from {env_var} / config"))
        );
    } else {
        eprintln!("  {}", warn.apply_to(format!("{env_var} not set.")));

        match Password::with_theme(&theme)
            .with_prompt(format!("Enter your {provider} API key"))
            .allow_empty_password(true)
            .interact()
        {
            Ok(key) if !key.is_empty() => session_api_key = Some(key),
            _ => return Ok(None),
        }
    }

    Ok(Some(ProviderSelection {
        provider,
        api_base,
        model,
        api_key: session_api_key,
    }))
}

/// Environment variable the default config reads the key from.
fn env_var_for(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "OPENAI_API_KEY",
        Provider::Azure => "AZURE_OPENAI_API_KEY",
    }
}

/// True when the config file holds a literal key rather than a `${VAR}` reference.
fn config_has_key(config: &Config, provider: Provider) -> bool {
    let key = match provider {
        Provider::Openai => &config.provider.openai.api_key,
        Provider::Azure => &config.provider.azure.api_key,
    };
    !key.is_empty() && !key.starts_with("${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_names_match_default_config() {
        let config = Config::default();
        assert!(config
            .provider
            .openai
            .api_key
            .contains(env_var_for(Provider::Openai)));
        assert!(config
            .provider
            .azure
            .api_key
            .contains(env_var_for(Provider::Azure)));
    }

    #[test]
    fn env_reference_is_not_a_stored_key() {
        let config = Config::default();
        assert!(!config_has_key(&config, Provider::Openai));
    }

    #[test]
    fn literal_key_counts_as_stored() {
        let mut config = Config::default();
        config.provider.azure.api_key = "abc123".to_string();
        assert!(config_has_key(&config, Provider::Azure));
    }
}
