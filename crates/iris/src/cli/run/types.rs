//! CLI enum types for the run command: provider and mode.

use clap::ValueEnum;
use iris_core::ProviderKind;

/// Supported providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// OpenAI API (bearer token)
    Openai,
    /// Azure OpenAI deployment (api-key header)
    Azure,
}

impl From<Provider> for ProviderKind {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Openai => ProviderKind::Openai,
            Provider::Azure => ProviderKind::Azure,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ProviderKind::from(*self).fmt(f)
    }
}

/// Single image vs. whole directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum Mode {
    /// Single for a file, batch for a directory (default)
    #[default]
    Auto,
    /// Send one image and print the raw reply
    Single,
    /// Process a directory into one JSON file per image
    Batch,
}
