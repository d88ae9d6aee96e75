//! The `iris run` command.

mod batch;
mod setup;
mod single;
pub mod types;

pub use types::{Mode, Provider};

use clap::Args;
use iris_core::{Config, Interrupt, InterruptHandle};
use std::path::PathBuf;

use setup::{resolve_mode, setup_driver};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory for JSON results (defaults to config `output.dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Provider to send requests to (defaults to config `provider.default`)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (OpenAI) or deployment name (Azure)
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenAI endpoint or Azure resource base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// API key (overrides the key from config)
    #[arg(long, env = "IRIS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Prompt text sent with every image
    #[arg(short, long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt text from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Single image or batch mode
    #[arg(long, value_enum, default_value = "auto")]
    pub mode: Mode,

    /// Override `max_tokens` for this run
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Override batch sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Completed requests allowed per throttle window
    #[arg(long)]
    pub window_limit: Option<u32>,

    /// Disable client-side throttling (spacing and window pauses)
    #[arg(long)]
    pub no_throttle: bool,
}

/// Manual Default impl for constructing RunArgs outside of clap.
///
/// Values match the clap defaults above. Used by the interactive module to
/// build RunArgs field-by-field.
impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            provider: None,
            model: None,
            api_base: None,
            api_key: None,
            prompt: None,
            prompt_file: None,
            mode: Mode::Auto,
            max_tokens: None,
            temperature: None,
            window_limit: None,
            no_throttle: false,
        }
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let mode = resolve_mode(&args)?;
    let ctx = setup_driver(&args, config)?;
    let (interrupt, _listener) = install_ctrl_c();

    match mode {
        Mode::Single => single::run_single(&ctx, &args.input, &interrupt).await,
        Mode::Batch | Mode::Auto => batch::run_batch(&ctx, &args.input, &interrupt).await,
    }
}

/// Background signal listener, stopped when dropped so repeated runs in
/// interactive mode don't pile up listeners.
struct SignalListener {
    task: tokio::task::JoinHandle<()>,
}

impl SignalListener {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: tokio::spawn(future),
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Route Ctrl-C into the driver's interrupt so the run can stop cleanly.
fn install_ctrl_c() -> (Interrupt, SignalListener) {
    let (handle, interrupt) = Interrupt::channel();
    (interrupt, SignalListener::spawn(wait_for_ctrl_c(handle)))
}

async fn wait_for_ctrl_c(handle: InterruptHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Interrupt received, stopping after the current step");
        handle.trigger();
    }
}
