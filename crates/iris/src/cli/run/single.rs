//! Single-image mode: one request, raw reply to stdout.

use iris_core::Interrupt;
use std::path::Path;

use super::setup::RunContext;

pub async fn run_single(
    ctx: &RunContext,
    image: &Path,
    interrupt: &Interrupt,
) -> anyhow::Result<()> {
    tracing::info!("Sending {} to {}", image.display(), ctx.driver.provider_name());

    match ctx.driver.run_single(image, interrupt).await {
        Ok(response) => {
            println!("Status Code: {}", response.status);
            println!("{}", response.body);
        }
        Err(e) => {
            tracing::error!("Error processing image {}: {e}", image.display());
        }
    }
    Ok(())
}
