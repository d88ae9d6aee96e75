//! Batch processing pipeline components.
//!
//! - **discovery**: Find eligible images in the input directory
//! - **encode**: Read images into base64 payloads
//! - **throttle**: Client-side quota window between requests
//! - **persist**: Atomic `{stable_id}.json` writes
//! - **interrupt**: Cooperative stop signal
//! - **driver**: Orchestrates the per-image pipeline over a batch

pub mod discovery;
pub mod driver;
pub mod encode;
pub mod interrupt;
pub mod persist;
pub mod throttle;

// Re-exports for convenient access
pub use discovery::FileDiscovery;
pub use driver::{BatchDriver, DriverOptions};
pub use encode::{EncodedPayload, ImageEncoder, MimePolicy};
pub use interrupt::{Interrupt, InterruptHandle};
pub use persist::ResultPersister;
pub use throttle::{BatchState, ThrottleWindow};
