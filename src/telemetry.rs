#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the fmt subscriber, honouring `RUST_LOG` on top of `info`.
/// Fails when a global subscriber is already set.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .try_init()
        .map_err(Into::into)
}

/// Routes panics and tracing events to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    console_error_panic_hook::set_once();
    tracing_wasm::try_set_as_global_default().map_err(Into::into)
}
