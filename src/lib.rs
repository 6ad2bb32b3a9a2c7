pub mod core;

pub use crate::core::config::{Environment, Interpreter, LaunchDescriptor, Resource};
pub use crate::core::error::{LauncherError, LauncherResult};

use tracing_subscriber::EnvFilter;

/// Initialize structured logging. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,haven_launch=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}
