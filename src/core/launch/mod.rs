pub mod classpath;
pub mod loader;
pub mod task;

pub use classpath::{build_classpath, LaunchPlan};
pub use loader::{source_resource, Loader, MAX_CHAIN_DEPTH};
pub use task::{build_command, spawn, LaunchCommand};
