//! Engine adapters
//!
//! An adapter captures everything that differs between container engines:
//! the program invoked, the shape of `info --format json` and the image
//! presence check. Everything else is shared by [`EngineProvider`](crate::EngineProvider).

mod docker;
mod podman;

pub use docker::DockerEngine;
pub use podman::PodmanEngine;

use minc_core::exec::Cmd;
use minc_core::{ProviderInfo, Result};

/// Per-engine command construction and response parsing
pub trait EngineAdapter: Send + Sync + 'static {
    /// Provider name this adapter is registered under
    fn name(&self) -> &'static str;

    /// Program that is executed, e.g. `docker`
    fn program(&self) -> &'static str;

    /// Build a command running the engine with `args`
    fn command(&self, args: Vec<String>) -> Cmd {
        Cmd::new(self.program()).args(args)
    }

    /// Parse the output of `info --format json`
    fn parse_info(&self, raw: &[u8]) -> Result<ProviderInfo>;

    /// Arguments that succeed only if `image` is present locally
    fn image_exists_args(&self, image: &str) -> Vec<String>;
}
