//! Progress reporting seam
//!
//! Purely cosmetic: implementations must not affect the outcome of an
//! operation.

/// Receives the phases of a long-running operation
pub trait Progress: Send + Sync {
    /// A new phase started; replaces the previous phase's message
    fn start(&self, message: &str);

    /// The operation ended, successfully or not
    fn finish(&self);
}

/// Reports nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _message: &str) {}

    fn finish(&self) {}
}
