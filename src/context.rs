//! Audio context state and the backend that resumes it

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::EngineError;

/// Whether the engine is currently producing audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Nothing is rendered; queued messages wait
    Suspended,
    Running,
}

/// Whatever has to happen before audio can flow (opening a device stream,
/// waiting for a user gesture in a host, ...).
///
/// [`Engine::ensure_running`](crate::Engine::ensure_running) awaits
/// [`resume`](Backend::resume) once per suspension.
pub trait Backend {
    fn resume(&mut self) -> LocalBoxFuture<'static, Result<(), EngineError>>;

    fn suspend(&mut self) {}
}

/// Resumes instantly. Used for offline rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateBackend;

impl Backend for ImmediateBackend {
    fn resume(&mut self) -> LocalBoxFuture<'static, Result<(), EngineError>> {
        future::ready(Ok(())).boxed_local()
    }
}
