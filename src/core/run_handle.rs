//! Engine run handles.
//!
//! A run handle is the registry's only lever on an in-progress run: it can ask
//! the engine to stop, and the engine is expected to call
//! [`ExecutionRegistry::remove`](crate::core::ExecutionRegistry::remove) once the
//! run concludes.

use tokio_util::sync::CancellationToken;

/// Cancelable reference to an in-progress workflow run.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_active_executions::core::RunHandle;
///
/// struct EngineRun {
///     stop: tokio::sync::watch::Sender<bool>,
/// }
///
/// impl RunHandle for EngineRun {
///     fn cancel(&self) {
///         let _ = self.stop.send(true);
///     }
/// }
/// ```
pub trait RunHandle: Send + Sync {
    /// Request a cooperative stop. Must not block.
    fn cancel(&self);
}

impl RunHandle for CancellationToken {
    fn cancel(&self) {
        Self::cancel(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_handle() {
        let token = CancellationToken::new();
        let handle: Box<dyn RunHandle> = Box::new(token.clone());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
