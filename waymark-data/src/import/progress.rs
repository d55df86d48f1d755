//! Coarse progress reporting and cancellation.
//!
//! An import reports two phases. Cancellation is observed only when a phase
//! is about to start, never per element.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// The two checkpoints of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportPhase {
    /// Streaming elements into the staging area.
    Parsing,
    /// Wiring paths and relations.
    Resolving,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parsing => "parsing",
            Self::Resolving => "resolving",
        })
    }
}

/// Receives progress updates from an import.
pub trait ProgressMonitor {
    /// The import starts; `total_steps` phases will follow.
    fn begin(&mut self, total_steps: usize);

    /// A phase starts.
    fn phase(&mut self, phase: ImportPhase);

    /// `steps` phases completed.
    fn worked(&mut self, steps: usize);

    /// Whether the caller asked for the import to stop.
    fn is_cancelled(&self) -> bool;

    /// The import ended, successfully or not.
    fn finish(&mut self);
}

/// Monitor that ignores every update and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressMonitor;

impl ProgressMonitor for NullProgressMonitor {
    fn begin(&mut self, _total_steps: usize) {}

    fn phase(&mut self, _phase: ImportPhase) {}

    fn worked(&mut self, _steps: usize) {}

    fn is_cancelled(&self) -> bool {
        false
    }

    fn finish(&mut self) {}
}

/// Shared flag a caller sets to request cancellation.
///
/// # Examples
/// ```
/// use waymark_data::{CancellableMonitor, CancellationToken, ProgressMonitor};
///
/// let token = CancellationToken::default();
/// let monitor = CancellableMonitor::new(token.clone());
/// assert!(!monitor.is_cancelled());
/// token.cancel();
/// assert!(monitor.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Wraps a monitor so that a [`CancellationToken`] can stop the import.
#[derive(Debug, Clone)]
pub struct CancellableMonitor<M = NullProgressMonitor> {
    inner: M,
    token: CancellationToken,
}

impl CancellableMonitor {
    /// A monitor that only observes `token`.
    #[must_use]
    pub const fn new(token: CancellationToken) -> Self {
        Self::wrap(NullProgressMonitor, token)
    }
}

impl<M> CancellableMonitor<M> {
    /// Forward updates to `inner` and report cancellation from either source.
    pub const fn wrap(inner: M, token: CancellationToken) -> Self {
        Self { inner, token }
    }
}

impl<M: ProgressMonitor> ProgressMonitor for CancellableMonitor<M> {
    fn begin(&mut self, total_steps: usize) {
        self.inner.begin(total_steps);
    }

    fn phase(&mut self, phase: ImportPhase) {
        self.inner.phase(phase);
    }

    fn worked(&mut self, steps: usize) {
        self.inner.worked(steps);
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.inner.is_cancelled()
    }

    fn finish(&mut self) {
        self.inner.finish();
    }
}
