//! Non-fatal store conditions reported to an injected sink

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A condition the store recovered from but a caller may want to surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The uuid index does not exist yet; uuid lookups resolve to nothing
    IndexMissing { path: PathBuf },
    /// A subdirectory has no canonical document and was skipped
    UnmaterializedArtifact { directory: PathBuf },
    /// Binary content of a deleted asset could not be removed
    AssetContentNotDeleted {
        component_id: String,
        asset: String,
        reason: String,
    },
}

/// Receiver for [`Diagnostic`] events
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics as structured tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::IndexMissing { path } => tracing::info!(
                path = %path.display(),
                "index file not found, it will be created when needed or by the migration"
            ),
            Diagnostic::UnmaterializedArtifact { directory } => tracing::debug!(
                directory = %directory.display(),
                "skipping directory without canonical document"
            ),
            Diagnostic::AssetContentNotDeleted {
                component_id,
                asset,
                reason,
            } => tracing::warn!(
                component_id = %component_id,
                asset = %asset,
                reason = %reason,
                "asset content could not be deleted"
            ),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

/// Shared handle used by loaders, repositories and services
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// The sink used when none is injected
pub fn default_sink() -> SharedSink {
    Arc::new(TracingSink)
}
