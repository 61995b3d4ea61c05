use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Preview requests that supersede one another. Different kinds never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    Ingest,
    IngestVerbose,
    Search,
}

impl PreviewKind {
    fn slot(self) -> usize {
        match self {
            PreviewKind::Ingest => 0,
            PreviewKind::IngestVerbose => 1,
            PreviewKind::Search => 2,
        }
    }
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewKind::Ingest => write!(f, "ingest"),
            PreviewKind::IngestVerbose => write!(f, "ingest-verbose"),
            PreviewKind::Search => write!(f, "search"),
        }
    }
}

/// Handed out when a preview request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    kind: PreviewKind,
    generation: u64,
}

impl PreviewTicket {
    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Drops responses of previews that were superseded while in flight.
#[derive(Debug, Clone, Default)]
pub struct PreviewGuard {
    generations: Arc<[AtomicU64; 3]>,
}

impl PreviewGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, invalidating any earlier ticket of the same kind.
    pub fn begin(&self, kind: PreviewKind) -> PreviewTicket {
        let generation = self.generations[kind.slot()].fetch_add(1, Ordering::SeqCst) + 1;
        PreviewTicket { kind, generation }
    }

    /// True when no newer request of the same kind has started since `ticket`.
    pub fn is_current(&self, ticket: &PreviewTicket) -> bool {
        self.generations[ticket.kind.slot()].load(Ordering::SeqCst) == ticket.generation
    }

    /// Hand back `response` only if its ticket is still current.
    pub fn accept<T>(&self, ticket: &PreviewTicket, response: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(response)
        } else {
            tracing::debug!(
                kind = %ticket.kind,
                generation = ticket.generation,
                "dropping stale preview response"
            );
            None
        }
    }
}
