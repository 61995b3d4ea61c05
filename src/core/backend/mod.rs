//! Search backend contract: simulate and search calls, workflow provisioning,
//! and preview summaries that keep partial successes.

mod client;
mod guard;
mod preview;
mod types;

pub use client::{BackendClient, BackendError, PreviewRunner, SearchBackend, SearchRequest};
pub use guard::{PreviewGuard, PreviewKind, PreviewTicket};
pub use preview::{
    DocOutcome, DocPreview, IngestPreview, ProcessorOutcome, SearchPreview,
    SearchProcessorOutcome, NO_DOCUMENT_RETURNED,
};
pub use types::*;
