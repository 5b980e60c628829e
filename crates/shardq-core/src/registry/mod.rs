//! Mapping from controller kinds to processors.
//!
//! The set of kinds is closed ([`ControllerKind`]); a catalog decides how each
//! kind is wired (queues, clients, shards). Implementations `match` on the kind,
//! so a new kind fails to compile until every catalog handles it.
use std::collections::HashSet;

use shardq_model::ControllerKind;
use tracing::{debug, instrument};

use crate::{error::CoreError, processor::DynProcessor, queue::WorkKey};

/// Builds the processor behind a controller kind.
pub trait ProcessorCatalog<K: WorkKey>: Send + Sync {
    fn build(&self, kind: ControllerKind) -> Result<DynProcessor<K>, CoreError>;
}

/// Build one processor per distinct kind, in the order given.
///
/// Repeated kinds are built once. The first failing kind aborts the whole call.
#[instrument(level = "debug", skip(catalog), fields(kinds = kinds.len()))]
pub fn build_processors<K: WorkKey>(
    catalog: &dyn ProcessorCatalog<K>,
    kinds: &[ControllerKind],
) -> Result<Vec<DynProcessor<K>>, CoreError> {
    let mut seen = HashSet::with_capacity(kinds.len());
    let mut out = Vec::with_capacity(kinds.len());

    for &kind in kinds {
        if !seen.insert(kind) {
            debug!(%kind, "duplicate controller kind skipped");
            continue;
        }
        let processor = catalog.build(kind)?;
        debug!(%kind, processor = processor.name(), "processor built");
        out.push(processor);
    }
    Ok(out)
}
