//! # Pipeline Module
//!
//! Orchestrates complete runs.
//!
//! ## Stages
//! 1. **Load** - Read the fingerprint cache (corruption means a fresh cache)
//! 2. **Scan** - Enumerate image files
//! 3. **Hash** - Fingerprint cache misses on a bounded worker pool
//! 4. **Compare** - Dedup: stream fingerprints into the comparator as they
//!    arrive. Search: scan the corpus for the first match
//! 5. **Save** - Merge new fingerprints after the workers join, then persist
//!
//! Cancellation is not supported; a run always goes to completion.

mod dispatcher;
mod executor;

pub use dispatcher::{merge_outcomes, summarize, DispatchReport, Dispatcher, HashOutcome};
pub use executor::{
    DedupPipeline, DedupPipelineBuilder, DedupReport, SearchPipeline, SearchPipelineBuilder,
    SearchReport,
};
