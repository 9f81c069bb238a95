//! Bounded-concurrency fingerprinting of cache misses.
//!
//! Workers run on a dedicated rayon pool and pull identities from a shared
//! crossbeam queue. Outcomes flow back over a second channel to the calling
//! thread, which is the only place they are observed. That channel closes
//! once the last worker has dropped its sender, so by the time
//! [`Dispatcher::run`] returns every worker has finished and the cache can
//! be merged without locking.

use crate::core::cache::{FileIdentity, HashCache};
use crate::core::config::Concurrency;
use crate::core::hasher::{fingerprint_file, Fingerprint, HashAlgorithm};
use crate::error::HashError;
use crate::events::{Event, EventSender, HashEvent, HashProgress};
use crossbeam_channel::unbounded;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What happened to one identity
#[derive(Debug)]
pub struct HashOutcome {
    pub identity: FileIdentity,
    /// `Ok(None)` is NoHash: the file is not a usable image
    pub result: Result<Option<Fingerprint>, HashError>,
}

impl HashOutcome {
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.result.as_ref().ok().and_then(Option::as_ref)
    }
}

/// Counts for one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Identities handed in
    pub requested: usize,
    /// Identities served from the cache
    pub cache_hits: usize,
    /// Fingerprints computed
    pub computed: usize,
    /// Files that produced no fingerprint
    pub no_hash: usize,
    /// Files that could not be read, with the reason
    pub errors: Vec<(PathBuf, String)>,
    /// Entries added to the cache
    pub merged: usize,
}

/// Schedules a hasher over many files
pub struct Dispatcher<'a> {
    hasher: &'a dyn HashAlgorithm,
    concurrency: Concurrency,
}

impl<'a> Dispatcher<'a> {
    pub fn new(hasher: &'a dyn HashAlgorithm, concurrency: Concurrency) -> Self {
        Self {
            hasher,
            concurrency,
        }
    }

    /// Split identities into valid cache hits and misses, keeping input
    /// order in both.
    pub fn partition(
        &self,
        identities: &[FileIdentity],
        cache: &HashCache,
    ) -> (Vec<(FileIdentity, Fingerprint)>, Vec<FileIdentity>) {
        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for identity in identities {
            match cache.get(identity, self.hasher.kind(), self.hasher.bit_len()) {
                Some(fingerprint) => hits.push((identity.clone(), fingerprint.clone())),
                None => misses.push(identity.clone()),
            }
        }
        (hits, misses)
    }

    /// Fingerprint every identity in `pending`.
    ///
    /// `on_outcome` is called on the calling thread for each outcome as it
    /// arrives. With one worker everything runs here, in input order.
    /// Returns once all workers have finished.
    pub fn run<F>(
        &self,
        pending: Vec<FileIdentity>,
        events: &EventSender,
        mut on_outcome: F,
    ) -> Vec<HashOutcome>
    where
        F: FnMut(&HashOutcome),
    {
        let total = pending.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut record = |outcome: HashOutcome| {
            report_outcome(&outcome, outcomes.len() + 1, total, events);
            on_outcome(&outcome);
            outcomes.push(outcome);
        };

        let workers = self.concurrency.get().min(total.max(1));
        if workers == 1 {
            for identity in pending {
                record(hash_one(self.hasher, identity));
            }
            return outcomes;
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("hash-worker-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "cannot start hashing workers, hashing sequentially");
                for identity in pending {
                    record(hash_one(self.hasher, identity));
                }
                return outcomes;
            }
        };

        let (job_tx, job_rx) = unbounded::<FileIdentity>();
        for identity in pending {
            let _ = job_tx.send(identity);
        }
        drop(job_tx);

        let (result_tx, result_rx) = unbounded::<HashOutcome>();
        let hasher = self.hasher;

        debug!(workers, total, "dispatching fingerprint jobs");
        pool.in_place_scope(|scope| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move |_| {
                    for identity in jobs.iter() {
                        if results.send(hash_one(hasher, identity)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            // Ends when the last worker drops its sender
            for outcome in result_rx.iter() {
                record(outcome);
            }
        });

        outcomes
    }

    /// Fingerprint every identity missing from `cache` and merge the
    /// results in after all workers have finished.
    pub fn compute_missing(
        &self,
        identities: &[FileIdentity],
        cache: &mut HashCache,
        events: &EventSender,
    ) -> DispatchReport {
        let (hits, misses) = self.partition(identities, cache);
        events.send(Event::Hash(HashEvent::Started {
            to_compute: misses.len(),
            cache_hits: hits.len(),
        }));

        let outcomes = self.run(misses, events, |_| {});
        let mut report = summarize(&outcomes);
        report.requested = identities.len();
        report.cache_hits = hits.len();
        report.merged = merge_outcomes(cache, outcomes);

        events.send(Event::Hash(HashEvent::Completed {
            computed: report.computed,
            no_hash: report.no_hash,
            errors: report.errors.len(),
        }));
        report
    }
}

fn hash_one(hasher: &dyn HashAlgorithm, identity: FileIdentity) -> HashOutcome {
    let result = fingerprint_file(hasher, &identity.path);
    HashOutcome { identity, result }
}

fn report_outcome(outcome: &HashOutcome, completed: usize, total: usize, events: &EventSender) {
    let path = &outcome.identity.path;
    match &outcome.result {
        Ok(Some(_)) => {}
        Ok(None) => {
            events.send(Event::Hash(HashEvent::NoHash { path: path.clone() }));
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot fingerprint file");
            events.send(Event::Hash(HashEvent::Error {
                path: path.clone(),
                message: e.to_string(),
            }));
        }
    }
    events.send(Event::Hash(HashEvent::Progress(HashProgress {
        completed,
        total,
        current_path: path.clone(),
    })));
}

/// Count computed, NoHash and failed outcomes
pub fn summarize(outcomes: &[HashOutcome]) -> DispatchReport {
    let mut report = DispatchReport::default();
    for outcome in outcomes {
        match &outcome.result {
            Ok(Some(_)) => report.computed += 1,
            Ok(None) => report.no_hash += 1,
            Err(e) => report
                .errors
                .push((outcome.identity.path.clone(), e.to_string())),
        }
    }
    report
}

/// Merge the successful outcomes into `cache`; returns entries written.
pub fn merge_outcomes(cache: &mut HashCache, outcomes: Vec<HashOutcome>) -> usize {
    cache.merge(outcomes.into_iter().filter_map(|outcome| {
        let HashOutcome { identity, result } = outcome;
        result.ok().flatten().map(|fingerprint| (identity, fingerprint))
    }))
}
