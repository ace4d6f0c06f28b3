//! Scrape runner.
//!
//! Walks an inclusive identifier range with a fixed pool of worker
//! threads. Identifiers are handed out through an atomic counter, so no
//! two workers touch the same school; within one school the six pages are
//! always fetched in order, because later fixups assume earlier pages'
//! labels. One school failing never stops the run.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, PageFetch};
use crate::page::Page;
use crate::process_page;
use crate::record::{merge_pairs, SchoolRecord};

/// Cooperative cancellation handle, checked between schools.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Successfully scraped records, ordered by school identifier.
    pub records: Vec<SchoolRecord>,
    /// Schools whose pages no longer match the expected structure.
    pub failures: Vec<(u32, Error)>,
    /// Identifiers with no school behind them, or unreachable after retries.
    pub skipped: u32,
}

enum Outcome {
    Record(Box<SchoolRecord>),
    NoSchool,
    Failed(Error),
}

/// Scrape every school in `start..=end`.
pub fn run(
    config: &Config,
    (start, end): (u32, u32),
    silent: bool,
    cancel: &CancelFlag,
) -> Result<RunSummary> {
    let fetcher = Fetcher::new(config)?;
    let next_id = AtomicU32::new(start);
    let workers = config.workers.max(1);
    let (tx, rx) = mpsc::channel::<(u32, Outcome)>();

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut skipped = 0u32;

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let fetcher = &fetcher;
            let next_id = &next_id;
            scope.spawn(move || {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let id = next_id.fetch_add(1, Ordering::Relaxed);
                    if id > end {
                        break;
                    }
                    let outcome = match scrape_school(fetcher, config, id) {
                        Ok(Some(record)) => Outcome::Record(Box::new(record)),
                        Ok(None) => Outcome::NoSchool,
                        Err(err) => Outcome::Failed(err),
                    };
                    if tx.send((id, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        for (id, outcome) in rx {
            match outcome {
                Outcome::Record(record) => {
                    if !silent {
                        info!(school_id = id, fields = record.fields().len(), "scraped");
                    }
                    records.push(*record);
                }
                Outcome::NoSchool => {
                    if !silent {
                        info!(school_id = id, "no school for identifier");
                    }
                    skipped += 1;
                }
                Outcome::Failed(err) => match err {
                    // Unreachable schools are skipped like no-data ids;
                    // only structural problems count as failures.
                    Error::Transport { .. } | Error::Request(_) => {
                        warn!(school_id = id, %err, "school unreachable, skipping");
                        skipped += 1;
                    }
                    err => {
                        error!(school_id = id, %err, "school failed");
                        failures.push((id, err));
                    }
                },
            }
        }
    });

    records.sort_by_key(SchoolRecord::id);
    failures.sort_by_key(|(id, _)| *id);
    Ok(RunSummary {
        records,
        failures,
        skipped,
    })
}

/// Scrape one school's six pages into a merged record. `Ok(None)` means
/// the identifier maps to no school.
fn scrape_school(fetcher: &Fetcher, config: &Config, school_id: u32) -> Result<Option<SchoolRecord>> {
    let mut pairs = Vec::new();
    for page in Page::ALL {
        let doc = match fetcher.fetch(config, school_id, page)? {
            PageFetch::Page(doc) => doc,
            PageFetch::NoData => return Ok(None),
        };
        pairs.extend(process_page(&doc, page, school_id, config)?);
    }
    merge_pairs(school_id, pairs).map(Some)
}
