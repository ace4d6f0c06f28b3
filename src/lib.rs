//! Scraper for the six per-school profile pages of CollegeData.com.
//!
//! Every school is addressed by a numeric identifier; each of its six pages
//! (overview, admissions, financial aid, academics, campus life, students)
//! renders data tables in a handful of recurring but messy layouts. This
//! crate fetches the pages, normalizes the markup into a uniform table
//! shape, extracts flat `(label, value)` pairs from each table, and merges
//! the pairs of all six pages into one uniquely-labeled record per school.
//!
//! The processing pipeline for one fetched page is [`process_page`]:
//! tag normalization, label disambiguation, page-specific fixups, table
//! parsing and pattern extraction. [`run`] drives the whole pipeline over
//! an identifier range with a worker pool, and [`write_csv`] serializes
//! the resulting records as one wide CSV.

pub mod config;
pub mod dom;
mod encoding;
mod error;
mod extract;
mod fetch;
mod fixers;
mod labels;
mod normalize;
mod output;
mod page;
mod record;
mod runner;
mod table;

pub use config::{resolve_range, Config};
pub use error::{Error, Result};
pub use normalize::VALUE_SEPARATOR;
pub use output::write_csv;
pub use page::Page;
pub use record::{merge_pairs, SchoolRecord, Value};
pub use runner::{run, CancelFlag, RunSummary};

use dom::Document;

/// Run the full per-page pipeline on one reduced page and return its
/// extracted pairs. The document is modified in place.
///
/// # Errors
///
/// Fails when a label the disambiguator depends on is missing, which means
/// the page layout no longer matches what the rest of the pipeline
/// assumes.
pub fn process_page(
    doc: &Document,
    page: Page,
    school_id: u32,
    config: &Config,
) -> Result<Vec<(String, Value)>> {
    normalize::normalize_tags(doc);
    labels::disambiguate_labels(doc).map_err(|what| Error::MissingStructure {
        school: school_id,
        page,
        what,
    })?;
    fixers::fix_page(doc, page);
    let tables = table::parse_tables(doc, config);
    Ok(extract::extract_pairs(&tables))
}
