//! Page-Specific Anomaly Fixers.
//!
//! Six independent passes, one per page template, each a sequence of
//! find-target-then-rewrite steps for layout defects the general passes do
//! not cover. Not every school's page exhibits every anomaly, so every
//! fixer tolerates its target being absent, and every fixer is idempotent.
//!
//! Fixers run after normalization and label disambiguation, so all cells
//! hold collapsed single-string content by the time they execute.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{self, Document, Selection};
use crate::page::Page;

/// City population rows embed the city name in the label, which varies per
/// school; they are renamed to one canonical label.
static POPULATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("Population").expect("POPULATION regex"));

/// Apply the fixer for one page template.
pub(crate) fn fix_page(doc: &Document, page: Page) {
    match page {
        Page::Overview => fix_overview(doc),
        Page::Admissions => fix_admissions(doc),
        Page::FinancialAid => fix_financial_aid(doc),
        Page::Academics => fix_academics(doc),
        Page::CampusLife => fix_campus_life(doc),
        Page::Students => {} // needs no additional fixing
    }
}

/// Overview page (1).
fn fix_overview(doc: &Document) {
    let body = doc.select("body");

    // The Overview carries a shortened duplicate of the Admissions page's
    // Selection of Students table; drop it and keep the full version.
    // Dropped first so grafted rows never land in it.
    if let Some(caption) = dom::find_by_text(&body, "caption", "Selection of Students") {
        if let Some(table) = dom::closest(&caption, "table") {
            table.remove();
        }
    }

    // School name and description live outside any table; graft them into
    // the first table body so extraction sees them as ordinary rows.
    // Each insert rebuilds the table, so the body is re-selected per row.
    let h1 = doc.select("h1");
    if h1.exists() {
        let name = dom::cell_text(&h1.first());
        graft_overview_row(doc, "Name", &name);
    }
    let p = doc.select("p");
    if p.exists() {
        let description = dom::cell_text(&p.first());
        graft_overview_row(doc, "Description", &description);
    }

    // The campus map widget rides inside a data row.
    if let Some(th) = dom::find_by_text_contains(&body, "th", "View Larger Map") {
        if let Some(row) = dom::containing_row(&th) {
            row.remove();
        }
    }

    rename_population_label(doc);

    // Line the GPA label up with the identical value on the Admissions page.
    if let Some(th) = dom::find_by_text(&body, "th", "Average GPA") {
        dom::set_cell_text(&th, "GPA, Average");
    }
}

/// Admissions page (2).
fn fix_admissions(doc: &Document) {
    let body = doc.select("body");

    // The Overview carries the same label for a different table.
    if let Some(th) = dom::find_by_text(&body, "th", "Entrance Difficulty") {
        dom::set_cell_text(&th, "Entrance Difficulty, Description");
    }

    // The Examinations matrix ships without a label over its first column.
    if let Some(caption) = dom::find_by_text(&body, "caption", "Examinations") {
        if let Some(table) = dom::closest(&caption, "table") {
            let thead_td = table.select("thead td");
            if thead_td.exists() {
                let first = thead_td.first();
                if dom::cell_text(&first).is_empty() {
                    dom::set_cell_text(&first, "Requirement");
                }
            }
        }
    }

    // GPA breakdown rows carry bare bucket labels ("3.75 and Above" ...).
    if let Some(caption) = dom::find_by_text_contains(&body, "caption", "Grade Point Average") {
        if let Some(table) = dom::closest(&caption, "table") {
            let th_nodes = table.select("th").nodes().to_vec();
            let mut iter = th_nodes.into_iter();
            if let Some(first) = iter.next() {
                dom::set_cell_text(&Selection::from(first), "GPA, Average");
            }
            for node in iter {
                let th = Selection::from(node);
                let text = dom::cell_text(&th);
                if !text.starts_with("GPA, ") {
                    dom::set_cell_text(&th, &format!("GPA, {text}"));
                }
            }
        }
    }

    // "Other Application Requirements" rows collide with identical labels
    // elsewhere ("Interview", "Essay"...).
    if let Some(caption) = dom::find_by_text(&body, "caption", "Other Application Requirements") {
        if let Some(table) = dom::closest(&caption, "table") {
            prefix_table_labels(&table, "Application Requirements, ");
        }
    }
}

/// Financial aid page (3).
fn fix_financial_aid(doc: &Document) {
    let body = doc.select("body");

    // E-mail and Web Site also appear in the admissions office block.
    if let Some(caption) = dom::find_by_text(&body, "caption", "Financial Aid Office") {
        if let Some(table) = dom::closest(&caption, "table") {
            if let Some(th) = dom::find_by_text(&table, "th", "E-mail") {
                dom::set_cell_text(&th, "Financial Aid Office, E-mail");
            }
            if let Some(th) = dom::find_by_text(&table, "th", "Web Site") {
                dom::set_cell_text(&th, "Financial Aid Office, Web Site");
            }
        }
    }

    // The Forms Required / Cost to File table nests the FAFSA code inside
    // its label cell. Split the code out into its own row and drop the
    // two-column pseudo-header.
    if let Some(th) = dom::find_by_text(&body, "th", "Forms Required") {
        if let Some(table) = dom::closest(&th, "table") {
            table.select("thead").remove();
            if let Some(fafsa_th) = dom::find_by_text_contains(&table, "th", "FAFSA") {
                let text = dom::cell_text(&fafsa_th);
                let code = last_chars(&text, 6);
                dom::set_cell_text(&fafsa_th, "FAFSA");
                let tbody = table.select("tbody");
                if tbody.exists() && dom::find_by_text(&table, "th", "FAFSA Code").is_none() {
                    dom::insert_row(&tbody.first(), "FAFSA Code", &code);
                }
            }
        }
    }

    // The first two tables of the aid section reuse generic row labels;
    // prefix them with their captions.
    let tables = doc.select("div#section11 table");
    for node in tables.nodes().iter().take(2) {
        let table = Selection::from(*node);
        let caption = table.select("caption");
        if !caption.exists() {
            continue;
        }
        let prefix = format!("{}, ", dom::cell_text(&caption.first()));
        prefix_table_labels(&table, &prefix);
    }
}

/// Academics page (4).
fn fix_academics(doc: &Document) {
    let section = doc.select("div#section14");
    if !section.exists() {
        return;
    }
    let table = section.select("table");
    if table.exists() {
        prefix_table_labels(&table.first(), "Curriculum Requirements, ");
    }
}

/// Campus life page (5).
fn fix_campus_life(doc: &Document) {
    rename_population_label(doc);

    // The sports table header is built from decorative markup the parser
    // cannot use; rebuild the table with a flat header carrying the
    // caption as the row-index name and explicit (gender, status) column
    // labels over the untouched body. Consuming the caption keeps the
    // rebuild one-shot.
    let body = doc.select("body");
    if let Some(caption) = dom::find_by_text(&body, "caption", "Intercollegiate Sports Offered") {
        if let Some(table) = dom::closest(&caption, "table") {
            let tbody = table.select("tbody");
            let rows = if tbody.exists() {
                tbody.first().html().to_string()
            } else {
                String::new()
            };
            dom::replace_table(
                &table,
                &format!(
                    "<thead><tr><th>Intercollegiate Sports Offered</th>\
                     <td>Women, Offered</td><td>Women, Scholarships Given</td>\
                     <td>Men, Offered</td><td>Men, Scholarships Given</td></tr></thead>{rows}"
                ),
            );
        }
    }
}

/// Prepend one labeled row to the first table body of the Overview page,
/// unless the label already exists there.
fn graft_overview_row(doc: &Document, label: &str, val: &str) {
    if val.is_empty() {
        return;
    }
    let tbody = doc.select("tbody");
    if !tbody.exists() {
        return;
    }
    let first_tbody = tbody.first();
    if dom::find_by_text(&first_tbody, "th", label).is_none() {
        dom::insert_row(&first_tbody, label, val);
    }
}

/// Prefix every row label of a table, skipping labels already carrying it.
fn prefix_table_labels(table: &Selection, prefix: &str) {
    for node in table.select("th").nodes().to_vec() {
        let th = Selection::from(node);
        let text = dom::cell_text(&th);
        if !text.is_empty() && !text.starts_with(prefix) {
            dom::set_cell_text(&th, &format!("{prefix}{text}"));
        }
    }
}

/// Canonicalize the per-school "<City> Population" label.
fn rename_population_label(doc: &Document) {
    let body = doc.select("body");
    if dom::find_by_text(&body, "th", "City Population").is_some() {
        return;
    }
    for node in body.select("th").nodes().to_vec() {
        let th = Selection::from(node);
        let text = dom::cell_text(&th);
        if POPULATION_RE.is_match(&text) {
            dom::set_cell_text(&th, "City Population");
            break;
        }
    }
}

/// Last `n` characters of a string, char-boundary safe.
fn last_chars(text: &str, n: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(n)).collect()
}
