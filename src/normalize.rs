//! Tag Normalizer.
//!
//! First pass over a fetched page: collapse every `<caption>` and `<td>`
//! cell's rendered content into a single canonical string, in place.
//! Header cells (`<th>`) are collapsed later by the label disambiguator,
//! which needs their raw indentation markers intact.
//!
//! Rules:
//! - captions: all descendant text space-joined and trimmed;
//! - data cells containing a hyperlink: the cell becomes the link target,
//!   keeping machine-actionable references (external sites, e-mail) that
//!   text flattening would lose;
//! - data cells with other nested markup: distinct fragments joined with
//!   the `---` sentinel;
//! - plain cells: trimmed text.
//!
//! The pass is idempotent: a second run over normalized markup is a no-op.

use crate::dom::{self, Document, Selection};

/// Sentinel separating multiple values packed into one cell.
pub const VALUE_SEPARATOR: &str = "---";

/// Collapse all caption and data cells of a page in place.
pub fn normalize_tags(doc: &Document) {
    for node in doc.select("caption").nodes() {
        let caption = Selection::from(*node);
        let text = dom::cell_text(&caption);
        dom::set_cell_text(&caption, &text);
    }

    for node in doc.select("td").nodes() {
        let td = Selection::from(*node);
        if let Some(href) = dom::first_link_href(&td) {
            dom::set_cell_text(&td, &href);
        } else {
            let text = dom::fragment_text(&td, VALUE_SEPARATOR);
            dom::set_cell_text(&td, &text);
        }
    }
}
