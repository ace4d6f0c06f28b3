//! DOM helpers over `dom_query`.
//!
//! Thin, domain-shaped wrappers the cleaning passes share: collapsing a
//! cell's rendered content into one string, finding header cells by their
//! text, walking to a label row's predecessors, and splicing synthetic rows
//! into a table body.

pub use dom_query::{Document, Selection};
pub use tendril::StrTendril;

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Lowercase tag name of the first node in the selection.
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Escape text for use as element content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Collect the distinct whitespace-collapsed text fragments under a node,
/// joined by `sep`.
///
/// Equivalent to walking every descendant text node, collapsing each run of
/// whitespace inside it to one space, skipping the empty ones, and joining
/// what is left. With `" "` this collapses rich markup into one readable
/// string; with the `---` sentinel it marks "multiple distinct values packed
/// into one cell" for later stages.
#[must_use]
pub fn fragment_text(sel: &Selection, sep: &str) -> String {
    let Some(root) = sel.nodes().first() else {
        return String::new();
    };
    let mut fragments: Vec<String> = Vec::new();
    if root.is_text() {
        let collapsed = collapse_whitespace(&root.text());
        if !collapsed.is_empty() {
            fragments.push(collapsed);
        }
    }
    for node in root.descendants() {
        if node.is_text() {
            let collapsed = collapse_whitespace(&node.text());
            if !collapsed.is_empty() {
                fragments.push(collapsed);
            }
        }
    }
    fragments.join(sep)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Space-collapsed text of a cell (caption, th, td).
#[inline]
#[must_use]
pub fn cell_text(sel: &Selection) -> String {
    fragment_text(sel, " ")
}

/// Replace a cell's content with plain text.
#[inline]
pub fn set_cell_text(sel: &Selection, text: &str) {
    sel.set_html(escape_html(text));
}

/// Raw (uncollapsed) text of a selection, NBSP and all.
#[inline]
#[must_use]
pub fn raw_text(sel: &Selection) -> StrTendril {
    sel.text()
}

/// The `href` of the first hyperlink under a cell, if any.
#[must_use]
pub fn first_link_href(sel: &Selection) -> Option<String> {
    let link = sel.select("a");
    if link.exists() {
        link.attr("href").map(|h| h.to_string())
    } else {
        None
    }
}

/// First element under `root` matching `selector` whose collapsed text
/// equals `text` exactly.
#[must_use]
pub fn find_by_text<'a>(root: &Selection<'a>, selector: &str, text: &str) -> Option<Selection<'a>> {
    root.select(selector)
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .find(|sel| cell_text(sel) == text)
}

/// First element under `root` matching `selector` whose collapsed text
/// contains `needle`.
#[must_use]
pub fn find_by_text_contains<'a>(
    root: &Selection<'a>,
    selector: &str,
    needle: &str,
) -> Option<Selection<'a>> {
    root.select(selector)
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .find(|sel| cell_text(sel).contains(needle))
}

/// Get previous element sibling (skipping text nodes).
#[must_use]
pub fn previous_element_sibling<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    sel.nodes().first().and_then(|node| {
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.is_element() {
                return Some(Selection::from(s));
            }
            sibling = s.prev_sibling();
        }
        None
    })
}

/// Nearest ancestor with the given tag name.
#[must_use]
pub fn closest<'a>(sel: &Selection<'a>, tag: &str) -> Option<Selection<'a>> {
    let mut current = sel.nodes().first().and_then(dom_query::NodeRef::parent);
    while let Some(node) = current {
        if node.is_element() && node.node_name().is_some_and(|n| n.eq_ignore_ascii_case(tag)) {
            return Some(Selection::from(node));
        }
        current = node.parent();
    }
    None
}

/// The `<tr>` containing a cell.
#[inline]
#[must_use]
pub fn containing_row<'a>(cell: &Selection<'a>) -> Option<Selection<'a>> {
    closest(cell, "tr")
}

/// The row-label `<th>` of a table row.
#[must_use]
pub fn row_label_cell<'a>(row: &Selection<'a>) -> Option<Selection<'a>> {
    let th = row.select("th");
    if th.exists() {
        Some(th.first())
    } else {
        None
    }
}

/// Replace a table wholesale, re-parsing `inner` under a fresh `<table>`
/// root.
///
/// Row-level fragments (`<tr>`, `<tbody>`, `<thead>`) parse to bare text
/// outside a table context, so any rewrite that touches table structure
/// must rebuild the whole element instead of splicing a fragment into a
/// section. The old table node is detached; callers must re-select it
/// afterwards.
pub fn replace_table(table: &Selection, inner: &str) {
    table.replace_with_html(format!("<table>{inner}</table>"));
}

/// Prepend a `<tr><th>label</th><td>val</td>` row to a table body.
///
/// Rebuilds the containing table (see [`replace_table`]); selections into
/// the old table are stale afterwards.
pub fn insert_row(tbody: &Selection, label: &str, val: &str) {
    let Some(table) = closest(tbody, "table") else {
        return;
    };
    let row = format!(
        "<tr><th>{}</th><td>{}</td></tr>",
        escape_html(label),
        escape_html(val)
    );
    let inner = table.inner_html().to_string();
    // The serializer always writes the implicit <tbody>, so splice right
    // after its open tag; a sectionless table gets one appended.
    let rebuilt = inner
        .find("<tbody")
        .and_then(|start| {
            let close = inner[start..].find('>')?;
            let at = start + close + 1;
            Some(format!("{}{}{}", &inner[..at], row, &inner[at..]))
        })
        .unwrap_or_else(|| format!("{inner}<tbody>{row}</tbody>"));
    replace_table(&table, &rebuilt);
}
