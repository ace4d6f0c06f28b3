//! Uniform table model.
//!
//! After normalization, disambiguation and fixing, every data table on a
//! page reduces to the same shape: an optional caption, an optional header
//! row naming a row index and data columns, and body rows of one label cell
//! plus value cells. This module parses that shape and classifies each
//! table into the extraction pattern that fits it.

use crate::config::Config;
use crate::dom::{self, Document, Selection};
use crate::labels::CAPTION_AS_LABEL;

/// One body row: a label plus its value cells, in column order.
/// Cells holding a not-reported token or nothing at all are `None`.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub label: String,
    pub cells: Vec<Option<String>>,
}

/// A parsed table, independent of the markup it came from.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    pub caption: Option<String>,
    /// Label over the row-label column, from the header's first cell.
    pub index_name: Option<String>,
    /// Labels over the value columns. May be shorter than a row's cell
    /// count when the source header was ragged; extraction pads with
    /// unnamed columns.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    two_level: bool,
}

/// Which extraction pattern a table follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableKind {
    /// Label column plus one value column; rows are independent fields.
    SingleColumn,
    /// Rows crossed with named columns; every cell is a field.
    Matrix,
    /// Per row, exactly the first marked column matters.
    SingleMark,
    /// Per column, the set of marked rows matters.
    MultiMark,
    /// Layout or junk table carrying no data.
    Ignore,
}

impl Table {
    pub fn classify(&self) -> TableKind {
        if let Some(index) = self.index_name.as_deref() {
            match index {
                "Subject" | "Exam" => return TableKind::Matrix,
                "Factor" => return TableKind::SingleMark,
                "Intercollegiate Sports Offered" => return TableKind::MultiMark,
                _ => {}
            }
        }
        if self.two_level {
            return TableKind::MultiMark;
        }
        let single_column = self
            .rows
            .iter()
            .all(|row| row.cells.len() <= 1);
        if single_column && !self.rows.is_empty() {
            // Caption-restructured tables legitimately carry one row.
            if self.rows.len() > 1
                || self
                    .rows
                    .first()
                    .is_some_and(|row| CAPTION_AS_LABEL.contains(row.label.as_str()))
            {
                return TableKind::SingleColumn;
            }
        }
        TableKind::Ignore
    }
}

/// Parse every `<table>` in document order.
pub(crate) fn parse_tables(doc: &Document, config: &Config) -> Vec<Table> {
    doc.select("table")
        .nodes()
        .iter()
        .map(|node| parse_table(&Selection::from(*node), config))
        .collect()
}

fn parse_table(table: &Selection, config: &Config) -> Table {
    let caption = {
        let sel = table.select("caption");
        if sel.exists() {
            let text = dom::cell_text(&sel.first());
            (!text.is_empty()).then_some(text)
        } else {
            None
        }
    };

    let header_rows: Vec<_> = table.select("thead tr").nodes().to_vec();
    let mut index_name = None;
    let mut columns = Vec::new();
    let two_level = header_rows.len() > 1;
    if let Some(last) = header_rows.last() {
        let cells = row_cells(&Selection::from(*last));
        let mut iter = cells.into_iter();
        if let Some(first) = iter.next() {
            let text = dom::cell_text(&first);
            index_name = (!text.is_empty()).then_some(text);
        }
        columns = iter.map(|cell| dom::cell_text(&cell)).collect();
        if two_level {
            columns = join_group_labels(&header_rows, columns);
        }
    }

    let mut rows = Vec::new();
    for node in table.select("tbody tr").nodes() {
        let row = Selection::from(*node);
        let Some(label_cell) = dom::row_label_cell(&row) else {
            continue;
        };
        let label = dom::cell_text(&label_cell);
        if label.is_empty() {
            continue;
        }
        let cells = row
            .select("td")
            .nodes()
            .iter()
            .map(|n| {
                let text = dom::cell_text(&Selection::from(*n));
                (!text.is_empty() && !config.is_na(&text)).then_some(text)
            })
            .collect();
        rows.push(Row { label, cells });
    }

    Table {
        caption,
        index_name,
        columns,
        rows,
        two_level,
    }
}

/// Combine a two-row header into "group, column" labels where the group
/// row lines up one-to-one with the column row; otherwise keep the bottom
/// row's labels as-is.
fn join_group_labels(
    header_rows: &[dom_query::NodeRef<'_>],
    columns: Vec<String>,
) -> Vec<String> {
    let top = row_cells(&Selection::from(header_rows[0]));
    let top_labels: Vec<String> = top
        .iter()
        .skip(1)
        .map(dom::cell_text)
        .collect();
    if top_labels.len() != columns.len() {
        return columns;
    }
    top_labels
        .into_iter()
        .zip(columns)
        .map(|(group, col)| {
            if group.is_empty() {
                col
            } else if col.is_empty() {
                group
            } else {
                format!("{group}, {col}")
            }
        })
        .collect()
}

/// Cells of one header row in document order, th and td alike.
fn row_cells<'a>(row: &Selection<'a>) -> Vec<Selection<'a>> {
    row.select("th, td")
        .nodes()
        .iter()
        .map(|n| Selection::from(*n))
        .collect()
}
