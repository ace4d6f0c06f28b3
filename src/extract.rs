//! Pattern extraction.
//!
//! Turns parsed tables into flat `(label, value)` pairs according to their
//! classification. Only extraction happens here; coercion, conflict checks
//! and merging live in [`crate::record`].

use crate::record::Value;
use crate::table::{Table, TableKind};

/// Extract every pair from every table, in document order.
pub(crate) fn extract_pairs(tables: &[Table]) -> Vec<(String, Value)> {
    let mut pairs = Vec::new();
    for table in tables {
        match table.classify() {
            TableKind::SingleColumn => extract_single_column(table, &mut pairs),
            TableKind::Matrix => extract_matrix(table, &mut pairs),
            TableKind::SingleMark => extract_single_mark(table, &mut pairs),
            TableKind::MultiMark => extract_multi_mark(table, &mut pairs),
            TableKind::Ignore => {}
        }
    }
    pairs
}

/// Each row is one field: its label, its single cell.
fn extract_single_column(table: &Table, pairs: &mut Vec<(String, Value)>) {
    for row in &table.rows {
        if let Some(Some(cell)) = row.cells.first() {
            pairs.push((row.label.clone(), Value::text(cell)));
        }
    }
}

/// Each cell is one field, keyed "index, row, column". A column the header
/// left unnamed contributes "index, row" instead.
fn extract_matrix(table: &Table, pairs: &mut Vec<(String, Value)>) {
    let index = table.index_name.as_deref().unwrap_or_default();
    for row in &table.rows {
        for (i, cell) in row.cells.iter().enumerate() {
            let Some(cell) = cell else { continue };
            let label = match table.columns.get(i).map(String::as_str) {
                Some(col) if !col.is_empty() => {
                    format!("{index}, {}, {col}", row.label)
                }
                _ => format!("{index}, {}", row.label),
            };
            pairs.push((label, Value::text(cell)));
        }
    }
}

/// Each row carries a mark in at most one column; the field is the row
/// ("index, row") and the value is the marked column's name. Unmarked rows
/// contribute nothing.
fn extract_single_mark(table: &Table, pairs: &mut Vec<(String, Value)>) {
    let index = table.index_name.as_deref().unwrap_or_default();
    for row in &table.rows {
        let marked = row
            .cells
            .iter()
            .position(Option::is_some)
            .and_then(|i| table.columns.get(i));
        if let Some(col) = marked {
            pairs.push((format!("{index}, {}", row.label), Value::text(col)));
        }
    }
}

/// Each column is one field ("index, column") whose value is the list of
/// row labels marked in that column. Columns with no marks contribute
/// nothing.
fn extract_multi_mark(table: &Table, pairs: &mut Vec<(String, Value)>) {
    let index = table.index_name.as_deref().unwrap_or_default();
    for (i, col) in table.columns.iter().enumerate() {
        let marked: Vec<String> = table
            .rows
            .iter()
            .filter(|row| row.cells.get(i).is_some_and(Option::is_some))
            .map(|row| row.label.clone())
            .collect();
        if !marked.is_empty() {
            pairs.push((format!("{index}, {col}"), Value::List(marked)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dom::parse;
    use crate::table::parse_tables;

    fn pairs_of(html: &str) -> Vec<(String, Value)> {
        let doc = parse(html);
        let tables = parse_tables(&doc, &Config::default());
        extract_pairs(&tables)
    }

    #[test]
    fn single_column_rows_become_fields() {
        let pairs = pairs_of(
            "<html><body><table><tbody>\
             <tr><th>City</th><td>Springfield</td></tr>\
             <tr><th>State</th><td>IL</td></tr>\
             </tbody></table></body></html>",
        );
        assert_eq!(
            pairs,
            vec![
                ("City".to_string(), Value::text("Springfield")),
                ("State".to_string(), Value::text("IL")),
            ]
        );
    }

    #[test]
    fn not_reported_contributes_no_pair() {
        let pairs = pairs_of(
            "<html><body><table><tbody>\
             <tr><th>City</th><td>Not reported</td></tr>\
             <tr><th>State</th><td>IL</td></tr>\
             </tbody></table></body></html>",
        );
        assert_eq!(pairs, vec![("State".to_string(), Value::text("IL"))]);
    }

    #[test]
    fn matrix_cells_key_on_index_row_and_column() {
        let pairs = pairs_of(
            "<html><body><table>\
             <thead><tr><th>Exam</th><td>Requirement</td><td>Average Score</td></tr></thead>\
             <tbody>\
             <tr><th>SAT I</th><td>Required</td><td>1200</td></tr>\
             <tr><th>ACT</th><td></td><td>27</td></tr>\
             </tbody></table></body></html>",
        );
        assert_eq!(
            pairs,
            vec![
                ("Exam, SAT I, Requirement".to_string(), Value::text("Required")),
                ("Exam, SAT I, Average Score".to_string(), Value::text("1200")),
                ("Exam, ACT, Average Score".to_string(), Value::text("27")),
            ]
        );
    }

    #[test]
    fn matrix_unnamed_column_keys_on_index_and_row() {
        let pairs = pairs_of(
            "<html><body><table>\
             <thead><tr><th>Subject</th><td></td></tr></thead>\
             <tbody><tr><th>English</th><td>4 units</td></tr></tbody>\
             </table></body></html>",
        );
        assert_eq!(
            pairs,
            vec![("Subject, English".to_string(), Value::text("4 units"))]
        );
    }

    #[test]
    fn single_mark_yields_marked_column_name() {
        let pairs = pairs_of(
            "<html><body><table>\
             <thead><tr><th>Factor</th><td>Very Important</td><td>Important</td>\
             <td>Considered</td></tr></thead>\
             <tbody>\
             <tr><th>Academics</th><td></td><td>X</td><td></td></tr>\
             <tr><th>Interview</th><td></td><td></td><td></td></tr>\
             </tbody></table></body></html>",
        );
        assert_eq!(
            pairs,
            vec![("Factor, Academics".to_string(), Value::text("Important"))]
        );
    }

    #[test]
    fn multi_mark_collects_marked_row_labels_per_column() {
        let pairs = pairs_of(
            "<html><body><table>\
             <thead><tr><th>Intercollegiate Sports Offered</th>\
             <td>Women, Offered</td><td>Men, Offered</td></tr></thead>\
             <tbody>\
             <tr><th>Soccer</th><td>X</td><td>X</td></tr>\
             <tr><th>Tennis</th><td>X</td><td></td></tr>\
             <tr><th>Football</th><td></td><td>X</td></tr>\
             </tbody></table></body></html>",
        );
        assert_eq!(
            pairs,
            vec![
                (
                    "Intercollegiate Sports Offered, Women, Offered".to_string(),
                    Value::List(vec!["Soccer".to_string(), "Tennis".to_string()]),
                ),
                (
                    "Intercollegiate Sports Offered, Men, Offered".to_string(),
                    Value::List(vec!["Soccer".to_string(), "Football".to_string()]),
                ),
            ]
        );
    }

    #[test]
    fn multi_mark_empty_column_contributes_no_pair() {
        let pairs = pairs_of(
            "<html><body><table>\
             <thead><tr><th>Intercollegiate Sports Offered</th>\
             <td>Women, Offered</td><td>Women, Scholarships Given</td></tr></thead>\
             <tbody><tr><th>Soccer</th><td>X</td><td></td></tr></tbody>\
             </table></body></html>",
        );
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "Intercollegiate Sports Offered, Women, Offered");
    }
}
