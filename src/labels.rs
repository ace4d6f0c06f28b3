//! Label Disambiguator.
//!
//! Rewrites row-label cells so every label is self-describing without table
//! or page context. Runs after [`crate::normalize::normalize_tags`], which
//! leaves `<th>` cells untouched so the indentation markers inspected here
//! (the `sub` class and NBSP padding) are still visible.
//!
//! Three general passes, in order:
//! 1. collapse each `<th>`, prefixing sub-rows with their parent label;
//! 2. restructure tables that use their caption as the only label;
//! 3. prefix `Women`/`Men` rows under the known gendered parent labels,
//!    which the site renders without any sub-row marker.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::dom::{self, Document, Selection};
use crate::normalize::VALUE_SEPARATOR;

/// Parent labels whose `Women`/`Men` child rows carry no indentation marker.
static GENDERED_PARENT_LABELS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Undergraduate Students",
        "Overall Admission Rate",
        "Students Enrolled",
        "All Undergraduates",
    ]
    .into_iter()
    .collect()
});

/// Captions of tables that store data in both `<th>` and `<td>` cells and
/// use the caption itself as the label.
pub(crate) static CAPTION_AS_LABEL: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Undergraduate Majors",
        "Master's Programs of Study",
        "Doctoral Programs of Study",
        "Master's Degrees Offered",
        "Doctoral Degrees Offered",
        "Entrance Difficulty",
    ]
    .into_iter()
    .collect()
});

/// Rewrite all row labels of a page in place.
///
/// Fails when a sub-row has no preceding parent label to inherit; a
/// malformed page must abort extraction rather than mislabel data.
pub(crate) fn disambiguate_labels(doc: &Document) -> Result<(), &'static str> {
    rewrite_header_cells(doc)?;
    restructure_caption_labeled_tables(doc);
    prefix_gendered_rows(doc);
    Ok(())
}

/// Collapse every `<th>` and apply the two structural sub-row rules.
///
/// A cell flagged with the `sub` class inherits the nearest preceding
/// unflagged label. A cell indented with NBSP padding is an implicit
/// sub-row: `Women` finds its parent one row up, `Men` two rows up, Men
/// rows being conventionally the second of a paired block.
fn rewrite_header_cells(doc: &Document) -> Result<(), &'static str> {
    let mut last_unflagged: Option<String> = None;

    for node in doc.select("th").nodes().to_vec() {
        let th = Selection::from(node);
        let had_indent = dom::raw_text(&th).contains('\u{a0}');
        let text = dom::cell_text(&th);
        let flagged = th.attr("class").is_some();
        let is_sub = th
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == "sub"));

        let label = if is_sub {
            let parent = last_unflagged
                .clone()
                .ok_or("parent label for sub-row")?;
            format!("{parent}, {text}")
        } else if had_indent && text == "Women" {
            let parent =
                parent_label_back(&th, 1).ok_or("parent row for indented Women sub-row")?;
            format!("{parent}, {text}")
        } else if had_indent && text == "Men" {
            let parent =
                parent_label_back(&th, 2).ok_or("parent row for indented Men sub-row")?;
            format!("{parent}, {text}")
        } else {
            text
        };

        dom::set_cell_text(&th, &label);
        if !flagged {
            last_unflagged = Some(label);
        }
    }
    Ok(())
}

/// The row label `hops` table rows before the one containing `cell`.
fn parent_label_back(cell: &Selection, hops: usize) -> Option<String> {
    let mut row = dom::containing_row(cell)?;
    for _ in 0..hops {
        row = dom::previous_element_sibling(&row)?;
    }
    let label_cell = dom::row_label_cell(&row)?;
    let label = dom::cell_text(&label_cell);
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Flatten each caption-labeled table into one synthetic row.
///
/// All body text joins into a single sentinel-separated value cell and the
/// caption becomes that row's label. The caption element itself is
/// consumed, which also makes the pass idempotent.
fn restructure_caption_labeled_tables(doc: &Document) {
    for node in doc.select("caption").nodes().to_vec() {
        let caption = Selection::from(node);
        let text = dom::cell_text(&caption);
        if !CAPTION_AS_LABEL.contains(text.as_str()) {
            continue;
        }
        let Some(table) = dom::closest(&caption, "table") else {
            continue;
        };
        let tbody = table.select("tbody");
        if !tbody.exists() {
            continue;
        }
        let joined = dom::fragment_text(&tbody, VALUE_SEPARATOR);
        dom::replace_table(
            &table,
            &format!(
                "<tbody><tr><th>{}</th><td>{}</td></tr></tbody>",
                dom::escape_html(&text),
                dom::escape_html(&joined)
            ),
        );
    }
}

/// Prefix the unmarked `Women`/`Men` rows that follow the known
/// duplicate-bearing parent labels.
fn prefix_gendered_rows(doc: &Document) {
    let th_nodes = doc.select("th").nodes().to_vec();
    for (i, node) in th_nodes.iter().enumerate() {
        let parent = dom::cell_text(&Selection::from(*node));
        if !GENDERED_PARENT_LABELS.contains(parent.as_str()) {
            continue;
        }
        let Some(women) = th_nodes.get(i + 1).map(|n| Selection::from(*n)) else {
            continue;
        };
        if dom::cell_text(&women) == "Women" {
            dom::set_cell_text(&women, &format!("{parent}, Women"));
            if let Some(men) = th_nodes.get(i + 2).map(|n| Selection::from(*n)) {
                if dom::cell_text(&men) == "Men" {
                    dom::set_cell_text(&men, &format!("{parent}, Men"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;
    use crate::normalize::normalize_tags;

    fn labels_of(doc: &Document) -> Vec<String> {
        doc.select("th")
            .nodes()
            .iter()
            .map(|n| dom::cell_text(&Selection::from(*n)))
            .collect()
    }

    #[test]
    fn sub_class_row_inherits_parent_prefix() {
        let doc = parse(
            "<table><tbody>\
             <tr><th>GPA</th><td>3.5</td></tr>\
             <tr><th class=\"sub\">Average</th><td>3.6</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(labels_of(&doc), vec!["GPA", "GPA, Average"]);
    }

    #[test]
    fn gendered_indent_lookback_is_asymmetric() {
        // Women is one row below the shared parent, Men two rows below.
        let doc = parse(
            "<table><tbody>\
             <tr><th>Enrollment</th><td>1000</td></tr>\
             <tr><th>\u{a0}\u{a0}Women</th><td>600</td></tr>\
             <tr><th>\u{a0}\u{a0}Men</th><td>400</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(
            labels_of(&doc),
            vec!["Enrollment", "Enrollment, Women", "Enrollment, Men"]
        );
    }

    #[test]
    fn indented_sub_row_without_parent_fails() {
        let doc = parse(
            "<table><tbody>\
             <tr><th>\u{a0}Women</th><td>600</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        assert!(disambiguate_labels(&doc).is_err());
    }

    #[test]
    fn sub_class_without_preceding_label_fails() {
        let doc = parse(
            "<table><tbody>\
             <tr><th class=\"sub\">Average</th><td>3.6</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        assert!(disambiguate_labels(&doc).is_err());
    }

    #[test]
    fn known_gendered_parents_need_no_marker() {
        let doc = parse(
            "<table><tbody>\
             <tr><th>Undergraduate Students</th><td>5000</td></tr>\
             <tr><th>Women</th><td>2600</td></tr>\
             <tr><th>Men</th><td>2400</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(
            labels_of(&doc),
            vec![
                "Undergraduate Students",
                "Undergraduate Students, Women",
                "Undergraduate Students, Men"
            ]
        );
    }

    #[test]
    fn men_without_women_between_is_not_prefixed() {
        let doc = parse(
            "<table><tbody>\
             <tr><th>Overall Admission Rate</th><td>60%</td></tr>\
             <tr><th>Men</th><td>55%</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(labels_of(&doc), vec!["Overall Admission Rate", "Men"]);
    }

    #[test]
    fn caption_labeled_table_collapses_to_one_row() {
        let doc = parse(
            "<table><caption>Undergraduate Majors</caption><tbody>\
             <tr><th>Biology</th><td>Chemistry</td></tr>\
             <tr><th>Physics</th><td>History</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(labels_of(&doc), vec!["Undergraduate Majors"]);
        assert_eq!(
            doc.select("td").text().as_ref(),
            "Biology---Chemistry---Physics---History"
        );
        // The synthetic row is real table structure, and the consumed
        // caption cannot trigger the pass a second time.
        assert_eq!(doc.select("tbody tr").length(), 1);
        assert!(!doc.select("caption").exists());
        let once = doc.html().to_string();
        disambiguate_labels(&doc).unwrap();
        assert_eq!(doc.html().to_string(), once);
    }

    #[test]
    fn unrelated_captions_are_untouched() {
        let doc = parse(
            "<table><caption>Costs</caption><tbody>\
             <tr><th>Tuition</th><td>$10,000</td></tr>\
             </tbody></table>",
        );
        normalize_tags(&doc);
        disambiguate_labels(&doc).unwrap();
        assert_eq!(labels_of(&doc), vec!["Tuition"]);
    }
}
