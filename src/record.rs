//! Record assembly.
//!
//! Pairs extracted from all six pages of one school are merged into one
//! flat record. Labels must be unique after the merge; the same label
//! appearing twice with the same value is a known site quirk and keeps its
//! first instance, while two different values for one label mean the page
//! layout shifted under us and the whole school fails loudly rather than
//! silently picking one.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::normalize::VALUE_SEPARATOR;

/// A single field value.
///
/// Extraction only ever produces `Text` and `List`; `Number` appears after
/// the coercion pass that closes out a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub(crate) fn text(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => f.write_str(&items.join(VALUE_SEPARATOR)),
        }
    }
}

/// Turn a text value numeric when it reads as a number, tolerating
/// thousands separators ("23,456"). Anything else stays text; this
/// function never fails.
pub(crate) fn coerce(text: &str) -> Value {
    let trimmed = text.trim();
    if looks_numeric(trimmed) {
        let stripped = trimmed.replace(',', "");
        if let Ok(n) = stripped.parse::<f64>() {
            return Value::Number(n);
        }
    }
    Value::text(text)
}

/// A numeric candidate is digits with optional sign, decimal point and
/// thousands commas. Keeps words the float parser would accept ("inf",
/// "NaN") textual.
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
}

/// One school's flattened record.
#[derive(Debug, Clone)]
pub struct SchoolRecord {
    id: u32,
    fields: BTreeMap<String, Value>,
}

impl SchoolRecord {
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields.get(label)
    }
}

/// Merge the pairs of all pages into one record.
///
/// Duplicate labels with equal values collapse to the first instance;
/// unequal values are a conflict. Comparison happens before numeric
/// coercion, on the values as extracted.
pub fn merge_pairs(school_id: u32, pairs: Vec<(String, Value)>) -> Result<SchoolRecord> {
    let mut fields: BTreeMap<String, Value> = BTreeMap::new();
    for (label, value) in pairs {
        match fields.get(&label) {
            None => {
                fields.insert(label, value);
            }
            Some(existing) => {
                if *existing != value {
                    return Err(Error::LabelConflict {
                        school: school_id,
                        label,
                        first: existing.to_string(),
                        second: value.to_string(),
                    });
                }
            }
        }
    }
    let fields = fields
        .into_iter()
        .map(|(label, value)| {
            let value = match value {
                Value::Text(s) => coerce(&s),
                other => other,
            };
            (label, value)
        })
        .collect();
    Ok(SchoolRecord {
        id: school_id,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_parses_plain_and_grouped_numbers() {
        assert_eq!(coerce("1200"), Value::Number(1200.0));
        assert_eq!(coerce("3.75"), Value::Number(3.75));
        assert_eq!(coerce("23,456"), Value::Number(23456.0));
    }

    #[test]
    fn coerce_leaves_non_numbers_textual() {
        assert_eq!(coerce("86%"), Value::text("86%"));
        assert_eq!(coerce("$20,000"), Value::text("$20,000"));
        assert_eq!(coerce("3.50 - 3.74"), Value::text("3.50 - 3.74"));
        assert_eq!(coerce("NaN"), Value::text("NaN"));
        assert_eq!(coerce("inf"), Value::text("inf"));
    }

    #[test]
    fn merge_keeps_first_of_equal_duplicates() {
        let record = merge_pairs(
            59,
            vec![
                ("GPA, Average".to_string(), Value::text("3.6")),
                ("GPA, Average".to_string(), Value::text("3.6")),
            ],
        )
        .unwrap();
        assert_eq!(record.get("GPA, Average"), Some(&Value::Number(3.6)));
        assert_eq!(record.fields().len(), 1);
    }

    #[test]
    fn merge_rejects_conflicting_duplicates() {
        let err = merge_pairs(
            59,
            vec![
                ("X".to_string(), Value::text("A")),
                ("X".to_string(), Value::text("B")),
            ],
        )
        .unwrap_err();
        match err {
            Error::LabelConflict {
                school,
                label,
                first,
                second,
            } => {
                assert_eq!(school, 59);
                assert_eq!(label, "X");
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn merged_record_coerces_text_fields() {
        let record = merge_pairs(
            1,
            vec![
                ("Students Enrolled".to_string(), Value::text("2,847")),
                ("City".to_string(), Value::text("Springfield")),
                (
                    "Sports".to_string(),
                    Value::List(vec!["Soccer".to_string(), "Tennis".to_string()]),
                ),
            ],
        )
        .unwrap();
        assert_eq!(record.get("Students Enrolled"), Some(&Value::Number(2847.0)));
        assert_eq!(record.get("City"), Some(&Value::text("Springfield")));
        assert_eq!(
            record.get("Sports").unwrap().to_string(),
            "Soccer---Tennis"
        );
    }

    #[test]
    fn record_fields_iterate_in_label_order() {
        let record = merge_pairs(
            1,
            vec![
                ("Zebra".to_string(), Value::text("z")),
                ("Alpha".to_string(), Value::text("a")),
            ],
        )
        .unwrap();
        let labels: Vec<&String> = record.fields().keys().collect();
        assert_eq!(labels, vec!["Alpha", "Zebra"]);
    }
}
