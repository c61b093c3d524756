//! Result normalization.
//!
//! Converts a raw `QueryResult` into a canonical, hashable form so that two
//! semantically equal results always compare equal, regardless of value
//! representation drift (trailing zeros, float formatting) and, when the
//! exercise allows it, row order.

use crate::db::{QueryResult, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of decimal places floats are rounded to before hashing.
const FLOAT_PRECISION: usize = 9;

/// Separator between cells within one canonical row.
const UNIT_SEP: char = '\x1f';

/// Separator between rows in the canonical byte stream.
const RECORD_SEP: char = '\x1e';

/// Length of the stored digest, in hex characters.
const DIGEST_LEN: usize = 16;

/// Per-exercise rule declaring whether row order is significant.
///
/// This is always an explicit, declared policy; the checker never infers it
/// from the candidate query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPolicy {
    /// Rows are sorted by their canonical tuple before hashing.
    #[default]
    OrderInsensitive,
    /// Row order as returned by the query is part of the canonical form.
    OrderSensitive,
}

/// Canonical form of a query result, suitable for equality comparison.
///
/// Only structure (column names, row count) and a digest of the values are
/// kept, so a stored `NormalizedResult` never reveals expected cell values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Column names, in select-list order.
    pub columns: Vec<String>,

    /// Number of rows.
    pub row_count: usize,

    /// Truncated SHA-256 digest of the canonical byte stream.
    pub digest: String,
}

/// Normalizes a query result under the given comparison policy.
///
/// An empty result set is valid and normalizes to a well-defined form whose
/// canonical stream contains only the column header.
pub fn normalize(result: &QueryResult, policy: ComparisonPolicy) -> NormalizedResult {
    let columns = result.column_names();

    let mut encoded_rows: Vec<String> = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(canonical_cell)
                .collect::<Vec<_>>()
                .join(&UNIT_SEP.to_string())
        })
        .collect();

    if policy == ComparisonPolicy::OrderInsensitive {
        encoded_rows.sort_unstable();
    }

    let mut stream = columns
        .iter()
        .map(|name| escape_text(name))
        .collect::<Vec<_>>()
        .join(&UNIT_SEP.to_string());
    for row in &encoded_rows {
        stream.push(RECORD_SEP);
        stream.push_str(row);
    }

    let mut hasher = Sha256::new();
    hasher.update(stream.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_LEN);

    NormalizedResult {
        columns,
        row_count: result.rows.len(),
        digest,
    }
}

/// Encodes one cell as type-tagged canonical text.
///
/// The tag keeps differently-typed values distinct even when they render the
/// same (integer 1, float 1.0, string "1", boolean true), and keeps NULL
/// distinct from any string value.
fn canonical_cell(value: &Value) -> String {
    match value {
        Value::Null => "n".to_string(),
        Value::Bool(b) => format!("b:{b}"),
        Value::Int(i) => format!("i:{i}"),
        Value::Float(f) => format!("f:{}", canonical_float(*f)),
        Value::Text(s) => format!("s:{}", escape_text(s)),
        Value::Bytes(b) => format!("x:{}", hex::encode(b)),
    }
}

/// Escapes the frame separators (and the escape character itself) inside
/// text cells, so a value containing `\x1f` or `\x1e` cannot shift cell or
/// row boundaries in the canonical stream.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            UNIT_SEP => out.push_str("\\u"),
            RECORD_SEP => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a float at fixed precision with trailing zeros trimmed, so that
/// representation drift (2.5 vs 2.50, 3.0 vs 3) hashes identically.
fn canonical_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let fixed = format!("{:.*}", FLOAT_PRECISION, f);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');

    // Negative zero rounds to "-0"; fold it into "0".
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, QueryResult};
    use pretty_assertions::assert_eq;

    fn departments() -> QueryResult {
        QueryResult::with_data(
            vec![
                ColumnInfo::new("department_id", "INTEGER"),
                ColumnInfo::new("department_name", "TEXT"),
            ],
            vec![
                vec![Value::Int(1), Value::from("Engineering")],
                vec![Value::Int(2), Value::from("Sales")],
                vec![Value::Int(3), Value::from("HR")],
            ],
        )
    }

    fn permuted_departments() -> QueryResult {
        QueryResult::with_data(
            vec![
                ColumnInfo::new("department_id", "INTEGER"),
                ColumnInfo::new("department_name", "TEXT"),
            ],
            vec![
                vec![Value::Int(3), Value::from("HR")],
                vec![Value::Int(1), Value::from("Engineering")],
                vec![Value::Int(2), Value::from("Sales")],
            ],
        )
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let result = departments();
        let a = normalize(&result, ComparisonPolicy::OrderSensitive);
        let b = normalize(&result, ComparisonPolicy::OrderSensitive);
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_insensitive_ignores_row_permutation() {
        let a = normalize(&departments(), ComparisonPolicy::OrderInsensitive);
        let b = normalize(&permuted_departments(), ComparisonPolicy::OrderInsensitive);
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn test_order_sensitive_detects_row_permutation() {
        let a = normalize(&departments(), ComparisonPolicy::OrderSensitive);
        let b = normalize(&permuted_departments(), ComparisonPolicy::OrderSensitive);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_value_difference_changes_digest() {
        let a = normalize(&departments(), ComparisonPolicy::OrderInsensitive);

        let mut changed = departments();
        changed.rows[1][1] = Value::from("Marketing");
        let b = normalize(&changed, ComparisonPolicy::OrderInsensitive);

        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_column_names_are_part_of_canonical_form() {
        let a = QueryResult::with_data(
            vec![ColumnInfo::new("id", "INTEGER")],
            vec![vec![Value::Int(1)]],
        );
        let b = QueryResult::with_data(
            vec![ColumnInfo::new("department_id", "INTEGER")],
            vec![vec![Value::Int(1)]],
        );

        let na = normalize(&a, ComparisonPolicy::OrderInsensitive);
        let nb = normalize(&b, ComparisonPolicy::OrderInsensitive);
        assert_ne!(na.digest, nb.digest);
    }

    #[test]
    fn test_float_representation_drift_hashes_identically() {
        assert_eq!(canonical_float(2.5), canonical_float(2.50));
        assert_eq!(canonical_float(3.0), "3");
        assert_eq!(canonical_float(-0.0), "0");
        assert_eq!(canonical_float(0.1 + 0.2), canonical_float(0.3));
    }

    #[test]
    fn test_type_changes_are_mismatches() {
        let variants = [
            Value::Int(1),
            Value::Float(1.0),
            Value::from("1"),
            Value::Bool(true),
        ];
        let cells: Vec<String> = variants.iter().map(canonical_cell).collect();

        for (i, a) in cells.iter().enumerate() {
            for b in cells.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_separator_characters_in_text_cannot_shift_cell_boundaries() {
        let columns = vec![ColumnInfo::new("a", "TEXT"), ColumnInfo::new("b", "TEXT")];

        // Without escaping these two rows would produce the same canonical
        // stream: "x\x1fs:y" | "z" versus "x" | "y\x1fs:z".
        let left = QueryResult::with_data(
            columns.clone(),
            vec![vec![Value::from("x\x1fs:y"), Value::from("z")]],
        );
        let right = QueryResult::with_data(
            columns,
            vec![vec![Value::from("x"), Value::from("y\x1fs:z")]],
        );

        let a = normalize(&left, ComparisonPolicy::OrderSensitive);
        let b = normalize(&right, ComparisonPolicy::OrderSensitive);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_record_separator_in_text_cannot_split_rows() {
        let columns = vec![ColumnInfo::new("a", "TEXT")];

        let one_row = QueryResult::with_data(
            columns.clone(),
            vec![vec![Value::from("x\x1es:y")]],
        );
        let two_rows = QueryResult::with_data(
            columns,
            vec![vec![Value::from("x")], vec![Value::from("y")]],
        );

        let a = normalize(&one_row, ComparisonPolicy::OrderSensitive);
        let b = normalize(&two_rows, ComparisonPolicy::OrderSensitive);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_escape_round_trips_are_distinct() {
        // The escape character itself must be escaped, or "\\u" in data
        // would collide with an escaped unit separator.
        assert_ne!(
            canonical_cell(&Value::from("\\u")),
            canonical_cell(&Value::from("\x1f"))
        );
        assert_ne!(
            canonical_cell(&Value::from("\\r")),
            canonical_cell(&Value::from("\x1e"))
        );
    }

    #[test]
    fn test_null_is_distinct_from_null_string() {
        assert_ne!(canonical_cell(&Value::Null), canonical_cell(&Value::from("NULL")));
        assert_ne!(canonical_cell(&Value::Null), canonical_cell(&Value::from("")));
    }

    #[test]
    fn test_empty_result_is_well_defined() {
        let empty = QueryResult::with_data(vec![ColumnInfo::new("id", "INTEGER")], vec![]);
        let n = normalize(&empty, ComparisonPolicy::OrderInsensitive);

        assert_eq!(n.row_count, 0);
        assert_eq!(n.digest.len(), 16);

        // Same shape, different column name: still a mismatch.
        let other = QueryResult::with_data(vec![ColumnInfo::new("name", "TEXT")], vec![]);
        let m = normalize(&other, ComparisonPolicy::OrderInsensitive);
        assert_ne!(n.digest, m.digest);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&ComparisonPolicy::OrderSensitive).unwrap();
        assert_eq!(json, "\"order_sensitive\"");
        let back: ComparisonPolicy = serde_json::from_str("\"order_insensitive\"").unwrap();
        assert_eq!(back, ComparisonPolicy::OrderInsensitive);
    }
}
