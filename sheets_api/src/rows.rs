//! Row normalizer: header-keyed records from delimited text.
//!
//! Grammar accepted by [`parse_rows`]:
//! - the first non-empty line is the header and is required;
//! - completely empty lines are skipped;
//! - rows shorter than the header are padded with empty strings, cells past
//!   the last header column are dropped;
//! - repeated header names get `_1`, `_2`, ... suffixes;
//! - header and cell text is kept verbatim (no trimming, no coercion).

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::Error;

/// One row of a sheet: column name to cell text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the cell for `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the cell for `column` when it exists and is non-empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A record is valid when at least one of its cells is non-empty.
    pub fn is_valid(&self) -> bool {
        self.fields.iter().any(|(_, v)| !v.is_empty())
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parses CSV text into records using the first row as the schema.
pub fn parse_rows(text: &str) -> Result<Vec<Record>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(row) => row.map_err(|e| Error::Parse(e.to_string()))?,
        None => return Err(Error::Parse("missing header row".to_string())),
    };
    let columns = dedupe_columns(header.iter());

    let mut out = Vec::new();
    for (line, row) in records.enumerate() {
        let row = row.map_err(|e| Error::Parse(e.to_string()))?;
        if row.len() > columns.len() {
            tracing::debug!(
                "Row {} has {} cells for {} columns, dropping extras",
                line + 2,
                row.len(),
                columns.len()
            );
        }
        let record = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), row.get(i).unwrap_or("").to_string()))
            .collect::<Record>();
        out.push(record);
    }

    Ok(out)
}

fn dedupe_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut n = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        columns.push(candidate);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_becomes_schema() {
        let rows = parse_rows("Name,Year\nAda,1843\nGrace,1952\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Ada"));
        assert_eq!(rows[1].get("Year"), Some("1952"));
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["Name", "Year"]);
    }

    #[test]
    fn blank_lines_skipped() {
        let rows = parse_rows("A,B\n\n1,2\n\n\n3,4\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn delimiter_only_line_kept_as_invalid_record() {
        let rows = parse_rows("A,B\n,\n1,2\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_valid());
        assert!(rows[1].is_valid());
    }

    #[test]
    fn short_rows_padded() {
        let rows = parse_rows("A,B,C\n1\n").unwrap();
        assert_eq!(rows[0].get("A"), Some("1"));
        assert_eq!(rows[0].get("B"), Some(""));
        assert_eq!(rows[0].get("C"), Some(""));
    }

    #[test]
    fn long_rows_truncated() {
        let rows = parse_rows("A,B\n1,2,3,4\n").unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("B"), Some("2"));
    }

    #[test]
    fn cell_text_kept_verbatim() {
        let rows = parse_rows("Title ,Link\n  padded  ,https://x.org\n").unwrap();
        assert_eq!(rows[0].get("Title "), Some("  padded  "));
    }

    #[test]
    fn quoted_cells_with_commas_and_newlines() {
        let rows = parse_rows("Title,Authors\n\"On Things, Vol 2\",\"A\nB\"\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Title"), Some("On Things, Vol 2"));
        assert_eq!(rows[0].get("Authors"), Some("A\nB"));
    }

    #[test]
    fn duplicate_headers_suffixed() {
        let rows = parse_rows("Link,Link,Link\na,b,c\n").unwrap();
        let cols: Vec<_> = rows[0].columns().collect();
        assert_eq!(cols, vec!["Link", "Link_1", "Link_2"]);
    }

    #[test]
    fn empty_input_is_parse_error() {
        assert!(matches!(parse_rows(""), Err(Error::Parse(_))));
    }

    #[test]
    fn header_only_yields_no_records() {
        let rows = parse_rows("A,B\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn record_serializes_in_column_order() {
        let record = Record::from_pairs([("z", "1"), ("a", "2")]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }

    #[test]
    fn non_empty_filters_blank_cells() {
        let record = Record::from_pairs([("a", ""), ("b", "x")]);
        assert_eq!(record.non_empty("a"), None);
        assert_eq!(record.non_empty("b"), Some("x"));
        assert_eq!(record.non_empty("missing"), None);
    }
}
