//! In-memory table read from a worksheet.
//!
//! Row 1 of the tab is the header; every later row is a record whose cells are
//! addressed by header name. Missing trailing cells read as empty strings.

use serde_json::{Map, Value};

/// A worksheet's contents split into header and data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One data row of a [`Table`], borrowed from it.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    values: &'a [String],
    row_number: usize,
}

impl Table {
    /// Builds a table from raw sheet values, row 1 first.
    ///
    /// Rows with no data at all are dropped but keep their sheet row numbers.
    #[must_use]
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let headers = iter.next().unwrap_or_default();
        Self {
            headers,
            rows: iter.collect(),
        }
    }

    /// Header row.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a header, 0-based.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// True when the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().count()
    }

    /// Iterates over the records in sheet order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, values)| values.iter().any(|v| !v.is_empty()))
            .map(|(i, values)| Record {
                headers: &self.headers,
                values,
                row_number: i + 2,
            })
    }

    /// First record whose `column` equals `value`.
    #[must_use]
    pub fn find(&self, column: &str, value: &str) -> Option<Record<'_>> {
        self.records().find(|r| r.get(column) == Some(value))
    }

    /// All values of one column, in record order.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<&str> {
        self.records().filter_map(|r| r.get(name)).collect()
    }
}

impl<'a> Record<'a> {
    /// Value under `column`; `None` when the table has no such header.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        Some(self.values.get(index).map_or("", String::as_str))
    }

    /// Value under `column`, empty when absent.
    #[must_use]
    pub fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().trim().to_string()
    }

    /// 1-based row number in the worksheet.
    #[must_use]
    pub const fn row_number(&self) -> usize {
        self.row_number
    }

    /// Value at a 0-based position, empty when absent.
    #[must_use]
    pub fn value_at(&self, index: usize) -> &'a str {
        self.values.get(index).map_or("", String::as_str)
    }

    /// Header/value pairs as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), Value::String(self.value_at(i).to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn values(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn test_records_skip_blank_rows_but_keep_row_numbers() {
        let table = Table::from_values(values(&[
            &["Code", "Name", "Year"],
            &["A12345", "Mona", "2"],
            &[],
            &["B67890", "Omar"],
        ]));

        assert_eq!(table.len(), 2);
        let rows: Vec<usize> = table.records().map(|r| r.row_number()).collect();
        assert_eq!(rows, vec![2, 4]);

        let omar = table.find("Code", "B67890").unwrap();
        assert_eq!(omar.get("Name"), Some("Omar"));
        // Missing trailing cell reads as empty, unknown header as None
        assert_eq!(omar.get("Year"), Some(""));
        assert_eq!(omar.get("Phone"), None);
    }

    #[test]
    fn test_empty_and_header_only_tables() {
        assert!(Table::from_values(Vec::new()).is_empty());

        let header_only = Table::from_values(values(&[&["Code", "Name"]]));
        assert!(header_only.is_empty());
        assert_eq!(header_only.headers(), ["Code", "Name"]);
        assert_eq!(header_only.column_index("Name"), Some(1));
    }

    #[test]
    fn test_column_and_json() {
        let table = Table::from_values(values(&[
            &["Code", "Name"],
            &["A1", "Mona"],
            &["A2", "Omar"],
        ]));
        assert_eq!(table.column("Code"), vec!["A1", "A2"]);

        let json = table.find("Code", "A2").unwrap().to_json();
        assert_eq!(json.get("Name"), Some(&Value::String("Omar".to_string())));
    }
}
