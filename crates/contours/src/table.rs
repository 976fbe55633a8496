//! The chant table: corpus rows loaded from CSV.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Columns every chant table must provide.
pub const REQUIRED_COLUMNS: &[&str] = &["id", "volpiano"];

/// One row of the chant corpus.
///
/// Every field except the id may be missing; filters that read a missing
/// field exclude the row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChantRecord {
    pub id: String,
    #[serde(default)]
    pub volpiano: Option<String>,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub incipit: Option<String>,
    #[serde(default)]
    pub full_text_manuscript: Option<String>,
    #[serde(default)]
    pub genre_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub cantus_id: Option<String>,
    #[serde(default)]
    pub siglum: Option<String>,
}

impl ChantRecord {
    pub fn new(id: impl Into<String>) -> Self {
        ChantRecord {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_volpiano(mut self, volpiano: impl Into<String>) -> Self {
        self.volpiano = Some(volpiano.into());
        self
    }

    /// The notation, treating an empty string as missing.
    pub fn notation(&self) -> Option<&str> {
        self.volpiano.as_deref().filter(|v| !v.is_empty())
    }
}

/// Ordered chant rows with unique ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChantTable {
    records: Vec<ChantRecord>,
}

impl ChantTable {
    /// Build a table, rejecting duplicate ids.
    pub fn new(records: Vec<ChantRecord>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(TableError::DuplicateId(record.id.clone()));
            }
        }
        Ok(ChantTable { records })
    }

    /// Load a table from a CSV file with a header row.
    pub fn from_csv_path(path: &Path, required: &[&str]) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file, required)
    }

    /// Load a table from CSV, checking that the required columns exist.
    pub fn from_reader<R: io::Read>(reader: R, required: &[&str]) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in required {
            if !headers.iter().any(|h| h == *column) {
                return Err(TableError::MissingColumn(column.to_string()));
            }
        }

        let records = reader
            .deserialize::<ChantRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ChantRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChantRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ChantRecord> {
        self.records.get(index)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    /// The rows at the given indices, in the given order.
    ///
    /// Out-of-range and repeated indices are ignored, so the result is
    /// always a subset of this table.
    pub fn select(&self, indices: &[usize]) -> ChantTable {
        let mut taken = vec![false; self.records.len()];
        let records = indices
            .iter()
            .filter_map(|&i| {
                let slot = taken.get_mut(i)?;
                if *slot {
                    return None;
                }
                *slot = true;
                Some(self.records[i].clone())
            })
            .collect();
        ChantTable { records }
    }
}

impl<'a> IntoIterator for &'a ChantTable {
    type Item = &'a ChantRecord;
    type IntoIter = std::slice::Iter<'a, ChantRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CSV: &str = "\
id,incipit,volpiano,mode,genre_id,extra
a1,Ave,1---fg---h,1,genre_a,x
a2,Alma,,2T,genre_r,y
";

    #[test]
    fn test_load_from_csv() {
        let table = ChantTable::from_reader(CSV.as_bytes(), REQUIRED_COLUMNS).unwrap();
        assert_eq!(table.len(), 2);

        let first = table.get(0).unwrap();
        assert_eq!(first.id, "a1");
        assert_eq!(first.notation(), Some("1---fg---h"));
        assert_eq!(first.mode.as_deref(), Some("1"));
        assert_eq!(first.full_text, None);

        // Empty cells load as missing
        assert_eq!(table.get(1).unwrap().volpiano, None);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = ChantTable::from_reader(CSV.as_bytes(), &["id", "cantus_id"]).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(c) if c == "cantus_id"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let csv = "id,volpiano\na,1---f\na,1---g\n";
        let err = ChantTable::from_reader(csv.as_bytes(), REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, TableError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_select_is_a_subset() {
        let table = ChantTable::new(vec![
            ChantRecord::new("a"),
            ChantRecord::new("b"),
            ChantRecord::new("c"),
        ])
        .unwrap();

        let subset = table.select(&[2, 0, 2, 7]);
        assert_eq!(subset.ids().collect::<Vec<_>>(), vec!["c", "a"]);
    }
}
