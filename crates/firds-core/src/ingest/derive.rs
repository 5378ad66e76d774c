use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use super::records::InstrumentField;
use crate::error::{Error, Result};

/// Appends a letter-count column and a YES/NO presence column derived from
/// one source column of a table.
#[derive(Debug, Clone)]
pub struct ColumnDeriver {
    source_column: String,
    letter: char,
}

impl ColumnDeriver {
    pub fn new(source_column: impl Into<String>, letter: char) -> Self {
        Self {
            source_column: source_column.into(),
            letter,
        }
    }

    pub fn count_column(&self) -> String {
        format!("{}_count", self.letter)
    }

    pub fn flag_column(&self) -> String {
        format!("contains_{}", self.letter)
    }

    /// Case-sensitive occurrences of the letter; a missing value counts zero
    pub fn count(&self, value: Option<&str>) -> usize {
        value.map_or(0, |v| v.chars().filter(|c| *c == self.letter).count())
    }

    pub const fn flag(count: usize) -> &'static str {
        if count > 0 {
            "YES"
        } else {
            "NO"
        }
    }

    /// Rewrite `table` with the derived columns.
    ///
    /// Existing cells and row order are kept as read. If the derived columns
    /// are already present they are recomputed in place. The new table
    /// replaces the old one by rename, so a failure leaves the original file
    /// as it was.
    #[tracing::instrument(name = "derive", skip(self))]
    pub fn augment(&self, table: &Path) -> Result<()> {
        let dir = match table.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;

        let rows = {
            let file = fs::File::open(table)?;
            let mut reader = csv::Reader::from_reader(file);

            let mut headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
            let source_index = headers
                .iter()
                .position(|h| *h == self.source_column)
                .ok_or_else(|| Error::MissingColumn(self.source_column.clone()))?;
            let count_index = column_slot(&mut headers, &self.count_column());
            let flag_index = column_slot(&mut headers, &self.flag_column());

            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(&headers)?;

            let mut rows = 0usize;
            for result in reader.records() {
                let record = result?;
                let count = self.count(record.get(source_index));

                let mut row: Vec<String> = record.iter().map(String::from).collect();
                row.resize(headers.len(), String::new());
                row[count_index] = count.to_string();
                row[flag_index] = Self::flag(count).to_string();

                writer.write_record(&row)?;
                rows += 1;
            }
            writer.flush()?;
            rows
        };
        tracing::info!("'{}' column added successfully.", self.count_column());
        tracing::info!("'{}' column added successfully.", self.flag_column());

        tmp.persist(table).map_err(|e| e.error)?;
        tracing::info!(
            "Updated table with {} row(s) saved at: {}",
            rows,
            table.display()
        );
        Ok(())
    }
}

impl Default for ColumnDeriver {
    fn default() -> Self {
        Self::new(InstrumentField::FullName.column(), 'a')
    }
}

fn column_slot(headers: &mut Vec<String>, name: &str) -> usize {
    if let Some(index) = headers.iter().position(|h| h == name) {
        index
    } else {
        headers.push(name.to_string());
        headers.len() - 1
    }
}
