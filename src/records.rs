// 📄 CSV Records - raw rows for the three input tables
//
// Cells stay as strings here; the registry, catalog and resolver decide what
// a bad value means. Only CSV structure errors are raised at this layer.

use crate::error::SlcspError;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Deserialize;
use std::path::Path;
use tempfile::NamedTempFile;

// ============================================================================
// ZIP TABLE
// ============================================================================

/// One row of zips.csv: zipcode,state,county_code,name,rate_area
#[derive(Debug, Clone, Deserialize)]
pub struct ZipRecord {
    pub zipcode: String,
    pub state: String,
    #[serde(default)]
    pub county_code: String,
    #[serde(default)]
    pub name: String,
    pub rate_area: String,
}

pub fn load_zip_records(path: &Path) -> Result<Vec<ZipRecord>> {
    load_records(path)
}

// ============================================================================
// PLAN CATALOG
// ============================================================================

/// One row of plans.csv: plan_id,state,metal_level,rate,rate_area
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRecord {
    pub plan_id: String,
    pub state: String,
    pub metal_level: String,
    pub rate: String,
    pub rate_area: String,
}

pub fn load_plan_records(path: &Path) -> Result<Vec<PlanRecord>> {
    load_records(path)
}

fn load_records<T>(path: &Path) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut records = Vec::new();
    for (line_num, result) in reader.deserialize().enumerate() {
        let record: T = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
        })?;
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// TARGET TABLE (slcsp.csv)
// ============================================================================

/// The target table as read, kept verbatim so it can be rewritten with the
/// same header order and column set.
#[derive(Debug, Clone)]
pub struct TargetTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    zipcode_col: usize,
    rate_col: usize,
}

impl TargetTable {
    pub fn from_parts(headers: StringRecord, rows: Vec<StringRecord>) -> Result<Self, SlcspError> {
        let zipcode_col = column_index(&headers, "zipcode")?;
        let rate_col = column_index(&headers, "rate")?;

        Ok(TargetTable {
            headers,
            rows,
            zipcode_col,
            rate_col,
        })
    }

    /// Raw zipcode cells in row order
    pub fn zipcodes(&self) -> impl Iterator<Item = &str> {
        let col = self.zipcode_col;
        self.rows.iter().map(move |row| row.get(col).unwrap_or("").trim())
    }

    /// Copy of this table with the rate cell replaced row by row; every
    /// other cell, zipcode included, is kept exactly as read
    pub fn with_rates<I>(&self, rates: I) -> Vec<StringRecord>
    where
        I: IntoIterator<Item = String>,
    {
        self.rows
            .iter()
            .zip(rates)
            .map(|(row, rate)| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| if i == self.rate_col { rate.as_str() } else { cell })
                    .collect::<StringRecord>()
            })
            .collect()
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, SlcspError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SlcspError::MissingColumn(name.to_string()))
}

pub fn read_target_table(path: &Path) -> Result<TargetTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
        })?;
        rows.push(pad_to(record, headers.len()));
    }

    let table = TargetTable::from_parts(headers, rows)
        .with_context(|| format!("Unexpected header in {}", path.display()))?;
    Ok(table)
}

/// Short rows (e.g. "64148," written as "64148") get empty trailing cells
fn pad_to(record: StringRecord, width: usize) -> StringRecord {
    if record.len() >= width {
        return record;
    }
    let mut padded = record;
    while padded.len() < width {
        padded.push_field("");
    }
    padded
}

/// Write to a temp file beside `path`, then rename it over `path`.
/// A failure at any point leaves the existing file as it was.
pub fn write_target_table(path: &Path, headers: &StringRecord, rows: &[StringRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(&mut tmp);
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
