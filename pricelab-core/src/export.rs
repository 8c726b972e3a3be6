//! Delimiter-separated export of a price table.
//!
//! The default layout is the continental spreadsheet convention: `;` between
//! fields and `,` as the decimal mark. Missing cells are written empty.

use crate::data::table::PriceTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("field delimiter and decimal mark are both '{0}'")]
    AmbiguousSeparators(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub decimal_comma: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal_comma: true,
        }
    }
}

impl ExportOptions {
    fn decimal_mark(&self) -> u8 {
        if self.decimal_comma {
            b','
        } else {
            b'.'
        }
    }
}

fn format_value(value: Option<f64>, options: &ExportOptions) -> String {
    match value {
        Some(v) if options.decimal_comma => v.to_string().replace('.', ","),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Write `table` with a `Date` column followed by one column per symbol.
pub fn write_table<W: Write>(
    table: &PriceTable,
    writer: W,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    if options.delimiter == options.decimal_mark() {
        return Err(ExportError::AmbiguousSeparators(char::from(options.delimiter)));
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    let mut header = vec!["Date"];
    header.extend(table.symbols());
    wtr.write_record(&header)?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        for column in table.columns() {
            record.push(format_value(column.values[row], options));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render the export as a string.
pub fn export_table(table: &PriceTable, options: &ExportOptions) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_table(table, &mut buf, options)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the export to `path`, replacing any existing file.
pub fn export_to_path(
    table: &PriceTable,
    path: &Path,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_table(table, file, options)
}
