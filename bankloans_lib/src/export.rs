//! CSV export of the analysis table.
//!
//! The header row and cell text match what the table view shows, so a file
//! written here reads back into identical rows.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::analysis::BankResult;
use crate::error::LoanAnalysisError;

/// File name offered when the user does not choose one.
pub const DEFAULT_EXPORT_FILE: &str = "bank_analysis_results.csv";

/// Writes rows with a header line. An empty table still gets its header.
pub fn write_results_csv<W: Write>(results: &[BankResult], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADERS)?;
    for row in results {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads rows previously produced by [`write_results_csv`].
pub fn read_results_csv<R: Read>(reader: R) -> Result<Vec<BankResult>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

/// Writes the export file, replacing any previous one.
pub fn export_to_path(results: &[BankResult], path: &Path) -> Result<(), LoanAnalysisError> {
    let file = File::create(path)?;
    write_results_csv(results, file)?;
    tracing::info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(())
}

/// Export header, in column order.
pub const HEADERS: [&str; 7] = [
    "Bank Name",
    "City",
    "State",
    "County",
    "1-4 Family Residential Construction Loans (RCONF158)",
    "Other Construction and Land Development Loans (RCONF159)",
    "Total Construction Loans",
];
