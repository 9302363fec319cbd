use std::error::Error;
use std::io::Write;
use std::path::Path;

use super::{balance_rows, process_row};
use crate::{
    config::AuthConfig,
    csv_utils::{read_csv, write_csv},
    dto::LedgerRow,
    Ledger,
};

/// Replays the ledger operations in the given input file and writes the
/// resulting balances to the provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing ledger operations
/// * `writer` - Where to write the user balances (e.g. stdout)
/// * `config` - Password hashing and token settings for the ledger
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(input_path: P, writer: W, config: &AuthConfig) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut ledger = Ledger::new(config);

    let rows_iter = read_csv::<LedgerRow, _>(input_path)?;
    for (index, row) in rows_iter.enumerate() {
        // CSV parsing errors are critical - propagate them
        let row = row?;
        // Header is line 1
        process_row(&mut ledger, index as u64 + 2, row);
    }

    write_csv(writer, balance_rows(&ledger)?.into_iter())?;
    Ok(())
}
