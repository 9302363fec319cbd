use std::error::Error;
use std::io::Write;
use std::path::Path;

use super::{balance_rows, process_row};
use crate::{config::AuthConfig, csv_utils::write_csv, dto::LedgerRow, Ledger};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Replays the ledger operations async and writes the resulting balances to the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams rows from the input file, deserializes them and sends them to the processor via channel.
/// * Processor - owns the ledger, applies rows from the channel until it is closed.
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
pub async fn run<P, W>(input_path: P, writer: W, config: &AuthConfig) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing rows from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_rows(input_path, tx));
    let processor_handle = tokio::spawn(process_rows(rx, config.clone()));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    // Get final ledger state
    let ledger = processor_handle.await?;

    write_csv(writer, balance_rows(&ledger)?.into_iter())?;
    Ok(())
}

/// Reads and deserializes ledger rows from a CSV file.
/// Sends them, tagged with their line number, through the provided channel.
async fn read_rows(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<(u64, LedgerRow)>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<LedgerRow>();
    // Header is line 1
    let mut line = 1;
    while let Some(result) = records.next().await {
        line += 1;
        match result {
            Ok(row) => {
                if tx.send((line, row)).await.is_err() {
                    // Receiver dropped, exit gracefully
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Applies rows received through the channel.
/// Returns the final ledger once the channel is closed by the reader.
async fn process_rows(mut rx: mpsc::Receiver<(u64, LedgerRow)>, config: AuthConfig) -> Ledger {
    let mut ledger = Ledger::new(&config);
    while let Some((line, row)) = rx.recv().await {
        process_row(&mut ledger, line, row);
    }
    ledger
}
