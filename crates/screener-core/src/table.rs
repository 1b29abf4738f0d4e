//! Reading and writing the indicator and error tables exchanged between the
//! collector and the optimizer.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::{CollectionFailure, ScreenerError, TickerRecord};

pub const INDICATOR_DELIMITER: u8 = b';';
pub const ERROR_DELIMITER: u8 = b',';

pub fn write_records<W: Write>(writer: W, records: &[TickerRecord]) -> Result<(), ScreenerError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(INDICATOR_DELIMITER)
        .from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<TickerRecord>, ScreenerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(INDICATOR_DELIMITER)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: TickerRecord = result?;
        if record.ticker.is_empty() {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

pub fn write_failures<W: Write>(writer: W, failures: &[CollectionFailure]) -> Result<(), ScreenerError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(ERROR_DELIMITER)
        .from_writer(writer);
    for failure in failures {
        wtr.serialize(failure)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_records(path: &Path, records: &[TickerRecord]) -> Result<(), ScreenerError> {
    write_records(File::create(path)?, records)
}

pub fn load_records(path: &Path) -> Result<Vec<TickerRecord>, ScreenerError> {
    read_records(File::open(path)?)
}

pub fn save_failures(path: &Path, failures: &[CollectionFailure]) -> Result<(), ScreenerError> {
    write_failures(File::create(path)?, failures)
}
