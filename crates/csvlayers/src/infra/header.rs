//! Reading the header row of delimited text files.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, Trim};

use crate::domain::model::Delimiter;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Column names from the first record of `path`. An empty file yields no
/// columns.
pub fn read_header(path: &Path, delimiter: Delimiter) -> io::Result<Vec<String>> {
    let mut reader = open_reader(path, delimiter)?;
    let mut record = ByteRecord::new();
    if !reader.read_byte_record(&mut record).map_err(io::Error::from)? {
        return Ok(Vec::new());
    }
    Ok(header_columns(&record))
}

/// Record reader over `path`. Records may differ in length, fields are
/// trimmed and quoted fields may span lines. Opening errors keep their
/// `io::ErrorKind`.
pub(crate) fn open_reader(path: &Path, delimiter: Delimiter) -> io::Result<csv::Reader<File>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

/// Column names of a header record, without a leading byte order mark.
pub(crate) fn header_columns(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let field = match index {
                0 => field.strip_prefix(UTF8_BOM).unwrap_or(field),
                _ => field,
            };
            String::from_utf8_lossy(field).trim().to_owned()
        })
        .collect()
}
