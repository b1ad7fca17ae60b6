//! Filesystem-backed validation of delimited point layers.

use std::fs::File;
use std::io;

use csv::ByteRecord;

use crate::domain::errors::LayerIssue;
use crate::domain::model::LeafNode;
use crate::domain::ports::LayerValidator;
use crate::infra::config::Config;
use crate::infra::header::{header_columns, open_reader};

/// Accepts a file when its header carries both coordinate columns and, in
/// strict mode, every data row holds numeric values in them.
#[derive(Debug, Clone)]
pub struct DelimitedTextValidator {
    strict: bool,
}

impl Default for DelimitedTextValidator {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl DelimitedTextValidator {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.layer.strict_coordinates)
    }
}

impl LayerValidator for DelimitedTextValidator {
    fn validate(&self, leaf: &LeafNode) -> Result<(), LayerIssue> {
        let mut reader = open_reader(&leaf.source, leaf.delimiter)?;
        let mut record = ByteRecord::new();

        if !read_record(&mut reader, &mut record)? {
            return Err(LayerIssue::MissingHeader);
        }
        let columns = header_columns(&record);

        let column = |name: &str| {
            columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| LayerIssue::MissingField(name.to_owned()))
        };
        let x_index = column(leaf.fields.x.as_str())?;
        let y_index = column(leaf.fields.y.as_str())?;

        if !self.strict {
            return Ok(());
        }

        let mut offset = 0;
        while read_record(&mut reader, &mut record)? {
            offset += 1;
            if record.iter().all(<[u8]>::is_empty) {
                continue;
            }
            // Line the record starts on; the header is line 1.
            let row = record
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or(offset + 1);
            for (index, field) in [(x_index, &leaf.fields.x), (y_index, &leaf.fields.y)] {
                let value = String::from_utf8_lossy(record.get(index).unwrap_or_default());
                if value.parse::<f64>().map(f64::is_finite) != Ok(true) {
                    return Err(LayerIssue::MalformedCoordinate {
                        row,
                        field: field.clone(),
                        value: value.into_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn read_record(
    reader: &mut csv::Reader<File>,
    record: &mut ByteRecord,
) -> Result<bool, LayerIssue> {
    reader
        .read_byte_record(record)
        .map_err(|err| LayerIssue::Unreadable(io::Error::from(err)))
}
