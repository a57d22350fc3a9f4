//! Header-plus-rows delimited text member file.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    member::MemberRecord,
    types::{FIELD_NAMES, MemberId},
};

use super::{PersistError, PersistResult, RecordSink, RecordSource};

const COLUMNS: usize = FIELD_NAMES.len();

/// Member file where each line is `id<d>first<d>last<d>email`.
///
/// The first line names the columns and is skipped on read. Writes go to a
/// sibling temporary file which then replaces the target.
#[derive(Debug, Clone)]
pub struct DelimitedFile {
    path: PathBuf,
    delimiter: char,
}

impl DelimitedFile {
    /// Member file at `path` split on `delimiter`.
    pub fn new(path: impl AsRef<Path>, delimiter: char) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter,
        }
    }

    /// Parses members from any line reader.
    pub fn read_from(&self, reader: impl BufRead) -> PersistResult<Vec<MemberRecord>> {
        let mut out = Vec::new();
        for (idx, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            out.push(parse_row(line, self.delimiter, idx + 1)?);
        }
        Ok(out)
    }

    /// Writes the header and one row per record.
    pub fn write_to(&self, mut writer: impl Write, records: &[MemberRecord]) -> PersistResult<()> {
        let header = FIELD_NAMES.join(self.delimiter.to_string().as_str());
        writeln!(writer, "{header}")?;
        for rec in records {
            writeln!(writer, "{}", encode_row(rec, self.delimiter)?)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordSource for DelimitedFile {
    fn load_records(&mut self) -> PersistResult<Vec<MemberRecord>> {
        let file = File::open(&self.path)?;
        let records = self.read_from(BufReader::new(file))?;
        debug!(path = ?self.path, rows = records.len(), "read member file");
        Ok(records)
    }
}

impl RecordSink for DelimitedFile {
    fn write_records(&mut self, records: &[MemberRecord]) -> PersistResult<usize> {
        // Encode everything up front so a bad field leaves the target untouched.
        for rec in records {
            encode_row(rec, self.delimiter)?;
        }

        let tmp = self.temp_path();
        let written = File::create(&tmp)
            .map_err(PersistError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                self.write_to(&mut writer, records)?;
                writer.get_ref().sync_all()?;
                Ok(())
            })
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(PersistError::from));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        debug!(path = ?self.path, rows = records.len(), "rewrote member file");
        Ok(records.len())
    }
}

fn parse_row(line: &str, delimiter: char, line_no: usize) -> PersistResult<MemberRecord> {
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() != COLUMNS {
        return Err(PersistError::MalformedRow {
            line: line_no,
            expected: COLUMNS,
            found: fields.len(),
        });
    }

    let raw_id = fields[0].trim();
    let id = raw_id
        .parse::<MemberId>()
        .map_err(|_| PersistError::InvalidIdentifier {
            line: line_no,
            value: raw_id.to_string(),
        })?;

    Ok(MemberRecord {
        id,
        first_name: fields[1].to_string(),
        last_name: fields[2].to_string(),
        email: fields[3].to_string(),
    })
}

fn encode_row(rec: &MemberRecord, delimiter: char) -> PersistResult<String> {
    let fields = [
        rec.first_name.as_str(),
        rec.last_name.as_str(),
        rec.email.as_str(),
    ];
    if let Some(bad) = fields
        .iter()
        .find(|f| f.contains(delimiter) || f.contains(['\n', '\r']))
    {
        return Err(PersistError::FieldNotEncodable {
            field: bad.to_string(),
        });
    }
    let d = delimiter;
    Ok(format!("{}{d}{}{d}{}{d}{}", rec.id, fields[0], fields[1], fields[2]))
}
