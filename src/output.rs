// src/output.rs

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use crate::record::{header, Record};

/// Writes the fixed header followed by one row per record. Absent fields are empty.
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())?;
    for record in records {
        wtr.write_record(
            record
                .fields()
                .iter()
                .map(|f| f.as_deref().unwrap_or("")),
        )
        .with_context(|| format!("writing record {}", record.student_id()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `dir/<id>.csv`, replacing any previous file.
pub fn write_region(dir: &Path, id: &str, records: &[Record]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", id));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_records(file, records)?;
    Ok(path)
}

/// Reads a file produced by [`write_records`]. Empty fields come back as absent.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let found: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if found != header() {
        bail!("unexpected header {:?}", found);
    }

    let mut records = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("CSV parse error at record {}", idx))?;
        let fields = row
            .iter()
            .map(|f| if f.is_empty() { None } else { Some(f.to_string()) })
            .collect::<Vec<_>>();
        records.push(Record::try_from(fields).with_context(|| format!("record {}", idx))?);
    }
    Ok(records)
}
