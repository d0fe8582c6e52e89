// src/record.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScrapeError;

/// Number of positional fields in every output record.
pub const COLUMN_COUNT: usize = 17;

/// One position of the output schema. Declaration order is the CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "SBD")]
    Sbd,
    #[serde(rename = "TOÁN")]
    Toan,
    #[serde(rename = "VĂN")]
    Van,
    #[serde(rename = "LÝ")]
    Ly,
    #[serde(rename = "HÓA")]
    Hoa,
    #[serde(rename = "SINH")]
    Sinh,
    #[serde(rename = "SỬ")]
    Su,
    #[serde(rename = "ĐỊA")]
    Dia,
    #[serde(rename = "GDCD")]
    Gdcd,
    #[serde(rename = "ANH")]
    Anh,
    #[serde(rename = "KHTN")]
    Khtn,
    #[serde(rename = "KHXH")]
    Khxh,
    #[serde(rename = "KHỐI A")]
    KhoiA,
    #[serde(rename = "KHỐI B")]
    KhoiB,
    #[serde(rename = "KHỐI C")]
    KhoiC,
    #[serde(rename = "KHỐI D")]
    KhoiD,
    #[serde(rename = "KHỐI A1")]
    KhoiA1,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Sbd,
        Column::Toan,
        Column::Van,
        Column::Ly,
        Column::Hoa,
        Column::Sinh,
        Column::Su,
        Column::Dia,
        Column::Gdcd,
        Column::Anh,
        Column::Khtn,
        Column::Khxh,
        Column::KhoiA,
        Column::KhoiB,
        Column::KhoiC,
        Column::KhoiD,
        Column::KhoiA1,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Sbd => "SBD",
            Column::Toan => "TOÁN",
            Column::Van => "VĂN",
            Column::Ly => "LÝ",
            Column::Hoa => "HÓA",
            Column::Sinh => "SINH",
            Column::Su => "SỬ",
            Column::Dia => "ĐỊA",
            Column::Gdcd => "GDCD",
            Column::Anh => "ANH",
            Column::Khtn => "KHTN",
            Column::Khxh => "KHXH",
            Column::KhoiA => "KHỐI A",
            Column::KhoiB => "KHỐI B",
            Column::KhoiC => "KHỐI C",
            Column::KhoiD => "KHỐI D",
            Column::KhoiA1 => "KHỐI A1",
        }
    }

    /// Position of this column in a record.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The fixed header row, in schema order.
pub fn header() -> [&'static str; COLUMN_COUNT] {
    Column::ALL.map(Column::header)
}

/// A normalized score row. Always holds exactly [`COLUMN_COUNT`] fields and a student id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: [Option<String>; COLUMN_COUNT],
}

impl Record {
    pub fn student_id(&self) -> &str {
        // guaranteed by construction
        self.fields[Column::Sbd.index()].as_deref().unwrap_or_default()
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields[column.index()].as_deref()
    }

    /// Overwrites a score field. The student id cannot be cleared.
    pub fn set(&mut self, column: Column, value: Option<String>) {
        if column == Column::Sbd && value.is_none() {
            return;
        }
        self.fields[column.index()] = value;
    }

    pub fn fields(&self) -> &[Option<String>; COLUMN_COUNT] {
        &self.fields
    }
}

impl TryFrom<Vec<Option<String>>> for Record {
    type Error = ScrapeError;

    fn try_from(values: Vec<Option<String>>) -> Result<Self, Self::Error> {
        let found = values.len();
        let fields: [Option<String>; COLUMN_COUNT] =
            values
                .try_into()
                .map_err(|v: Vec<Option<String>>| ScrapeError::SchemaMismatch {
                    student_id: v.first().cloned().flatten().unwrap_or_default(),
                    expected: COLUMN_COUNT,
                    found,
                })?;
        if fields[Column::Sbd.index()].is_none() {
            return Err(ScrapeError::MissingStudentId);
        }
        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(id: Option<&str>) -> Vec<Option<String>> {
        let mut v = vec![None; COLUMN_COUNT];
        v[0] = id.map(str::to_string);
        v
    }

    #[test]
    fn header_matches_schema_order() {
        let h = header();
        assert_eq!(h[0], "SBD");
        assert_eq!(h[9], "ANH");
        assert_eq!(h[16], "KHỐI A1");
        assert_eq!(Column::KhoiA.index(), 12);
    }

    #[test]
    fn column_deserializes_from_header_name() {
        let c: Column = serde_yaml::from_str("\"KHỐI D\"").unwrap();
        assert_eq!(c, Column::KhoiD);
        let c: Column = serde_yaml::from_str("TOÁN").unwrap();
        assert_eq!(c, Column::Toan);
    }

    #[test]
    fn record_requires_seventeen_fields() {
        let mut short = fields(Some("00012345"));
        short.pop();
        let err = Record::try_from(short).unwrap_err();
        assert_eq!(
            err,
            ScrapeError::SchemaMismatch {
                student_id: "00012345".into(),
                expected: 17,
                found: 16
            }
        );
    }

    #[test]
    fn record_requires_student_id() {
        assert_eq!(
            Record::try_from(fields(None)).unwrap_err(),
            ScrapeError::MissingStudentId
        );
    }

    #[test]
    fn set_cannot_clear_student_id() {
        let mut r = Record::try_from(fields(Some("123456"))).unwrap();
        r.set(Column::Sbd, None);
        r.set(Column::Toan, Some("8.5".into()));
        assert_eq!(r.student_id(), "123456");
        assert_eq!(r.get(Column::Toan), Some("8.5"));
        assert_eq!(r.get(Column::Van), None);
    }
}
