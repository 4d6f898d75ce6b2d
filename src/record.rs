//! Positional records and the merge engine.
//!
//! A [`Record`] carries one value for every entry of [`FIELDS`]; a
//! [`LiveRecord`] carries one value for every entry of [`LIVE_FIELDS`].
//! Records are folded left to right with each field's combinator, and a
//! live record is merged into a full one with [`Record::overlay_live`].

use std::ops::Index;

use crate::error::{JobinfoError, Result};
use crate::fields::{FieldDef, FieldId, Value, FIELDS, FIELD_COUNT, LIVE_COUNT, LIVE_FIELDS};

/// Column separator of `sacct -P` and `sstat -P` output.
pub const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: [Value; FIELD_COUNT],
}

impl Default for Record {
    fn default() -> Self {
        Self::from_columns(std::iter::empty())
    }
}

impl Record {
    /// Parse raw columns in registry order. Missing trailing columns get the
    /// field's empty value; surplus columns are ignored.
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = columns.into_iter();
        Self {
            values: std::array::from_fn(|i| FIELDS[i].parse.parse(columns.next().unwrap_or(""))),
        }
    }

    /// Parse one pipe-delimited accounting line.
    pub fn from_line(line: &str) -> Self {
        let columns = line.split(SEPARATOR).count();
        if columns != FIELD_COUNT {
            tracing::debug!(columns, expected = FIELD_COUNT, "Accounting line has unexpected width");
        }
        Self::from_columns(line.split(SEPARATOR))
    }

    pub fn get(&self, id: FieldId) -> &Value {
        &self.values[id as usize]
    }

    pub fn set(&mut self, id: FieldId, value: Value) {
        self.values[id as usize] = value;
    }

    /// Field definitions paired with this record's values, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldDef, &Value)> {
        FIELDS.iter().zip(self.values.iter())
    }

    /// Fold `other` into `self`, field by field.
    pub fn absorb(&mut self, other: Record) {
        for (i, incoming) in other.values.into_iter().enumerate() {
            let current = std::mem::take(&mut self.values[i]);
            self.values[i] = FIELDS[i].combine.apply(current, incoming);
        }
    }

    /// Merge a projection record into this one. Only the projected fields
    /// are touched.
    pub fn overlay_live(&mut self, live: LiveRecord) {
        for (id, incoming) in LIVE_FIELDS.into_iter().zip(live.values) {
            let current = std::mem::take(&mut self.values[id as usize]);
            self.values[id as usize] = id.def().combine.apply(current, incoming);
        }
    }

    /// Fold an ordered sequence of records into one. The first record is the
    /// starting point, so first-wins fields keep its values.
    pub fn merge(records: impl IntoIterator<Item = Record>) -> Result<Record> {
        let mut records = records.into_iter();
        let mut merged = records.next().ok_or(JobinfoError::EmptyMerge)?;
        for record in records {
            merged.absorb(record);
        }
        Ok(merged)
    }
}

impl Index<FieldId> for Record {
    type Output = Value;

    fn index(&self, id: FieldId) -> &Value {
        self.get(id)
    }
}

/// The subset of fields `sstat` reports for a running job.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRecord {
    values: [Value; LIVE_COUNT],
}

impl LiveRecord {
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = columns.into_iter();
        Self {
            values: std::array::from_fn(|i| {
                LIVE_FIELDS[i].def().parse.parse(columns.next().unwrap_or(""))
            }),
        }
    }

    pub fn from_line(line: &str) -> Self {
        Self::from_columns(line.split(SEPARATOR))
    }

    pub fn get(&self, id: FieldId) -> Option<&Value> {
        LIVE_FIELDS
            .iter()
            .position(|f| *f == id)
            .map(|i| &self.values[i])
    }

    pub fn absorb(&mut self, other: LiveRecord) {
        for (i, incoming) in other.values.into_iter().enumerate() {
            let current = std::mem::take(&mut self.values[i]);
            self.values[i] = LIVE_FIELDS[i].def().combine.apply(current, incoming);
        }
    }

    pub fn merge(records: impl IntoIterator<Item = LiveRecord>) -> Result<LiveRecord> {
        let mut records = records.into_iter();
        let mut merged = records.next().ok_or(JobinfoError::EmptyMerge)?;
        for record in records {
            merged.absorb(record);
        }
        Ok(merged)
    }
}
