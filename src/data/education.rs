//! FIPS index: fips → education record, built once after the fetch.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{EducationRecord, Fips};
use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct FipsIndex {
    records: HashMap<Fips, EducationRecord>,
    overwritten: usize,
}

impl FipsIndex {
    /// Insert every record in order. A repeated fips replaces the earlier record.
    pub fn build(records: impl IntoIterator<Item = EducationRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            let fips = record.fips;
            if index.records.insert(fips, record).is_some() {
                debug!(fips, "duplicate fips in education data; keeping the later record");
                index.overwritten += 1;
            }
        }
        index
    }

    pub fn get(&self, fips: Fips) -> Option<&EducationRecord> {
        self.records.get(&fips)
    }

    /// Like `get`, but a miss is a `MissingJoinKey` error.
    pub fn lookup(&self, fips: Fips) -> Result<&EducationRecord, AppError> {
        self.get(fips).ok_or_else(|| AppError::missing_join_key(fips))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of input records that replaced an earlier record with the same fips.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }
}
