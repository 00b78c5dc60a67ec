/// Counters reported by a driver write.
///
/// `matched_count` counts documents selected by the filter and
/// `modified_count` those whose content actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
    pub upserted: bool,
}

impl WriteResult {
    pub fn inserted(count: u64) -> Self {
        WriteResult {
            inserted_count: count,
            ..Default::default()
        }
    }

    pub fn updated(matched: u64, modified: u64) -> Self {
        WriteResult {
            matched_count: matched,
            modified_count: modified,
            ..Default::default()
        }
    }

    pub fn upserted() -> Self {
        WriteResult {
            inserted_count: 1,
            upserted: true,
            ..Default::default()
        }
    }

    pub fn deleted(count: u64) -> Self {
        WriteResult {
            deleted_count: count,
            ..Default::default()
        }
    }

    /// Adds the counters of another result to this one.
    pub fn merge(&mut self, other: WriteResult) {
        self.inserted_count += other.inserted_count;
        self.matched_count += other.matched_count;
        self.modified_count += other.modified_count;
        self.deleted_count += other.deleted_count;
        self.upserted |= other.upserted;
    }

    /// Returns `true` if the write touched at least one document.
    pub fn is_acknowledged_change(&self) -> bool {
        self.inserted_count + self.modified_count + self.deleted_count > 0
    }
}
