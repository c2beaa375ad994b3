use term_input::KeyCode;

/// One accepted keypress. Never modified after it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEventRecord {
    pub timestamp_ms: i64,
    pub key: KeyCode,
}

/// Append-only record of keypresses in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingLog {
    records: Vec<KeyEventRecord>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: KeyEventRecord) {
        debug_assert!(
            self.records
                .last()
                .map_or(true, |last| last.timestamp_ms <= record.timestamp_ms),
            "timestamps must be non-decreasing"
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[KeyEventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyEventRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordingLog {
    type Item = &'a KeyEventRecord;
    type IntoIter = std::slice::Iter<'a, KeyEventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
