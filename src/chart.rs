//! Lane mapping and chart export.

use std::fs::Permissions;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use term_input::KeyCode;
use thiserror::Error;

use crate::session::RecordingLog;

/// Lane keys, indexed by lane.
const LANE_KEYS: [KeyCode; 5] = [KeyCode::D, KeyCode::F, KeyCode::SPACE, KeyCode::J, KeyCode::K];

/// Fixed D/F/Space/J/K to lanes 0-4 mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaneMap;

impl LaneMap {
    pub fn lane_for(key: KeyCode) -> Option<u8> {
        LANE_KEYS
            .iter()
            .position(|&lane_key| lane_key == key)
            .map(|lane| lane as u8)
    }

    pub fn keys() -> &'static [KeyCode; 5] {
        &LANE_KEYS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartNote {
    pub time: i64,
    pub lane: u8,
}

/// Projects the log through [`LaneMap`], keeping log order.
pub fn chart_notes(log: &RecordingLog) -> Vec<ChartNote> {
    log.iter()
        .filter_map(|record| {
            LaneMap::lane_for(record.key).map(|lane| ChartNote {
                time: record.timestamp_ms,
                lane,
            })
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to serialize chart: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write chart to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct ChartWriter {
    path: PathBuf,
}

impl ChartWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the chart and returns the number of notes in it.
    ///
    /// The JSON goes to a temp file next to the target which is then
    /// renamed over it, so the target holds either the whole chart or
    /// whatever it held before.
    pub fn write(&self, log: &RecordingLog) -> Result<usize, ChartError> {
        let notes = chart_notes(log);
        let json = serde_json::to_vec(&notes)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source| ChartError::Write {
            path: self.path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file()
            .set_permissions(Permissions::from_mode(0o644))
            .map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(notes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::KeyEventRecord;

    fn log_of(entries: &[(i64, KeyCode)]) -> RecordingLog {
        let mut log = RecordingLog::new();
        for &(timestamp_ms, key) in entries {
            log.push(KeyEventRecord { timestamp_ms, key });
        }
        log
    }

    #[test]
    fn lane_map_is_total_and_injective() {
        assert_eq!(LaneMap::lane_for(KeyCode::D), Some(0));
        assert_eq!(LaneMap::lane_for(KeyCode::F), Some(1));
        assert_eq!(LaneMap::lane_for(KeyCode::SPACE), Some(2));
        assert_eq!(LaneMap::lane_for(KeyCode::J), Some(3));
        assert_eq!(LaneMap::lane_for(KeyCode::K), Some(4));

        let mut lanes: Vec<u8> = LaneMap::keys()
            .iter()
            .filter_map(|&key| LaneMap::lane_for(key))
            .collect();
        lanes.sort_unstable();
        assert_eq!(lanes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn other_keys_have_no_lane() {
        assert_eq!(LaneMap::lane_for(KeyCode::from_byte(b'a')), None);
        assert_eq!(LaneMap::lane_for(KeyCode::ESCAPE_SEQUENCE), None);
        assert_eq!(LaneMap::lane_for(KeyCode(0x03)), None);
    }

    #[test]
    fn unmapped_keys_are_skipped_in_order() {
        let log = log_of(&[
            (100, KeyCode::K),
            (1200, KeyCode::from_byte(b'x')),
            (1300, KeyCode::SPACE),
        ]);
        assert_eq!(
            chart_notes(&log),
            vec![
                ChartNote { time: 100, lane: 4 },
                ChartNote { time: 1300, lane: 2 },
            ]
        );
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn write_produces_compact_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let log = log_of(&[(1000, KeyCode::D), (2500, KeyCode::J)]);

        let count = ChartWriter::new(&path).write(&log).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"[{"time":1000,"lane":0},{"time":2500,"lane":3}]"#
        );
    }

    #[test]
    fn empty_log_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");

        let count = ChartWriter::new(&path).write(&RecordingLog::new()).unwrap();

        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        std::fs::write(&path, "old contents that are longer than the new chart").unwrap();

        ChartWriter::new(&path)
            .write(&log_of(&[(5, KeyCode::F)]))
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"[{"time":5,"lane":1}]"#
        );
    }

    #[test]
    fn unwritable_path_is_error_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("chart.json");

        let err = ChartWriter::new(&path)
            .write(&log_of(&[(5, KeyCode::F)]))
            .unwrap_err();

        assert!(matches!(err, ChartError::Write { .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
