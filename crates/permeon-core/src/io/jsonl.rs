//! JSON Lines writer and reader for the per-frame stream.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::record::PerFrameRecord;
use crate::engine::error::EngineError;

/// Append-only writer of per-frame records, one JSON object per line.
pub struct JsonRecordWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonRecordWriter {
    pub fn create(path: &Path) -> Result<Self, EngineError> {
        let file = File::create(path).map_err(|e| EngineError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write_record(&mut self, record: &PerFrameRecord) -> Result<(), EngineError> {
        let line = serde_json::to_string(record)
            .map_err(|e| EngineError::Internal(format!("record serialization failed: {e}")))?;
        writeln!(self.writer, "{line}").map_err(|e| EngineError::Io {
            path: self.path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn finish(mut self) -> Result<(), EngineError> {
        self.writer.flush().map_err(|e| EngineError::Io {
            path: self.path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

/// Streaming reader over a per-frame stream file.
pub struct JsonRecordReader {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonRecordReader {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for JsonRecordReader {
    type Item = Result<PerFrameRecord, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => {
                return Some(Err(EngineError::Io {
                    path: self.path.to_string_lossy().to_string(),
                    source: e,
                }));
            }
        };
        self.line_no += 1;
        if line.trim().is_empty() {
            return self.next();
        }
        Some(
            serde_json::from_str(&line).map_err(|e| EngineError::MalformedRecord {
                line: self.line_no,
                message: e.to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn written_records_are_read_back_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stream.json");

        let mut writer = JsonRecordWriter::create(&path).unwrap();
        for i in 0..3 {
            writer
                .write_record(&PerFrameRecord::failure(i as f64))
                .unwrap();
        }
        writer.finish().unwrap();

        let times: Vec<f64> = JsonRecordReader::open(&path)
            .unwrap()
            .map(|r| r.unwrap().path_summary.time_stamp)
            .collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn malformed_line_is_reported_with_its_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stream.json");
        std::fs::write(
            &path,
            format!(
                "{}\nnot a record\n",
                serde_json::to_string(&PerFrameRecord::failure(0.0)).unwrap()
            ),
        )
        .unwrap();

        let results: Vec<_> = JsonRecordReader::open(&path).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(EngineError::MalformedRecord { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected malformed record error, got {other:?}"),
        }
    }

    #[test]
    fn missing_stream_file_is_an_io_error() {
        let result = JsonRecordReader::open(Path::new("no_such_stream.json"));
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}
