#![warn(missing_docs)]
//! Test surfaces for block families: a neighbour grid, a recording block
//! builder and a JSONL sink for build logs.

mod grid;
mod recording;

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use grid::*;
pub use recording::*;

/// A sink that writes build records as newline-delimited JSON.
pub struct BuildLogSink {
    file: File,
}

impl BuildLogSink {
    /// Create a sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create build log {}", path.display()))?;
        Ok(Self { file })
    }

    /// Append every record of `builder`.
    pub fn write_all(&mut self, builder: &RecordingBuilder) -> Result<()> {
        for record in builder.records() {
            self.write(record)?;
        }
        Ok(())
    }

    /// Append one record.
    pub fn write(&mut self, record: &BuildRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn build_log_sink_writes_lines() {
        let path = std::env::temp_dir().join(format!(
            "terablock-build-log-{}/log.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let record = BuildRecord {
            uri: "engine:stone".into(),
            family: "engine:stone".into(),
            section: None,
            yaw: 0,
            pitch: 0,
            roll: 0,
        };
        let mut sink = BuildLogSink::create(&path).expect("sink create");
        sink.write(&record).expect("write succeeds");
        sink.write(&record).expect("write succeeds");
        drop(sink);
        let contents = fs::read_to_string(&path).expect("file readable");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("\"uri\":\"engine:stone\""));
    }
}
