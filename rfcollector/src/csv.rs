//! CSV file sink

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use parking_lot::Mutex;
use rfcollector_types::TagEvent;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sink::TagSink;

/// Writes one row per tag event, raw values as the reader reported them
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    rows: AtomicU64,
}

impl CsvSink {
    pub const HEADER: &'static str = "time,id,channel,phase,rssi,antenna";

    /// Create a new timestamped file in `dir`, creating `dir` if needed
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let name = Local::now().format("RFID_%Y-%m-%d-%H-%M-%S.csv").to_string();
        Self::create_at(dir.join(name))
    }

    /// Create (or truncate) the file at `path`
    pub fn create_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", Self::HEADER)?;
        info!("Recording tags to {}", path.display());

        Ok(Self {
            path,
            writer: Mutex::new(writer),
            rows: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows written so far
    pub fn rows(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn row(event: &TagEvent) -> String {
        format!(
            "{},{},{},{},{},{}",
            field(event.first_seen_us),
            event.tag_id_hex(),
            field(event.channel_index),
            field(event.phase_raw),
            field(event.rssi_raw),
            field(event.antenna_id),
        )
    }
}

fn field<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl TagSink for CsvSink {
    fn accept(&self, event: TagEvent) {
        let row = Self::row(&event);
        match writeln!(self.writer.lock(), "{row}") {
            Ok(()) => {
                self.rows.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => warn!("Dropping tag {}: write to {} failed: {}", event.tag_id_hex(), self.path.display(), e),
        }
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.get_mut().flush() {
            warn!("Final flush of {} failed: {}", self.path.display(), e);
        }
        debug!("{} rows written to {}", self.rows(), self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_written_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::create(dir.path().join("output")).unwrap();

        sink.accept(TagEvent {
            first_seen_us: Some(1_700_000_000_000_000),
            channel_index: Some(7),
            phase_raw: Some(2048),
            rssi_raw: Some(-5000),
            antenna_id: Some(1),
            ..TagEvent::new(vec![0xE2, 0x80])
        });
        sink.accept(TagEvent::new(vec![0x01]));
        sink.flush().unwrap();

        let name = sink.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("RFID_") && name.ends_with(".csv"));
        assert_eq!(sink.rows(), 2);

        let content = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            content,
            "time,id,channel,phase,rssi,antenna\n\
             1700000000000000,e280,7,2048,-5000,1\n\
             ,01,,,,\n"
        );
    }
}
