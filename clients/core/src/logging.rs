//! Cycle records
//!
//! While recording, the servo loop appends one line per cycle:
//! `elapsed_us,cmd_u,cmd_v,meas_u,meas_v,mask`,
//! with the time elapsed since the recording started in microseconds and
//! the activation mask as a decimal number.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use ferroservo_clients_io::{ActivationMask, Point2D};

/// Record of a control cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleRecord {
    /// Time since the recording started
    pub elapsed: Duration,
    pub command: Point2D,
    pub measured: Point2D,
    pub mask: ActivationMask,
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.elapsed.as_micros(),
            self.command.u,
            self.command.v,
            self.measured.u,
            self.measured.v,
            self.mask.bits()
        )
    }
}

/// Destination of the cycle records
pub trait RecordSink: Send {
    /// Opens a new recording
    fn start(&mut self) -> io::Result<()>;
    fn record(&mut self, record: &CycleRecord) -> io::Result<()>;
    /// Closes the current recording
    fn stop(&mut self) -> io::Result<()>;
    fn is_recording(&self) -> bool;
}

/// Text file records
///
/// Each recording is written to a new file in `directory`
/// named after the local time at which the recording started.
#[derive(Debug)]
pub struct TextLog {
    directory: PathBuf,
    file: Option<(PathBuf, BufWriter<File>)>,
}

impl TextLog {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            file: None,
        }
    }
    /// Path to the current recording
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }
    fn new_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y_%m_%d_%H_%M_%S").to_string();
        let mut path = self.directory.join(format!("{stamp}.txt"));
        let mut n = 0;
        while path.exists() {
            n += 1;
            path = self.directory.join(format!("{stamp}_{n}.txt"));
        }
        path
    }
}

impl RecordSink for TextLog {
    fn start(&mut self) -> io::Result<()> {
        self.stop()?;
        std::fs::create_dir_all(&self.directory)?;
        let path = self.new_path();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        log::info!("recording to {}", path.display());
        self.file = Some((path, BufWriter::new(file)));
        Ok(())
    }
    fn record(&mut self, record: &CycleRecord) -> io::Result<()> {
        match self.file.as_mut() {
            Some((_, writer)) => writeln!(writer, "{record}"),
            None => Ok(()),
        }
    }
    fn stop(&mut self) -> io::Result<()> {
        if let Some((path, mut writer)) = self.file.take() {
            writer.flush()?;
            log::info!("recording saved to {}", path.display());
        }
        Ok(())
    }
    fn is_recording(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for TextLog {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            interface::print_info("failed to save the recording", Some(&e));
        }
    }
}

/// In-memory records
///
/// Clones share the same records, so a clone can be kept to inspect
/// the records of a sink moved into the servo loop.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    recordings: Arc<Mutex<Vec<Vec<CycleRecord>>>>,
    recording: bool,
}

impl MemoryLog {
    pub fn new() -> Self {
        Default::default()
    }
    /// Records of all the recordings
    pub fn recordings(&self) -> Vec<Vec<CycleRecord>> {
        self.recordings
            .lock()
            .map(|recordings| recordings.clone())
            .unwrap_or_default()
    }
    /// Text lines of all the recordings
    pub fn lines(&self) -> Vec<String> {
        self.recordings()
            .iter()
            .flatten()
            .map(|record| record.to_string())
            .collect()
    }
    fn with<F: FnOnce(&mut Vec<Vec<CycleRecord>>)>(&self, f: F) -> io::Result<()> {
        let mut recordings = self
            .recordings
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        f(&mut recordings);
        Ok(())
    }
}

impl RecordSink for MemoryLog {
    fn start(&mut self) -> io::Result<()> {
        self.with(|recordings| recordings.push(Vec::new()))?;
        self.recording = true;
        Ok(())
    }
    fn record(&mut self, record: &CycleRecord) -> io::Result<()> {
        if !self.recording {
            return Ok(());
        }
        self.with(|recordings| {
            if let Some(recording) = recordings.last_mut() {
                recording.push(*record);
            }
        })
    }
    fn stop(&mut self) -> io::Result<()> {
        self.recording = false;
        Ok(())
    }
    fn is_recording(&self) -> bool {
        self.recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ms: u64) -> CycleRecord {
        CycleRecord {
            elapsed: Duration::from_millis(ms),
            command: Point2D::new(470., 532.5),
            measured: Point2D::new(468.25, 530.),
            mask: ActivationMask::new(0b1000_0001),
        }
    }

    #[test]
    fn line_format() {
        assert_eq!(record(1).to_string(), "1000,470,532.5,468.25,530,129");
    }

    #[test]
    fn memory_log() {
        let mut sink = MemoryLog::new();
        let handle = sink.clone();
        sink.record(&record(0)).unwrap();
        sink.start().unwrap();
        sink.record(&record(100)).unwrap();
        sink.record(&record(200)).unwrap();
        sink.stop().unwrap();
        sink.record(&record(300)).unwrap();
        assert_eq!(handle.recordings().len(), 1);
        assert_eq!(handle.lines().len(), 2);
    }

    #[test]
    fn text_log() {
        let directory = std::env::temp_dir().join(format!("ferroservo-{}", std::process::id()));
        let mut sink = TextLog::new(&directory);
        sink.start().unwrap();
        assert!(sink.is_recording());
        let path = sink.path().unwrap().to_path_buf();
        sink.record(&record(100)).unwrap();
        sink.record(&record(200)).unwrap();
        sink.stop().unwrap();
        assert!(!sink.is_recording());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.lines().collect::<Vec<_>>(),
            vec![
                "100000,470,532.5,468.25,530,129",
                "200000,470,532.5,468.25,530,129"
            ]
        );
        // a second recording within the same second gets its own file
        sink.start().unwrap();
        assert_ne!(sink.path(), Some(path.as_path()));
        sink.stop().unwrap();
        std::fs::remove_dir_all(directory).unwrap();
    }
}
