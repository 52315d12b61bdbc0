//! Append-only row sinks shared between workers.
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

struct SinkState<W> {
    writer: W,
    rows: usize,
}

/// Serializes whole rows from concurrent writers.
pub struct RowSink<W: Write> {
    state: Mutex<SinkState<W>>,
}

impl<W: Write> RowSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(SinkState { writer, rows: 0 }),
        }
    }

    /// Write `row` in one piece and flush it.
    pub fn append(&self, row: &str) -> io::Result<()> {
        let mut state = self.state.lock();
        state.writer.write_all(row.as_bytes())?;
        state.writer.flush()?;
        state.rows += 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows(&self) -> usize {
        self.state.lock().rows
    }

    pub fn into_inner(self) -> W {
        self.state.into_inner().writer
    }
}

impl RowSink<File> {
    /// Open `path` for appending, creating it and its parent directory.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_rows_do_not_interleave() {
        let sink = Arc::new(RowSink::new(Vec::new()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.append(&format!("worker {t} row {i}\n")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.rows(), 200);
        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 200);
        assert!(text.lines().all(|l| l.starts_with("worker ")));
    }

    #[test]
    fn file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.txt");
        RowSink::append_to(&path).unwrap().append("a\n").unwrap();
        RowSink::append_to(&path).unwrap().append("b\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
