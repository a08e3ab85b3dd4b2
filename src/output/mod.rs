//! Status output for concurrent download progress
//!
//! The [`StatusSink`] is a line-addressable console abstraction. Parallel
//! download tasks each own a reserved row and rewrite it in place with
//! ANSI cursor movement; a mutex around the output stream guarantees that
//! concurrent writers never interleave partial writes.
//!
//! All writes are best-effort: status output never affects crawl
//! correctness, so I/O errors are swallowed.

use std::io::Write;
use std::sync::Mutex;

struct SinkInner {
    out: Box<dyn Write + Send>,
    /// Number of lines written so far; the cursor rests below the last one
    rows: u16,
}

/// Synchronized, line-addressable status output
pub struct StatusSink {
    inner: Mutex<SinkInner>,
}

impl StatusSink {
    /// Creates a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates a sink writing to an arbitrary stream
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Mutex::new(SinkInner { out, rows: 0 }),
        }
    }

    /// Appends a full line at the bottom of the output
    pub fn write_line(&self, text: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = writeln!(inner.out, "{}", text);
            let _ = inner.out.flush();
            inner.rows = inner.rows.saturating_add(1);
        }
    }

    /// Reserves an empty row and returns its identifier
    ///
    /// The returned row stays valid for the lifetime of the sink and can
    /// be rewritten any number of times with [`StatusSink::write_at`].
    pub fn reserve_row(&self) -> u16 {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = writeln!(inner.out);
            let _ = inner.out.flush();
            inner.rows = inner.rows.saturating_add(1);
            inner.rows
        } else {
            0
        }
    }

    /// Rewrites a previously reserved row in place
    ///
    /// `col` is the 1-based column to start writing at. Rows that were
    /// never reserved fall back to appending a plain line. No ordering is
    /// guaranteed between writes to distinct rows.
    pub fn write_at(&self, row: u16, col: u16, text: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            if row == 0 || row > inner.rows {
                let _ = writeln!(inner.out, "{}", text);
                let _ = inner.out.flush();
                inner.rows = inner.rows.saturating_add(1);
                return;
            }

            // The cursor sits one line below the last written row; move up
            // to the target row, clear it, write, and jump back.
            let up = inner.rows - row + 1;
            let col = col.max(1);
            let _ = write!(
                inner.out,
                "\x1b[s\x1b[{}A\x1b[2K\x1b[{}G{}\x1b[u",
                up, col, text
            );
            let _ = inner.out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shared in-memory buffer standing in for stdout
    #[derive(Clone)]
    struct TestBuf(Arc<Mutex<Vec<u8>>>);

    impl TestBuf {
        fn new() -> Self {
            TestBuf(Arc::new(Mutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for TestBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_line_appends() {
        let buf = TestBuf::new();
        let sink = StatusSink::new(Box::new(buf.clone()));

        sink.write_line("first");
        sink.write_line("second");

        assert_eq!(buf.contents(), "first\nsecond\n");
    }

    #[test]
    fn test_reserve_row_returns_increasing_ids() {
        let buf = TestBuf::new();
        let sink = StatusSink::new(Box::new(buf.clone()));

        assert_eq!(sink.reserve_row(), 1);
        assert_eq!(sink.reserve_row(), 2);
        sink.write_line("text");
        assert_eq!(sink.reserve_row(), 4);
    }

    #[test]
    fn test_write_at_targets_reserved_row() {
        let buf = TestBuf::new();
        let sink = StatusSink::new(Box::new(buf.clone()));

        let row = sink.reserve_row();
        sink.write_line("below");
        sink.write_at(row, 1, "progress 50%");

        let output = buf.contents();
        // Two lines above the cursor means the reserved row is 2 up
        assert!(output.contains("\x1b[2A"));
        assert!(output.contains("progress 50%"));
        // Save/restore brackets the in-place write
        assert!(output.contains("\x1b[s"));
        assert!(output.contains("\x1b[u"));
    }

    #[test]
    fn test_write_at_unreserved_row_appends() {
        let buf = TestBuf::new();
        let sink = StatusSink::new(Box::new(buf.clone()));

        sink.write_at(7, 1, "orphan");
        assert_eq!(buf.contents(), "orphan\n");
    }

    #[test]
    fn test_concurrent_writers_never_interleave() {
        let buf = TestBuf::new();
        let sink = Arc::new(StatusSink::new(Box::new(buf.clone())));

        let mut handles = Vec::new();
        for i in 0..8 {
            let sink = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    sink.write_line(&format!("writer-{i} line"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Every line must be whole: exactly 400 lines, each well-formed
        let output = buf.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.ends_with(" line")));
    }
}
