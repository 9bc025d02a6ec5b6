//! Background line writer
//!
//! Lines are queued from the caller's thread and written to disk by a
//! dedicated thread, so a long file does not stall the tick loop. `close()`
//! must be called after the last line; it flushes and reports the outcome.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::error::SaveError;

#[derive(Default)]
struct Queue {
    lines: VecDeque<String>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct LineWriter {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<std::io::Result<usize>>>,
}

impl LineWriter {
    /// Create (or truncate) `path` and start the writer thread
    pub fn create(path: &Path) -> Result<Self, SaveError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        let shared = Arc::new(Shared::default());
        let worker = shared.clone();
        let handle = thread::Builder::new()
            .name("tas-writer".into())
            .spawn(move || drain(&worker, BufWriter::new(file)))?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Queue one line; the newline is added by the writer
    pub fn write_line(&self, line: impl Into<String>) {
        let mut queue = self.shared.lock();
        if queue.closed {
            tracing::warn!("line queued after the writer was closed, dropping");
            return;
        }
        queue.lines.push_back(line.into());
        self.shared.ready.notify_one();
    }

    /// Signal the end of input, wait for every queued line to reach the file.
    /// Returns the number of lines written.
    pub fn close(mut self) -> Result<usize, SaveError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<usize, SaveError> {
        {
            let mut queue = self.shared.lock();
            queue.closed = true;
            self.shared.ready.notify_one();
        }
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(result) => Ok(result?),
                Err(_) => Err(SaveError::WriterPanicked),
            },
            None => Ok(0),
        }
    }
}

fn drain(shared: &Shared, mut out: BufWriter<File>) -> std::io::Result<usize> {
    let mut written = 0;
    loop {
        let batch: Vec<String> = {
            let mut queue = shared.lock();
            while queue.lines.is_empty() && !queue.closed {
                queue = shared
                    .ready
                    .wait(queue)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            if queue.lines.is_empty() {
                break;
            }
            queue.lines.drain(..).collect()
        };
        for line in batch {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if self.handle.is_some()
            && let Err(e) = self.finish()
        {
            tracing::error!("file writer failed while dropping: {}", e);
        }
    }
}
