//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::vec::Vec;

use crate::*;

/// Errors reported by [`MockStorage`] and [`MockFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStorageError {
    /// No file or directory at that path
    NotFound,
    /// Injected read failure
    Io,
}

impl core::fmt::Display for MockStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Io => write!(f, "injected I/O error"),
        }
    }
}

impl std::error::Error for MockStorageError {}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicUsize,
    bytes: AtomicUsize,
    open: AtomicUsize,
}

/// Snapshot of how a mock file has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStats {
    /// Number of `read` calls across every handle
    pub reads: usize,
    /// Total bytes handed out by `read`
    pub bytes_read: usize,
    /// Handles currently open (not yet dropped)
    pub open_handles: usize,
}

#[derive(Debug, Clone)]
struct MockFileSpec {
    data: Arc<Vec<u8>>,
    fail_at: Option<usize>,
    max_read: Option<usize>,
    counters: Arc<Counters>,
}

/// In-memory volume with a directory tree.
///
/// Directory listings keep insertion order, the way a FAT directory keeps
/// creation order.
#[derive(Debug, Default)]
pub struct MockStorage {
    files: BTreeMap<String, MockFileSpec>,
    dirs: BTreeMap<String, Vec<DirEntry>>,
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((parent, name)) => (parent, name),
        None => ("/", path),
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        let mut owned = String::from("/");
        owned.push_str(trimmed);
        owned
    }
}

impl MockStorage {
    /// Create an empty volume containing only the root directory.
    pub fn new() -> Self {
        let mut dirs = BTreeMap::new();
        dirs.insert("/".to_string(), Vec::new());
        Self {
            files: BTreeMap::new(),
            dirs,
        }
    }

    /// Create a directory (and its parents).
    pub fn add_dir(&mut self, path: &str) {
        let path = normalize(path);
        if self.dirs.contains_key(&path) {
            return;
        }
        let (parent, name) = split_parent(&path);
        let parent = parent.to_string();
        self.add_dir(&parent);
        if let (Some(entries), Some(entry)) = (self.dirs.get_mut(&parent), DirEntry::new(name, true, 0)) {
            entries.push(entry);
        }
        self.dirs.insert(path, Vec::new());
    }

    /// Create a file with `data` (and its parent directories).
    pub fn add_file(&mut self, path: &str, data: &[u8]) {
        let path = normalize(path);
        let (parent, name) = split_parent(&path);
        let parent = parent.to_string();
        self.add_dir(&parent);
        if let (Some(entries), Some(entry)) = (
            self.dirs.get_mut(&parent),
            DirEntry::new(name, false, data.len() as u64),
        ) {
            entries.retain(|e| e.name.as_str() != name);
            entries.push(entry);
        }
        self.files.insert(
            path,
            MockFileSpec {
                data: Arc::new(data.to_vec()),
                fail_at: None,
                max_read: None,
                counters: Arc::new(Counters::default()),
            },
        );
    }

    /// Make reads of `path` fail once the cursor reaches `offset`.
    pub fn fail_reads_at(&mut self, path: &str, offset: usize) {
        if let Some(spec) = self.files.get_mut(&normalize(path)) {
            spec.fail_at = Some(offset);
        }
    }

    /// Cap the number of bytes any single `read` of `path` returns.
    pub fn limit_read_size(&mut self, path: &str, max: usize) {
        if let Some(spec) = self.files.get_mut(&normalize(path)) {
            spec.max_read = Some(max);
        }
    }

    /// Usage statistics for `path` (all zero for unknown paths).
    pub fn stats(&self, path: &str) -> FileStats {
        self.files
            .get(&normalize(path))
            .map(|spec| FileStats {
                reads: spec.counters.reads.load(Ordering::Relaxed),
                bytes_read: spec.counters.bytes.load(Ordering::Relaxed),
                open_handles: spec.counters.open.load(Ordering::Relaxed),
            })
            .unwrap_or_default()
    }

    /// Total handles open across all files.
    pub fn open_handles(&self) -> usize {
        self.files
            .values()
            .map(|spec| spec.counters.open.load(Ordering::Relaxed))
            .sum()
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;
    type File = MockFile;

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let spec = self
            .files
            .get(&normalize(path))
            .ok_or(MockStorageError::NotFound)?
            .clone();
        spec.counters.open.fetch_add(1, Ordering::Relaxed);
        Ok(MockFile { spec, pos: 0 })
    }

    fn read_dir<V>(&mut self, path: &str, mut visit: V) -> Result<(), Self::Error>
    where
        V: FnMut(&DirEntry),
    {
        let entries = self
            .dirs
            .get(&normalize(path))
            .ok_or(MockStorageError::NotFound)?;
        entries.iter().for_each(|e| visit(e));
        Ok(())
    }
}

/// Handle on a [`MockStorage`] file. Dropping it closes it.
#[derive(Debug)]
pub struct MockFile {
    spec: MockFileSpec,
    pos: usize,
}

impl File for MockFile {
    type Error = MockStorageError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.spec.counters.reads.fetch_add(1, Ordering::Relaxed);
        if self.spec.fail_at.is_some_and(|at| self.pos >= at) {
            return Err(MockStorageError::Io);
        }
        let remaining = self.spec.data.get(self.pos..).unwrap_or_default();
        let mut n = buf.len().min(remaining.len());
        if let Some(max) = self.spec.max_read {
            n = n.min(max);
        }
        if let Some(at) = self.spec.fail_at {
            n = n.min(at.saturating_sub(self.pos));
        }
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), remaining.get(..n)) {
            dst.copy_from_slice(src);
        }
        self.pos = self.pos.saturating_add(n);
        self.spec.counters.bytes.fetch_add(n, Ordering::Relaxed);
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        let len = self.spec.data.len();
        self.pos = usize::try_from(pos).map_or(len, |p| p.min(len));
        Ok(self.pos as u64)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.spec.data.len()
    }

    fn size(&self) -> u64 {
        self.spec.data.len() as u64
    }
}

impl Drop for MockFile {
    fn drop(&mut self) {
        self.spec.counters.open.fetch_sub(1, Ordering::Relaxed);
    }
}

/// DAC that records every sample it is given.
#[derive(Debug, Default, Clone)]
pub struct RecordingOutput {
    samples: Vec<u8>,
}

impl RecordingOutput {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples written so far, oldest first.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Forget recorded samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl SampleOutput for RecordingOutput {
    fn write_sample(&mut self, sample: u8) {
        self.samples.push(sample);
    }
}

/// Timer that records how it was programmed.
#[derive(Debug, Default, Clone)]
pub struct MockTimer {
    running: bool,
    period: Option<TimerTicks>,
    starts: usize,
    stops: usize,
}

impl MockTimer {
    /// Create a disarmed timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Period of the most recent `start`.
    pub fn period(&self) -> Option<TimerTicks> {
        self.period
    }

    /// Number of `start` calls.
    pub fn start_count(&self) -> usize {
        self.starts
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> usize {
        self.stops
    }
}

impl PeriodicTimer for MockTimer {
    fn start(&mut self, period: TimerTicks) {
        self.running = true;
        self.period = Some(period);
        self.starts = self.starts.saturating_add(1);
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops = self.stops.saturating_add(1);
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Mock input device
pub struct MockInput {
    events: heapless::Deque<InputEvent, 16>,
}

impl MockInput {
    /// Create new mock input
    pub fn new() -> Self {
        Self {
            events: heapless::Deque::new(),
        }
    }

    /// Add event to queue
    pub fn add_event(&mut self, event: InputEvent) -> Result<(), InputEvent> {
        self.events.push_back(event)
    }

    /// Queue a press of `button`.
    pub fn press(&mut self, button: Button) -> Result<(), InputEvent> {
        self.add_event(InputEvent::ButtonPress(button))
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for MockInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDevice for MockInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

/// Text display that keeps the current screen as styled segments.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    lines: Vec<Vec<(String, TextStyle)>>,
    open_line: Vec<(String, TextStyle)>,
    clears: usize,
}

impl RecordingDisplay {
    /// Create a blank display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed lines of the current screen as plain text.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|segments| segments.iter().map(|(text, _)| text.as_str()).collect())
            .collect()
    }

    /// Style of the first segment of line `index`.
    pub fn line_style(&self, index: usize) -> Option<TextStyle> {
        self.lines.get(index)?.first().map(|(_, style)| *style)
    }

    /// Segments of line `index`.
    pub fn segments(&self, index: usize) -> Option<&[(String, TextStyle)]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    /// Number of `clear` calls.
    pub fn clear_count(&self) -> usize {
        self.clears
    }
}

impl TextDisplay for RecordingDisplay {
    type Error = core::convert::Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.lines.clear();
        self.open_line.clear();
        self.clears = self.clears.saturating_add(1);
        Ok(())
    }

    fn write_str(&mut self, text: &str, style: TextStyle) -> Result<(), Self::Error> {
        self.open_line.push((text.to_string(), style));
        Ok(())
    }

    fn newline(&mut self) -> Result<(), Self::Error> {
        let line = core::mem::take(&mut self.open_line);
        self.lines.push(line);
        Ok(())
    }
}
