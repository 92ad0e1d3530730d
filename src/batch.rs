use crate::error::CodecError;
use crate::formats::{content_type_for_path, output_file_name};
use crate::processing::{Codec, CompressionConfig};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A user-selected file: name, declared content type and immutable contents.
#[derive(Debug, Clone)]
pub struct InputFile {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl InputFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Builds an input whose content type is declared from the file name's extension.
    pub fn with_declared_type(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let content_type = content_type_for_path(Path::new(&name));
        Self::new(name, content_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A successfully converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Size of the input this file was produced from
    pub original_size: u64,
}

impl OutputFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogId(u64);

impl LogId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Pending,
    Success,
    Error,
}

impl LogStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LogStatus::Pending)
    }
}

/// Per-file activity record. Starts `Pending` and is resolved exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: LogId,
    pub file_name: String,
    pub message: String,
    pub status: LogStatus,
    pub original_size: u64,
    pub compressed_size: Option<u64>,
}

impl LogEntry {
    fn pending(id: LogId, file: &InputFile) -> Self {
        Self {
            id,
            file_name: file.name().to_string(),
            message: format!("Processing {}...", file.name()),
            status: LogStatus::Pending,
            original_size: file.size(),
            compressed_size: None,
        }
    }

    fn succeed(&mut self, output: &OutputFile) {
        debug_assert_eq!(self.status, LogStatus::Pending);
        self.status = LogStatus::Success;
        self.message = format!("{} -> {}", self.file_name, output.name);
        self.compressed_size = Some(output.size());
    }

    fn fail(&mut self) {
        debug_assert_eq!(self.status, LogStatus::Pending);
        self.status = LogStatus::Error;
        self.message = format!("Failed to compress {}", self.file_name);
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Successful outputs, in input order
    pub files: Vec<OutputFile>,
    /// One entry per input, in input order
    pub log: Vec<LogEntry>,
    /// Input bytes of the successful files only
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.files.len()
    }

    pub fn failed(&self) -> usize {
        self.log
            .iter()
            .filter(|entry| entry.status == LogStatus::Error)
            .count()
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started { total: usize },
    FileStarted(LogEntry),
    FileFinished(LogEntry),
    Progress {
        processed: usize,
        total: usize,
        percent: u8,
    },
    Finished { succeeded: usize, failed: usize },
}

/// Receives [`BatchEvent`]s. Closures taking `&BatchEvent` implement it.
pub trait BatchObserver: Send + Sync {
    fn on_event(&self, event: &BatchEvent);
}

impl<F> BatchObserver for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &BatchEvent) {
        self(event)
    }
}

pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_event(&self, _event: &BatchEvent) {}
}

/// `round(100 * processed / total)`, half rounding up. An empty batch is complete.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let processed = processed.min(total) as u64;
    let total = total as u64;
    ((200 * processed + total) / (2 * total)) as u8
}

/// Mutable state of a single run, owned by one `run` call.
struct BatchRun<'a> {
    observer: &'a dyn BatchObserver,
    total: usize,
    processed: usize,
    result: BatchResult,
}

impl<'a> BatchRun<'a> {
    fn new(total: usize, observer: &'a dyn BatchObserver) -> Self {
        Self {
            observer,
            total,
            processed: 0,
            result: BatchResult {
                log: Vec::with_capacity(total),
                ..BatchResult::default()
            },
        }
    }

    fn begin(&mut self, entry: LogEntry) -> usize {
        self.observer.on_event(&BatchEvent::FileStarted(entry.clone()));
        self.result.log.push(entry);
        self.result.log.len() - 1
    }

    fn record(&mut self, index: usize, outcome: Result<OutputFile, CodecError>) {
        let entry = &mut self.result.log[index];
        match outcome {
            Ok(output) => {
                entry.succeed(&output);
                debug!(file = %entry.file_name, output = %output.name, size = output.size(), "Converted");
                self.result.original_bytes += output.original_size;
                self.result.compressed_bytes += output.size();
                self.result.files.push(output);
            }
            Err(e) => {
                entry.fail();
                warn!(file = %entry.file_name, error = %e, "Failed to compress");
            }
        }
        self.observer.on_event(&BatchEvent::FileFinished(entry.clone()));

        self.processed += 1;
        self.observer.on_event(&BatchEvent::Progress {
            processed: self.processed,
            total: self.total,
            percent: progress_percent(self.processed, self.total),
        });
    }

    fn finish(self) -> BatchResult {
        if self.total == 0 {
            self.observer.on_event(&BatchEvent::Progress {
                processed: 0,
                total: 0,
                percent: progress_percent(0, 0),
            });
        }
        self.observer.on_event(&BatchEvent::Finished {
            succeeded: self.result.succeeded(),
            failed: self.result.failed(),
        });
        self.result
    }
}

/// Converts files one at a time, in input order.
pub struct BatchCompressor<C: Codec> {
    codec: Arc<C>,
    next_id: AtomicU64,
}

impl<C: Codec> BatchCompressor<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_log_id(&self) -> LogId {
        LogId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Runs the whole batch. Per-file failures are recorded in the log and
    /// never abort the run.
    pub async fn run(
        &self,
        files: &[InputFile],
        config: &CompressionConfig,
        observer: &dyn BatchObserver,
    ) -> BatchResult {
        let total = files.len();
        let start_time = Instant::now();
        info!(total, format = %config.format, "Starting batch conversion");
        observer.on_event(&BatchEvent::Started { total });

        let mut run = BatchRun::new(total, observer);
        for file in files {
            let index = run.begin(LogEntry::pending(self.next_log_id(), file));
            let outcome = self.convert(file, config).await;
            run.record(index, outcome);
        }

        let result = run.finish();
        info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            elapsed = ?start_time.elapsed(),
            "Batch conversion complete"
        );
        result
    }

    async fn convert(
        &self,
        file: &InputFile,
        config: &CompressionConfig,
    ) -> Result<OutputFile, CodecError> {
        let encoded = if config.offload {
            let codec = Arc::clone(&self.codec);
            let bytes = Arc::clone(&file.bytes);
            let worker_config = config.clone();
            tokio::task::spawn_blocking(move || codec.encode(&bytes, &worker_config))
                .await
                .map_err(|e| CodecError::Worker(e.to_string()))??
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| self.codec.encode(file.bytes(), config)))
                .map_err(|payload| CodecError::Worker(panic_message(payload.as_ref())))??
        };

        Ok(OutputFile {
            name: output_file_name(file.name(), config.format),
            content_type: config.format.mime_type().to_string(),
            bytes: encoded,
            original_size: file.size(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("codec panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("codec panicked: {}", message)
    } else {
        "codec panicked".to_string()
    }
}
