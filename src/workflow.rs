//! Upload → Processing → Done state machine around a [`BatchCompressor`].

use crate::archive::{Archive, ArchiveWriter};
use crate::batch::{BatchCompressor, BatchObserver, BatchResult, InputFile, LogEntry};
use crate::error::WorkflowError;
use crate::processing::{Codec, CompressionConfig};
use crate::selection::select_images;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Upload,
    Processing,
    Done,
}

/// Aggregate numbers shown once a batch is done. Only successful files count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub files_succeeded: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl BatchStats {
    pub fn from_result(result: &BatchResult) -> Self {
        Self {
            files_succeeded: result.succeeded(),
            original_bytes: result.original_bytes,
            compressed_bytes: result.compressed_bytes,
        }
    }

    /// Negative when the outputs grew.
    pub fn saved_bytes(&self) -> i64 {
        self.original_bytes as i64 - self.compressed_bytes as i64
    }

    pub fn savings_percent(&self) -> Option<i64> {
        if self.original_bytes == 0 {
            return None;
        }
        Some((self.saved_bytes() as f64 / self.original_bytes as f64 * 100.0).round() as i64)
    }
}

pub struct AppController<C: Codec> {
    compressor: BatchCompressor<C>,
    phase: WorkflowPhase,
    files: Vec<InputFile>,
    config: CompressionConfig,
    result: Option<BatchResult>,
}

impl<C: Codec> AppController<C> {
    pub fn new(codec: C, config: CompressionConfig) -> Self {
        Self {
            compressor: BatchCompressor::new(codec),
            phase: WorkflowPhase::Upload,
            files: Vec::new(),
            config,
            result: None,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn result(&self) -> Option<&BatchResult> {
        self.result.as_ref()
    }

    /// Activity log of the last run; empty before a run and after a reset.
    pub fn log(&self) -> &[LogEntry] {
        self.result
            .as_ref()
            .map_or(&[][..], |result| result.log.as_slice())
    }

    fn expect_phase(&self, expected: WorkflowPhase) -> Result<(), WorkflowError> {
        if self.phase != expected {
            return Err(WorkflowError::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Replaces the selection with the candidates declared as images.
    /// Returns how many were accepted.
    pub fn select_files(&mut self, candidates: Vec<InputFile>) -> Result<usize, WorkflowError> {
        self.expect_phase(WorkflowPhase::Upload)?;
        self.files = select_images(candidates);
        Ok(self.files.len())
    }

    pub fn set_config(&mut self, config: CompressionConfig) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Upload)?;
        self.config = config;
        Ok(())
    }

    /// Runs the batch over the current selection and moves to `Done`.
    ///
    /// Rejected with [`WorkflowError::EmptySelection`] when nothing is
    /// selected; the phase then stays `Upload`.
    pub async fn start(
        &mut self,
        observer: &dyn BatchObserver,
    ) -> Result<&BatchResult, WorkflowError> {
        self.expect_phase(WorkflowPhase::Upload)?;
        if self.files.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }

        self.phase = WorkflowPhase::Processing;
        let result = self
            .compressor
            .run(&self.files, &self.config, observer)
            .await;
        self.phase = WorkflowPhase::Done;

        Ok(&*self.result.insert(result))
    }

    pub fn stats(&self) -> Option<BatchStats> {
        match self.phase {
            WorkflowPhase::Done => self.result.as_ref().map(BatchStats::from_result),
            _ => None,
        }
    }

    /// Packages the successful outputs of the finished run.
    pub fn download(&self, writer: &dyn ArchiveWriter) -> Result<Archive, WorkflowError> {
        self.expect_phase(WorkflowPhase::Done)?;
        let files = self.result.as_ref().map_or(&[][..], |r| r.files.as_slice());
        let archive = Archive::build(writer, files)?;
        info!(entries = files.len(), size = archive.bytes.len(), "Archive ready");
        Ok(archive)
    }

    /// Back to `Upload` from any phase. Selection, log and result are cleared;
    /// the configuration is kept.
    pub fn reset(&mut self) {
        self.files.clear();
        self.result = None;
        self.phase = WorkflowPhase::Upload;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ZipArchiveWriter;
    use crate::batch::{LogStatus, NoopObserver, OutputFile};
    use crate::error::{ArchiveError, CodecError};

    struct StubCodec;

    impl Codec for StubCodec {
        fn encode(&self, bytes: &[u8], _: &CompressionConfig) -> Result<Vec<u8>, CodecError> {
            if bytes.starts_with(b"corrupt") {
                return Err(CodecError::Encode("stub".to_string()));
            }
            Ok(bytes[..bytes.len() / 2].to_vec())
        }
    }

    struct FailingWriter;

    impl ArchiveWriter for FailingWriter {
        fn write(&self, _: &[OutputFile]) -> Result<Vec<u8>, ArchiveError> {
            Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    fn controller() -> AppController<StubCodec> {
        AppController::new(StubCodec, CompressionConfig::default())
    }

    fn input(name: &str, bytes: &[u8]) -> InputFile {
        InputFile::with_declared_type(name, bytes.to_vec())
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();
        assert_eq!(controller.phase(), WorkflowPhase::Upload);
        assert!(controller.files().is_empty());
        assert!(controller.result().is_none());
        assert!(controller.stats().is_none());
    }

    #[test]
    fn test_select_files_replaces_and_filters() {
        let mut controller = controller();
        controller
            .select_files(vec![input("a.png", b"aa"), input("b.png", b"bb")])
            .unwrap();

        let accepted = controller
            .select_files(vec![input("c.jpg", b"cc"), input("notes.txt", b"tt")])
            .unwrap();

        assert_eq!(accepted, 1);
        let names: Vec<_> = controller.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["c.jpg"]);
    }

    #[tokio::test]
    async fn test_start_with_empty_selection_is_rejected() {
        let mut controller = controller();
        let result = controller.start(&NoopObserver).await;

        assert!(matches!(result, Err(WorkflowError::EmptySelection)));
        assert_eq!(controller.phase(), WorkflowPhase::Upload);
    }

    #[tokio::test]
    async fn test_start_moves_to_done() {
        let mut controller = controller();
        controller
            .select_files(vec![input("x.png", b"xxxx"), input("y.jpg", b"corrupt")])
            .unwrap();

        let result = controller.start(&NoopObserver).await.unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(controller.phase(), WorkflowPhase::Done);

        let stats = controller.stats().unwrap();
        assert_eq!(
            stats,
            BatchStats {
                files_succeeded: 1,
                original_bytes: 4,
                compressed_bytes: 2,
            }
        );

        let statuses: Vec<_> = controller.log().iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![LogStatus::Success, LogStatus::Error]);
    }

    #[tokio::test]
    async fn test_commands_rejected_outside_their_phase() {
        let mut controller = controller();
        assert!(matches!(
            controller.download(&ZipArchiveWriter::default()),
            Err(WorkflowError::InvalidPhase {
                expected: WorkflowPhase::Done,
                actual: WorkflowPhase::Upload,
            })
        ));

        controller.select_files(vec![input("a.png", b"aa")]).unwrap();
        controller.start(&NoopObserver).await.unwrap();

        assert!(matches!(
            controller.select_files(vec![input("b.png", b"bb")]),
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert!(matches!(
            controller.set_config(CompressionConfig::default()),
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert!(matches!(
            controller.start(&NoopObserver).await,
            Err(WorkflowError::InvalidPhase { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_packages_only_successes() {
        let mut controller = controller();
        controller
            .select_files(vec![input("x.png", b"xxxx"), input("y.jpg", b"corrupt")])
            .unwrap();
        controller.start(&NoopObserver).await.unwrap();

        let archive = controller.download(&ZipArchiveWriter::default()).unwrap();
        assert_eq!(archive.name, "converted-images.zip");

        let zip = zip::ZipArchive::new(std::io::Cursor::new(archive.bytes)).unwrap();
        let names: Vec<_> = zip.file_names().collect();
        assert_eq!(names, vec!["x.webp"]);
    }

    #[tokio::test]
    async fn test_download_surfaces_archive_failure() {
        let mut controller = controller();
        controller.select_files(vec![input("x.png", b"xxxx")]).unwrap();
        controller.start(&NoopObserver).await.unwrap();

        let result = controller.download(&FailingWriter);
        assert!(matches!(result, Err(WorkflowError::Archive(_))));
        assert_eq!(controller.phase(), WorkflowPhase::Done);
    }

    #[tokio::test]
    async fn test_reset_clears_everything_but_config() {
        let config = CompressionConfig {
            quality: 0.5,
            ..CompressionConfig::default()
        };
        let mut controller = AppController::new(StubCodec, config.clone());
        controller.select_files(vec![input("a.png", b"aa")]).unwrap();
        controller.start(&NoopObserver).await.unwrap();

        controller.reset();

        assert_eq!(controller.phase(), WorkflowPhase::Upload);
        assert!(controller.files().is_empty());
        assert!(controller.log().is_empty());
        assert!(controller.result().is_none());
        assert_eq!(controller.config(), &config);
    }

    #[test]
    fn test_batch_stats_savings() {
        let stats = BatchStats {
            files_succeeded: 2,
            original_bytes: 1000,
            compressed_bytes: 250,
        };
        assert_eq!(stats.saved_bytes(), 750);
        assert_eq!(stats.savings_percent(), Some(75));

        let grew = BatchStats {
            files_succeeded: 1,
            original_bytes: 100,
            compressed_bytes: 120,
        };
        assert_eq!(grew.saved_bytes(), -20);
        assert_eq!(grew.savings_percent(), Some(-20));

        let empty = BatchStats {
            files_succeeded: 0,
            original_bytes: 0,
            compressed_bytes: 0,
        };
        assert_eq!(empty.savings_percent(), None);
    }
}
