pub mod archive;
pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod processing;
pub mod progress;
pub mod selection;
pub mod utils;
pub mod workflow;

pub use archive::{Archive, ArchiveWriter, ZipArchiveWriter};
pub use batch::{
    progress_percent, BatchCompressor, BatchEvent, BatchObserver, BatchResult, InputFile,
    LogEntry, LogId, LogStatus, NoopObserver, OutputFile,
};
pub use error::{ArchiveError, CodecError, CompressionError, Result, WorkflowError};
pub use formats::{output_file_name, TargetFormat};
pub use processing::{Codec, CompressionConfig, ImageCodec};
pub use progress::ProgressBarObserver;
pub use selection::{collect_candidate_paths, load_images, read_input_file, select_images};
pub use workflow::{AppController, BatchStats, WorkflowPhase};
