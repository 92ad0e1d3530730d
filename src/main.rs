use anyhow::{Context, Result};
use clap::Parser;
use quick_convert::cli::Args;
use quick_convert::constants::{INFO_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use quick_convert::logger::{init_logging, is_quiet};
use quick_convert::status;
use quick_convert::utils::{format_file_size, format_size_delta};
use quick_convert::{
    load_images, AppController, CompressionConfig, ImageCodec, ProgressBarObserver, TargetFormat,
    ZipArchiveWriter,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    let format: TargetFormat = args.format.parse()?;
    let config = CompressionConfig::new(
        args.quality,
        args.max_size,
        args.max_dimension,
        format,
        !args.inline,
    )?;

    let candidates =
        load_images(&args.inputs, args.recursive).context("Failed to collect input files")?;

    let mut controller = AppController::new(ImageCodec, config);
    let selected = controller.select_files(candidates)?;
    if selected == 0 {
        warn!("No image files found in the given inputs");
        return Ok(());
    }

    status!(
        "{} Converting {} image(s) to {}",
        INFO_PREFIX,
        selected,
        format
    );

    let observer = ProgressBarObserver::new(is_quiet());
    controller.start(&observer).await?;

    let Some(stats) = controller.stats() else {
        return Ok(());
    };
    let failed = controller.result().map_or(0, |result| result.failed());

    status!("{} Converted: {}/{}", INFO_PREFIX, stats.files_succeeded, selected);
    status!("   Original size:   {}", format_file_size(stats.original_bytes));
    status!("   Compressed size: {}", format_file_size(stats.compressed_bytes));
    if let Some(percent) = stats.savings_percent() {
        status!(
            "   Saved:           {} ({}%)",
            format_size_delta(stats.saved_bytes()),
            percent
        );
    }
    if failed > 0 {
        status!("{} {} file(s) could not be converted", WARNING_PREFIX, failed);
    }

    if stats.files_succeeded == 0 {
        warn!("Nothing was converted; no archive written");
        return Ok(());
    }

    let archive = controller
        .download(&ZipArchiveWriter::default())
        .context("Failed to build archive")?;
    let path = archive
        .save_to(&args.output)
        .with_context(|| format!("Failed to save archive to {}", args.output.display()))?;

    status!("{} Archive saved to {}", SUCCESS_PREFIX, path.display());
    Ok(())
}
