use crate::formats::TargetFormat;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quick-convert",
    about = "Batch-convert images to WebP, JPEG or PNG under a size limit",
    long_about = "quick-convert re-encodes a batch of images into one target format, \
                  downscaling them until each fits a per-file size limit. \
                  Converted files are bundled into a single ZIP archive. \
                  Inputs can be files, directories or glob patterns; non-image files are skipped.",
    version,
    after_help = "EXAMPLES:\n  \
    quick-convert photo.jpg scan.png\n  \
    quick-convert ./album -r -f jpeg -q 0.7 -o ./out\n  \
    quick-convert \"./shots/*.png\" -m 0.5 -d 1920"
)]
pub struct Args {
    #[arg(
        required = true,
        help = "Input files, directories or glob patterns",
        long_help = "Files are taken as-is. Directories contribute their image files \
                     (sorted by name, hidden entries skipped). Anything else is expanded as a glob."
    )]
    pub inputs: Vec<String>,

    #[arg(
        short = 'o',
        long,
        default_value = ".",
        help = "Directory to write the archive into"
    )]
    pub output: PathBuf,

    #[arg(
        short = 'q',
        long,
        help = "Encoding quality (0.1-1.0, default: 0.8)",
        long_help = "Encoder quality from 0.1 (smallest) to 1.0 (best). Any value in that \
                     range is used as given, without snapping to steps. For PNG: >=0.9 uses Zopfli, >=0.7 uses high compression, below that standard compression."
    )]
    pub quality: Option<f32>,

    #[arg(
        short = 'm',
        long = "max-size",
        help = "Per-file size limit in MB (min 0.1, default: 1.0)"
    )]
    pub max_size: Option<f64>,

    #[arg(
        short = 'd',
        long = "max-dimension",
        help = "Maximum width or height in pixels",
        long_help = "Downscale so neither side exceeds this many pixels, preserving aspect ratio. \
                     Smaller images are left alone."
    )]
    pub max_dimension: Option<u32>,

    #[arg(
        short = 'f',
        long,
        default_value = "webp",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(TargetFormat::format_names().iter().copied()),
        help = "Output format"
    )]
    pub format: String,

    #[arg(
        long,
        help = "Encode on the async runtime thread instead of a blocking worker"
    )]
    pub inline: bool,

    #[arg(short = 'r', long, help = "Descend into subdirectories")]
    pub recursive: bool,

    #[arg(long, conflicts_with = "verbose", help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print per-file debug details")]
    pub verbose: bool,
}
