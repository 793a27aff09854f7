//! Desktop and command-line front end for pdfimageextract.
//!
//! Without arguments the extractor window opens. Given an input and an output
//! folder the same run happens headlessly and the log is printed to stdout.

use clap::Parser;
use pdfimageextract::{Dispatcher, ExtractorConfig, Result};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-image-extract",
    version,
    about = "Extract the embedded images of every PDF below a folder"
)]
struct Cli {
    /// Folder to scan for PDF files (recursively)
    #[arg(requires = "output")]
    input: Option<PathBuf>,

    /// Folder that receives one subfolder of images per PDF
    output: Option<PathBuf>,

    /// Skip images larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_image_size: Option<usize>,

    /// Write decoded samples as raw .bin instead of .pgm/.ppm
    #[arg(long)]
    raw: bool,
}

impl Cli {
    fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_image_size: self.max_image_size,
            wrap_pnm: !self.raw,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let dispatcher = Dispatcher::with_config(cli.config());

    let result = match (cli.input, cli.output) {
        (Some(input), Some(output)) => run_headless(&dispatcher, input, output),
        _ => run_window(dispatcher),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_headless(dispatcher: &Dispatcher, input: PathBuf, output: PathBuf) -> Result<()> {
    let handle = dispatcher.start(input, output)?;
    match handle.wait(&|line: &str| println!("{line}")) {
        Some(summary) => log::info!(
            "{} PDF(s), {} image(s), {} unreadable",
            summary.pdfs_found,
            summary.images_written,
            summary.documents_failed
        ),
        None => log::warn!("run ended without a summary"),
    }
    println!("Extraction process has finished!");
    Ok(())
}

#[cfg(feature = "gui")]
fn run_window(dispatcher: Dispatcher) -> Result<()> {
    pdfimageextract::ui::run_gui(dispatcher)
}

#[cfg(not(feature = "gui"))]
fn run_window(_dispatcher: Dispatcher) -> Result<()> {
    use clap::CommandFactory;

    Cli::command().print_help()?;
    process::exit(2);
}
