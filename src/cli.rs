use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input pdf file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory, defaults to the directory of the input file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to the pdftohtml executable
    #[arg(short, long)]
    pub bin: Option<PathBuf>,

    /// JSON config file with `bin` and `options`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Generate a single HTML document (-c) instead of one per page (-s)
    #[arg(long)]
    pub single_page: bool,

    /// Write images as jpg instead of png
    #[arg(long)]
    pub jpeg: bool,

    /// Skip images
    #[arg(long)]
    pub ignore_images: bool,

    /// Zoom factor
    #[arg(short, long)]
    pub zoom: Option<f64>,

    /// Keep frames (omits -noframes)
    #[arg(long)]
    pub frames: bool,

    /// Set an option by name, e.g. `--set zoom=2`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Clear the output directory (keeping .gitignore and the input) before
    /// converting. Only allowed together with an explicit output directory
    #[arg(long, requires = "output_dir", conflicts_with = "clear_generated")]
    pub clear: bool,

    /// Remove the files produced by this run once they are listed
    #[arg(long)]
    pub clear_generated: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_needs_an_explicit_output_directory() {
        let err =
            Args::try_parse_from(["pdf2html", "-i", "docs/report.pdf", "--clear"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = Args::try_parse_from([
            "pdf2html",
            "-i",
            "docs/report.pdf",
            "--output-dir",
            "html",
            "--clear",
        ])
        .unwrap();
        assert!(args.clear);
        assert_eq!(args.output_dir, Some(PathBuf::from("html")));
    }
}
