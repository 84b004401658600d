mod cli;

use cli::Args;

use clap::Parser;
use eyre::{eyre, Result};
use pdf2html::{Config, Converter, Setting};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::resolve(args.bin.clone(), args.config.as_deref())?;
    let mut converter = Converter::from_config(&config);
    converter.open(&args.input);

    if let Some(dir) = &args.output_dir {
        converter.set_output_directory(dir);
    }
    if args.single_page {
        converter.set_option(Setting::SinglePage(true));
    }
    if args.jpeg {
        converter.set_option(Setting::ImageFormatJpeg(true));
    }
    if args.ignore_images {
        converter.set_option(Setting::IgnoreImages(true));
    }
    if let Some(zoom) = args.zoom {
        converter.set_option(Setting::Zoom(zoom));
    }
    if args.frames {
        converter.set_option(Setting::NoFrames(false));
    }
    for setting in &args.settings {
        let (key, value) = setting
            .split_once('=')
            .ok_or(eyre!("Expected KEY=VALUE, got {setting}"))?;
        converter.set_option_named(key, value)?;
    }

    if args.clear {
        converter.clear_output_directory()?;
    }

    tracing::info!(
        "Converting {} with options {}",
        args.input.display(),
        converter.generate_options()
    );
    let conversion = converter.generate()?;

    for path in &conversion.produced {
        println!("{}", path.display());
    }

    if args.clear_generated {
        converter.clear_generated()?;
    }

    Ok(())
}
