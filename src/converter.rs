use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    cleanup::{self, CleanupReport},
    config::Config,
    error::{Error, Result},
    options::{ConversionOptions, OptionKey, Setting},
};

/// Outcome of a successful [`Converter::generate`] run.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output: PathBuf,
    /// Top-level entries of the output directory that appeared or were
    /// rewritten during the run, plus the target HTML file.
    pub produced: Vec<PathBuf>,
    pub stdout: String,
}

/// Drives `pdftohtml` for one PDF file at a time.
///
/// ```no_run
/// use pdf2html::{Converter, Setting};
///
/// # fn main() -> pdf2html::Result<()> {
/// let mut converter = Converter::new("/usr/bin/pdftohtml");
/// converter
///     .open("/srv/docs/report.pdf")
///     .set_option(Setting::SinglePage(true))
///     .set_output_directory("/srv/html");
/// let conversion = converter.generate()?;
/// println!("wrote {}", conversion.output.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    bin: PathBuf,
    file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    options: ConversionOptions,
    generated: Vec<PathBuf>,
}

impl Converter {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            file: None,
            output_dir: None,
            options: ConversionOptions::default(),
            generated: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.bin).with_options(config.options)
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the PDF to convert. The output directory becomes the file's
    /// parent directory; existence is only checked by [`Converter::generate`].
    pub fn open(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        self.file = Some(path.to_path_buf());
        self.set_output_directory(parent)
    }

    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn set_option(&mut self, setting: Setting) -> &mut Self {
        self.options.set(setting);
        self
    }

    pub fn set_option_named(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        self.options.set_named(key, value)?;
        Ok(self)
    }

    pub fn set_options(&mut self, options: ConversionOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn option(&self, key: OptionKey) -> Setting {
        self.options.get(key)
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Files written by successful [`Converter::generate`] runs since the
    /// last cleanup.
    pub fn generated(&self) -> &[PathBuf] {
        &self.generated
    }

    pub fn generate_options(&self) -> String {
        self.options.generate()
    }

    /// `<output dir>/<input name>` with a trailing `.pdf` swapped for `.html`.
    pub fn output_path(&self) -> Result<PathBuf> {
        let file = self.file.as_deref().ok_or(Error::NoInput)?;
        let name = file.file_name().ok_or_else(|| Error::InputNotFound {
            path: file.to_path_buf(),
        })?;

        let mut html = match file.extension() {
            Some(extension) if extension == "pdf" => {
                file.file_stem().unwrap_or(name).to_os_string()
            }
            _ => name.to_os_string(),
        };
        html.push(".html");

        Ok(self.output_dir()?.join(html))
    }

    /// The `pdftohtml` invocation as an argument vector; no shell is involved.
    pub fn command(&self) -> Result<Command> {
        let file = self.file.as_deref().ok_or(Error::NoInput)?;
        let output = self.output_path()?;

        let mut command = Command::new(&self.bin);
        command.args(self.options.to_args()).arg(file).arg(output);

        Ok(command)
    }

    /// Runs `pdftohtml` and blocks until it exits.
    pub fn generate(&mut self) -> Result<Conversion> {
        let file = self.file.as_deref().ok_or(Error::NoInput)?;
        if !file.exists() {
            return Err(Error::InputNotFound {
                path: file.to_path_buf(),
            });
        }

        let output_dir = self.output_dir()?;
        let unwritable = |source: io::Error| Error::OutputDirectoryUnwritable {
            path: output_dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(output_dir).map_err(unwritable)?;
        let before = cleanup::snapshot(output_dir).map_err(unwritable)?;

        let output = self.output_path()?;
        let mut command = self.command()?;
        tracing::info!("Converting {} to {}...", file.display(), output.display());
        tracing::debug!("Running {:?}", command);

        let result = command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => Error::ExecutableNotFound {
                    path: self.bin.clone(),
                },
                _ => Error::Spawn {
                    path: self.bin.clone(),
                    source,
                },
            })?;

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_owned();
        if !result.status.success() {
            return Err(Error::ExecutableFailed {
                path: self.bin.clone(),
                code: result.status.code(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            tracing::warn!("pdftohtml: {stderr}");
        }

        let mut produced = match cleanup::snapshot(output_dir) {
            Ok(after) => cleanup::changed(&before, &after),
            Err(err) => {
                tracing::warn!("Could not list {}: {err}", output_dir.display());
                Vec::new()
            }
        };
        if output.exists() && !produced.contains(&output) {
            produced.push(output.clone());
        }
        tracing::info!("Wrote {} ({} files)", output.display(), produced.len());

        for path in &produced {
            if !self.generated.contains(path) {
                self.generated.push(path.clone());
            }
        }

        Ok(Conversion {
            output,
            produced,
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
        })
    }

    /// Deletes everything in the output directory except `.gitignore` files
    /// and the opened PDF. See [`cleanup::clear_directory`].
    pub fn clear_output_directory(&mut self) -> Result<CleanupReport> {
        let keep: Vec<&Path> = self.file.as_deref().into_iter().collect();
        let report = cleanup::clear_directory(self.output_dir()?, &keep)?;
        self.generated.clear();

        Ok(report)
    }

    /// Deletes only what [`Converter::generate`] produced since the last
    /// cleanup.
    pub fn clear_generated(&mut self) -> Result<CleanupReport> {
        let report = cleanup::remove_tracked(&self.generated)?;
        tracing::info!("Removed {} generated entries", report.removed());
        self.generated.clear();

        Ok(report)
    }

    fn output_dir(&self) -> Result<&Path> {
        self.output_dir.as_deref().ok_or(Error::NoInput)
    }
}
