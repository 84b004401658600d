use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings passed to `pdftohtml`, one field per supported flag.
///
/// Build it once with a struct literal and hand it to the converter:
///
/// ```
/// use pdf2html::ConversionOptions;
///
/// let options = ConversionOptions {
///     single_page: true,
///     zoom: 2.0,
///     ..Default::default()
/// };
/// assert_eq!(options.generate(), "-c -fmt png -zoom 2 -noframes");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversionOptions {
    pub single_page: bool,
    #[serde(alias = "imageJpeg")]
    pub image_format_jpeg: bool,
    pub ignore_images: bool,
    /// Passed through as is. Zero and negative values are not rejected here;
    /// `pdftohtml` decides what to do with them.
    pub zoom: f64,
    pub no_frames: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            single_page: false,
            image_format_jpeg: false,
            ignore_images: false,
            zoom: 1.5,
            no_frames: true,
        }
    }
}

impl ConversionOptions {
    pub fn get(&self, key: OptionKey) -> Setting {
        match key {
            OptionKey::SinglePage => Setting::SinglePage(self.single_page),
            OptionKey::ImageFormatJpeg => Setting::ImageFormatJpeg(self.image_format_jpeg),
            OptionKey::IgnoreImages => Setting::IgnoreImages(self.ignore_images),
            OptionKey::Zoom => Setting::Zoom(self.zoom),
            OptionKey::NoFrames => Setting::NoFrames(self.no_frames),
        }
    }

    pub fn set(&mut self, setting: Setting) {
        match setting {
            Setting::SinglePage(value) => self.single_page = value,
            Setting::ImageFormatJpeg(value) => self.image_format_jpeg = value,
            Setting::IgnoreImages(value) => self.ignore_images = value,
            Setting::Zoom(value) => self.zoom = value,
            Setting::NoFrames(value) => self.no_frames = value,
        }
    }

    /// Assigns an option by its external name, e.g. `("zoom", "2")`.
    ///
    /// Unknown keys and unparsable values are errors and leave the options
    /// untouched.
    pub fn set_named(&mut self, key: &str, value: &str) -> Result<()> {
        let setting = Setting::parse(key.parse()?, value)?;
        self.set(setting);

        Ok(())
    }

    /// Flags for `pdftohtml` as separate arguments, in [`OptionKey::ALL`] order.
    pub fn to_args(&self) -> Vec<String> {
        OptionKey::ALL
            .iter()
            .flat_map(|key| self.get(*key).flags())
            .collect()
    }

    /// The same flags joined into a single space-separated string.
    pub fn generate(&self) -> String {
        self.to_args().join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    SinglePage,
    ImageFormatJpeg,
    IgnoreImages,
    Zoom,
    NoFrames,
}

impl OptionKey {
    /// Order in which flags are emitted.
    pub const ALL: [OptionKey; 5] = [
        OptionKey::SinglePage,
        OptionKey::ImageFormatJpeg,
        OptionKey::IgnoreImages,
        OptionKey::Zoom,
        OptionKey::NoFrames,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OptionKey::SinglePage => "singlePage",
            OptionKey::ImageFormatJpeg => "imageFormatJpeg",
            OptionKey::IgnoreImages => "ignoreImages",
            OptionKey::Zoom => "zoom",
            OptionKey::NoFrames => "noFrames",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OptionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "singlePage" => Ok(OptionKey::SinglePage),
            "imageFormatJpeg" | "imageJpeg" => Ok(OptionKey::ImageFormatJpeg),
            "ignoreImages" => Ok(OptionKey::IgnoreImages),
            "zoom" => Ok(OptionKey::Zoom),
            "noFrames" => Ok(OptionKey::NoFrames),
            _ => Err(Error::UnknownOption(s.to_owned())),
        }
    }
}

/// A single option together with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    SinglePage(bool),
    ImageFormatJpeg(bool),
    IgnoreImages(bool),
    Zoom(f64),
    NoFrames(bool),
}

impl Setting {
    pub fn key(&self) -> OptionKey {
        match self {
            Setting::SinglePage(_) => OptionKey::SinglePage,
            Setting::ImageFormatJpeg(_) => OptionKey::ImageFormatJpeg,
            Setting::IgnoreImages(_) => OptionKey::IgnoreImages,
            Setting::Zoom(_) => OptionKey::Zoom,
            Setting::NoFrames(_) => OptionKey::NoFrames,
        }
    }

    pub fn parse(key: OptionKey, value: &str) -> Result<Self> {
        let invalid = || Error::InvalidOptionValue {
            key: key.name().to_owned(),
            value: value.to_owned(),
        };
        let value = value.trim();

        match key {
            OptionKey::Zoom => value.parse().map(Setting::Zoom).map_err(|_| invalid()),
            OptionKey::SinglePage => parse_flag(value).map(Setting::SinglePage).ok_or_else(invalid),
            OptionKey::ImageFormatJpeg => parse_flag(value)
                .map(Setting::ImageFormatJpeg)
                .ok_or_else(invalid),
            OptionKey::IgnoreImages => parse_flag(value)
                .map(Setting::IgnoreImages)
                .ok_or_else(invalid),
            OptionKey::NoFrames => parse_flag(value).map(Setting::NoFrames).ok_or_else(invalid),
        }
    }

    fn flags(&self) -> Vec<String> {
        let flags: &[&str] = match *self {
            Setting::SinglePage(true) => &["-c"],
            Setting::SinglePage(false) => &["-s"],
            Setting::ImageFormatJpeg(true) => &["-fmt", "jpg"],
            Setting::ImageFormatJpeg(false) => &["-fmt", "png"],
            Setting::IgnoreImages(true) => &["-i"],
            Setting::IgnoreImages(false) => &[],
            Setting::Zoom(zoom) => return vec!["-zoom".to_owned(), zoom.to_string()],
            Setting::NoFrames(true) => &["-noframes"],
            Setting::NoFrames(false) => &[],
        };

        flags.iter().map(|flag| flag.to_string()).collect()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
