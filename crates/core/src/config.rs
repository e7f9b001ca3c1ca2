//! Job configuration and option value types.

use std::{fmt, str::FromStr};

use indexmap::IndexSet;

use crate::error::ParseOptionError;

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetFormat {
    Ttf,
    Woff,
    Woff2,
    Eot,
    Svg,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 5] = [Self::Ttf, Self::Woff, Self::Woff2, Self::Eot, Self::Svg];

    /// File extension (and stage label) of the format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ttf => "ttf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Eot => "eot",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOptionError {
                kind: "format",
                value: s.to_string(),
                expected: "ttf, woff, woff2, eot, svg",
            })
    }
}

/// Named group of code points to keep when subsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetCategory {
    LowerCase,
    UpperCase,
    Digits,
    Punctuation,
    Custom,
}

impl SubsetCategory {
    pub const ALL: [SubsetCategory; 5] =
        [Self::LowerCase, Self::UpperCase, Self::Digits, Self::Punctuation, Self::Custom];

    pub fn name(self) -> &'static str {
        match self {
            Self::LowerCase => "a-z",
            Self::UpperCase => "A-Z",
            Self::Digits => "0-9",
            Self::Punctuation => "punctuation",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SubsetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubsetCategory {
    type Err = ParseOptionError;

    /// Case matters for the letter ranges; the word categories are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| match category {
                Self::LowerCase | Self::UpperCase | Self::Digits => category.name() == s,
                Self::Punctuation | Self::Custom => category.name().eq_ignore_ascii_case(s),
            })
            .ok_or_else(|| ParseOptionError {
                kind: "subset",
                value: s.to_string(),
                expected: "a-z, A-Z, 0-9, punctuation, custom",
            })
    }
}

/// Accepted input file type, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputType {
    Ttf,
    Otf,
    Woff,
    Woff2,
    Eot,
    Svg,
}

impl InputType {
    pub const ALL: [InputType; 6] =
        [Self::Ttf, Self::Otf, Self::Woff, Self::Woff2, Self::Eot, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ttf => "ttf",
            Self::Otf => "otf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Eot => "eot",
            Self::Svg => "svg",
        }
    }

    /// Match a trimmed, case-insensitive extension without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim();
        Self::ALL.into_iter().find(|t| t.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for InputType {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ParseOptionError {
            kind: "input type",
            value: s.trim().to_string(),
            expected: "ttf, otf, woff, woff2, eot, svg",
        })
    }
}

/// How output paths are compared with the input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCase {
    Sensitive,
    Insensitive,
}

impl PathCase {
    /// The usual behaviour of the platform's default filesystem.
    pub fn native() -> Self {
        if cfg!(any(windows, target_os = "macos")) { Self::Insensitive } else { Self::Sensitive }
    }
}

impl Default for PathCase {
    fn default() -> Self {
        Self::native()
    }
}

/// Resolved options of a single conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Prompt for the destination directory before running.
    pub ask: bool,
    /// Output directory, relative to the input's directory unless absolute.
    pub destination: String,
    /// Rename the input aside when an output would overwrite it.
    pub backup_original: bool,
    /// Formats to write, in emission order.
    pub formats: IndexSet<TargetFormat>,
    pub subsets: IndexSet<SubsetCategory>,
    /// Characters kept when [`SubsetCategory::Custom`] is selected.
    pub custom_subset: String,
    /// Keep TrueType hinting in the outputs.
    pub hinting: bool,
    pub path_case: PathCase,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            ask: false,
            destination: String::new(),
            backup_original: true,
            formats: IndexSet::new(),
            subsets: IndexSet::new(),
            custom_subset: String::new(),
            hinting: true,
            path_case: PathCase::native(),
        }
    }
}

impl Configuration {
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = TargetFormat>) -> Self {
        self.formats.extend(formats);
        self
    }

    pub fn with_subsets(mut self, subsets: impl IntoIterator<Item = SubsetCategory>) -> Self {
        self.subsets.extend(subsets);
        self
    }
}
