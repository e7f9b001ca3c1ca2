//! CLI definitions and batch dispatch.

use anyhow::{Error, Result};
use clap::Parser;
use fontgen_core::{
    BatchResult, Configuration, JobOutcome, Modifiers, PathCase, Payload, SfntEngine,
    SubsetCategory, TargetFormat, run_batch,
};

use crate::{
    console::{ConsolePrompt, ConsoleReporter},
    io::expand_inputs,
};

#[derive(Parser, Debug)]
#[command(name = "fontgen", version)]
#[command(about = "Convert fonts between ttf, otf, woff, woff2, eot and svg")]
pub struct Cli {
    /// Input fonts; glob patterns are expanded.
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Output formats, in the order they are written. Without any, inputs
    /// are only read and validated.
    #[arg(short, long = "format", value_delimiter = ',')]
    pub formats: Vec<TargetFormat>,

    /// Keep only these code point groups: a-z, A-Z, 0-9, punctuation, custom.
    #[arg(short, long = "subset", value_delimiter = ',')]
    pub subsets: Vec<SubsetCategory>,

    /// Characters kept by the `custom` subset.
    #[arg(long, default_value = "")]
    pub custom_subset: String,

    /// Output folder, relative to each input's folder.
    #[arg(short, long, default_value = "")]
    pub destination: String,

    /// Ask for the output folder before converting each input.
    #[arg(long)]
    pub ask: bool,

    /// Behave as if the ctrl modifier was held: always ask for the output folder.
    #[arg(long)]
    pub ctrl: bool,

    /// Overwrite an input instead of renaming it to <name>.BACKUP.<ext>.
    #[arg(long)]
    pub no_backup: bool,

    /// Strip TrueType hinting from the outputs.
    #[arg(long)]
    pub no_hinting: bool,

    /// Compare paths ignoring case when checking for collisions.
    #[arg(long, conflicts_with = "case_sensitive")]
    pub case_insensitive: bool,

    /// Compare paths respecting case when checking for collisions.
    #[arg(long)]
    pub case_sensitive: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Job options shared by every input.
    pub fn configuration(&self) -> Configuration {
        let path_case = if self.case_insensitive {
            PathCase::Insensitive
        } else if self.case_sensitive {
            PathCase::Sensitive
        } else {
            PathCase::native()
        };

        Configuration {
            ask: self.ask,
            destination: self.destination.clone(),
            backup_original: !self.no_backup,
            custom_subset: self.custom_subset.clone(),
            hinting: !self.no_hinting,
            path_case,
            ..Configuration::default()
        }
        .with_formats(self.formats.iter().copied())
        .with_subsets(self.subsets.iter().copied())
    }

    pub fn run(self) -> Result<()> {
        let inputs = expand_inputs(&self.inputs)?;
        let options = self.configuration();
        let modifiers = Modifiers { ctrl: self.ctrl };

        let payloads = inputs.into_iter().map(|input| Payload::new(input, options.clone()));
        let reports = run_batch(payloads, modifiers, &ConsolePrompt, &SfntEngine, |payload| {
            ConsoleReporter::new(&payload.input)
        });

        let result = BatchResult::from_reports(&reports);
        for report in reports {
            match report.result {
                Ok(JobOutcome::Completed(_)) => {}
                Ok(JobOutcome::Aborted) => eprintln!("Skipped {}", report.input.display()),
                Err(e) => {
                    let e = Error::new(e).context(format!("Failed to convert {}", report.input.display()));
                    eprintln!("{e:?}");
                }
            }
        }

        println!(
            "Convert: {} succeeded, {} failed, {} aborted",
            result.succeeded, result.failed, result.aborted
        );
        result.ok_or_bail("Convert")
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fontgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["-f", "woff2", "a.ttf"]).configuration();
        assert_eq!(config, Configuration::default().with_formats([TargetFormat::Woff2]));
    }

    #[test]
    fn test_formats_are_optional() {
        let config = parse(&["a.ttf"]).configuration();
        assert!(config.formats.is_empty());
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_formats_and_subsets_keep_order_without_duplicates() {
        let cli = parse(&["-f", "svg,ttf", "--format", "SVG", "-s", "0-9,a-z", "-s", "0-9", "a.otf"]);
        let config = cli.configuration();
        assert_eq!(config.formats.into_iter().collect::<Vec<_>>(), [TargetFormat::Svg, TargetFormat::Ttf]);
        assert_eq!(config.subsets.into_iter().collect::<Vec<_>>(), [
            SubsetCategory::Digits,
            SubsetCategory::LowerCase
        ]);
    }

    #[test]
    fn test_flags_map_to_configuration() {
        let cli = parse(&[
            "--ask",
            "-d",
            "web",
            "--no-backup",
            "--no-hinting",
            "--case-insensitive",
            "-s",
            "custom",
            "--custom-subset",
            "Ωé",
            "-f",
            "eot",
            "--ctrl",
            "a.ttf",
            "b/*.woff",
        ]);
        assert!(cli.ctrl);
        assert_eq!(cli.inputs, ["a.ttf", "b/*.woff"]);

        let config = cli.configuration();
        assert!(config.ask);
        assert_eq!(config.destination, "web");
        assert!(!config.backup_original);
        assert!(!config.hinting);
        assert_eq!(config.path_case, PathCase::Insensitive);
        assert_eq!(config.custom_subset, "Ωé");
    }

    #[test]
    fn test_case_sensitive_flag() {
        let config = parse(&["--case-sensitive", "-f", "ttf", "a.svg"]).configuration();
        assert_eq!(config.path_case, PathCase::Sensitive);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        for args in [
            &["-f", "otf", "a.ttf"][..],
            &["-f", "ttf", "-s", "latin", "a.ttf"],
            &["-f", "ttf"],
            &["-f", "ttf", "--case-sensitive", "--case-insensitive", "a.ttf"],
        ] {
            let argv = std::iter::once("fontgen").chain(args.iter().copied());
            assert!(Cli::try_parse_from(argv).is_err(), "{args:?}");
        }
    }
}
