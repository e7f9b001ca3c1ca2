//! Conversion jobs: destination resolution and multi-format emission.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    config::{Configuration, TargetFormat},
    engine::{FontEngine, FontModel},
    error::{Error, Result},
    host::{DestinationPrompt, JobReporter, Modifiers},
    paths,
    subset::CodePointSubset,
};

/// One conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub input: PathBuf,
    pub options: Configuration,
}

impl Payload {
    pub fn new(input: impl Into<PathBuf>, options: Configuration) -> Self {
        Self { input: input.into(), options }
    }
}

/// Result of [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preparation {
    Ready(Payload),
    /// The user cancelled the destination prompt.
    Aborted,
}

/// A file written by a job. `path` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub format: TargetFormat,
}

/// How a job ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(Vec<OutputFile>),
    Aborted,
}

/// Resolve the destination directory, prompting when asked to.
///
/// The prompt runs when `ask` is set or `ctrl` was held, and starts in the
/// input's directory. A chosen directory replaces the configured one.
pub fn prepare<P>(mut payload: Payload, modifiers: Modifiers, prompt: &P) -> Result<Preparation>
where
    P: DestinationPrompt + ?Sized,
{
    if !payload.options.ask && !modifiers.ctrl {
        return Ok(Preparation::Ready(payload));
    }

    let start = paths::input_dir(&payload.input);
    let selection = prompt.prompt_directory(start).map_err(Error::Prompt)?;
    if selection.cancelled {
        info!("Destination prompt cancelled for {}", payload.input.display());
        return Ok(Preparation::Aborted);
    }

    let destination = selection
        .paths
        .first()
        .and_then(|p| p.to_str())
        .filter(|p| !p.trim().is_empty())
        .ok_or(Error::InvalidDestination)?;
    debug!("Destination overridden with {destination:?}");
    payload.options.destination = destination.to_string();
    Ok(Preparation::Ready(payload))
}

/// Convert one input file into every configured format.
///
/// Any failure ends the job; files written for earlier formats and a backup
/// already made are left in place.
pub fn process<E, R>(payload: &Payload, engine: &E, reporter: &R) -> Result<Vec<OutputFile>>
where
    E: FontEngine + ?Sized,
    R: JobReporter + ?Sized,
{
    let input = payload.input.as_path();
    let options = &payload.options;
    let input_type = paths::input_type(input)?;
    let subset = CodePointSubset::from_config(options);

    let data = fs::read(input).map_err(|source| Error::Read { path: input.to_path_buf(), source })?;
    let mut font = engine.parse(&data, input_type, &subset)?;
    font.optimize()?;

    let out_dir = paths::output_dir(input, &options.destination);
    let stem = paths::input_stem(input);
    let total = options.formats.len();
    let mut outputs = Vec::with_capacity(total);

    for (i, &format) in options.formats.iter().enumerate() {
        reporter.stage(format.extension());
        engine.prepare_format(format)?;
        let bytes = font.write(format, options.hinting)?;

        let output = paths::output_path(&out_dir, &stem, format);
        if options.backup_original && paths::same_path(input, &output, options.path_case) {
            back_up(input)?;
        }

        fs::create_dir_all(&out_dir)
            .map_err(|source| Error::CreateDir { path: out_dir.clone(), source })?;
        fs::write(&output, &bytes).map_err(|source| Error::Write { path: output.clone(), source })?;
        info!("Wrote {} ({} bytes)", output.display(), bytes.len());

        let path = std::path::absolute(&output).unwrap_or(output);
        reporter.output_file(&path);
        reporter.progress(total, i + 1);
        outputs.push(OutputFile { path, format });
    }

    Ok(outputs)
}

fn back_up(input: &Path) -> Result<()> {
    let backup = paths::backup_path(input);
    fs::rename(input, &backup).map_err(|source| Error::Backup { path: input.to_path_buf(), source })?;
    info!("Backed up {} to {}", input.display(), backup.display());
    Ok(())
}

/// Prepare and process a single job.
pub fn run_job<P, E, R>(
    payload: Payload,
    modifiers: Modifiers,
    prompt: &P,
    engine: &E,
    reporter: &R,
) -> Result<JobOutcome>
where
    P: DestinationPrompt + ?Sized,
    E: FontEngine + ?Sized,
    R: JobReporter + ?Sized,
{
    match prepare(payload, modifiers, prompt)? {
        Preparation::Ready(payload) => process(&payload, engine, reporter).map(JobOutcome::Completed),
        Preparation::Aborted => Ok(JobOutcome::Aborted),
    }
}
